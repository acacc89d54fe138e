//! Input events translated into view operations.

use super::data::GridData;
use super::view::{GridView, SortOrder};

/// Terminal-independent key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Home.
    Home,
    /// End.
    End,
}

#[cfg(feature = "terminal")]
impl Key {
    /// Converts a crossterm key code; keys without a counterpart give `None`.
    #[must_use]
    pub fn from_crossterm(code: crossterm::event::KeyCode) -> Option<Self> {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Char(c) => Some(Key::Char(c)),
            KeyCode::Up => Some(Key::Up),
            KeyCode::Down => Some(Key::Down),
            KeyCode::Left => Some(Key::Left),
            KeyCode::Right => Some(Key::Right),
            KeyCode::PageUp => Some(Key::PageUp),
            KeyCode::PageDown => Some(Key::PageDown),
            KeyCode::Home => Some(Key::Home),
            KeyCode::End => Some(Key::End),
            _ => None,
        }
    }
}

/// Input event routed to controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Key hit in a terminal.
    TermKeyHit(Key),
    /// Key pressed in a graphical host (host key code).
    GuiKeyDown(i32),
    /// Key released in a graphical host (host key code).
    GuiKeyUp(i32),
    /// Mouse button pressed at (x, y).
    MouseDown(u16, u16),
    /// Mouse button released at (x, y).
    MouseUp(u16, u16),
}

/// Translates events into operations on one view.
pub trait GridCtrl {
    /// Handles `event`; returns true if it was consumed.
    fn handle_event(&mut self, view: &mut GridView, data: &GridData, event: &Event) -> bool;
}

/// Meaning of the next digit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CtrlMode {
    /// Digit sorts by the column (again: flips the order).
    #[default]
    Sort,
    /// Digit toggles the column sum.
    Sum,
    /// Digit pins or unpins the column.
    Fix,
}

/// Keyboard controller for terminal views.
///
/// | Key | Effect |
/// |---|---|
/// | `0` | disable sorting |
/// | arrows | scroll one row or column |
/// | `+` / `-`, page keys | scroll one page |
/// | `=` `s` `S` | next digit toggles a sum |
/// | `f` `F` | next digit pins or unpins |
/// | `1`..`9` | act on the Nth displayed column |
#[derive(Debug, Clone, Default)]
pub struct TermGridCtrl {
    mode: CtrlMode,
}

impl TermGridCtrl {
    /// Creates a controller in sort mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending digit mode.
    #[must_use]
    pub fn mode(&self) -> CtrlMode {
        self.mode
    }

    fn handle_key(&mut self, view: &mut GridView, data: &GridData, key: Key) -> bool {
        let page = i32::from(view.geometry().height);
        match key {
            Key::Char('0') => view.disable_sort(),
            Key::Up => view.scroll_view(-1, 0),
            Key::Down => view.scroll_view(1, 0),
            Key::Left => view.scroll_view(0, -1),
            Key::Right => view.scroll_view(0, 1),
            Key::Char('+') | Key::PageDown => view.scroll_view(page, 0),
            Key::Char('-') | Key::PageUp => view.scroll_view(-page, 0),
            Key::Home => view.scroll_view(i32::MIN, 0),
            Key::End => view.scroll_view(i32::MAX, 0),
            Key::Char('=' | 's' | 'S') => self.mode = CtrlMode::Sum,
            Key::Char('f' | 'F') => self.mode = CtrlMode::Fix,
            Key::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                let mode = std::mem::take(&mut self.mode);
                let Some(column) = view.display_columns().get(index).copied() else {
                    return true;
                };
                match mode {
                    CtrlMode::Sum => {
                        view.toggle_column_sum(data, column);
                    }
                    CtrlMode::Fix => {
                        view.toggle_column_fixed(column);
                    }
                    CtrlMode::Sort => {
                        let order = match view.sort_spec() {
                            Some(spec) if spec.column == column => spec.order.toggled(),
                            Some(spec) => spec.order,
                            None => SortOrder::Descending,
                        };
                        view.sort_by(column, order);
                    }
                }
            }
            Key::Char(_) => return false,
        }
        true
    }
}

impl GridCtrl for TermGridCtrl {
    fn handle_event(&mut self, view: &mut GridView, data: &GridData, event: &Event) -> bool {
        match event {
            Event::TermKeyHit(key) => self.handle_key(view, data, *key),
            _ => false,
        }
    }
}
