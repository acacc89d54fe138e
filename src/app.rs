//! Interactive terminal driver.
//!
//! One loop iteration: gated monitor update, render of the views needing it,
//! copy of the terminal views into the frame, then up to 100ms of input.

use crate::error::Result;
use crate::grid::{Event as GridEvent, Key};
use crate::monitor::{Monitor, MonitorHooks};
use crate::render::TerminalRenderer;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout};
use std::time::Duration;

/// Input action resulting from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Forward to the view controllers.
    Grid(Key),
    /// No action.
    None,
}

/// Maps a key event to an action: `q`, `Esc` and `Ctrl+C` quit, everything
/// else goes to the controllers.
#[must_use]
pub fn action_for(event: KeyEvent) -> Action {
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        code => Key::from_crossterm(code).map_or(Action::None, Action::Grid),
    }
}

/// The interactive dashboard.
pub struct App<H: MonitorHooks> {
    monitor: Monitor<H>,
    should_quit: bool,
}

impl<H: MonitorHooks> App<H> {
    /// Dashboard driving `monitor`.
    #[must_use]
    pub fn new(monitor: Monitor<H>) -> Self {
        Self { monitor, should_quit: false }
    }

    /// The monitor.
    #[must_use]
    pub fn monitor(&self) -> &Monitor<H> {
        &self.monitor
    }

    /// Returns whether the app should quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Runs the application main loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup or rendering fails.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let poll_timeout = Duration::from_millis(100);

        while !self.should_quit {
            let size = terminal.size()?;
            self.set_host_size(size.width, size.height);
            self.monitor.update();
            if self.monitor.render_views() {
                terminal.draw(|frame| self.blit(frame.buffer_mut()))?;
            }

            if event::poll(poll_timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_action(action_for(key)),
                    Event::Resize(..) => {
                        terminal.clear()?;
                        self.force_render();
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Handles an input action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Grid(key) => {
                self.monitor.handle_event(&GridEvent::TermKeyHit(key));
            }
            Action::None => {}
        }
    }

    fn set_host_size(&mut self, width: u16, height: u16) {
        let keys = self.monitor.model().view_keys().to_vec();
        for key in keys {
            if let Some((view, _)) = self.monitor.model_mut().view_mut(key) {
                if let Some(renderer) = view.renderer_as_mut::<TerminalRenderer>() {
                    renderer.set_host_size(width, height);
                }
            }
        }
    }

    fn force_render(&mut self) {
        let keys = self.monitor.model().view_keys().to_vec();
        for key in keys {
            if let Some((view, _)) = self.monitor.model_mut().view_mut(key) {
                view.force_render();
            }
        }
    }

    fn blit(&self, target: &mut ratatui::buffer::Buffer) {
        for (_, view) in self.monitor.model().views() {
            if let Some(renderer) = view.renderer_as::<TerminalRenderer>() {
                renderer.blit(target);
            }
        }
    }
}
