//! Per-consumer projections of a grid model.
//!
//! A [`GridView`] keeps its own ordering, visibility, sort, fixed items, sums,
//! styles and geometry over the shared model, and draws itself through a
//! [`Renderer`]. The model owns its connected views and notifies them of every
//! change; view operations that read cell data take the model's [`GridData`].

mod layout;
mod renderer;

pub use layout::{AutoSize, Rect};
pub use renderer::{CellItem, HeaderItem, Placement, Renderer, TextRenderer};

use self::layout::{column_widths, place_fixed, WidthRequest};
use super::data::GridData;
use super::filter::GridFilter;
use super::item::{FixedPosition, UpdateCounter};
use super::log::GridLog;
use super::style::GridStyle;
use super::{ColumnKey, RowKey};
use crate::debug::DebugLog;
use crate::error::Result;
use crate::format::BlockType;
use crate::value::{Value, ValueKind};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifier of a registered style. Items whose tag equals a style id use
/// that style unless overridden.
pub type StyleId = i32;

/// Row sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// `asc`/`ascending` (any case) is ascending; anything else descending.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.eq_ignore_ascii_case("asc") || text.eq_ignore_ascii_case("ascending") {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }

    fn indicator(self) -> char {
        match self {
            SortOrder::Ascending => '^',
            SortOrder::Descending => 'v',
        }
    }
}

/// Active sort of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Sort column.
    pub column: ColumnKey,
    /// Direction.
    pub order: SortOrder,
}

/// Extra separator lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    /// Separator line below the header.
    pub additional_header_line: bool,
    /// Separator line above the sum bar.
    pub additional_sum_line: bool,
}

#[derive(Debug, Clone)]
struct ColumnView {
    key: ColumnKey,
    visible: bool,
    sum: Option<Value>,
    fixed: Option<FixedPosition>,
    style: Option<StyleId>,
}

#[derive(Debug, Clone)]
struct RowView {
    key: RowKey,
    passes: bool,
    hidden: bool,
    fixed: Option<FixedPosition>,
    style: Option<StyleId>,
    filter_style: Option<StyleId>,
}

impl RowView {
    fn visible(&self) -> bool {
        self.passes && !self.hidden
    }
}

#[derive(Debug, Clone)]
struct StyleFilter {
    filter: GridFilter,
    style: StyleId,
}

/// Columns (with widths) and rows a frame draws, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    /// Rendered columns and their widths.
    pub columns: Vec<(ColumnKey, u16)>,
    /// Rendered rows.
    pub rows: Vec<RowKey>,
}

/// Projection of a model drawn through a renderer.
pub struct GridView {
    name: String,
    renderer: Box<dyn Renderer>,
    columns: Vec<ColumnView>,
    rows: Vec<RowView>,
    row_index: HashMap<RowKey, usize>,
    sort: Option<SortSpec>,
    sort_needed: bool,
    sums_dirty: bool,
    filter: GridFilter,
    style_filters: Vec<StyleFilter>,
    styles: BTreeMap<StyleId, GridStyle>,
    default_style: GridStyle,
    header_style: GridStyle,
    sum_style: GridStyle,
    geometry: Rect,
    auto_size: AutoSize,
    row_scroll: usize,
    column_scroll: usize,
    options: ViewOptions,
    counter: UpdateCounter,
    last_render: Option<u64>,
    log: Option<GridLog>,
    log_active: bool,
    debug: DebugLog,
}

impl GridView {
    /// Creates an unsorted, unfiltered view drawing through `renderer`.
    #[must_use]
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self {
            name: String::from("view"),
            renderer,
            columns: Vec::new(),
            rows: Vec::new(),
            row_index: HashMap::new(),
            sort: None,
            sort_needed: false,
            sums_dirty: false,
            filter: GridFilter::new(),
            style_filters: Vec::new(),
            styles: BTreeMap::new(),
            default_style: GridStyle::new(),
            header_style: GridStyle::header(),
            sum_style: GridStyle::sum_bar(),
            geometry: Rect::default(),
            auto_size: AutoSize::default(),
            row_scroll: 0,
            column_scroll: 0,
            options: ViewOptions::default(),
            counter: UpdateCounter::default(),
            last_render: None,
            log: None,
            log_active: false,
            debug: DebugLog::new(),
        }
    }

    /// Sets the name used in debug output (builder form).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets geometry (builder form).
    #[must_use]
    pub fn with_geometry(mut self, geometry: Rect) -> Self {
        self.geometry = geometry;
        self
    }

    /// Sets auto-sizing (builder form).
    #[must_use]
    pub fn with_auto_size(mut self, auto_size: AutoSize) -> Self {
        self.auto_size = auto_size;
        self
    }

    /// View name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Renderer
    // ========================================================================

    /// Renderer.
    #[must_use]
    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Mutable renderer.
    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    /// Renderer downcast to its concrete type.
    #[must_use]
    pub fn renderer_as<T: 'static>(&self) -> Option<&T> {
        self.renderer.as_any().downcast_ref::<T>()
    }

    /// Mutable renderer downcast to its concrete type.
    pub fn renderer_as_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.renderer.as_any_mut().downcast_mut::<T>()
    }

    // ========================================================================
    // Change tracking
    // ========================================================================

    /// View update count; advances on every change that affects output.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.counter.get()
    }

    /// Returns true if something changed since the last render.
    #[must_use]
    pub fn need_render(&self) -> bool {
        self.last_render != Some(self.counter.get())
    }

    /// Marks the view dirty.
    pub fn force_render(&mut self) {
        self.counter.bump();
    }

    fn touch(&mut self) {
        self.counter.bump();
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Position and size.
    #[must_use]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Moves and resizes the view.
    pub fn set_geometry(&mut self, geometry: Rect) {
        if self.geometry != geometry {
            self.geometry = geometry;
            self.touch();
        }
    }

    /// Resizes; zero dimensions are left unchanged.
    pub fn resize(&mut self, width: u16, height: u16) {
        let mut geometry = self.geometry;
        if width > 0 {
            geometry.width = width;
        }
        if height > 0 {
            geometry.height = height;
        }
        self.set_geometry(geometry);
    }

    /// Auto-size settings.
    #[must_use]
    pub fn auto_size(&self) -> AutoSize {
        self.auto_size
    }

    /// Changes auto-size settings.
    pub fn set_auto_size(&mut self, auto_size: AutoSize) {
        self.auto_size = auto_size;
        self.touch();
    }

    /// Re-fits geometry to the renderer's host size; returns true if it changed.
    pub fn refresh_auto_size(&mut self) -> bool {
        if !self.auto_size.is_enabled() {
            return false;
        }
        let Some(host) = self.renderer.host_size() else {
            return false;
        };
        let changed = self.auto_size.apply(&mut self.geometry, host);
        if changed {
            self.touch();
        }
        changed
    }

    /// Separator options.
    #[must_use]
    pub fn options(&self) -> ViewOptions {
        self.options
    }

    /// Changes separator options.
    pub fn set_options(&mut self, options: ViewOptions) {
        self.options = options;
        self.touch();
    }

    // ========================================================================
    // Model notifications
    // ========================================================================

    pub(crate) fn attach(&mut self, data: &GridData, debug: DebugLog) {
        if let Some(log) = &mut self.log {
            log.set_debug(debug.clone());
        }
        self.debug = debug;
        self.columns.clear();
        self.rows.clear();
        self.row_index.clear();
        for key in data.column_keys().to_vec() {
            self.on_column_added(data, key);
        }
        for key in data.row_keys().to_vec() {
            self.on_row_added(data, key);
        }
        self.after_shape_change(data);
        crate::debug!(self.debug, "view", "{} attached ({} columns, {} rows)", self.name, self.columns.len(), self.rows.len());
    }

    pub(crate) fn detach(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.row_index.clear();
        self.sort = None;
        self.row_scroll = 0;
        self.column_scroll = 0;
        self.touch();
    }

    pub(crate) fn on_column_added(&mut self, data: &GridData, key: ColumnKey) {
        let fixed = data.column(key).and_then(|c| c.fixed());
        self.columns.push(ColumnView { key, visible: true, sum: None, fixed, style: None });
        self.touch();
    }

    pub(crate) fn on_column_removing(&mut self, key: ColumnKey) {
        self.columns.retain(|c| c.key != key);
        if self.sort.is_some_and(|s| s.column == key) {
            crate::debug!(self.debug, "view", "{}: sort column removed, sorting disabled", self.name);
            self.sort = None;
        }
        self.column_scroll = self.column_scroll.min(self.columns.len().saturating_sub(1));
        self.sums_dirty = true;
        self.touch();
    }

    pub(crate) fn on_row_added(&mut self, data: &GridData, key: RowKey) {
        let fixed = data.row(key).and_then(|r| r.fixed());
        let mut view = RowView { key, passes: true, hidden: false, fixed, style: None, filter_style: None };
        self.evaluate_row(data, &mut view);
        let visible = view.visible();
        self.row_index.insert(key, self.rows.len());
        self.rows.push(view);
        if self.sort.is_some() {
            self.sort_needed = true;
        }
        self.sums_dirty = true;
        if visible {
            self.log_row(data, key, BlockType::Added);
        }
        self.touch();
    }

    pub(crate) fn on_row_removing(&mut self, data: &GridData, key: RowKey) {
        let Some(index) = self.row_index.get(&key).copied() else {
            return;
        };
        if self.rows[index].visible() {
            self.log_row(data, key, BlockType::Erased);
        }
        self.rows.remove(index);
        self.reindex();
        self.sums_dirty = true;
        self.touch();
    }

    pub(crate) fn on_cell_changed(&mut self, data: &GridData, row: RowKey, column: ColumnKey) {
        let Some(index) = self.row_index.get(&row).copied() else {
            return;
        };
        let was_visible = self.rows[index].visible();
        let mut view = self.rows[index].clone();
        self.evaluate_row(data, &mut view);
        let visible = view.visible();
        self.rows[index] = view;

        match (was_visible, visible) {
            (true, true) => self.log_row(data, row, BlockType::Updated),
            (false, true) => self.log_row(data, row, BlockType::Added),
            (true, false) => self.log_row(data, row, BlockType::Erased),
            (false, false) => {}
        }
        if self.sort.is_some_and(|s| s.column == column) {
            self.sort_needed = true;
        }
        self.sums_dirty = true;
        self.touch();
    }

    pub(crate) fn on_row_changed(&mut self, data: &GridData, row: RowKey) {
        let Some(index) = self.row_index.get(&row).copied() else {
            return;
        };
        let mut view = self.rows[index].clone();
        view.fixed = data.row(row).and_then(|r| r.fixed());
        self.evaluate_row(data, &mut view);
        self.rows[index] = view;
        self.sums_dirty = true;
        self.touch();
    }

    pub(crate) fn on_column_changed(&mut self, data: &GridData, column: ColumnKey) {
        let fixed = data.column(column).and_then(|c| c.fixed());
        if let Some(view) = self.columns.iter_mut().find(|c| c.key == column) {
            view.fixed = fixed;
            if let (Some(sum), Some(col)) = (view.sum.as_mut(), data.column(column)) {
                sum.set_kind(col.kind());
            }
        }
        if self.sort.is_some_and(|s| s.column == column) {
            self.sort_needed = true;
        }
        self.refilter(data);
    }

    /// Re-resolves every filter after columns were added or removed.
    pub(crate) fn after_shape_change(&mut self, data: &GridData) {
        self.filter.refresh(data);
        for rule in &mut self.style_filters {
            rule.filter.refresh(data);
        }
        if let Some(log) = &mut self.log {
            log.refresh_filter(data);
        }
        self.refilter(data);
    }

    /// Re-evaluates filters and style filters for every row.
    pub(crate) fn refilter(&mut self, data: &GridData) {
        let mut rows = std::mem::take(&mut self.rows);
        for view in &mut rows {
            self.evaluate_row(data, view);
        }
        self.rows = rows;
        self.sums_dirty = true;
        self.touch();
    }

    fn evaluate_row(&self, data: &GridData, view: &mut RowView) {
        view.passes = data.row_passes_filter(view.key) && self.filter.apply(data, view.key);
        view.filter_style = self.style_filters.iter().find(|rule| rule.filter.apply(data, view.key)).map(|rule| rule.style);
    }

    fn reindex(&mut self) {
        self.row_index = self.rows.iter().enumerate().map(|(i, r)| (r.key, i)).collect();
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Number of columns known to the view (visible or not).
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column keys in view order.
    pub fn column_keys(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        self.columns.iter().map(|c| c.key)
    }

    fn column_view(&self, key: ColumnKey) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.key == key)
    }

    fn column_view_mut(&mut self, key: ColumnKey) -> Option<&mut ColumnView> {
        self.columns.iter_mut().find(|c| c.key == key)
    }

    /// Returns true if `key` is shown by this view.
    #[must_use]
    pub fn is_column_visible(&self, key: ColumnKey) -> bool {
        self.column_view(key).is_some_and(|c| c.visible)
    }

    /// Shows or hides a column; returns false for unknown columns.
    pub fn set_column_visible(&mut self, key: ColumnKey, visible: bool) -> bool {
        let Some(view) = self.column_view_mut(key) else {
            return false;
        };
        if view.visible != visible {
            view.visible = visible;
            self.touch();
        }
        true
    }

    /// Shows exactly `keys`, in that order, ahead of the hidden columns.
    pub fn show_only(&mut self, keys: &[ColumnKey]) {
        let mut shown = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(index) = self.columns.iter().position(|c| c.key == *key) {
                let mut view = self.columns.remove(index);
                view.visible = true;
                shown.push(view);
            }
        }
        for view in &mut self.columns {
            view.visible = false;
        }
        shown.append(&mut self.columns);
        self.columns = shown;
        self.column_scroll = 0;
        self.touch();
    }

    /// Moves `key` right after `after`, or to the front when `after` is `None`.
    pub fn move_column(&mut self, key: ColumnKey, after: Option<ColumnKey>) -> bool {
        if after == Some(key) {
            return false;
        }
        let Some(from) = self.columns.iter().position(|c| c.key == key) else {
            return false;
        };
        let view = self.columns.remove(from);
        let to = match after {
            None => 0,
            Some(after) => match self.columns.iter().position(|c| c.key == after) {
                Some(index) => index + 1,
                None => {
                    self.columns.insert(from, view);
                    return false;
                }
            },
        };
        self.columns.insert(to, view);
        self.touch();
        true
    }

    /// Visible columns in display order: scrolled flowing columns with fixed
    /// columns placed at their pinned positions.
    #[must_use]
    pub fn display_columns(&self) -> Vec<ColumnKey> {
        let flowing: Vec<ColumnKey> = self
            .columns
            .iter()
            .filter(|c| c.visible && c.fixed.is_none())
            .skip(self.column_scroll)
            .map(|c| c.key)
            .collect();
        let fixed = self.columns.iter().filter(|c| c.visible).filter_map(|c| c.fixed.map(|f| (c.key, f))).collect();
        place_fixed(flowing, fixed)
    }

    // ========================================================================
    // Rows
    // ========================================================================

    /// Number of rows known to the view (visible or not).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row keys in view order.
    pub fn row_keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.rows.iter().map(|r| r.key)
    }

    /// Visible row keys in view order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<RowKey> {
        self.rows.iter().filter(|r| r.visible()).map(|r| r.key).collect()
    }

    /// Returns true if `key` passes the filters and is not hidden.
    #[must_use]
    pub fn is_row_visible(&self, key: RowKey) -> bool {
        self.row_index.get(&key).is_some_and(|i| self.rows[*i].visible())
    }

    /// Hides or shows a row; returns false for unknown rows.
    pub fn set_row_visible(&mut self, key: RowKey, visible: bool) -> bool {
        let Some(index) = self.row_index.get(&key).copied() else {
            return false;
        };
        if self.rows[index].hidden == visible {
            self.rows[index].hidden = !visible;
            self.sums_dirty = true;
            self.touch();
        }
        true
    }

    /// Hides or shows the row at view position `index`; refused while sorted.
    pub fn set_row_visible_at(&mut self, index: usize, visible: bool) -> bool {
        if self.sort.is_some() {
            return false;
        }
        match self.rows.get(index).map(|r| r.key) {
            Some(key) => self.set_row_visible(key, visible),
            None => false,
        }
    }

    /// Moves `key` right after `after`, or to the front; refused while sorted.
    pub fn move_row(&mut self, key: RowKey, after: Option<RowKey>) -> bool {
        if self.sort.is_some() || after == Some(key) {
            return false;
        }
        let Some(from) = self.row_index.get(&key).copied() else {
            return false;
        };
        let to = match after {
            None => 0,
            Some(after) => match self.row_index.get(&after) {
                Some(index) if *index < from => index + 1,
                Some(index) => *index,
                None => return false,
            },
        };
        let view = self.rows.remove(from);
        self.rows.insert(to, view);
        self.reindex();
        self.touch();
        true
    }

    // ========================================================================
    // Sort
    // ========================================================================

    /// Sorts rows by `column`; returns false for columns unknown to the view.
    pub fn sort_by(&mut self, column: ColumnKey, order: SortOrder) -> bool {
        if self.column_view(column).is_none() {
            return false;
        }
        let spec = SortSpec { column, order };
        if self.sort != Some(spec) {
            self.sort = Some(spec);
            self.sort_needed = true;
            self.touch();
        }
        true
    }

    /// Restores insertion-independent manual order (rows stay where they are).
    pub fn disable_sort(&mut self) {
        if self.sort.take().is_some() {
            self.sort_needed = false;
            self.touch();
        }
    }

    /// Active sort.
    #[must_use]
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Returns true if sorted by `column`.
    #[must_use]
    pub fn is_sorted_by(&self, column: ColumnKey) -> bool {
        self.sort.is_some_and(|s| s.column == column)
    }

    fn sort_rows(&mut self, data: &GridData) {
        self.sort_needed = false;
        let Some(spec) = self.sort else {
            return;
        };
        let Some(kind) = data.column(spec.column).map(super::column::GridColumn::kind) else {
            self.sort = None;
            return;
        };
        let mut keyed: Vec<(Value, RowView)> = self
            .rows
            .drain(..)
            .map(|view| {
                let value = data.value_or_default(view.key, spec.column).unwrap_or_else(|| Value::of_kind(kind));
                (value, view)
            })
            .collect();
        keyed.sort_by(|a, b| match spec.order {
            SortOrder::Ascending => a.0.compare(&b.0),
            SortOrder::Descending => b.0.compare(&a.0),
        });
        self.rows = keyed.into_iter().map(|(_, view)| view).collect();
        self.reindex();
        self.touch();
    }

    // ========================================================================
    // Fixed items
    // ========================================================================

    /// Pins a column in this view.
    pub fn fix_column(&mut self, key: ColumnKey, position: FixedPosition) -> bool {
        self.set_column_fixed(key, Some(position))
    }

    /// Unpins a column in this view.
    pub fn unfix_column(&mut self, key: ColumnKey) -> bool {
        self.set_column_fixed(key, None)
    }

    fn set_column_fixed(&mut self, key: ColumnKey, fixed: Option<FixedPosition>) -> bool {
        let Some(view) = self.column_view_mut(key) else {
            return false;
        };
        view.fixed = fixed;
        self.touch();
        true
    }

    /// Pins the column after the columns already pinned at the start, or
    /// unpins it if pinned.
    pub fn toggle_column_fixed(&mut self, key: ColumnKey) -> bool {
        let pinned = self.columns.iter().filter(|c| c.fixed.is_some_and(|f| !f.at_end)).count();
        match self.column_view(key).map(|c| c.fixed) {
            Some(Some(_)) => self.unfix_column(key),
            Some(None) => self.fix_column(key, FixedPosition::start(pinned)),
            None => false,
        }
    }

    /// Pin state of a column in this view.
    #[must_use]
    pub fn column_fixed(&self, key: ColumnKey) -> Option<FixedPosition> {
        self.column_view(key).and_then(|c| c.fixed)
    }

    /// Pins a row in this view.
    pub fn fix_row(&mut self, key: RowKey, position: FixedPosition) -> bool {
        self.set_row_fixed(key, Some(position))
    }

    /// Unpins a row in this view.
    pub fn unfix_row(&mut self, key: RowKey) -> bool {
        self.set_row_fixed(key, None)
    }

    fn set_row_fixed(&mut self, key: RowKey, fixed: Option<FixedPosition>) -> bool {
        let Some(index) = self.row_index.get(&key).copied() else {
            return false;
        };
        self.rows[index].fixed = fixed;
        self.touch();
        true
    }

    // ========================================================================
    // Sums
    // ========================================================================

    /// Enables or disables the sum of a column and computes it at once.
    pub fn set_column_sum(&mut self, data: &GridData, key: ColumnKey, enabled: bool) -> bool {
        let Some(kind) = data.column(key).map(super::column::GridColumn::kind) else {
            return false;
        };
        let Some(view) = self.column_view_mut(key) else {
            return false;
        };
        if view.sum.is_some() == enabled {
            return true;
        }
        view.sum = enabled.then(|| Value::of_kind(kind));
        self.recalc_sums(data);
        self.touch();
        true
    }

    /// Flips the sum of a column.
    pub fn toggle_column_sum(&mut self, data: &GridData, key: ColumnKey) -> bool {
        let enabled = self.is_column_sum_enabled(key);
        self.set_column_sum(data, key, !enabled)
    }

    /// Returns true if `key` has its sum enabled.
    #[must_use]
    pub fn is_column_sum_enabled(&self, key: ColumnKey) -> bool {
        self.column_view(key).is_some_and(|c| c.sum.is_some())
    }

    /// Current sum of a column, if enabled.
    #[must_use]
    pub fn column_sum(&self, key: ColumnKey) -> Option<&Value> {
        self.column_view(key).and_then(|c| c.sum.as_ref())
    }

    /// Returns true if any column sums.
    #[must_use]
    pub fn has_sums(&self) -> bool {
        self.columns.iter().any(|c| c.sum.is_some())
    }

    fn recalc_sums(&mut self, data: &GridData) {
        self.sums_dirty = false;
        let rows: Vec<RowKey> = self
            .rows
            .iter()
            .filter(|r| r.visible() && data.row(r.key).is_some_and(super::row::GridRow::is_sum_considered))
            .map(|r| r.key)
            .collect();
        for view in &mut self.columns {
            let Some(sum) = view.sum.as_mut() else {
                continue;
            };
            sum.reset();
            if sum.kind() == ValueKind::String {
                continue;
            }
            for row in &rows {
                if let Some(value) = data.value(*row, view.key) {
                    *sum += value;
                }
            }
        }
    }

    // ========================================================================
    // Styles
    // ========================================================================

    /// Registers or replaces a style.
    pub fn set_style(&mut self, id: StyleId, style: GridStyle) {
        self.styles.insert(id, style);
        self.touch();
    }

    /// Style registered under `id`, or the default cell style.
    #[must_use]
    pub fn style(&self, id: StyleId) -> &GridStyle {
        self.styles.get(&id).unwrap_or(&self.default_style)
    }

    /// Returns true if a style is registered under `id`.
    #[must_use]
    pub fn has_style(&self, id: StyleId) -> bool {
        self.styles.contains_key(&id)
    }

    /// Default cell style.
    #[must_use]
    pub fn default_style(&self) -> &GridStyle {
        &self.default_style
    }

    /// Replaces the default cell style.
    pub fn set_default_style(&mut self, style: GridStyle) {
        self.default_style = style;
        self.touch();
    }

    /// Column header style.
    #[must_use]
    pub fn header_style(&self) -> &GridStyle {
        &self.header_style
    }

    /// Replaces the column header style.
    pub fn set_header_style(&mut self, style: GridStyle) {
        self.header_style = style;
        self.touch();
    }

    /// Sum bar style.
    #[must_use]
    pub fn sum_style(&self) -> &GridStyle {
        &self.sum_style
    }

    /// Replaces the sum bar style.
    pub fn set_sum_style(&mut self, style: GridStyle) {
        self.sum_style = style;
        self.touch();
    }

    /// Overrides the tag-derived style of a column.
    pub fn set_column_style(&mut self, key: ColumnKey, style: Option<StyleId>) -> bool {
        let Some(view) = self.column_view_mut(key) else {
            return false;
        };
        view.style = style;
        self.touch();
        true
    }

    /// Overrides the tag-derived style of a row.
    pub fn set_row_style(&mut self, key: RowKey, style: Option<StyleId>) -> bool {
        let Some(index) = self.row_index.get(&key).copied() else {
            return false;
        };
        self.rows[index].style = style;
        self.touch();
        true
    }

    /// Adds a rule; rows matching `expression` use style `style`.
    ///
    /// Rules are tried in insertion order and the first match wins.
    pub fn add_style_filter(&mut self, data: &GridData, expression: &str, style: StyleId) -> Result<()> {
        let mut filter = GridFilter::parse(expression)?;
        filter.refresh(data);
        self.style_filters.push(StyleFilter { filter, style });
        self.refilter(data);
        Ok(())
    }

    /// Removes the rule at `index`.
    pub fn remove_style_filter(&mut self, data: &GridData, index: usize) -> bool {
        if index >= self.style_filters.len() {
            return false;
        }
        self.style_filters.remove(index);
        self.refilter(data);
        true
    }

    /// Removes every rule.
    pub fn clear_style_filters(&mut self, data: &GridData) {
        self.style_filters.clear();
        self.refilter(data);
    }

    /// Number of rules.
    #[must_use]
    pub fn style_filter_count(&self) -> usize {
        self.style_filters.len()
    }

    /// Style a cell is drawn with: style-filter match, then row style, then
    /// column style, then the default. Row and column styles come from the
    /// explicit override or the item tag.
    #[must_use]
    pub fn cell_style(&self, data: &GridData, row: RowKey, column: ColumnKey) -> &GridStyle {
        let row_view = self.row_index.get(&row).map(|i| &self.rows[*i]);
        let row_tag = data.row(row).and_then(|r| r.tag()).map(|t| t.0);
        let column_view = self.column_view(column);
        let column_tag = data.column(column).and_then(|c| c.tag()).map(|t| t.0);

        let candidates = [
            row_view.and_then(|r| r.filter_style),
            row_view.and_then(|r| r.style).or(row_tag),
            column_view.and_then(|c| c.style).or(column_tag),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(|id| self.styles.get(&id))
            .unwrap_or(&self.default_style)
    }

    // ========================================================================
    // Filter
    // ========================================================================

    /// Replaces the view filter and re-evaluates every row.
    ///
    /// A malformed expression disables the filter and is returned as an error.
    pub fn set_filter(&mut self, data: &GridData, expression: &str) -> Result<()> {
        let result = self.filter.set(expression);
        self.filter.refresh(data);
        self.refilter(data);
        result
    }

    /// View filter.
    #[must_use]
    pub fn filter(&self) -> &GridFilter {
        &self.filter
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    fn flowing_rows(&self) -> impl Iterator<Item = &RowView> {
        self.rows.iter().filter(|r| r.visible() && r.fixed.is_none())
    }

    fn flowing_columns(&self) -> impl Iterator<Item = &ColumnView> {
        self.columns.iter().filter(|c| c.visible && c.fixed.is_none())
    }

    /// First scrolled (non-fixed) visible row.
    #[must_use]
    pub fn first_row(&self) -> Option<RowKey> {
        self.flowing_rows().nth(self.row_scroll).map(|r| r.key)
    }

    /// First scrolled (non-fixed) visible column.
    #[must_use]
    pub fn first_column(&self) -> Option<ColumnKey> {
        self.flowing_columns().nth(self.column_scroll).map(|c| c.key)
    }

    /// Scrolls so that `key` is the first row.
    pub fn scroll_row_to(&mut self, key: RowKey) -> bool {
        let found = self.flowing_rows().position(|r| r.key == key);
        match found {
            Some(index) => {
                self.row_scroll = index;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Scrolls so that `key` is the first column.
    pub fn scroll_column_to(&mut self, key: ColumnKey) -> bool {
        let found = self.flowing_columns().position(|c| c.key == key);
        match found {
            Some(index) => {
                self.column_scroll = index;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Scrolls by a signed number of rows and columns, clamped to the content.
    pub fn scroll_view(&mut self, rows: i32, columns: i32) {
        let row_max = self.flowing_rows().count().saturating_sub(1);
        let column_max = self.flowing_columns().count().saturating_sub(1);
        let rows_to = offset(self.row_scroll, rows).min(row_max);
        let columns_to = offset(self.column_scroll, columns).min(column_max);
        if rows_to != self.row_scroll || columns_to != self.column_scroll {
            self.row_scroll = rows_to;
            self.column_scroll = columns_to;
            self.touch();
        }
    }

    // ========================================================================
    // Layout and rendering
    // ========================================================================

    fn header_lines(&self) -> u16 {
        1 + u16::from(self.options.additional_header_line)
    }

    fn sum_lines(&self) -> u16 {
        if self.has_sums() {
            1 + u16::from(self.options.additional_sum_line)
        } else {
            0
        }
    }

    /// Columns and rows the next frame draws.
    #[must_use]
    pub fn plan(&self, data: &GridData) -> RenderPlan {
        let render_all = self.renderer.render_all_items();
        let keys = self.display_columns();
        let requests: Vec<WidthRequest> = keys
            .iter()
            .filter_map(|key| data.column(*key))
            .map(|c| WidthRequest::new(c.min_size(), c.title().chars().count(), c.percent_size()))
            .collect();
        let widths = column_widths(&requests, self.geometry.width);

        let mut columns = Vec::with_capacity(keys.len());
        let mut used: u16 = 0;
        for (key, width) in keys.into_iter().zip(widths) {
            if render_all {
                columns.push((key, width));
                continue;
            }
            let room = self.geometry.width.saturating_sub(used);
            if room == 0 {
                break;
            }
            let width = width.min(room);
            columns.push((key, width));
            used = used.saturating_add(width);
        }

        let flowing: Vec<RowKey> = self.flowing_rows().skip(self.row_scroll).map(|r| r.key).collect();
        let fixed = self.rows.iter().filter(|r| r.visible()).filter_map(|r| r.fixed.map(|f| (r.key, f))).collect();
        let mut rows = place_fixed(flowing, fixed);
        if !render_all {
            let room = self.geometry.height.saturating_sub(self.header_lines()).saturating_sub(self.sum_lines());
            rows.truncate(usize::from(room));
        }
        RenderPlan { columns, rows }
    }

    /// Returns true if the next frame draws `key`.
    #[must_use]
    pub fn is_row_rendered(&self, data: &GridData, key: RowKey) -> bool {
        self.plan(data).rows.contains(&key)
    }

    /// Returns true if the next frame draws `key`.
    #[must_use]
    pub fn is_column_rendered(&self, data: &GridData, key: ColumnKey) -> bool {
        self.plan(data).columns.iter().any(|(k, _)| *k == key)
    }

    /// Applies pending sorts and sum recomputation, and lets the log flush.
    pub fn update(&mut self, data: &GridData) {
        if self.sort_needed {
            self.sort_rows(data);
        }
        if self.sums_dirty {
            self.recalc_sums(data);
        }
        if let Some(log) = &mut self.log {
            if log.update() {
                crate::trace!(self.debug, "view", "{}: log flushed", self.name);
            }
        }
    }

    /// Draws a frame if anything changed since the last one.
    ///
    /// Returns true if a frame was drawn. Output errors reported by the
    /// renderer are logged and do not stop rendering.
    pub fn render(&mut self, data: &GridData) -> bool {
        self.refresh_auto_size();
        if !self.need_render() {
            return false;
        }
        crate::time_scope!(self.debug, "view", format!("render {}", self.name));
        self.update(data);

        let plan = self.plan(data);
        let origin = self.geometry;
        let render_all = self.renderer.render_all_items();
        let bottom = u32::from(origin.y) + u32::from(origin.height);
        let fits = |y: u16| render_all || u32::from(y) < bottom;
        let total_width = plan.columns.iter().fold(0u16, |sum, (_, w)| sum.saturating_add(*w));
        self.renderer.before_render(origin);

        let mut y = origin.y;
        if fits(y) {
            let mut x = origin.x;
            for (key, width) in &plan.columns {
                let Some(column) = data.column(*key) else {
                    continue;
                };
                let sort = self.sort.filter(|s| s.column == *key).map(|s| s.order);
                let mut text = self.renderer.show_text(column.title(), *width, &self.header_style);
                if let Some(order) = sort {
                    text = with_sort_indicator(&text, order);
                }
                let header = HeaderItem { key: *key, column, sort };
                self.renderer.render_column_header(&header, &text, Placement { x, y, width: *width }, &self.header_style);
                x = x.saturating_add(*width);
            }
            y = y.saturating_add(1);
        }
        if self.options.additional_header_line && fits(y) {
            self.renderer.render_separator(Placement { x: origin.x, y, width: total_width }, &self.header_style);
            y = y.saturating_add(1);
        }

        for row_key in &plan.rows {
            let Some(row) = data.row(*row_key) else {
                continue;
            };
            self.renderer.render_row(row, Placement { x: origin.x, y, width: total_width });
            let mut x = origin.x;
            for (column_key, width) in &plan.columns {
                let Some(column) = data.column(*column_key) else {
                    continue;
                };
                let cell = data.cell(*row_key, *column_key);
                let raw = cell.map(|c| c.value().to_string()).unwrap_or_default();
                let style = self.cell_style(data, *row_key, *column_key).clone();
                let text = self.renderer.show_text(&raw, *width, &style);
                let item = CellItem { row_key: *row_key, row, column_key: *column_key, column, cell };
                self.renderer.render_cell(&item, &text, Placement { x, y, width: *width }, &style);
                x = x.saturating_add(*width);
            }
            y = y.saturating_add(1);
        }

        if self.has_sums() {
            if self.options.additional_sum_line && fits(y) {
                self.renderer.render_separator(Placement { x: origin.x, y, width: total_width }, &self.sum_style);
                y = y.saturating_add(1);
            }
            if fits(y) {
                self.renderer.render_sum_bar(Placement { x: origin.x, y, width: total_width });
                let mut x = origin.x;
                for (key, width) in &plan.columns {
                    let Some(column) = data.column(*key) else {
                        continue;
                    };
                    let raw = self.column_sum(*key).map(ToString::to_string).unwrap_or_default();
                    let text = self.renderer.show_text(&raw, *width, &self.sum_style);
                    self.renderer.render_sum_bar_item(column, &text, Placement { x, y, width: *width }, &self.sum_style);
                    x = x.saturating_add(*width);
                }
                y = y.saturating_add(1);
            }
        }

        if let Err(e) = self.renderer.after_render(total_width, y.saturating_sub(origin.y)) {
            crate::error!(self.debug, "view", "{}: output failed: {}", self.name, e);
        }
        self.last_render = Some(self.counter.get());
        true
    }

    // ========================================================================
    // Logging
    // ========================================================================

    /// Installs a log (inactive until [`GridView::activate_log`]).
    pub fn set_log(&mut self, mut log: GridLog) {
        log.set_debug(self.debug.clone());
        self.log = Some(log);
    }

    /// Installed log.
    #[must_use]
    pub fn log(&self) -> Option<&GridLog> {
        self.log.as_ref()
    }

    /// Mutable installed log.
    pub fn log_mut(&mut self) -> Option<&mut GridLog> {
        self.log.as_mut()
    }

    /// Starts or stops recording row changes.
    pub fn activate_log(&mut self, active: bool) {
        self.log_active = active && self.log.is_some();
    }

    /// Returns true while row changes are recorded.
    #[must_use]
    pub fn is_log_active(&self) -> bool {
        self.log_active
    }

    /// Replaces the log's row filter.
    pub fn set_log_filter(&mut self, data: &GridData, expression: &str) -> Result<()> {
        match &mut self.log {
            Some(log) => log.set_filter(data, expression),
            None => Ok(()),
        }
    }

    /// Writes every visible row as one `grid` record.
    pub fn log_all(&mut self, data: &GridData) {
        let rows = self.visible_rows();
        let columns = self.logged_columns();
        if let Some(log) = &mut self.log {
            log.log_grid(data, &rows, &columns);
        }
    }

    /// Flushes the log now.
    pub fn log_flush(&mut self) -> bool {
        self.log.as_mut().is_some_and(GridLog::flush)
    }

    fn logged_columns(&self) -> Vec<ColumnKey> {
        self.columns.iter().filter(|c| c.visible).map(|c| c.key).collect()
    }

    fn log_row(&mut self, data: &GridData, row: RowKey, block: BlockType) {
        if !self.log_active {
            return;
        }
        let columns = self.logged_columns();
        if let Some(log) = &mut self.log {
            log.log_row_columns(data, row, &columns, block);
        }
    }
}

fn offset(current: usize, delta: i32) -> usize {
    let magnitude = delta.unsigned_abs() as usize;
    if delta < 0 {
        current.saturating_sub(magnitude)
    } else {
        current.saturating_add(magnitude)
    }
}

/// Marks the second-to-last character with the sort direction when it is
/// blank, otherwise appends the marker.
fn with_sort_indicator(text: &str, order: SortOrder) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len >= 2 && chars[len - 2] == ' ' {
        chars[len - 2] = order.indicator();
        chars.into_iter().collect()
    } else {
        format!("{text} {}", order.indicator())
    }
}

impl fmt::Debug for GridView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridView")
            .field("name", &self.name)
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("sort", &self.sort)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ColumnSpec, GridColor, GridColumn, GridModel, Tag, ViewKey};
    use crate::sink::MemorySink;
    use std::any::Any;

    #[derive(Debug, Clone, PartialEq)]
    enum Drawn {
        Header(String),
        Cell { row: RowKey, column: ColumnKey, text: String, fg: Option<GridColor> },
        Separator,
        Sum(String),
    }

    /// Renderer keeping every draw call with its line.
    #[derive(Default)]
    struct Recorder {
        render_all: bool,
        calls: Vec<(u16, Drawn)>,
        extent: (u16, u16),
    }

    impl Recorder {
        fn headers(&self) -> Vec<String> {
            self.calls
                .iter()
                .filter_map(|(_, d)| match d {
                    Drawn::Header(t) => Some(t.trim().to_string()),
                    _ => None,
                })
                .collect()
        }

        fn row_order(&self) -> Vec<RowKey> {
            let mut rows: Vec<RowKey> = Vec::new();
            for (_, d) in &self.calls {
                if let Drawn::Cell { row, .. } = d {
                    if rows.last() != Some(row) {
                        rows.push(*row);
                    }
                }
            }
            rows
        }
    }

    impl Renderer for Recorder {
        fn before_render(&mut self, _area: Rect) {
            self.calls.clear();
        }

        fn render_column_header(&mut self, _header: &HeaderItem<'_>, text: &str, at: Placement, _style: &GridStyle) {
            self.calls.push((at.y, Drawn::Header(text.to_string())));
        }

        fn render_cell(&mut self, cell: &CellItem<'_>, text: &str, at: Placement, style: &GridStyle) {
            let drawn = Drawn::Cell { row: cell.row_key, column: cell.column_key, text: text.to_string(), fg: style.fg };
            self.calls.push((at.y, drawn));
        }

        fn render_separator(&mut self, at: Placement, _style: &GridStyle) {
            self.calls.push((at.y, Drawn::Separator));
        }

        fn render_sum_bar_item(&mut self, _column: &GridColumn, text: &str, at: Placement, _style: &GridStyle) {
            self.calls.push((at.y, Drawn::Sum(text.trim().to_string())));
        }

        fn after_render(&mut self, width: u16, height: u16) -> Result<()> {
            self.extent = (width, height);
            Ok(())
        }

        fn render_all_items(&self) -> bool {
            self.render_all
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn recorded(f: &mut Fixture, recorder: Recorder, geometry: Rect) -> ViewKey {
        let key = f.model.connect_view(GridView::new(Box::new(recorder)).with_geometry(geometry));
        f.view = key;
        key
    }

    fn render_recorder(model: &mut GridModel, key: ViewKey) -> &Recorder {
        let (view, data) = model.view_mut(key).unwrap();
        view.render(data);
        model.view(key).unwrap().renderer_as::<Recorder>().unwrap()
    }

    struct Fixture {
        model: GridModel,
        name: ColumnKey,
        cpu: ColumnKey,
        a: RowKey,
        b: RowKey,
        view: ViewKey,
    }

    fn fixture() -> Fixture {
        let mut model = GridModel::new();
        let name = model.add_column(ColumnSpec::new("Name", ValueKind::String));
        let cpu = model.add_column(ColumnSpec::new("CPU", ValueKind::Double));
        let a = model.add_row(None);
        let b = model.add_row(None);
        model.set_value(a, name, &Value::from("a"));
        model.set_value(a, cpu, &Value::from(1.0));
        model.set_value(b, name, &Value::from("b"));
        model.set_value(b, cpu, &Value::from(2.0));
        let view = model.connect_view(GridView::new(Box::new(TextRenderer::new())).with_geometry(Rect::new(0, 0, 40, 10)));
        Fixture { model, name, cpu, a, b, view }
    }

    fn rendered_text(f: &mut Fixture) -> Vec<String> {
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.render(data);
        view.renderer_as::<TextRenderer>().unwrap().lines()
    }

    #[test]
    fn test_descending_sort_then_update_resorts() {
        let mut f = fixture();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        assert!(view.sort_by(f.cpu, SortOrder::Descending));

        let lines = rendered_text(&mut f);
        assert!(lines[1].starts_with('b'), "{lines:?}");
        assert!(lines[2].starts_with('a'), "{lines:?}");

        f.model.set_value(f.a, f.cpu, &Value::from(5.0));
        let lines = rendered_text(&mut f);
        assert!(lines[1].starts_with('a'), "{lines:?}");
        assert_eq!(f.model.row_count(), 2);
    }

    #[test]
    fn test_header_shows_sort_indicator() {
        let mut f = fixture();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        view.sort_by(f.cpu, SortOrder::Ascending);
        let lines = rendered_text(&mut f);
        assert!(lines[0].contains("CPU^"), "{lines:?}");
    }

    #[test]
    fn test_render_skips_when_clean() {
        let mut f = fixture();
        let (view, data) = f.model.view_mut(f.view).unwrap();
        assert!(view.render(data));
        assert!(!view.need_render());
        assert!(!view.render(data));
        view.force_render();
        assert!(view.render(data));
    }

    #[test]
    fn test_sum_excludes_rows_not_considered() {
        let mut f = fixture();
        f.model.set_value(f.a, f.cpu, &Value::from(5.0));
        f.model.set_row_sum_considered(f.b, false);
        let (view, data) = f.model.view_mut(f.view).unwrap();
        assert!(view.set_column_sum(data, f.cpu, true));
        view.update(data);
        let sum = view.column_sum(f.cpu).unwrap().as_f64();
        assert!((sum - 5.0).abs() < 1e-9, "{sum}");
        assert!(view.column_sum(f.name).is_none());
    }

    #[test]
    fn test_sum_bar_rendered_last() {
        let mut f = fixture();
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_column_sum(data, f.cpu, true);
        let lines = rendered_text(&mut f);
        assert_eq!(lines.len(), 4);
        assert!(lines[3].trim_end().ends_with('3'), "{lines:?}");
    }

    #[test]
    fn test_filter_hides_rows_and_sums() {
        let mut f = fixture();
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_column_sum(data, f.cpu, true);
        view.set_filter(data, "Name = b").unwrap();
        view.update(data);
        assert_eq!(view.visible_rows(), vec![f.b]);
        assert!((view.column_sum(f.cpu).unwrap().as_f64() - 2.0).abs() < 1e-9);
        assert!(!view.is_row_rendered(data, f.a));
    }

    #[test]
    fn test_bad_filter_disables_filtering() {
        let mut f = fixture();
        let (view, data) = f.model.view_mut(f.view).unwrap();
        assert!(view.set_filter(data, "Name ~ b").is_err());
        assert_eq!(view.visible_rows().len(), 2);
    }

    #[test]
    fn test_removing_sort_column_disables_sort() {
        let mut f = fixture();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        view.sort_by(f.cpu, SortOrder::Descending);
        f.model.remove_column(f.cpu);
        assert!(f.model.view(f.view).unwrap().sort_spec().is_none());
    }

    #[test]
    fn test_move_row_refused_while_sorted() {
        let mut f = fixture();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        assert!(view.move_row(f.b, None));
        assert_eq!(view.row_keys().collect::<Vec<_>>(), vec![f.b, f.a]);
        view.sort_by(f.cpu, SortOrder::Ascending);
        assert!(!view.move_row(f.a, None));
        assert!(!view.set_row_visible_at(0, false));
        view.disable_sort();
        assert!(view.set_row_visible_at(0, false));
        assert_eq!(view.visible_rows(), vec![f.a]);
    }

    #[test]
    fn test_move_and_hide_columns() {
        let mut f = fixture();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        assert!(view.move_column(f.name, Some(f.cpu)));
        assert_eq!(view.display_columns(), vec![f.cpu, f.name]);
        view.set_column_visible(f.cpu, false);
        assert_eq!(view.display_columns(), vec![f.name]);
        view.show_only(&[f.cpu]);
        assert_eq!(view.display_columns(), vec![f.cpu]);
        assert!(!view.is_column_visible(f.name));
    }

    #[test]
    fn test_fixed_column_stays_while_scrolling() {
        let mut f = fixture();
        let extra = f.model.add_column(ColumnSpec::new("Mem", ValueKind::UInt));
        let (view, _) = f.model.view_mut(f.view).unwrap();
        view.fix_column(f.name, FixedPosition::start(0));
        assert_eq!(view.display_columns(), vec![f.name, f.cpu, extra]);
        view.scroll_view(0, 1);
        assert_eq!(view.display_columns(), vec![f.name, extra]);
        assert_eq!(view.first_column(), Some(extra));
        view.scroll_view(0, 10);
        assert_eq!(view.first_column(), Some(extra));
        view.scroll_view(0, -5);
        assert_eq!(view.first_column(), Some(f.cpu));
    }

    #[test]
    fn test_row_clipping_and_scroll() {
        let mut f = fixture();
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_geometry(Rect::new(0, 0, 40, 2));
        assert_eq!(view.plan(data).rows, vec![f.a]);
        assert!(view.scroll_row_to(f.b));
        assert_eq!(view.plan(data).rows, vec![f.b]);
        assert_eq!(view.first_row(), Some(f.b));
    }

    #[test]
    fn test_scroll_to_only_reaches_flowing_items() {
        let mut f = fixture();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        assert!(view.scroll_column_to(f.cpu));
        assert_eq!(view.first_column(), Some(f.cpu));
        assert!(view.fix_row(f.a, FixedPosition::start(0)));
        assert!(!view.scroll_row_to(f.a));
        assert!(view.scroll_row_to(f.b));
        assert_eq!(view.first_row(), Some(f.b));
        assert!(view.set_column_visible(f.name, false));
        assert!(!view.scroll_column_to(f.name));
    }

    #[test]
    fn test_style_filter_first_match_wins() {
        let mut f = fixture();
        let (view, data) = f.model.view_mut(f.view).unwrap();
        let red = GridStyle::new().prefix("!");
        let blue = GridStyle::new().prefix("?");
        view.set_style(1, red.clone());
        view.set_style(2, blue);
        view.add_style_filter(data, "CPU > 0", 1).unwrap();
        view.add_style_filter(data, "Name = b", 2).unwrap();
        assert_eq!(view.cell_style(data, f.b, f.cpu), &red);
        assert_eq!(view.style_filter_count(), 2);
        assert!(view.remove_style_filter(data, 0));
        assert_eq!(view.cell_style(data, f.b, f.cpu).prefix, "?");
        assert_eq!(view.cell_style(data, f.a, f.cpu), view.default_style());
    }

    #[test]
    fn test_tag_style_applies_to_column() {
        let mut f = fixture();
        let tagged = f.model.add_column(ColumnSpec::new("Watts", ValueKind::Double).tag(Tag(9)));
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_style(9, GridStyle::new().suffix("W"));
        assert_eq!(view.cell_style(data, f.a, tagged).suffix, "W");
        assert_eq!(view.style(42), view.default_style());
    }

    #[test]
    fn test_view_log_records_changes() {
        let mut f = fixture();
        let sink = MemorySink::new();
        let (view, _) = f.model.view_mut(f.view).unwrap();
        view.set_log(GridLog::with(Box::new(sink.clone()), Box::new(crate::format::CsvFormatter::new())));
        view.activate_log(true);

        let c = f.model.add_row(None);
        f.model.set_value(c, f.name, &Value::from("c"));
        f.model.remove_row(c);

        let (view, _) = f.model.view_mut(f.view).unwrap();
        assert!(view.log_flush());
        let text = sink.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["+,,0", ".,c,0", "-,c,0"]);
    }

    #[test]
    fn test_auto_size_follows_host() {
        let mut model = GridModel::new();
        let key = model.connect_view(
            GridView::new(Box::new(TextRenderer::new().with_host_size(120, 30))).with_auto_size(AutoSize::full()),
        );
        let (view, _) = model.view_mut(key).unwrap();
        assert!(view.refresh_auto_size());
        assert_eq!(view.geometry(), Rect::new(0, 0, 120, 30));
        view.resize(0, 12);
        assert_eq!(view.geometry().height, 12);
    }

    #[test]
    fn test_sort_indicator_placement() {
        assert_eq!(with_sort_indicator(" CPU  ", SortOrder::Descending), " CPUv ");
        assert_eq!(with_sort_indicator("CPU", SortOrder::Ascending), "CPU ^");
    }

    #[test]
    fn test_end_pinned_row_and_column_render_last() {
        let mut f = fixture();
        let c = f.model.add_row(None);
        f.model.set_value(c, f.name, &Value::from("c"));
        recorded(&mut f, Recorder::default(), Rect::new(0, 0, 40, 10));
        let (view, _) = f.model.view_mut(f.view).unwrap();
        assert!(view.fix_row(f.a, FixedPosition::end(0)));
        assert!(view.fix_column(f.name, FixedPosition::end(0)));
        view.sort_by(f.cpu, SortOrder::Ascending);

        let rec = render_recorder(&mut f.model, f.view);
        let headers = rec.headers();
        assert!(headers[0].starts_with("CPU"), "{headers:?}");
        assert_eq!(headers[1], "Name");
        assert_eq!(rec.row_order(), vec![c, f.b, f.a]);
        let last = rec.calls.last().unwrap();
        assert!(matches!(&last.1, Drawn::Cell { row, column, .. } if *row == f.a && *column == f.name), "{last:?}");
    }

    #[test]
    fn test_style_filter_reaches_cell_draws() {
        let mut f = fixture();
        recorded(&mut f, Recorder::default(), Rect::new(0, 0, 40, 10));
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_style(1, GridStyle::new().fg(GridColor::Red).prefix("!"));
        view.add_style_filter(data, "Name = b", 1).unwrap();

        let rec = render_recorder(&mut f.model, f.view);
        let b = f.b;
        assert!(rec.calls.iter().any(|(_, d)| matches!(d, Drawn::Cell { row, .. } if *row == b)));
        for (_, drawn) in &rec.calls {
            if let Drawn::Cell { row, text, fg, .. } = drawn {
                if *row == b {
                    assert_eq!(*fg, Some(GridColor::Red));
                    assert!(text.starts_with('!'), "{text}");
                } else {
                    assert_eq!(*fg, None);
                }
            }
        }
    }

    #[test]
    fn test_render_all_beyond_line_range() {
        let mut model = GridModel::new();
        let cpu = model.add_column(ColumnSpec::new("CPU", ValueKind::Double));
        for _ in 0..70_000 {
            model.add_row(None);
        }
        let recorder = Recorder { render_all: true, ..Recorder::default() };
        let key = model.connect_view(GridView::new(Box::new(recorder)).with_geometry(Rect::new(0, 0, 20, 5)));
        let (view, data) = model.view_mut(key).unwrap();
        view.set_column_sum(data, cpu, true);
        assert!(view.render(data));

        let rec = view.renderer_as::<Recorder>().unwrap();
        let cells = rec.calls.iter().filter(|(_, d)| matches!(d, Drawn::Cell { .. })).count();
        assert_eq!(cells, 70_000);
        assert!(rec.calls.iter().any(|(_, d)| matches!(d, Drawn::Sum(_))));
        assert_eq!(rec.extent.1, u16::MAX);
    }

    #[test]
    fn test_clipped_decorations_stay_inside_geometry() {
        let mut f = fixture();
        recorded(&mut f, Recorder::default(), Rect::new(0, 3, 40, 1));
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_column_sum(data, f.cpu, true);
        view.set_options(ViewOptions { additional_header_line: true, additional_sum_line: true });

        let rec = render_recorder(&mut f.model, f.view);
        assert!(rec.calls.iter().all(|(y, _)| *y == 3), "{:?}", rec.calls);
        assert_eq!(rec.headers().len(), 2);
        assert!(!rec.calls.iter().any(|(_, d)| matches!(d, Drawn::Sum(_) | Drawn::Separator)));
        assert_eq!(rec.extent.1, 1);
    }

    #[test]
    fn test_unparsable_filters_leave_rows_drawn_plain() {
        let mut f = fixture();
        recorded(&mut f, Recorder::default(), Rect::new(0, 0, 40, 10));
        let (view, data) = f.model.view_mut(f.view).unwrap();
        view.set_style(1, GridStyle::new().fg(GridColor::Red));
        assert!(view.add_style_filter(data, "(Name = b", 1).is_err());
        assert!(view.set_filter(data, "CPU >").is_err());
        assert_eq!(view.style_filter_count(), 0);

        let rec = render_recorder(&mut f.model, f.view);
        assert_eq!(rec.row_order().len(), 2);
        assert!(rec.calls.iter().all(|(_, d)| !matches!(d, Drawn::Cell { fg: Some(_), .. })));
    }
}
