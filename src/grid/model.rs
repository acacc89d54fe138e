//! The mutable grid model and its connected views.

use super::cell::GridCell;
use super::column::{ColumnSpec, GridColumn};
use super::data::{ColumnLocator, GridData, RowLocator};
use super::item::{FixedPosition, Tag};
use super::row::GridRow;
use super::view::GridView;
use super::{ColumnKey, RowKey, ViewKey};
use crate::debug::DebugLog;
use crate::error::Result;
use crate::value::{Value, ValueKind};
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Owner of all columns, rows and cells, and of the views projecting them.
///
/// Every mutation goes through the model so that tag indices, the model
/// filter and each connected view stay consistent. Read access to the data
/// is available through `Deref<Target = GridData>`.
#[derive(Debug, Default)]
pub struct GridModel {
    data: GridData,
    views: SlotMap<ViewKey, GridView>,
    view_order: Vec<ViewKey>,
    debug: DebugLog,
}

impl GridModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty model reporting to `debug`.
    #[must_use]
    pub fn with_debug(debug: DebugLog) -> Self {
        Self { debug, ..Self::default() }
    }

    /// Debug context shared with connected views.
    #[must_use]
    pub fn debug_log(&self) -> &DebugLog {
        &self.debug
    }

    /// Read-only data.
    #[must_use]
    pub fn data(&self) -> &GridData {
        &self.data
    }

    // ========================================================================
    // Shape
    // ========================================================================

    /// Appends a column.
    pub fn add_column(&mut self, spec: ColumnSpec) -> ColumnKey {
        let id = self.data.column_order.len();
        let column = GridColumn::from_spec(id, spec);
        let tag = column.tag();
        let key = self.data.columns.insert(column);
        self.data.column_order.push(key);
        if let Some(tag) = tag {
            self.data.column_tags.entry(tag).or_default().push(key);
        }
        self.data.counter.bump();
        for view in self.views.values_mut() {
            view.on_column_added(&self.data, key);
        }
        self.after_shape_change();
        crate::trace!(self.debug, "model", "column {} added", id);
        key
    }

    /// Removes a column and every cell in it; returns false if not found.
    pub fn remove_column(&mut self, column: impl ColumnLocator) -> bool {
        let Some(key) = column.locate_column(&self.data) else {
            return false;
        };
        for view in self.views.values_mut() {
            view.on_column_removing(key);
        }
        let Some(removed) = self.data.columns.remove(key) else {
            return false;
        };
        for (row, cell) in removed.cells {
            if let Some(row) = self.data.rows.get_mut(row) {
                row.cells.remove(&key);
            }
            self.data.cells.remove(cell);
        }
        self.data.column_order.retain(|k| *k != key);
        for (id, k) in self.data.column_order.iter().enumerate() {
            self.data.columns[*k].item.id = id;
        }
        if let Some(tag) = removed.item.tag {
            remove_tagged(&mut self.data.column_tags, tag, key);
        }
        self.data.counter.bump();
        self.after_shape_change();
        true
    }

    /// Appends a row.
    pub fn add_row(&mut self, tag: Option<Tag>) -> RowKey {
        let id = self.data.row_order.len();
        let key = self.data.rows.insert(GridRow::new(id, tag));
        self.data.row_order.push(key);
        if let Some(tag) = tag {
            self.data.row_tags.entry(tag).or_default().push(key);
        }
        self.data.counter.bump();
        for view in self.views.values_mut() {
            view.on_row_added(&self.data, key);
        }
        key
    }

    /// Removes a row and every cell in it; returns false if not found.
    pub fn remove_row(&mut self, row: impl RowLocator) -> bool {
        let Some(key) = row.locate_row(&self.data) else {
            return false;
        };
        for view in self.views.values_mut() {
            view.on_row_removing(&self.data, key);
        }
        let Some(removed) = self.data.rows.remove(key) else {
            return false;
        };
        for (column, cell) in removed.cells {
            if let Some(column) = self.data.columns.get_mut(column) {
                column.cells.remove(&key);
            }
            self.data.cells.remove(cell);
        }
        self.data.row_order.retain(|k| *k != key);
        for (id, k) in self.data.row_order.iter().enumerate() {
            self.data.rows[*k].item.id = id;
        }
        if let Some(tag) = removed.item.tag {
            remove_tagged(&mut self.data.row_tags, tag, key);
        }
        self.data.counter.bump();
        true
    }

    /// Removes every row.
    pub fn clear_rows(&mut self) {
        while let Some(key) = self.data.row_order.last().copied() {
            self.remove_row(key);
        }
    }

    /// Removes every column.
    pub fn clear_columns(&mut self) {
        while let Some(key) = self.data.column_order.last().copied() {
            self.remove_column(key);
        }
    }

    /// Removes every row and column.
    pub fn clear(&mut self) {
        self.clear_rows();
        self.clear_columns();
    }

    fn after_shape_change(&mut self) {
        self.refresh_model_filter();
        for view in self.views.values_mut() {
            view.after_shape_change(&self.data);
        }
    }

    fn refresh_model_filter(&mut self) {
        let mut filter = std::mem::take(&mut self.data.filter);
        filter.refresh(&self.data);
        self.data.filter = filter;
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Assigns the value at (row, column), creating the cell on first use.
    ///
    /// Returns true if the cell was created or its value changed; only then
    /// do the cell, row, column and model counters advance and views hear
    /// about it.
    pub fn set_value(&mut self, row: impl RowLocator, column: impl ColumnLocator, value: &Value) -> bool {
        let (Some(row), Some(column)) = (row.locate_row(&self.data), column.locate_column(&self.data)) else {
            return false;
        };
        let (cell_key, created) = match self.data.rows[row].cell_key(column) {
            Some(key) => (key, false),
            None => {
                let kind = self.data.columns[column].kind;
                let key = self.data.cells.insert(GridCell::new(row, column, kind));
                self.data.rows[row].cells.insert(column, key);
                self.data.columns[column].cells.insert(row, key);
                (key, true)
            }
        };
        let assigned = self.data.cells.get_mut(cell_key).and_then(|cell| cell.assign(value)).is_some();
        if !(assigned || created) {
            return false;
        }
        self.data.rows[row].item.touch();
        self.data.columns[column].item.touch();
        self.data.counter.bump();
        for view in self.views.values_mut() {
            view.on_cell_changed(&self.data, row, column);
        }
        true
    }

    // ========================================================================
    // Filter
    // ========================================================================

    /// Replaces the model filter; rows it rejects are hidden from every view.
    ///
    /// A malformed expression disables the filter and is returned as an error.
    pub fn set_filter(&mut self, expression: &str) -> Result<()> {
        let result = self.data.filter.set(expression);
        self.refresh_model_filter();
        if let Err(e) = &result {
            crate::warn!(self.debug, "model", "filter disabled: {}", e);
        }
        for view in self.views.values_mut() {
            view.refilter(&self.data);
        }
        self.data.counter.bump();
        result
    }

    /// Switches case-sensitive column name lookup and re-resolves filters.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.data.case_sensitive = case_sensitive;
        self.after_shape_change();
    }

    // ========================================================================
    // Item attributes
    // ========================================================================

    fn column_mut(&mut self, column: impl ColumnLocator) -> Option<(ColumnKey, &mut GridColumn)> {
        let key = column.locate_column(&self.data)?;
        self.data.columns.get_mut(key).map(|c| (key, c))
    }

    fn row_mut(&mut self, row: impl RowLocator) -> Option<(RowKey, &mut GridRow)> {
        let key = row.locate_row(&self.data)?;
        self.data.rows.get_mut(key).map(|r| (key, r))
    }

    fn column_changed(&mut self, key: ColumnKey) {
        self.data.counter.bump();
        for view in self.views.values_mut() {
            view.on_column_changed(&self.data, key);
        }
    }

    fn row_changed(&mut self, key: RowKey) {
        self.data.counter.bump();
        for view in self.views.values_mut() {
            view.on_row_changed(&self.data, key);
        }
    }

    /// Changes a column's header title.
    pub fn set_column_title(&mut self, column: impl ColumnLocator, title: impl Into<String>) -> bool {
        let Some((key, col)) = self.column_mut(column) else {
            return false;
        };
        col.title = title.into();
        col.item.touch();
        self.column_changed(key);
        true
    }

    /// Changes a column's lookup name and re-resolves filters referring to it.
    pub fn set_column_name(&mut self, column: impl ColumnLocator, name: impl Into<String>) -> bool {
        let Some((_, col)) = self.column_mut(column) else {
            return false;
        };
        col.name = name.into();
        col.item.touch();
        self.data.counter.bump();
        self.after_shape_change();
        true
    }

    /// Changes a column's kind; every existing cell resets to the new default.
    pub fn set_column_kind(&mut self, column: impl ColumnLocator, kind: ValueKind) -> bool {
        let Some((key, col)) = self.column_mut(column) else {
            return false;
        };
        if col.kind == kind {
            return true;
        }
        col.kind = kind;
        col.item.touch();
        let cells: Vec<_> = col.cells.values().copied().collect();
        for cell in cells {
            if let Some(cell) = self.data.cells.get_mut(cell) {
                cell.change_kind(kind);
            }
        }
        self.refresh_model_filter();
        for view in self.views.values_mut() {
            view.after_shape_change(&self.data);
        }
        self.column_changed(key);
        true
    }

    /// Reassigns a column's tag, keeping the tag index consistent.
    pub fn set_column_tag(&mut self, column: impl ColumnLocator, tag: Option<Tag>) -> bool {
        let Some((key, col)) = self.column_mut(column) else {
            return false;
        };
        let old = std::mem::replace(&mut col.item.tag, tag);
        col.item.touch();
        if let Some(old) = old {
            remove_tagged(&mut self.data.column_tags, old, key);
        }
        if let Some(tag) = tag {
            self.data.column_tags.entry(tag).or_default().push(key);
        }
        self.column_changed(key);
        true
    }

    /// Reassigns a row's tag, keeping the tag index consistent.
    pub fn set_row_tag(&mut self, row: impl RowLocator, tag: Option<Tag>) -> bool {
        let Some((key, r)) = self.row_mut(row) else {
            return false;
        };
        let old = std::mem::replace(&mut r.item.tag, tag);
        r.item.touch();
        if let Some(old) = old {
            remove_tagged(&mut self.data.row_tags, old, key);
        }
        if let Some(tag) = tag {
            self.data.row_tags.entry(tag).or_default().push(key);
        }
        self.row_changed(key);
        true
    }

    /// Stores a presentation argument on a column.
    pub fn set_column_arg(&mut self, column: impl ColumnLocator, id: u32, value: Value) -> bool {
        let Some((key, col)) = self.column_mut(column) else {
            return false;
        };
        col.item.args.insert(id, value);
        col.item.touch();
        self.column_changed(key);
        true
    }

    /// Stores a presentation argument on a row.
    pub fn set_row_arg(&mut self, row: impl RowLocator, id: u32, value: Value) -> bool {
        let Some((key, r)) = self.row_mut(row) else {
            return false;
        };
        r.item.args.insert(id, value);
        r.item.touch();
        self.row_changed(key);
        true
    }

    /// Attaches an opaque data key to a column.
    pub fn set_column_data(&mut self, column: impl ColumnLocator, data: Option<u64>) -> bool {
        match self.column_mut(column) {
            Some((_, col)) => {
                col.item.data = data;
                true
            }
            None => false,
        }
    }

    /// Attaches an opaque data key to a row.
    pub fn set_row_data(&mut self, row: impl RowLocator, data: Option<u64>) -> bool {
        match self.row_mut(row) {
            Some((_, r)) => {
                r.item.data = data;
                true
            }
            None => false,
        }
    }

    /// Pins a column in every view (views may override).
    pub fn set_column_fixed(&mut self, column: impl ColumnLocator, fixed: Option<FixedPosition>) -> bool {
        let Some((key, col)) = self.column_mut(column) else {
            return false;
        };
        col.item.fixed = fixed;
        col.item.touch();
        self.column_changed(key);
        true
    }

    /// Pins a row in every view (views may override).
    pub fn set_row_fixed(&mut self, row: impl RowLocator, fixed: Option<FixedPosition>) -> bool {
        let Some((key, r)) = self.row_mut(row) else {
            return false;
        };
        r.item.fixed = fixed;
        r.item.touch();
        self.row_changed(key);
        true
    }

    /// Includes or excludes a row from sum bars.
    pub fn set_row_sum_considered(&mut self, row: impl RowLocator, considered: bool) -> bool {
        let Some((key, r)) = self.row_mut(row) else {
            return false;
        };
        if r.sum_considered != considered {
            r.sum_considered = considered;
            r.item.touch();
            self.row_changed(key);
        }
        true
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Connects a view; existing columns then rows are replayed into it.
    pub fn connect_view(&mut self, mut view: GridView) -> ViewKey {
        view.attach(&self.data, self.debug.clone());
        let key = self.views.insert(view);
        self.view_order.push(key);
        key
    }

    /// Disconnects a view and returns it with its projections cleared.
    pub fn remove_view(&mut self, key: ViewKey) -> Option<GridView> {
        let mut view = self.views.remove(key)?;
        self.view_order.retain(|k| *k != key);
        view.detach();
        Some(view)
    }

    /// Disconnects every view.
    pub fn clear_views(&mut self) {
        for key in std::mem::take(&mut self.view_order) {
            if let Some(mut view) = self.views.remove(key) {
                view.detach();
            }
        }
    }

    /// Number of connected views.
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.view_order.len()
    }

    /// Connected view keys in connection order.
    #[must_use]
    pub fn view_keys(&self) -> &[ViewKey] {
        &self.view_order
    }

    /// Connected view.
    #[must_use]
    pub fn view(&self, key: ViewKey) -> Option<&GridView> {
        self.views.get(key)
    }

    /// Connected view, mutably, with the data its operations read.
    pub fn view_mut(&mut self, key: ViewKey) -> Option<(&mut GridView, &GridData)> {
        self.views.get_mut(key).map(|view| (view, &self.data))
    }

    /// Connected views in connection order.
    pub fn views(&self) -> impl Iterator<Item = (ViewKey, &GridView)> {
        self.view_order.iter().filter_map(|key| self.views.get(*key).map(|v| (*key, v)))
    }

    /// Runs pending sorts and sums of every view.
    pub fn update_views(&mut self) {
        for key in &self.view_order {
            if let Some(view) = self.views.get_mut(*key) {
                view.update(&self.data);
            }
        }
    }

    /// Renders every view that needs it; returns true if any did.
    pub fn render_views(&mut self) -> bool {
        let mut rendered = false;
        for key in &self.view_order {
            if let Some(view) = self.views.get_mut(*key) {
                rendered |= view.render(&self.data);
            }
        }
        rendered
    }

    // ========================================================================
    // Queries across views
    // ========================================================================

    /// Returns true if some view renders `row`.
    pub fn is_row_visible(&self, row: impl RowLocator) -> bool {
        row.locate_row(&self.data).is_some_and(|key| self.views.values().any(|v| v.is_row_rendered(&self.data, key)))
    }

    /// Returns true if some view renders `column`.
    pub fn is_column_visible(&self, column: impl ColumnLocator) -> bool {
        column
            .locate_column(&self.data)
            .is_some_and(|key| self.views.values().any(|v| v.is_column_rendered(&self.data, key)))
    }

    /// Returns true if some view renders both `row` and `column`.
    pub fn is_cell_visible(&self, row: impl RowLocator, column: impl ColumnLocator) -> bool {
        let (Some(row), Some(column)) = (row.locate_row(&self.data), column.locate_column(&self.data)) else {
            return false;
        };
        self.views.values().any(|v| {
            let plan = v.plan(&self.data);
            plan.rows.contains(&row) && plan.columns.iter().any(|(k, _)| *k == column)
        })
    }

    /// Returns true if some view sorts by `column`.
    pub fn is_view_sort_by_column(&self, column: impl ColumnLocator) -> bool {
        column.locate_column(&self.data).is_some_and(|key| self.views.values().any(|v| v.is_sorted_by(key)))
    }

    /// Returns true if some view sums `column`.
    pub fn is_view_column_sum_enabled(&self, column: impl ColumnLocator) -> bool {
        column
            .locate_column(&self.data)
            .is_some_and(|key| self.views.values().any(|v| v.is_column_sum_enabled(key)))
    }

    /// Returns true if some view shows, sorts by or sums `column`.
    pub fn is_view_need_data(&self, column: impl ColumnLocator) -> bool {
        column.locate_column(&self.data).is_some_and(|key| {
            self.views.values().any(|v| v.is_column_visible(key) || v.is_sorted_by(key) || v.is_column_sum_enabled(key))
        })
    }

    /// Returns true if some view needs `column` and shows `row`.
    pub fn is_view_need_data_cell(&self, row: impl RowLocator, column: impl ColumnLocator) -> bool {
        let (Some(row), Some(column)) = (row.locate_row(&self.data), column.locate_column(&self.data)) else {
            return false;
        };
        self.views.values().any(|v| {
            v.is_row_visible(row) && (v.is_column_visible(column) || v.is_sorted_by(column) || v.is_column_sum_enabled(column))
        })
    }
}

impl Deref for GridModel {
    type Target = GridData;

    fn deref(&self) -> &GridData {
        &self.data
    }
}

fn remove_tagged<K: PartialEq>(index: &mut BTreeMap<Tag, Vec<K>>, tag: Tag, key: K) {
    if let Some(keys) = index.get_mut(&tag) {
        keys.retain(|k| *k != key);
        if keys.is_empty() {
            index.remove(&tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{SortOrder, TextRenderer};
    use proptest::prelude::*;

    fn two_columns() -> (GridModel, ColumnKey, ColumnKey) {
        let mut model = GridModel::new();
        let name = model.add_column(ColumnSpec::new("Name", ValueKind::String));
        let cpu = model.add_column(ColumnSpec::new("CPU", ValueKind::Double).tag(Tag(3)));
        (model, name, cpu)
    }

    #[test]
    fn test_lookups_of_missing_items_are_none() {
        let empty = GridModel::new();
        assert!(empty.column_key(0usize).is_none());
        assert!(empty.row_key(0usize).is_none());

        let (model, _, _) = two_columns();
        assert!(model.column_key(2usize).is_none());
        assert!(model.column("missing").is_none());
        assert!(model.value(0usize, 0usize).is_none());
    }

    #[test]
    fn test_locators_resolve_same_column() {
        let (model, _, cpu) = two_columns();
        assert_eq!(model.column_key(1usize), Some(cpu));
        assert_eq!(model.column_key("cpu"), Some(cpu));
        assert_eq!(model.column_key(Tag(3)), Some(cpu));
        assert_eq!(model.column_key(cpu), Some(cpu));
    }

    #[test]
    fn test_case_sensitive_lookup() {
        let (mut model, _, cpu) = two_columns();
        model.set_case_sensitive(true);
        assert!(model.column_key("cpu").is_none());
        assert_eq!(model.column_key("CPU"), Some(cpu));
    }

    #[test]
    fn test_set_value_advances_counters_once() {
        let (mut model, _, cpu) = two_columns();
        let row = model.add_row(None);
        assert!(model.set_value(row, cpu, &Value::from(1.0)));

        let before = (
            model.update_count(),
            model.row(row).unwrap().update_count(),
            model.column(cpu).unwrap().update_count(),
            model.cell(row, cpu).unwrap().update_count(),
        );
        assert!(!model.set_value(row, cpu, &Value::from(1.0)));
        assert_eq!(model.update_count(), before.0);

        assert!(model.set_value(row, cpu, &Value::from(2.0)));
        assert!(model.update_count() > before.0);
        assert!(model.row(row).unwrap().update_count() > before.1);
        assert!(model.column(cpu).unwrap().update_count() > before.2);
        assert!(model.cell(row, cpu).unwrap().update_count() > before.3);
    }

    #[test]
    fn test_value_converts_to_column_kind() {
        let (mut model, _, cpu) = two_columns();
        let row = model.add_row(None);
        model.set_value(row, cpu, &Value::from("2.5"));
        assert_eq!(model.value(row, cpu).unwrap().kind(), ValueKind::Double);
        assert!((model.value(row, cpu).unwrap().as_f64() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remove_column_drops_cells_and_renumbers() {
        let (mut model, name, cpu) = two_columns();
        let mem = model.add_column(ColumnSpec::new("Mem", ValueKind::UInt));
        let row = model.add_row(None);
        model.set_value(row, name, &Value::from("x"));
        model.set_value(row, cpu, &Value::from(1.0));
        let cell = model.cell_key(row, cpu).unwrap();

        assert!(model.remove_column(cpu));
        assert!(!model.is_valid_cell(cell));
        assert!(model.row(row).unwrap().cell_key(cpu).is_none());
        assert_eq!(model.cell_count(), 1);
        assert_eq!(model.column(mem).unwrap().id(), 1);
        assert!(model.column_key(Tag(3)).is_none());
        assert!(!model.remove_column(cpu));
    }

    #[test]
    fn test_remove_row_drops_cells() {
        let (mut model, name, _) = two_columns();
        let a = model.add_row(Some(Tag(1)));
        let b = model.add_row(Some(Tag(1)));
        model.set_value(a, name, &Value::from("a"));
        assert!(model.remove_row(a));
        assert_eq!(model.cell_count(), 0);
        assert!(model.column(name).unwrap().cell_key(a).is_none());
        assert_eq!(model.row(b).unwrap().id(), 0);
        assert_eq!(model.rows_with_tag(Tag(1)), &[b]);
    }

    #[test]
    fn test_set_column_kind_resets_cells() {
        let (mut model, _, cpu) = two_columns();
        let row = model.add_row(None);
        model.set_value(row, cpu, &Value::from(4.0));
        assert!(model.set_column_kind(cpu, ValueKind::String));
        assert_eq!(model.value(row, cpu).unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_tag_reassignment_updates_index() {
        let (mut model, name, cpu) = two_columns();
        model.set_column_tag(name, Some(Tag(3)));
        assert_eq!(model.columns_with_tag(Tag(3)), &[cpu, name]);
        model.set_column_tag(cpu, None);
        assert_eq!(model.columns_with_tag(Tag(3)), &[name]);
    }

    #[test]
    fn test_item_args_and_data() {
        let (mut model, name, _) = two_columns();
        let row = model.add_row(None);
        model.set_column_arg(name, 1, Value::from(10i64));
        model.set_row_data(row, Some(42));
        assert_eq!(model.column(name).unwrap().arg(1).unwrap().as_i64(), 10);
        assert_eq!(model.row(row).unwrap().data(), Some(42));
    }

    #[test]
    fn test_model_filter_hides_rows_in_views() {
        let (mut model, name, _) = two_columns();
        let a = model.add_row(None);
        let b = model.add_row(None);
        model.set_value(a, name, &Value::from("a"));
        model.set_value(b, name, &Value::from("b"));
        let view = model.connect_view(GridView::new(Box::new(TextRenderer::new())));

        model.set_filter("Name != a").unwrap();
        assert_eq!(model.rows_passing_filter().collect::<Vec<_>>(), vec![b]);
        assert_eq!(model.view(view).unwrap().visible_rows(), vec![b]);
        assert!(!model.is_row_visible(a));
        assert!(model.is_row_visible(b));

        assert!(model.set_filter("Name ==").is_err());
        assert_eq!(model.view(view).unwrap().visible_rows().len(), 2);
    }

    #[test]
    fn test_filter_survives_column_removal() {
        let (mut model, name, cpu) = two_columns();
        let a = model.add_row(None);
        model.set_value(a, name, &Value::from("a"));
        model.set_filter("CPU > 1").unwrap();
        assert_eq!(model.rows_passing_filter().count(), 0);
        model.remove_column(cpu);
        assert_eq!(model.rows_passing_filter().count(), 0, "unresolved column rejects");
    }

    #[test]
    fn test_connect_view_replays_existing_items() {
        let (mut model, _, _) = two_columns();
        model.add_row(None);
        let key = model.connect_view(GridView::new(Box::new(TextRenderer::new())));
        let view = model.view(key).unwrap();
        assert_eq!(view.column_count(), 2);
        assert_eq!(view.row_count(), 1);

        let detached = model.remove_view(key).unwrap();
        assert_eq!(detached.column_count(), 0);
        assert!(model.view(key).is_none());
        model.add_row(None);
        assert_eq!(detached.row_count(), 0);
    }

    #[test]
    fn test_views_are_independent() {
        let (mut model, name, cpu) = two_columns();
        for (n, c) in [("a", 1.0), ("b", 2.0)] {
            let row = model.add_row(None);
            model.set_value(row, name, &Value::from(n));
            model.set_value(row, cpu, &Value::from(c));
        }
        let first = model.connect_view(GridView::new(Box::new(TextRenderer::new())));
        let second = model.connect_view(GridView::new(Box::new(TextRenderer::new())));
        let order: Vec<RowKey> = model.row_keys().to_vec();

        let (view, _) = model.view_mut(first).unwrap();
        view.sort_by(cpu, SortOrder::Descending);
        view.set_column_visible(name, false);
        model.update_views();

        assert_eq!(model.view(first).unwrap().row_keys().collect::<Vec<_>>(), vec![order[1], order[0]]);
        assert_eq!(model.view(second).unwrap().row_keys().collect::<Vec<_>>(), order);
        assert!(model.view(second).unwrap().is_column_visible(name));
        assert_eq!(model.row_keys(), order.as_slice());
        assert!(model.is_view_sort_by_column(cpu));
        assert!(model.is_view_need_data(name));
    }

    #[test]
    fn test_need_data_without_views() {
        let (mut model, name, _) = two_columns();
        let row = model.add_row(None);
        assert!(!model.is_view_need_data(name));
        assert!(!model.is_view_need_data_cell(row, name));
        model.connect_view(GridView::new(Box::new(TextRenderer::new())));
        assert!(model.is_view_need_data_cell(row, name));
        assert!(model.is_cell_visible(row, name));
    }

    #[test]
    fn test_render_views_reports_activity() {
        let (mut model, _, _) = two_columns();
        model.connect_view(GridView::new(Box::new(TextRenderer::new())));
        assert!(model.render_views());
        assert!(!model.render_views());
        model.add_row(None);
        assert!(model.render_views());
        model.clear_views();
        assert_eq!(model.view_count(), 0);
        assert!(!model.render_views());
    }

    #[test]
    fn test_clear() {
        let (mut model, name, _) = two_columns();
        let row = model.add_row(None);
        model.set_value(row, name, &Value::from("x"));
        model.clear();
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.column_count(), 0);
        assert_eq!(model.cell_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_column_ids_stay_dense(count in 1usize..12, removals in proptest::collection::vec(0usize..12, 0..8)) {
            let mut model = GridModel::new();
            for i in 0..count {
                model.add_column(ColumnSpec::new(format!("c{i}"), ValueKind::Int));
            }
            for index in removals {
                model.remove_column(index);
            }
            for (id, (_, column)) in model.columns().enumerate() {
                prop_assert_eq!(column.id(), id);
            }
        }
    }
}
