//! Grid columns.

use super::item::{GridItem, Tag};
use super::{CellKey, RowKey};
use crate::value::ValueKind;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Description of a column to add to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Header title.
    pub title: String,
    /// Lookup name; defaults to the title.
    pub name: Option<String>,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Classification tag.
    pub tag: Option<Tag>,
    /// Minimum rendered width in characters.
    pub min_size: u16,
    /// Share of the remaining width, in percent (0 = fixed width).
    pub percent_size: u16,
}

impl ColumnSpec {
    /// Column titled `title` holding values of `kind`.
    #[must_use]
    pub fn new(title: impl Into<String>, kind: ValueKind) -> Self {
        Self { title: title.into(), name: None, kind, tag: None, min_size: 0, percent_size: 0 }
    }

    /// Sets the lookup name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the tag.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Sets the minimum width.
    #[must_use]
    pub fn min_size(mut self, min_size: u16) -> Self {
        self.min_size = min_size;
        self
    }

    /// Sets the percentage width.
    #[must_use]
    pub fn percent_size(mut self, percent: u16) -> Self {
        self.percent_size = percent.min(100);
        self
    }
}

/// A model column: title, declared kind, sizing and the cells it owns.
#[derive(Debug, Clone)]
pub struct GridColumn {
    pub(crate) item: GridItem,
    pub(crate) title: String,
    pub(crate) name: String,
    pub(crate) kind: ValueKind,
    pub(crate) min_size: u16,
    pub(crate) percent_size: u16,
    pub(crate) cells: BTreeMap<RowKey, CellKey>,
}

impl GridColumn {
    pub(crate) fn from_spec(id: usize, spec: ColumnSpec) -> Self {
        let name = spec.name.unwrap_or_else(|| spec.title.clone());
        Self {
            item: GridItem::new(id, spec.tag),
            title: spec.title,
            name,
            kind: spec.kind,
            min_size: spec.min_size,
            percent_size: spec.percent_size,
            cells: BTreeMap::new(),
        }
    }

    /// Header title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lookup name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value kind.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Minimum width.
    #[must_use]
    pub fn min_size(&self) -> u16 {
        self.min_size
    }

    /// Percentage width.
    #[must_use]
    pub fn percent_size(&self) -> u16 {
        self.percent_size
    }

    /// Cell in `row`, if one was ever assigned.
    #[must_use]
    pub fn cell_key(&self, row: RowKey) -> Option<CellKey> {
        self.cells.get(&row).copied()
    }

    /// Number of cells in this column.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Deref for GridColumn {
    type Target = GridItem;

    fn deref(&self) -> &GridItem {
        &self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = ColumnSpec::new("CPU%", ValueKind::Double)
            .name("cpu")
            .tag(Tag(2))
            .min_size(6)
            .percent_size(150);
        assert_eq!(spec.name.as_deref(), Some("cpu"));
        assert_eq!(spec.percent_size, 100);

        let column = GridColumn::from_spec(0, spec);
        assert_eq!(column.title(), "CPU%");
        assert_eq!(column.name(), "cpu");
        assert_eq!(column.tag(), Some(Tag(2)));
        assert_eq!(column.min_size(), 6);
    }

    #[test]
    fn test_name_defaults_to_title() {
        let column = GridColumn::from_spec(1, ColumnSpec::new("Name", ValueKind::String));
        assert_eq!(column.name(), "Name");
        assert_eq!(column.id(), 1);
        assert_eq!(column.cell_count(), 0);
    }
}
