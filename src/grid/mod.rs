//! Reactive grid engine.
//!
//! A [`GridModel`] owns columns, rows and the sparse cell matrix in
//! generational arenas and keeps every connected [`GridView`] in sync.
//! Items are addressed by stable handles ([`ColumnKey`], [`RowKey`],
//! [`CellKey`], [`ViewKey`]); lookups of anything missing return `None`.
//!
//! ```
//! use ectop::grid::{ColumnSpec, GridModel, GridView, SortOrder, TextRenderer};
//! use ectop::value::{Value, ValueKind};
//!
//! let mut model = GridModel::new();
//! let name = model.add_column(ColumnSpec::new("Name", ValueKind::String));
//! let cpu = model.add_column(ColumnSpec::new("CPU", ValueKind::Double));
//! let row = model.add_row(None);
//! model.set_value(row, name, &Value::from("init"));
//! model.set_value(row, cpu, &Value::from(0.5));
//!
//! let view = model.connect_view(GridView::new(Box::new(TextRenderer::new())));
//! if let Some((view, data)) = model.view_mut(view) {
//!     view.sort_by(cpu, SortOrder::Descending);
//!     assert!(view.render(data));
//! }
//! ```

mod cell;
mod column;
mod ctrl;
mod data;
mod filter;
mod item;
mod log;
mod model;
mod row;
mod style;
mod view;

pub use cell::GridCell;
pub use column::{ColumnSpec, GridColumn};
pub use ctrl::{CtrlMode, Event, GridCtrl, Key, TermGridCtrl};
pub use data::{ColumnLocator, GridData, RowLocator};
pub use filter::GridFilter;
pub use item::{FixedPosition, GridItem, Tag, UpdateCounter, UPDATE_COUNTER_WRAP};
pub use log::{GridLog, DEFAULT_FLUSH_INTERVAL};
pub use model::GridModel;
pub use row::GridRow;
pub use style::{Align, GridColor, GridStyle};
pub use view::{
    AutoSize, CellItem, GridView, HeaderItem, Placement, Rect, RenderPlan, Renderer, SortOrder, SortSpec,
    StyleId, TextRenderer, ViewOptions,
};

slotmap::new_key_type! {
    /// Handle of a model column.
    pub struct ColumnKey;
    /// Handle of a model row.
    pub struct RowKey;
    /// Handle of a model cell.
    pub struct CellKey;
    /// Handle of a view connected to a model.
    pub struct ViewKey;
}
