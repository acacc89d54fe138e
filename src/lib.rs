//! # ectop
//!
//! Reactive grid engine behind a `top`-like dashboard for process and energy
//! metrics.
//!
//! A [`GridModel`](grid::GridModel) owns columns, rows and cells and fans
//! every change out to its connected [`GridView`](grid::GridView)s. Each view
//! keeps its own projection (visibility, order, sort, pins, sums, styles,
//! filter) and draws it through one [`Renderer`](grid::Renderer): terminal,
//! text, HTML, JSON or chart. A [`Monitor`](monitor::Monitor) turns
//! feeder reports into row and column lifecycles, and a
//! [`GridLog`](grid::GridLog) records changes through a
//! [`Formatter`](format::Formatter).
//!
//! ## Quick Start
//!
//! ```
//! use ectop::grid::{ColumnSpec, GridModel, GridView, SortOrder, TextRenderer};
//! use ectop::value::{Value, ValueKind};
//!
//! let mut model = GridModel::new();
//! let name = model.add_column(ColumnSpec::new("Name", ValueKind::String));
//! let watts = model.add_column(ColumnSpec::new("Watts", ValueKind::Double));
//! for (n, w) in [("cpu", 12.5), ("gpu", 40.0)] {
//!     let row = model.add_row(None);
//!     model.set_value(row, name, &Value::from(n));
//!     model.set_value(row, watts, &Value::from(w));
//! }
//!
//! let key = model.connect_view(GridView::new(Box::new(TextRenderer::new())));
//! let (view, data) = model.view_mut(key).unwrap();
//! view.sort_by(watts, SortOrder::Descending);
//! assert!(view.render(data));
//! ```
//!
//! ## Feature Flags
//!
//! - `terminal` (default): ratatui renderer and the interactive driver

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Error types.
pub mod error;

/// Debug logging context.
pub mod debug;

/// Dynamically typed cell values.
pub mod value;

// ============================================================================
// Grid Engine
// ============================================================================

pub mod grid;

/// Structured record formatters for change logs.
pub mod format;

/// Log destinations.
pub mod sink;

// ============================================================================
// Rendering and Driving
// ============================================================================

pub mod render;

pub mod monitor;

/// YAML configuration.
pub mod config;

/// Interactive terminal driver.
#[cfg(feature = "terminal")]
#[cfg_attr(docsrs, doc(cfg(feature = "terminal")))]
pub mod app;

pub use error::{EctopError, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use ectop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::debug::DebugLog;
    pub use crate::error::{EctopError, Result};
    pub use crate::format::{BlockType, FormatKind, Formatter};
    pub use crate::grid::{
        ColumnKey, ColumnSpec, GridCtrl, GridLog, GridModel, GridStyle, GridView, Renderer, RowKey, SortOrder, Tag,
        TermGridCtrl, TextRenderer,
    };
    pub use crate::monitor::{FeedKey, FeedSink, Feeder, Monitor, MonitorHooks};
    pub use crate::render::RendererKind;
    pub use crate::value::{Value, ValueKind};
}
