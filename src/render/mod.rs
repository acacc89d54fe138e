//! Output backends for grid views.
//!
//! Every backend implements [`Renderer`](crate::grid::Renderer); a view owns
//! exactly one of them. [`RendererKind`] names the backends that can be
//! selected from configuration.

pub mod chart;
pub mod html;
pub mod json;
pub mod svg;
#[cfg(feature = "terminal")]
pub mod terminal;

pub use chart::ChartRenderer;
pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use svg::{SvgElement, SvgEncoder, TextAnchor};
#[cfg(feature = "terminal")]
pub use terminal::TerminalRenderer;

use crate::grid::{Renderer, TextRenderer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Selectable output backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Interactive terminal table (plain text without the `terminal` feature).
    #[default]
    Terminal,
    /// Plain text canvas.
    Text,
    /// HTML table page.
    Html,
    /// JSON document.
    Json,
    /// SVG bar chart.
    Chart,
}

impl RendererKind {
    /// Builds a renderer of this kind, saving its frames to `output` when the
    /// backend produces files.
    #[must_use]
    pub fn create(self, output: Option<PathBuf>) -> Box<dyn Renderer> {
        match self {
            #[cfg(feature = "terminal")]
            RendererKind::Terminal => Box::new(TerminalRenderer::new()),
            #[cfg(not(feature = "terminal"))]
            RendererKind::Terminal => Box::new(TextRenderer::new()),
            RendererKind::Text => Box::new(TextRenderer::new()),
            RendererKind::Html => match output {
                Some(path) => Box::new(HtmlRenderer::new().with_output(path)),
                None => Box::new(HtmlRenderer::new()),
            },
            RendererKind::Json => match output {
                Some(path) => Box::new(JsonRenderer::new().pretty(true).with_output(path)),
                None => Box::new(JsonRenderer::new().pretty(true)),
            },
            RendererKind::Chart => match output {
                Some(path) => Box::new(ChartRenderer::unbound().with_output(path)),
                None => Box::new(ChartRenderer::unbound()),
            },
        }
    }

    /// True for backends that write files rather than draw on screen.
    #[must_use]
    pub fn is_file_output(self) -> bool {
        matches!(self, RendererKind::Html | RendererKind::Json | RendererKind::Chart)
    }
}
