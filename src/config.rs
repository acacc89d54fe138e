//! Configuration system for the dashboard.
//!
//! YAML describes the monitor cadence and filter plus a list of views. Views
//! refer to columns by their lookup name; names the model does not know are
//! skipped so one file works across column sets.

use crate::debug::DebugLog;
use crate::error::{EctopError, Result};
use crate::format::{create_formatter, FormatKind, FormatOptions};
use crate::grid::{
    Align, AutoSize, ColumnKey, GridColor, GridData, GridLog, GridStyle, GridView, Rect, SortOrder, StyleId,
    TermGridCtrl, ViewKey, ViewOptions,
};
use crate::monitor::{Monitor, MonitorHooks};
use crate::render::{ChartRenderer, RendererKind};
use crate::sink::FileSink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Monitor section
// ============================================================================

/// Monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Minimum interval between updates in milliseconds.
    #[serde(default = "default_frequency_ms")]
    pub frequency_ms: u64,

    /// Model filter; rows failing it get no periodic refresh.
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_frequency_ms() -> u64 {
    1000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { frequency_ms: default_frequency_ms(), filter: None }
    }
}

// ============================================================================
// Styles
// ============================================================================

/// A style as written in YAML; colors are names or `#rrggbb`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// `left`, `right` or `center`.
    pub align: Option<String>,
    /// Foreground color.
    pub fg: Option<String>,
    /// Background color.
    pub bg: Option<String>,
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Struck-through text.
    pub strikethrough: bool,
    /// Right border.
    pub border: bool,
    /// Text before the value.
    pub prefix: String,
    /// Text after the value.
    pub suffix: String,
}

impl StyleConfig {
    /// Converts into a grid style starting from `base`; `key` names the
    /// setting in error messages.
    pub fn to_style(&self, base: GridStyle, key: &str) -> Result<GridStyle> {
        let mut style = base;
        if let Some(align) = &self.align {
            style.align = Align::parse(align).ok_or_else(|| invalid(key, format!("unknown alignment '{align}'")))?;
        }
        if let Some(fg) = &self.fg {
            style.fg = Some(parse_color(fg, key)?);
        }
        if let Some(bg) = &self.bg {
            style.bg = Some(parse_color(bg, key)?);
        }
        style.bold |= self.bold;
        style.italic |= self.italic;
        style.underline |= self.underline;
        style.strikethrough |= self.strikethrough;
        style.border |= self.border;
        if !self.prefix.is_empty() {
            style.prefix.clone_from(&self.prefix);
        }
        if !self.suffix.is_empty() {
            style.suffix.clone_from(&self.suffix);
        }
        Ok(style)
    }
}

fn parse_color(text: &str, key: &str) -> Result<GridColor> {
    GridColor::parse(text).ok_or_else(|| invalid(key, format!("unknown color '{text}'")))
}

fn invalid(key: &str, message: impl Into<String>) -> EctopError {
    EctopError::ConfigInvalid { key: key.to_string(), message: message.into() }
}

/// Logs a rejected setting and carries on without it.
fn ignored<T>(debug: &DebugLog, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            crate::warn!(debug, "config", "{}; setting ignored", e);
            None
        }
    }
}

/// Style applied to rows matching a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFilterConfig {
    /// Filter expression.
    pub filter: String,
    /// Style id from the view's `styles`.
    pub style: StyleId,
}

// ============================================================================
// View section
// ============================================================================

/// Position and size of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Left edge.
    #[serde(default)]
    pub x: u16,
    /// Top edge.
    #[serde(default)]
    pub y: u16,
    /// Width.
    pub width: u16,
    /// Height.
    pub height: u16,
}

/// Auto-sizing of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSizeConfig {
    /// Width follows the host.
    pub width: bool,
    /// Height follows the host.
    pub height: bool,
    /// Columns left free on the right.
    pub offset_width: u16,
    /// Lines left free at the bottom.
    pub offset_height: u16,
}

impl Default for AutoSizeConfig {
    fn default() -> Self {
        Self { width: true, height: true, offset_width: 0, offset_height: 0 }
    }
}

/// Key and value columns of a chart view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Column labelling the bars.
    pub key: String,
    /// Column sizing the bars.
    pub value: String,
}

/// Change log of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Output file, appended to.
    pub path: PathBuf,

    /// Record syntax.
    #[serde(default)]
    pub format: FormatKind,

    /// Field separator for csv and gnuplot.
    #[serde(default)]
    pub separator: Option<String>,

    /// Flush interval in milliseconds.
    #[serde(default = "default_flush_ms")]
    pub flush_ms: u64,

    /// Pending records forcing a flush (0 disables).
    #[serde(default)]
    pub flush_items: usize,

    /// Only rows matching this filter are logged.
    #[serde(default)]
    pub filter: Option<String>,

    /// Empty the file when the dashboard starts.
    #[serde(default)]
    pub truncate: bool,

    /// Log from the start.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_flush_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}

/// Input handling bound to a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// No input.
    #[default]
    None,
    /// Keyboard controller.
    Term,
}

/// One view of the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Name used in debug output.
    pub name: String,
    /// Output backend.
    pub kind: RendererKind,
    /// File written after each frame by file backends.
    pub output: Option<PathBuf>,
    /// Fixed geometry; auto-sized when absent.
    pub geometry: Option<GeometryConfig>,
    /// Auto-sizing, used when no geometry is given.
    pub auto_size: AutoSizeConfig,
    /// Named styles referenced by columns and style filters.
    pub styles: BTreeMap<StyleId, StyleConfig>,
    /// Default cell style.
    pub default_style: Option<StyleConfig>,
    /// Header style.
    pub header_style: Option<StyleConfig>,
    /// Sum bar style.
    pub sum_style: Option<StyleConfig>,
    /// Column name to style id.
    pub column_styles: BTreeMap<String, StyleId>,
    /// Style filters, first match wins.
    pub style_filters: Vec<StyleFilterConfig>,
    /// Columns to show, in order; all columns when empty.
    pub show: Vec<String>,
    /// Columns to hide.
    pub hide: Vec<String>,
    /// Columns with a sum.
    pub sum: Vec<String>,
    /// Row filter.
    pub filter: Option<String>,
    /// Sort spec: `column [asc|desc]`.
    pub sort: Option<String>,
    /// Separator line below the header.
    pub header_line: bool,
    /// Separator line above the sum bar.
    pub sum_line: bool,
    /// Chart columns.
    pub chart: Option<ChartConfig>,
    /// Change log.
    pub log: Option<LogConfig>,
    /// Input handling.
    pub controller: ControllerKind,
}

/// Parses `column [asc|desc]` (or `column:desc`).
fn parse_sort(spec: &str) -> Option<(&str, SortOrder)> {
    let mut parts = spec.split(|c: char| c.is_whitespace() || c == ':').filter(|p| !p.is_empty());
    let column = parts.next()?;
    let order = match parts.next() {
        None => SortOrder::Ascending,
        Some(o) if ["asc", "ascending", "desc", "descending"].iter().any(|k| o.eq_ignore_ascii_case(k)) => {
            SortOrder::parse(o)
        }
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((column, order))
}

impl ViewConfig {
    fn key(&self, index: usize, field: &str) -> String {
        format!("views[{index}].{field}")
    }

    fn columns(&self, data: &GridData, names: &[String], debug: &DebugLog) -> Vec<ColumnKey> {
        names
            .iter()
            .filter_map(|name| {
                let key = data.column_key(name.as_str());
                if key.is_none() {
                    crate::warn!(debug, "config", "view {}: unknown column '{}' skipped", self.name, name);
                }
                key
            })
            .collect()
    }

    /// Builds the view: backend, geometry and styles. A style that does not
    /// parse is left at its default.
    pub fn build(&self, index: usize, debug: &DebugLog) -> GridView {
        let mut view = GridView::new(self.kind.create(self.output.clone())).with_name(if self.name.is_empty() {
            format!("view{index}")
        } else {
            self.name.clone()
        });
        match self.geometry {
            Some(g) => view.set_geometry(Rect::new(g.x, g.y, g.width, g.height)),
            None => view.set_auto_size(AutoSize {
                auto_width: self.auto_size.width,
                auto_height: self.auto_size.height,
                offset_w: self.auto_size.offset_width,
                offset_h: self.auto_size.offset_height,
            }),
        }
        for (id, style) in &self.styles {
            if let Some(style) = ignored(debug, style.to_style(GridStyle::new(), &self.key(index, &format!("styles.{id}")))) {
                view.set_style(*id, style);
            }
        }
        if let Some(style) = &self.default_style {
            if let Some(style) = ignored(debug, style.to_style(GridStyle::new(), &self.key(index, "default_style"))) {
                view.set_default_style(style);
            }
        }
        if let Some(style) = &self.header_style {
            if let Some(style) = ignored(debug, style.to_style(GridStyle::header(), &self.key(index, "header_style"))) {
                view.set_header_style(style);
            }
        }
        if let Some(style) = &self.sum_style {
            if let Some(style) = ignored(debug, style.to_style(GridStyle::sum_bar(), &self.key(index, "sum_style"))) {
                view.set_sum_style(style);
            }
        }
        view.set_options(ViewOptions { additional_header_line: self.header_line, additional_sum_line: self.sum_line });
        view
    }

    /// Applies the settings that depend on the model's columns.
    ///
    /// A filter that does not parse switches off only its own feature: the
    /// row filter accepts every row, the style rule or log filter is dropped.
    pub fn configure(&self, index: usize, view: &mut GridView, data: &GridData, debug: &DebugLog) {
        if !self.show.is_empty() {
            view.show_only(&self.columns(data, &self.show, debug));
        }
        for key in self.columns(data, &self.hide, debug) {
            view.set_column_visible(key, false);
        }
        for key in self.columns(data, &self.sum, debug) {
            view.set_column_sum(data, key, true);
        }
        for (name, id) in &self.column_styles {
            if let Some(key) = self.columns(data, std::slice::from_ref(name), debug).first() {
                view.set_column_style(*key, Some(*id));
            }
        }
        for (i, rule) in self.style_filters.iter().enumerate() {
            let result = view.add_style_filter(data, &rule.filter, rule.style);
            ignored(debug, result.map_err(|e| invalid(&self.key(index, &format!("style_filters[{i}]")), e.to_string())));
        }
        if let Some(filter) = &self.filter {
            let result = view.set_filter(data, filter);
            ignored(debug, result.map_err(|e| invalid(&self.key(index, "filter"), e.to_string())));
        }
        if let Some(spec) = &self.sort {
            match parse_sort(spec).and_then(|(name, order)| data.column_key(name).map(|key| (key, order))) {
                Some((key, order)) => {
                    view.sort_by(key, order);
                }
                None => {
                    crate::warn!(debug, "config", "view {}: bad sort spec '{}', sorting disabled", self.name, spec);
                    view.disable_sort();
                }
            }
        }
        if let Some(chart) = &self.chart {
            let key = data.column_key(chart.key.as_str());
            let value = data.column_key(chart.value.as_str());
            if let Some(renderer) = view.renderer_as_mut::<ChartRenderer>() {
                renderer.set_chart_columns(key, value);
            }
        }
        if let Some(log) = &self.log {
            let options = FormatOptions { separator: log.separator.clone(), ..FormatOptions::default() };
            let sink = FileSink::new(&log.path).truncate_on_open(log.truncate);
            let mut grid_log = GridLog::with(Box::new(sink), create_formatter(log.format, &options));
            grid_log.set_flush_interval(Duration::from_millis(log.flush_ms));
            grid_log.set_flush_item_count(log.flush_items);
            view.set_log(grid_log);
            if let Some(filter) = &log.filter {
                let result = view.set_log_filter(data, filter);
                ignored(debug, result.map_err(|e| invalid(&self.key(index, "log.filter"), e.to_string())));
            }
            view.activate_log(log.active);
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Views, drawn in order.
    #[serde(default = "default_views")]
    pub views: Vec<ViewConfig>,
}

fn default_version() -> u32 {
    1
}

fn default_views() -> Vec<ViewConfig> {
    vec![ViewConfig {
        name: "main".to_string(),
        sort: Some("cpu desc".to_string()),
        sum: vec!["cpu".to_string(), "mem".to_string()],
        controller: ControllerKind::Term,
        ..ViewConfig::default()
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self { version: default_version(), monitor: MonitorConfig::default(), views: default_views() }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/ectop/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ectop").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|_| EctopError::ConfigNotFound(path.display().to_string()))?;
        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            EctopError::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Returns the update interval as a Duration.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.frequency_ms)
    }

    /// Applies the configuration to `monitor`: cadence, filter, and one view
    /// (plus controller) per view entry. Returns the view handles in order.
    ///
    /// Settings that do not parse are logged as warnings and left off; the
    /// remaining settings and views still apply.
    pub fn apply<H: MonitorHooks>(&self, monitor: &mut Monitor<H>) -> Vec<ViewKey> {
        monitor.set_frequency(self.update_interval());
        let debug = monitor.model().debug_log().clone();
        if let Some(filter) = &self.monitor.filter {
            let result = monitor.model_mut().set_filter(filter);
            ignored(&debug, result.map_err(|e| invalid("monitor.filter", e.to_string())));
        }
        let mut keys = Vec::with_capacity(self.views.len());
        for (index, config) in self.views.iter().enumerate() {
            let key = monitor.model_mut().connect_view(config.build(index, &debug));
            if let Some((view, data)) = monitor.model_mut().view_mut(key) {
                config.configure(index, view, data, &debug);
            }
            if config.controller == ControllerKind::Term {
                monitor.add_controller(key, Box::new(TermGridCtrl::new()));
            }
            crate::debug!(debug, "config", "view {} connected ({:?})", index, config.kind);
            keys.push(key);
        }
        keys
    }
}
