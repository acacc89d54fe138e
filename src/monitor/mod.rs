//! Binding between external data sources and a grid model.
//!
//! A [`Monitor`] owns a [`GridModel`] and keeps a stable mapping from the
//! entities reported by its [`Feeder`]s to model rows and columns. Repeated
//! polling of a changing collection (the OS process table, a sensor list)
//! turns into exactly one create, update or delete per real change, and the
//! [`MonitorHooks`] implementation fills the cells.
//!
//! # Example
//!
//! ```
//! use ectop::grid::{ColumnKey, ColumnSpec, GridModel, RowKey, Tag};
//! use ectop::monitor::{FeedKey, FeedSink, Monitor, MonitorHooks};
//! use ectop::value::{Value, ValueKind};
//!
//! struct Watts(ColumnKey);
//!
//! impl MonitorHooks for Watts {
//!     type Item = f64;
//!
//!     fn on_row_update(&mut self, model: &mut GridModel, row: RowKey, item: &f64) {
//!         model.set_value(row, self.0, &Value::from(*item));
//!     }
//! }
//!
//! let mut model = GridModel::new();
//! let watts = model.add_column(ColumnSpec::new("Watts", ValueKind::Double));
//! let mut monitor = Monitor::with_model(model, Watts(watts));
//! monitor.row_feed().feed_update_item(Tag(0), FeedKey(7), &12.5);
//! monitor.row_feed().feed_update_item(Tag(0), FeedKey(7), &13.0);
//! assert_eq!(monitor.model().row_count(), 1);
//! ```

// ============================================================================
// Modules
// ============================================================================

mod feeder;
pub mod process;

pub use feeder::{FeedKey, FeedSink, Feeder, FeederId};
pub use process::{ProcessFeeder, ProcessHooks, ProcessInfo, ProcessState};

use crate::debug::DebugLog;
use crate::grid::{ColumnKey, ColumnSpec, Event, GridCtrl, GridModel, RowKey, Tag, ViewKey};
use crate::value::ValueKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default minimum interval between two gated updates.
pub const DEFAULT_FREQUENCY: Duration = Duration::from_millis(1000);

/// Title of columns created from a feed.
pub const UNKNOWN_COLUMN_TITLE: &str = "UNKNOWN";

// ============================================================================
// Hooks
// ============================================================================

/// User behavior of a monitor. Every hook defaults to doing nothing.
#[allow(unused_variables)]
pub trait MonitorHooks {
    /// Payload reported by the feeders.
    type Item;

    /// Runs once per gated update, after the feeders were polled.
    fn on_update(&mut self, model: &mut GridModel) {}

    /// A feeder reported a new row entity.
    fn on_row_create(&mut self, model: &mut GridModel, row: RowKey, item: &Self::Item) {
        self.on_row_update(model, row, item);
    }

    /// A feeder reported a known row entity again.
    fn on_row_update(&mut self, model: &mut GridModel, row: RowKey, item: &Self::Item) {}

    /// Runs once per gated update for every row passing the model filter.
    fn on_row_refresh(&mut self, model: &mut GridModel, row: RowKey) {}

    /// A row entity is gone; the row is removed right after.
    fn on_row_delete(&mut self, model: &mut GridModel, row: RowKey) {}

    /// A feeder reported a new column entity.
    fn on_column_create(&mut self, model: &mut GridModel, column: ColumnKey, item: &Self::Item) {
        self.on_column_update(model, column, item);
    }

    /// A feeder reported a known column entity again.
    fn on_column_update(&mut self, model: &mut GridModel, column: ColumnKey, item: &Self::Item) {}

    /// A column entity is gone; the column is removed right after.
    fn on_column_delete(&mut self, model: &mut GridModel, column: ColumnKey) {}

    /// Runs before the first view of a render pass is drawn.
    fn before_render_views(&mut self, model: &GridModel) {}

    /// Runs after a render pass that drew at least one view.
    fn after_render_views(&mut self, model: &GridModel) {}
}

// ============================================================================
// Mapping
// ============================================================================

#[derive(Debug)]
struct Mapping<H> {
    model: GridModel,
    hooks: H,
    rows: HashMap<FeedKey, RowKey>,
    columns: HashMap<FeedKey, ColumnKey>,
}

impl<H: MonitorHooks> Mapping<H> {
    fn mapped_row(&self, key: FeedKey) -> Option<RowKey> {
        self.rows.get(&key).copied().filter(|row| self.model.is_valid_row(*row))
    }

    fn mapped_column(&self, key: FeedKey) -> Option<ColumnKey> {
        self.columns.get(&key).copied().filter(|column| self.model.is_valid_column(*column))
    }

    /// Forgets keys whose row or column was removed through the model.
    fn prune_stale(&mut self) -> usize {
        let before = self.rows.len() + self.columns.len();
        let model = &self.model;
        self.rows.retain(|_, row| model.is_valid_row(*row));
        self.columns.retain(|_, column| model.is_valid_column(*column));
        before - self.rows.len() - self.columns.len()
    }

    fn add_mapped_row(&mut self, key: FeedKey, tag: Option<Tag>) -> (RowKey, bool) {
        if let Some(row) = self.mapped_row(key) {
            return (row, false);
        }
        let row = self.model.add_row(tag);
        self.model.set_row_data(row, Some(key.0));
        self.rows.insert(key, row);
        (row, true)
    }

    fn add_mapped_column(&mut self, key: FeedKey, spec: ColumnSpec) -> (ColumnKey, bool) {
        if let Some(column) = self.mapped_column(key) {
            return (column, false);
        }
        let column = self.model.add_column(spec);
        self.model.set_column_data(column, Some(key.0));
        self.columns.insert(key, column);
        (column, true)
    }
}

/// Feed target creating and updating rows.
pub struct RowFeed<'a, H> {
    mapping: &'a mut Mapping<H>,
}

impl<H: MonitorHooks> FeedSink<H::Item> for RowFeed<'_, H> {
    fn feed_create_item(&mut self, tag: Tag, key: FeedKey, item: &H::Item) {
        let (row, created) = self.mapping.add_mapped_row(key, Some(tag));
        let Mapping { model, hooks, .. } = &mut *self.mapping;
        if created {
            hooks.on_row_create(model, row, item);
        } else {
            hooks.on_row_update(model, row, item);
        }
    }

    fn feed_update_item(&mut self, tag: Tag, key: FeedKey, item: &H::Item) {
        match self.mapping.mapped_row(key) {
            Some(row) => {
                let Mapping { model, hooks, .. } = &mut *self.mapping;
                hooks.on_row_update(model, row, item);
            }
            None => self.feed_create_item(tag, key, item),
        }
    }

    fn feed_delete_item(&mut self, _tag: Tag, key: FeedKey) {
        let Some(row) = self.mapping.mapped_row(key) else {
            self.mapping.rows.remove(&key);
            return;
        };
        let Mapping { model, hooks, rows, .. } = &mut *self.mapping;
        hooks.on_row_delete(model, row);
        model.remove_row(row);
        rows.remove(&key);
    }
}

/// Feed target creating and updating columns.
pub struct ColumnFeed<'a, H> {
    mapping: &'a mut Mapping<H>,
}

impl<H: MonitorHooks> FeedSink<H::Item> for ColumnFeed<'_, H> {
    fn feed_create_item(&mut self, tag: Tag, key: FeedKey, item: &H::Item) {
        let spec = ColumnSpec::new(UNKNOWN_COLUMN_TITLE, ValueKind::Int).tag(tag);
        let (column, created) = self.mapping.add_mapped_column(key, spec);
        let Mapping { model, hooks, .. } = &mut *self.mapping;
        if created {
            hooks.on_column_create(model, column, item);
        } else {
            hooks.on_column_update(model, column, item);
        }
    }

    fn feed_update_item(&mut self, tag: Tag, key: FeedKey, item: &H::Item) {
        match self.mapping.mapped_column(key) {
            Some(column) => {
                let Mapping { model, hooks, .. } = &mut *self.mapping;
                hooks.on_column_update(model, column, item);
            }
            None => self.feed_create_item(tag, key, item),
        }
    }

    fn feed_delete_item(&mut self, _tag: Tag, key: FeedKey) {
        let Some(column) = self.mapping.mapped_column(key) else {
            self.mapping.columns.remove(&key);
            return;
        };
        let Mapping { model, hooks, columns, .. } = &mut *self.mapping;
        hooks.on_column_delete(model, column);
        model.remove_column(column);
        columns.remove(&key);
    }
}

// ============================================================================
// Monitor
// ============================================================================

type BoxedFeeder<T> = Box<dyn Feeder<T>>;

/// A grid model driven by feeders, with controllers bound to its views.
pub struct Monitor<H: MonitorHooks> {
    mapping: Mapping<H>,
    row_feeders: Vec<(FeederId, BoxedFeeder<H::Item>)>,
    column_feeders: Vec<(FeederId, BoxedFeeder<H::Item>)>,
    next_feeder: u32,
    controllers: Vec<(ViewKey, Box<dyn GridCtrl>)>,
    frequency: Duration,
    last_update: Option<Instant>,
    debug: DebugLog,
}

impl<H: MonitorHooks> Monitor<H> {
    /// Monitor over an empty model.
    #[must_use]
    pub fn new(hooks: H) -> Self {
        Self::with_model(GridModel::new(), hooks)
    }

    /// Monitor over `model`; it logs through the model's debug context.
    #[must_use]
    pub fn with_model(model: GridModel, hooks: H) -> Self {
        let debug = model.debug_log().clone();
        Self {
            mapping: Mapping { model, hooks, rows: HashMap::new(), columns: HashMap::new() },
            row_feeders: Vec::new(),
            column_feeders: Vec::new(),
            next_feeder: 0,
            controllers: Vec::new(),
            frequency: DEFAULT_FREQUENCY,
            last_update: None,
            debug,
        }
    }

    /// Sets the minimum interval between gated updates.
    #[must_use]
    pub fn with_frequency(mut self, frequency: Duration) -> Self {
        self.frequency = frequency;
        self
    }

    /// The model.
    #[must_use]
    pub fn model(&self) -> &GridModel {
        &self.mapping.model
    }

    /// The model, for direct mutation.
    pub fn model_mut(&mut self) -> &mut GridModel {
        &mut self.mapping.model
    }

    /// The hooks.
    #[must_use]
    pub fn hooks(&self) -> &H {
        &self.mapping.hooks
    }

    /// The hooks, mutably.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.mapping.hooks
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Minimum interval between gated updates; zero disables gating.
    #[must_use]
    pub fn frequency(&self) -> Duration {
        self.frequency
    }

    /// Changes the update interval.
    pub fn set_frequency(&mut self, frequency: Duration) {
        self.frequency = frequency;
    }

    /// Returns true if an update at `now` would do work.
    #[must_use]
    pub fn need_update_at(&self, now: Instant) -> bool {
        match self.last_update {
            Some(last) if !self.frequency.is_zero() => now.saturating_duration_since(last) >= self.frequency,
            _ => true,
        }
    }

    /// Runs a gated update now.
    pub fn update(&mut self) -> bool {
        self.update_at(Instant::now())
    }

    /// Runs a gated update at `now`: polls the column feeders, then the row
    /// feeders, then calls `on_update` and `on_row_refresh` for every row
    /// passing the model filter. Returns false when the interval since the
    /// last update has not elapsed.
    pub fn update_at(&mut self, now: Instant) -> bool {
        if !self.need_update_at(now) {
            return false;
        }
        self.last_update = Some(now);
        crate::time_scope!(self.debug, "monitor", "update");

        let pruned = self.mapping.prune_stale();
        if pruned > 0 {
            crate::debug!(self.debug, "monitor", "{} stale mappings dropped", pruned);
        }

        for (_, feeder) in &mut self.column_feeders {
            feeder.feed(&mut ColumnFeed { mapping: &mut self.mapping });
        }
        for (_, feeder) in &mut self.row_feeders {
            feeder.feed(&mut RowFeed { mapping: &mut self.mapping });
        }

        let Mapping { model, hooks, .. } = &mut self.mapping;
        hooks.on_update(model);
        let rows: Vec<RowKey> = model.rows_passing_filter().collect();
        for row in rows {
            hooks.on_row_refresh(model, row);
        }
        crate::trace!(self.debug, "monitor", "{} rows, {} columns", model.row_count(), model.column_count());
        true
    }

    // ========================================================================
    // Feeders
    // ========================================================================

    /// Connects a feeder whose entities become rows.
    pub fn connect_row_feeder(&mut self, feeder: BoxedFeeder<H::Item>) -> FeederId {
        let (id, feeder) = self.connect(feeder);
        self.row_feeders.push((id, feeder));
        id
    }

    /// Connects a feeder whose entities become columns.
    pub fn connect_column_feeder(&mut self, feeder: BoxedFeeder<H::Item>) -> FeederId {
        let (id, feeder) = self.connect(feeder);
        self.column_feeders.push((id, feeder));
        id
    }

    fn connect(&mut self, mut feeder: BoxedFeeder<H::Item>) -> (FeederId, BoxedFeeder<H::Item>) {
        let id = FeederId(self.next_feeder);
        self.next_feeder += 1;
        feeder.connect_monitor(id);
        crate::debug!(self.debug, "monitor", "feeder {} connected as {}", feeder.name(), id.0);
        (id, feeder)
    }

    /// Disconnects one feeder and hands it back.
    pub fn disconnect_feeder(&mut self, id: FeederId) -> Option<BoxedFeeder<H::Item>> {
        let list = if self.row_feeders.iter().any(|(f, _)| *f == id) { &mut self.row_feeders } else { &mut self.column_feeders };
        let index = list.iter().position(|(f, _)| *f == id)?;
        let (_, mut feeder) = list.remove(index);
        feeder.disconnect_monitor(id);
        Some(feeder)
    }

    /// Disconnects every feeder.
    pub fn clear_feeders(&mut self) {
        for (id, mut feeder) in self.column_feeders.drain(..).chain(self.row_feeders.drain(..)) {
            feeder.disconnect_monitor(id);
        }
    }

    /// Number of connected feeders.
    #[must_use]
    pub fn feeder_count(&self) -> usize {
        self.row_feeders.len() + self.column_feeders.len()
    }

    /// Feeds row events directly.
    pub fn row_feed(&mut self) -> RowFeed<'_, H> {
        RowFeed { mapping: &mut self.mapping }
    }

    /// Feeds column events directly.
    pub fn column_feed(&mut self) -> ColumnFeed<'_, H> {
        ColumnFeed { mapping: &mut self.mapping }
    }

    // ========================================================================
    // Mapped items
    // ========================================================================

    /// Row mapped to `key`, adding it when absent.
    pub fn add_mapped_row(&mut self, key: FeedKey, tag: Option<Tag>) -> RowKey {
        self.mapping.add_mapped_row(key, tag).0
    }

    /// Row mapped to `key`.
    #[must_use]
    pub fn mapped_row(&self, key: FeedKey) -> Option<RowKey> {
        self.mapping.mapped_row(key)
    }

    /// Column mapped to `key`, adding one built from `spec` when absent.
    pub fn add_mapped_column(&mut self, key: FeedKey, spec: ColumnSpec) -> ColumnKey {
        self.mapping.add_mapped_column(key, spec).0
    }

    /// Column mapped to `key`.
    #[must_use]
    pub fn mapped_column(&self, key: FeedKey) -> Option<ColumnKey> {
        self.mapping.mapped_column(key)
    }

    /// Number of live row mappings.
    #[must_use]
    pub fn mapped_row_count(&self) -> usize {
        self.mapping.rows.values().filter(|row| self.mapping.model.is_valid_row(**row)).count()
    }

    // ========================================================================
    // Controllers and views
    // ========================================================================

    /// Binds a controller to a view of the model.
    pub fn add_controller(&mut self, view: ViewKey, controller: Box<dyn GridCtrl>) {
        self.controllers.push((view, controller));
    }

    /// Number of bound controllers.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Forwards `event` to every controller; returns true if any consumed it.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let mut handled = false;
        for (key, controller) in &mut self.controllers {
            if let Some((view, data)) = self.mapping.model.view_mut(*key) {
                handled |= controller.handle_event(view, data, event);
            }
        }
        handled
    }

    /// Renders every view needing it, surrounded by the render hooks when at
    /// least one view draws. Returns true if anything was drawn.
    pub fn render_views(&mut self) -> bool {
        let keys = self.mapping.model.view_keys().to_vec();
        let mut rendered = false;
        for key in keys {
            let needed = match self.mapping.model.view_mut(key) {
                Some((view, _)) => {
                    view.refresh_auto_size();
                    view.need_render()
                }
                None => false,
            };
            if !needed {
                continue;
            }
            if !rendered {
                self.mapping.hooks.before_render_views(&self.mapping.model);
                rendered = true;
            }
            if let Some((view, data)) = self.mapping.model.view_mut(key) {
                view.render(data);
            }
        }
        if rendered {
            self.mapping.hooks.after_render_views(&self.mapping.model);
        }
        rendered
    }
}

impl<H: MonitorHooks> Drop for Monitor<H> {
    fn drop(&mut self) {
        self.clear_feeders();
    }
}

impl<H: MonitorHooks + std::fmt::Debug> std::fmt::Debug for Monitor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("hooks", &self.mapping.hooks)
            .field("rows", &self.mapping.model.row_count())
            .field("feeders", &self.feeder_count())
            .field("controllers", &self.controllers.len())
            .field("frequency", &self.frequency)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridView, Key, TermGridCtrl, TextRenderer};
    use crate::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Recorder {
        value: Option<ColumnKey>,
        events: Vec<String>,
        renders: usize,
    }

    impl MonitorHooks for Recorder {
        type Item = i64;

        fn on_update(&mut self, _model: &mut GridModel) {
            self.events.push("tick".into());
        }

        fn on_row_create(&mut self, model: &mut GridModel, row: RowKey, item: &i64) {
            self.events.push(format!("create {item}"));
            self.on_row_update(model, row, item);
        }

        fn on_row_update(&mut self, model: &mut GridModel, row: RowKey, item: &i64) {
            self.events.push(format!("update {item}"));
            if let Some(column) = self.value {
                model.set_value(row, column, &Value::from(*item));
            }
        }

        fn on_row_delete(&mut self, _model: &mut GridModel, _row: RowKey) {
            self.events.push("delete".into());
        }

        fn on_column_create(&mut self, _model: &mut GridModel, _column: ColumnKey, item: &i64) {
            self.events.push(format!("column {item}"));
        }

        fn after_render_views(&mut self, _model: &GridModel) {
            self.renders += 1;
        }
    }

    /// Feeder replaying one batch of (key, value) pairs per poll.
    struct Script {
        batches: Vec<Vec<(u64, i64)>>,
        seen: Vec<u64>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Feeder<i64> for Script {
        fn connect_monitor(&mut self, id: FeederId) {
            self.log.borrow_mut().push(format!("connect {}", id.0));
        }

        fn disconnect_monitor(&mut self, id: FeederId) {
            self.log.borrow_mut().push(format!("disconnect {}", id.0));
        }

        fn feed(&mut self, sink: &mut dyn FeedSink<i64>) {
            if self.batches.is_empty() {
                return;
            }
            let batch = self.batches.remove(0);
            for gone in self.seen.iter().filter(|k| !batch.iter().any(|(b, _)| b == *k)) {
                sink.feed_delete_item(Tag(0), FeedKey(*gone));
            }
            for (key, value) in &batch {
                sink.feed_update_item(Tag(0), FeedKey(*key), value);
            }
            self.seen = batch.into_iter().map(|(k, _)| k).collect();
        }
    }

    fn monitor() -> Monitor<Recorder> {
        let mut model = GridModel::new();
        let value = model.add_column(ColumnSpec::new("Value", ValueKind::Int));
        Monitor::with_model(model, Recorder { value: Some(value), ..Recorder::default() })
    }

    #[test]
    fn test_update_of_unknown_key_creates_once() {
        let mut m = monitor();
        m.row_feed().feed_update_item(Tag(0), FeedKey(1), &5);
        m.row_feed().feed_update_item(Tag(0), FeedKey(1), &6);
        assert_eq!(m.model().row_count(), 1);
        assert_eq!(m.hooks().events, ["create 5", "update 5", "update 6"]);
        let row = m.mapped_row(FeedKey(1)).unwrap();
        assert_eq!(m.model().row(row).unwrap().data(), Some(1));
    }

    #[test]
    fn test_create_twice_is_an_update() {
        let mut m = monitor();
        m.row_feed().feed_create_item(Tag(0), FeedKey(1), &5);
        m.row_feed().feed_create_item(Tag(0), FeedKey(1), &5);
        assert_eq!(m.model().row_count(), 1);
    }

    #[test]
    fn test_delete_removes_row_and_mapping() {
        let mut m = monitor();
        m.row_feed().feed_create_item(Tag(3), FeedKey(1), &5);
        m.row_feed().feed_delete_item(Tag(3), FeedKey(1));
        m.row_feed().feed_delete_item(Tag(3), FeedKey(1));
        assert_eq!(m.model().row_count(), 0);
        assert_eq!(m.mapped_row(FeedKey(1)), None);
        assert_eq!(m.hooks().events.iter().filter(|e| *e == "delete").count(), 1);
    }

    #[test]
    fn test_row_removed_behind_the_monitor_is_recreated() {
        let mut m = monitor();
        let first = m.add_mapped_row(FeedKey(9), None);
        m.model_mut().remove_row(first);
        assert_eq!(m.mapped_row(FeedKey(9)), None);
        let second = m.add_mapped_row(FeedKey(9), None);
        assert_ne!(first, second);
        assert_eq!(m.model().row_count(), 1);
    }

    #[test]
    fn test_update_forgets_rows_removed_behind_the_monitor() {
        let mut m = monitor().with_frequency(Duration::ZERO);
        let gone = m.add_mapped_row(FeedKey(1), None);
        m.add_mapped_row(FeedKey(2), None);
        let column = m.add_mapped_column(FeedKey(3), ColumnSpec::new("X", ValueKind::Int));
        m.model_mut().remove_row(gone);
        m.model_mut().remove_column(column);
        assert_eq!(m.mapping.rows.len(), 2);

        assert!(m.update());
        assert_eq!(m.mapping.rows.len(), 1);
        assert!(m.mapping.columns.is_empty());
        assert!(m.mapped_row(FeedKey(2)).is_some());
        assert_eq!(m.mapped_row_count(), 1);
    }

    #[test]
    fn test_column_feed_creates_unknown_int_columns() {
        let mut m = monitor();
        m.column_feed().feed_update_item(Tag(2), FeedKey(4), &0);
        let column = m.mapped_column(FeedKey(4)).unwrap();
        let column = m.model().column(column).unwrap();
        assert_eq!(column.title(), UNKNOWN_COLUMN_TITLE);
        assert_eq!(column.kind(), ValueKind::Int);
        assert_eq!(column.tag(), Some(Tag(2)));
        assert_eq!(m.hooks().events, ["column 0"]);
    }

    #[test]
    fn test_update_is_frequency_gated() {
        let mut m = monitor().with_frequency(Duration::from_millis(1000));
        let start = Instant::now();
        assert!(m.update_at(start));
        assert!(!m.update_at(start + Duration::from_millis(10)));
        assert!(!m.update_at(start + Duration::from_millis(999)));
        assert!(m.update_at(start + Duration::from_millis(1000)));
        assert_eq!(m.hooks().events, ["tick", "tick"]);

        m.set_frequency(Duration::ZERO);
        assert!(m.update_at(start));
    }

    #[test]
    fn test_feeders_polled_on_update() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut m = monitor().with_frequency(Duration::ZERO);
        let script = Script { batches: vec![vec![(1, 10), (2, 20)], vec![(2, 21)]], seen: Vec::new(), log: log.clone() };
        let id = m.connect_row_feeder(Box::new(script));

        m.update();
        assert_eq!(m.model().row_count(), 2);
        m.update();
        assert_eq!(m.model().row_count(), 1);
        let row = m.mapped_row(FeedKey(2)).unwrap();
        let value = m.model().data().column_key("Value").unwrap();
        assert_eq!(m.model().value(row, value), Some(&Value::from(21_i64)));
        assert_eq!(m.mapped_row_count(), 1);

        assert!(m.disconnect_feeder(id).is_some());
        assert_eq!(*log.borrow(), ["connect 0", "disconnect 0"]);
        assert_eq!(m.feeder_count(), 0);
    }

    #[test]
    fn test_drop_disconnects_feeders() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut m = monitor();
            m.connect_row_feeder(Box::new(Script { batches: Vec::new(), seen: Vec::new(), log: log.clone() }));
            m.connect_column_feeder(Box::new(Script { batches: Vec::new(), seen: Vec::new(), log: log.clone() }));
        }
        assert_eq!(*log.borrow(), ["connect 0", "connect 1", "disconnect 1", "disconnect 0"]);
    }

    #[test]
    fn test_render_hooks_only_when_drawn() {
        let mut m = monitor();
        let view = m.model_mut().connect_view(GridView::new(Box::new(TextRenderer::new())));
        assert!(m.render_views());
        assert!(!m.render_views());
        assert_eq!(m.hooks().renders, 1);

        m.add_controller(view, Box::new(TermGridCtrl::new()));
        assert!(m.handle_event(&Event::TermKeyHit(Key::Char('1'))));
        assert!(m.model().is_view_sort_by_column(0_usize));
        assert!(m.render_views());
        assert_eq!(m.hooks().renders, 2);
    }
}
