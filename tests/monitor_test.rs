//! Monitor behavior driven through feeders.

#![allow(clippy::unwrap_used)]

use ectop::grid::{ColumnKey, ColumnSpec, GridModel, GridView, RowKey, Tag, TextRenderer};
use ectop::monitor::{FeedKey, FeedSink, Feeder, Monitor, MonitorHooks, ProcessFeeder, ProcessHooks};
use ectop::value::{Value, ValueKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const SENSOR: Tag = Tag(7);

struct Energy {
    watts: ColumnKey,
    refreshed: usize,
}

impl MonitorHooks for Energy {
    type Item = f64;

    fn on_row_update(&mut self, model: &mut GridModel, row: RowKey, item: &f64) {
        model.set_value(row, self.watts, &Value::from(*item));
    }

    fn on_row_refresh(&mut self, _model: &mut GridModel, _row: RowKey) {
        self.refreshed += 1;
    }
}

/// Reports whatever the shared table holds, deleting keys that vanished.
struct Sensors {
    table: Arc<Mutex<BTreeMap<u64, f64>>>,
    reported: Vec<u64>,
}

impl Feeder<f64> for Sensors {
    fn name(&self) -> &str {
        "sensors"
    }

    fn feed(&mut self, sink: &mut dyn FeedSink<f64>) {
        let table = self.table.lock().unwrap();
        for key in self.reported.iter().filter(|k| !table.contains_key(*k)) {
            sink.feed_delete_item(SENSOR, FeedKey(*key));
        }
        for (key, watts) in table.iter() {
            sink.feed_update_item(SENSOR, FeedKey(*key), watts);
        }
        self.reported = table.keys().copied().collect();
    }
}

fn energy_monitor() -> (Monitor<Energy>, Arc<Mutex<BTreeMap<u64, f64>>>) {
    let mut model = GridModel::new();
    let watts = model.add_column(ColumnSpec::new("Watts", ValueKind::Double));
    let mut monitor = Monitor::with_model(model, Energy { watts, refreshed: 0 });
    let table = Arc::new(Mutex::new(BTreeMap::new()));
    monitor.connect_row_feeder(Box::new(Sensors { table: Arc::clone(&table), reported: Vec::new() }));
    (monitor, table)
}

#[test]
fn test_feeder_reports_drive_row_lifecycle() {
    let (mut monitor, table) = energy_monitor();
    table.lock().unwrap().extend([(1, 10.0), (2, 20.0)]);
    let start = Instant::now();

    assert!(monitor.update_at(start));
    assert_eq!(monitor.model().row_count(), 2);
    let row = monitor.mapped_row(FeedKey(2)).unwrap();
    assert_eq!(monitor.model().value(row, "Watts"), Some(&Value::from(20.0)));
    assert_eq!(monitor.model().row(row).unwrap().tag(), Some(SENSOR));
    assert_eq!(monitor.model().row(row).unwrap().data(), Some(2));

    table.lock().unwrap().remove(&1);
    table.lock().unwrap().insert(2, 25.0);
    assert!(monitor.update_at(start + Duration::from_secs(1)));
    assert_eq!(monitor.model().row_count(), 1);
    assert_eq!(monitor.mapped_row(FeedKey(1)), None);
    assert_eq!(monitor.mapped_row(FeedKey(2)), Some(row));
    assert_eq!(monitor.model().value(row, "Watts"), Some(&Value::from(25.0)));
    assert_eq!(monitor.hooks().refreshed, 3);
}

#[test]
fn test_repeated_reports_do_not_duplicate_rows() {
    let (mut monitor, _) = energy_monitor();
    {
        let mut feed = monitor.row_feed();
        feed.feed_create_item(SENSOR, FeedKey(5), &1.0);
        feed.feed_create_item(SENSOR, FeedKey(5), &2.0);
        feed.feed_update_item(SENSOR, FeedKey(5), &3.0);
    }
    assert_eq!(monitor.model().row_count(), 1);
    assert_eq!(monitor.mapped_row_count(), 1);
    let row = monitor.mapped_row(FeedKey(5)).unwrap();
    assert_eq!(monitor.model().value(row, 0_usize), Some(&Value::from(3.0)));

    monitor.row_feed().feed_delete_item(SENSOR, FeedKey(5));
    monitor.row_feed().feed_delete_item(SENSOR, FeedKey(5));
    assert_eq!(monitor.model().row_count(), 0);
}

#[test]
fn test_updates_are_gated_by_frequency() {
    let (mut monitor, table) = energy_monitor();
    table.lock().unwrap().insert(1, 1.0);
    let start = Instant::now();

    assert!(monitor.update_at(start));
    table.lock().unwrap().insert(3, 3.0);
    assert!(!monitor.update_at(start + Duration::from_millis(500)));
    assert_eq!(monitor.model().row_count(), 1);
    assert!(monitor.update_at(start + Duration::from_millis(1000)));
    assert_eq!(monitor.model().row_count(), 2);

    monitor.set_frequency(Duration::ZERO);
    assert!(monitor.update_at(start + Duration::from_millis(1001)));
}

fn write_process(root: &Path, pid: u32, name: &str, utime: u64) {
    let dir = root.join(pid.to_string());
    fs::create_dir_all(&dir).unwrap();
    let stat = format!("{pid} ({name}) R 1 {pid} {pid} 0 -1 0 0 0 0 0 {utime} 0 0 0 20 0 1 0 100 1000 100");
    fs::write(dir.join("stat"), stat).unwrap();
    fs::write(dir.join("statm"), "1000 100 50 1 0 100 0").unwrap();
    fs::write(dir.join("cmdline"), format!("{name}\0")).unwrap();
}

#[test]
fn test_process_table_renders_through_a_view() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("meminfo"), "MemTotal:       2048000 kB\n").unwrap();
    fs::write(root.path().join("stat"), "cpu  10 0 10 80 0 0 0 0 0 0\n").unwrap();
    write_process(root.path(), 1, "init", 1);
    write_process(root.path(), 300, "worker", 5);

    let mut model = GridModel::new();
    let hooks = ProcessHooks::install(&mut model);
    let view = model.connect_view(GridView::new(Box::new(TextRenderer::new())));
    let mut monitor = Monitor::with_model(model, hooks).with_frequency(Duration::ZERO);
    monitor.connect_row_feeder(Box::new(ProcessFeeder::with_root(root.path())));

    monitor.update();
    assert_eq!(monitor.mapped_row_count(), 2);
    assert!(monitor.render_views());
    let text = monitor.model().view(view).unwrap().renderer_as::<TextRenderer>().unwrap().content();
    assert!(text.contains("worker"), "{text}");
    assert!(text.contains("PID"), "{text}");

    write_process(root.path(), 301, "late", 1);
    monitor.update();
    assert_eq!(monitor.model().row_count(), 3);
    let row = monitor.mapped_row(FeedKey(301)).unwrap();
    assert_eq!(monitor.model().value(row, "name"), Some(&Value::from("late")));
}
