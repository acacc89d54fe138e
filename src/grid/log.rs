//! Buffered recorder of grid mutations.
//!
//! Records go through a [`Formatter`] and queue until they are written to the
//! [`LogSink`]: when the flush interval elapses with records pending, or as
//! soon as the pending count reaches the item threshold. At most
//! [`GridLog::max_pending`] records queue; older ones are dropped first.

use super::data::GridData;
use super::filter::GridFilter;
use super::{ColumnKey, RowKey};
use crate::debug::DebugLog;
use crate::error::Result;
use crate::format::{BlockType, Formatter};
use crate::sink::LogSink;
use crate::value::Value;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Default interval between time-triggered flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(5000);

/// Default cap on queued records.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// Formatter plus sink with time and count flush triggers.
pub struct GridLog {
    sink: Option<Box<dyn LogSink>>,
    formatter: Option<Box<dyn Formatter>>,
    flush_interval: Duration,
    flush_item_count: usize,
    pending: VecDeque<String>,
    max_pending: usize,
    dropped: u64,
    last_flush: Instant,
    filter: GridFilter,
    debug: DebugLog,
}

impl GridLog {
    /// Log without sink or formatter; records are dropped until both are set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            formatter: None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_item_count: 0,
            pending: VecDeque::new(),
            max_pending: DEFAULT_MAX_PENDING,
            dropped: 0,
            last_flush: Instant::now(),
            filter: GridFilter::new(),
            debug: DebugLog::new(),
        }
    }

    /// Log writing through `formatter` into `sink`.
    #[must_use]
    pub fn with(sink: Box<dyn LogSink>, formatter: Box<dyn Formatter>) -> Self {
        let mut log = Self::new();
        log.sink = Some(sink);
        log.formatter = Some(formatter);
        log
    }

    /// Replaces the sink.
    pub fn set_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sink = Some(sink);
    }

    /// Replaces the formatter, discarding queued records.
    pub fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = Some(formatter);
        self.pending.clear();
    }

    /// Sets the context that failed flushes and dropped records report to.
    pub fn set_debug(&mut self, debug: DebugLog) {
        self.debug = debug;
    }

    /// Formatter, if configured.
    #[must_use]
    pub fn formatter(&self) -> Option<&dyn Formatter> {
        self.formatter.as_deref()
    }

    /// Mutable formatter, if configured (e.g. to rename blocks).
    pub fn formatter_mut(&mut self) -> Option<&mut (dyn Formatter + 'static)> {
        self.formatter.as_deref_mut()
    }

    /// Returns true when both sink and formatter are configured.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.sink.is_some() && self.formatter.is_some()
    }

    /// Time between time-triggered flushes.
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Sets the time between time-triggered flushes.
    pub fn set_flush_interval(&mut self, interval: Duration) {
        self.flush_interval = interval;
    }

    /// Pending-record threshold (0 disables count-triggered flushes).
    #[must_use]
    pub fn flush_item_count(&self) -> usize {
        self.flush_item_count
    }

    /// Sets the threshold, flushing at once if it is already reached.
    pub fn set_flush_item_count(&mut self, count: usize) {
        self.flush_item_count = count;
        self.flush_if_full();
    }

    /// Records written since the last flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queued text, oldest record first.
    #[must_use]
    pub fn pending_text(&self) -> String {
        self.pending.iter().map(String::as_str).collect()
    }

    /// Cap on queued records.
    #[must_use]
    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Sets the cap (at least 1), dropping the oldest records beyond it.
    pub fn set_max_pending(&mut self, max: usize) {
        self.max_pending = max.max(1);
        self.trim_pending();
    }

    /// Records dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Row filter applied to row records.
    #[must_use]
    pub fn filter(&self) -> &GridFilter {
        &self.filter
    }

    /// Replaces the row filter.
    pub fn set_filter(&mut self, data: &GridData, expression: &str) -> Result<()> {
        let result = self.filter.set(expression);
        self.filter.refresh(data);
        result
    }

    pub(crate) fn refresh_filter(&mut self, data: &GridData) {
        self.filter.refresh(data);
    }

    /// Writes the queued records to the sink.
    ///
    /// Returns true only if text was written. Without a sink, or with nothing
    /// queued, nothing happens. A failed write is reported to the debug log
    /// and keeps the records for the next attempt.
    pub fn flush(&mut self) -> bool {
        self.flush_at(Instant::now())
    }

    fn flush_at(&mut self, now: Instant) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        if self.pending.is_empty() {
            return false;
        }
        let text: String = self.pending.iter().map(String::as_str).collect();
        if let Err(e) = sink.write_text(&text) {
            crate::warn!(self.debug, "log", "flush to {} failed: {}; {} records kept", sink.describe(), e, self.pending.len());
            return false;
        }
        self.pending.clear();
        self.last_flush = now;
        true
    }

    /// Flushes when the interval has elapsed with records pending.
    pub fn update(&mut self) -> bool {
        self.update_at(Instant::now())
    }

    /// [`GridLog::update`] at an explicit instant.
    pub fn update_at(&mut self, now: Instant) -> bool {
        if !self.pending.is_empty() && now.saturating_duration_since(self.last_flush) >= self.flush_interval {
            return self.flush_at(now);
        }
        false
    }

    fn flush_if_full(&mut self) {
        if self.flush_item_count > 0 && self.pending.len() >= self.flush_item_count && !self.flush() {
            crate::trace!(self.debug, "log", "threshold flush deferred, {} records queued", self.pending.len());
        }
    }

    fn trim_pending(&mut self) {
        let excess = self.pending.len().saturating_sub(self.max_pending);
        if excess == 0 {
            return;
        }
        self.pending.drain(..excess);
        if self.dropped == 0 {
            crate::warn!(self.debug, "log", "queue full ({} records), dropping oldest", self.max_pending);
        }
        self.dropped = self.dropped.saturating_add(u64::try_from(excess).unwrap_or(u64::MAX));
    }

    fn record(&mut self, write: impl FnOnce(&mut (dyn Formatter + 'static))) {
        let Some(formatter) = self.formatter.as_deref_mut() else {
            return;
        };
        write(formatter);
        let text = formatter.peek().to_string();
        formatter.clear();
        if text.is_empty() {
            return;
        }
        self.pending.push_back(text);
        self.trim_pending();
        self.flush_if_full();
    }

    /// Writes one block of named values.
    pub fn log_record(&mut self, block: BlockType, fields: &[(&str, Value)]) {
        self.record(|f| {
            f.open_block_type(block);
            for (name, value) in fields {
                f.format_named(name, value);
            }
            f.close_block_type(block);
        });
    }

    /// Writes a comment.
    pub fn comment(&mut self, text: &str) {
        self.record(|f| f.format_comment(text));
    }

    /// Writes one cell per column of `row`, titled by column. Unassigned
    /// cells are written as their column kind's default.
    pub fn log_row(&mut self, data: &GridData, row: RowKey, block: BlockType) {
        let columns: Vec<ColumnKey> = data.column_keys().to_vec();
        self.log_row_columns(data, row, &columns, block);
    }

    /// Writes the cells of `row` in `columns`, titled by column.
    ///
    /// Unassigned cells are written as their column kind's default.
    pub fn log_row_columns(&mut self, data: &GridData, row: RowKey, columns: &[ColumnKey], block: BlockType) {
        if !data.is_valid_row(row) || !self.filter.apply(data, row) {
            return;
        }
        let fields: Vec<(&str, Value)> = columns
            .iter()
            .filter_map(|key| {
                let title = data.column(*key)?.title();
                Some((title, data.value_or_default(row, *key)?))
            })
            .collect();
        self.log_record(block, &fields);
    }

    /// Writes a `grid` block holding one record per row.
    pub fn log_grid(&mut self, data: &GridData, rows: &[RowKey], columns: &[ColumnKey]) {
        let filter = &self.filter;
        let rows: Vec<RowKey> = rows.iter().copied().filter(|r| filter.apply(data, *r)).collect();
        let records: Vec<Vec<(String, Value)>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|key| {
                        let title = data.column(*key)?.title().to_string();
                        Some((title, data.value_or_default(*row, *key)?))
                    })
                    .collect()
            })
            .collect();
        self.record(|f| {
            f.open_block("grid");
            f.format_comment(&format!("Entire log of grid at {}", unix_time()));
            for fields in &records {
                f.open_block_type(BlockType::Default);
                for (name, value) in fields {
                    f.format_named(name, value);
                }
                f.close_block_type(BlockType::Default);
            }
            f.close_block("grid");
        });
    }

    /// Writes a `column` block with one `row{i}` entry per assigned cell.
    pub fn log_column(&mut self, data: &GridData, column: ColumnKey) {
        let Some(col) = data.column(column) else {
            return;
        };
        let title = col.title().to_string();
        let entries: Vec<(String, Value)> = data
            .row_keys()
            .iter()
            .enumerate()
            .filter(|(_, row)| self.filter.apply(data, **row))
            .filter_map(|(i, row)| Some((format!("row{i}"), data.value(*row, column)?.clone())))
            .collect();
        self.record(|f| {
            f.open_block("column");
            f.format_comment(&format!("Entire log of column <{title}> at {}", unix_time()));
            for (name, value) in &entries {
                f.format_named(name, value);
            }
            f.close_block("column");
        });
    }
}

fn unix_time() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl Default for GridLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GridLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLog")
            .field("sink", &self.sink.as_ref().map(|s| s.describe()))
            .field("formatter", &self.formatter.as_ref().map(|f| f.kind()))
            .field("flush_interval", &self.flush_interval)
            .field("flush_item_count", &self.flush_item_count)
            .field("pending", &self.pending.len())
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}
