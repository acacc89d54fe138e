//! Process table feeder.
//!
//! Parses `/proc/[pid]/*` on Linux and reports one entity per PID. Other
//! systems have no `/proc` and the feeder reports nothing.

use super::feeder::{FeedKey, FeedSink, Feeder};
use super::MonitorHooks;
use crate::grid::{ColumnKey, ColumnSpec, GridModel, RowKey, Tag};
use crate::value::{Value, ValueKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Tag given to process rows.
pub const PROCESS_TAG: Tag = Tag(1);

const PAGE_SIZE: u64 = 4096;

/// Process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Running or runnable (on run queue).
    Running,
    /// Interruptible sleep (waiting for an event).
    Sleeping,
    /// Uninterruptible sleep (usually IO).
    DiskWait,
    /// Defunct/zombie process.
    Zombie,
    /// Stopped (on signal or by debugger).
    Stopped,
    /// Idle kernel thread.
    Idle,
    /// Unknown state.
    Unknown,
}

impl ProcessState {
    /// Parses a state character from /proc/[pid]/stat.
    fn from_char(c: char) -> Self {
        match c {
            'R' => Self::Running,
            'S' => Self::Sleeping,
            'D' => Self::DiskWait,
            'Z' => Self::Zombie,
            'T' | 't' => Self::Stopped,
            'I' => Self::Idle,
            _ => Self::Unknown,
        }
    }

    /// Returns a display character.
    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Self::Running => 'R',
            Self::Sleeping => 'S',
            Self::DiskWait => 'D',
            Self::Zombie => 'Z',
            Self::Stopped => 'T',
            Self::Idle => 'I',
            Self::Unknown => '?',
        }
    }
}

/// Snapshot of one process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    /// Process ID.
    pub pid: u32,
    /// Parent process ID.
    pub ppid: u32,
    /// Process name.
    pub name: String,
    /// Command line.
    pub cmdline: String,
    /// Process state.
    pub state: ProcessState,
    /// CPU usage since the previous scan, in percent of all CPUs.
    pub cpu_percent: f64,
    /// Resident memory in bytes.
    pub mem_bytes: u64,
    /// Resident memory in percent of the total.
    pub mem_percent: f64,
    /// Thread count.
    pub threads: u32,
}

// ============================================================================
// Feeder
// ============================================================================

/// Feeder scanning a proc filesystem.
#[derive(Debug)]
pub struct ProcessFeeder {
    root: PathBuf,
    processes: BTreeMap<u32, ProcessInfo>,
    prev_cpu_times: BTreeMap<u32, u64>,
    prev_total_cpu: u64,
    total_memory: u64,
}

impl ProcessFeeder {
    /// Feeder over `/proc`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Feeder over a proc filesystem mounted at `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let total_memory = read_total_memory(&root);
        Self { root, processes: BTreeMap::new(), prev_cpu_times: BTreeMap::new(), prev_total_cpu: 0, total_memory }
    }

    /// Processes seen by the last scan.
    #[must_use]
    pub fn processes(&self) -> &BTreeMap<u32, ProcessInfo> {
        &self.processes
    }

    /// Rescans the process table; returns the processes that vanished.
    fn scan(&mut self) -> Vec<u32> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            self.prev_cpu_times.clear();
            return std::mem::take(&mut self.processes).into_keys().collect();
        };
        let total_cpu = read_total_cpu_time(&self.root);
        let mut processes = BTreeMap::new();
        let mut cpu_times = BTreeMap::new();
        for entry in entries.flatten() {
            let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
                continue;
            };
            if let Some((info, cpu_time)) = self.read_process(pid, total_cpu) {
                cpu_times.insert(pid, cpu_time);
                processes.insert(pid, info);
            }
        }
        let gone = self.processes.keys().filter(|pid| !processes.contains_key(pid)).copied().collect();
        self.processes = processes;
        self.prev_cpu_times = cpu_times;
        self.prev_total_cpu = total_cpu;
        gone
    }

    fn read_process(&self, pid: u32, total_cpu: u64) -> Option<(ProcessInfo, u64)> {
        let dir = self.root.join(pid.to_string());
        let stat = fs::read_to_string(dir.join("stat")).ok()?;

        // pid (name) state ppid ... utime stime ...
        let name_start = stat.find('(')?;
        let name_end = stat.rfind(')')?;
        let name = stat[name_start + 1..name_end].to_string();
        let fields: Vec<&str> = stat.get(name_end + 2..).unwrap_or_default().split_whitespace().collect();

        let state = fields.first().and_then(|s| s.chars().next()).map_or(ProcessState::Unknown, ProcessState::from_char);
        let ppid: u32 = fields.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
        let utime: u64 = fields.get(11).and_then(|s| s.parse().ok()).unwrap_or(0);
        let stime: u64 = fields.get(12).and_then(|s| s.parse().ok()).unwrap_or(0);
        let threads: u32 = fields.get(17).and_then(|s| s.parse().ok()).unwrap_or(1);
        let cpu_time = utime + stime;

        let cpu_percent = match self.prev_cpu_times.get(&pid) {
            Some(&prev) => {
                let total_delta = total_cpu.saturating_sub(self.prev_total_cpu);
                if total_delta > 0 {
                    cpu_time.saturating_sub(prev) as f64 / total_delta as f64 * 100.0
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        let mem_bytes = fs::read_to_string(dir.join("statm"))
            .ok()
            .and_then(|s| s.split_whitespace().nth(1).and_then(|s| s.parse::<u64>().ok()))
            .map_or(0, |pages| pages * PAGE_SIZE);
        let mem_percent = if self.total_memory > 0 { mem_bytes as f64 / self.total_memory as f64 * 100.0 } else { 0.0 };

        let cmdline = fs::read_to_string(dir.join("cmdline"))
            .map(|s| s.replace('\0', " ").trim().to_string())
            .unwrap_or_default();

        let info = ProcessInfo { pid, ppid, name, cmdline, state, cpu_percent, mem_bytes, mem_percent, threads };
        Some((info, cpu_time))
    }
}

impl Default for ProcessFeeder {
    fn default() -> Self {
        Self::new()
    }
}

impl Feeder<ProcessInfo> for ProcessFeeder {
    fn name(&self) -> &str {
        "process"
    }

    fn feed(&mut self, sink: &mut dyn FeedSink<ProcessInfo>) {
        for pid in self.scan() {
            sink.feed_delete_item(PROCESS_TAG, FeedKey::from(pid));
        }
        for (pid, info) in &self.processes {
            sink.feed_update_item(PROCESS_TAG, FeedKey::from(*pid), info);
        }
    }
}

fn read_total_memory(root: &Path) -> u64 {
    fs::read_to_string(root.join("meminfo"))
        .ok()
        .and_then(|content| {
            content
                .lines()
                .find(|l| l.starts_with("MemTotal:"))
                .and_then(|l| l.split_whitespace().nth(1))
                .and_then(|s| s.parse::<u64>().ok())
                .map(|kb| kb * 1024)
        })
        .unwrap_or(0)
}

fn read_total_cpu_time(root: &Path) -> u64 {
    fs::read_to_string(root.join("stat"))
        .ok()
        .and_then(|content| {
            content
                .lines()
                .find(|l| l.starts_with("cpu "))
                .map(|l| l.split_whitespace().skip(1).filter_map(|s| s.parse::<u64>().ok()).sum())
        })
        .unwrap_or(0)
}

// ============================================================================
// Hooks
// ============================================================================

/// Columns of the process table, filled from [`ProcessInfo`] snapshots.
#[derive(Debug, Clone)]
pub struct ProcessHooks {
    pid: ColumnKey,
    name: ColumnKey,
    state: ColumnKey,
    cpu: ColumnKey,
    mem: ColumnKey,
    threads: ColumnKey,
    command: ColumnKey,
}

impl ProcessHooks {
    /// Adds the process columns to `model`.
    ///
    /// Column names usable from configuration: `pid`, `name`, `state`,
    /// `cpu`, `mem`, `threads`, `command`.
    pub fn install(model: &mut GridModel) -> Self {
        Self {
            pid: model.add_column(ColumnSpec::new("PID", ValueKind::UInt).name("pid").min_size(7)),
            name: model.add_column(ColumnSpec::new("Name", ValueKind::String).name("name").min_size(16)),
            state: model.add_column(ColumnSpec::new("S", ValueKind::String).name("state").min_size(3)),
            cpu: model.add_column(ColumnSpec::new("CPU%", ValueKind::Double).name("cpu").min_size(7)),
            mem: model.add_column(ColumnSpec::new("Mem(KB)", ValueKind::UInt).name("mem").min_size(10)),
            threads: model.add_column(ColumnSpec::new("Thr", ValueKind::UInt).name("threads").min_size(5)),
            command: model.add_column(ColumnSpec::new("Command", ValueKind::String).name("command").percent_size(100)),
        }
    }

    /// Column holding the CPU usage.
    #[must_use]
    pub fn cpu_column(&self) -> ColumnKey {
        self.cpu
    }
}

impl MonitorHooks for ProcessHooks {
    type Item = ProcessInfo;

    fn on_row_update(&mut self, model: &mut GridModel, row: RowKey, info: &ProcessInfo) {
        model.set_value(row, self.pid, &Value::from(info.pid));
        model.set_value(row, self.name, &Value::from(info.name.as_str()));
        model.set_value(row, self.state, &Value::from(info.state.as_char().to_string()));
        model.set_value(row, self.cpu, &Value::from((info.cpu_percent * 10.0).round() / 10.0));
        model.set_value(row, self.mem, &Value::from(info.mem_bytes / 1024));
        model.set_value(row, self.threads, &Value::from(info.threads));
        let command = if info.cmdline.is_empty() { format!("[{}]", info.name) } else { info.cmdline.clone() };
        model.set_value(row, self.command, &Value::from(command));
    }
}
