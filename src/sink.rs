//! Durable destinations for flushed log text.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Destination for formatted log text.
pub trait LogSink {
    /// Appends `text` durably.
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    /// Short description for debug output.
    fn describe(&self) -> String;
}

/// Appends to a file, optionally truncating it when first opened.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    truncate: bool,
    file: Option<File>,
}

impl FileSink {
    /// Sink appending to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), truncate: false, file: None }
    }

    /// Truncates the file on first write when `truncate` is set.
    #[must_use]
    pub fn truncate_on_open(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            let mut options = OpenOptions::new();
            options.create(true);
            if self.truncate {
                options.write(true).truncate(true);
            } else {
                options.append(true);
            }
            let file = options.open(&self.path)?;
            self.file = Some(file);
        }
        self.file.as_mut().ok_or_else(|| io::Error::other("log file unavailable"))
    }
}

impl LogSink for FileSink {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        let result = self.file().and_then(|file| {
            file.write_all(text.as_bytes())?;
            file.flush()
        });
        if result.is_err() {
            // reopen on the next attempt
            self.file = None;
        }
        result
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// In-memory sink whose contents stay readable through a shared handle.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Rc<RefCell<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }
}

impl LogSink for MemorySink {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.buffer.borrow_mut().push_str(text);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.log");
        std::fs::write(&path, "old\n").unwrap();

        let mut sink = FileSink::new(&path);
        sink.write_text("a\n").unwrap();
        sink.write_text("b\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\na\nb\n");
        assert!(sink.describe().ends_with("grid.log"));
    }

    #[test]
    fn test_file_sink_truncates_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.log");
        std::fs::write(&path, "old\n").unwrap();

        let mut sink = FileSink::new(&path).truncate_on_open(true);
        sink.write_text("a\n").unwrap();
        sink.write_text("b\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_file_sink_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("missing").join("grid.log"));
        assert!(sink.write_text("x").is_err());
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write_text("hello").unwrap();
        assert_eq!(sink.contents(), "hello");
    }
}
