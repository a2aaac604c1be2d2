#![warn(missing_docs)]
//! Event traces and snapshot helpers for headless runs and tests.

mod snapshot;

use anyhow::{Context, Result};
use folio3d_core::FrameIndex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub use snapshot::*;

/// One entry of an interaction trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Frame the event happened on.
    pub frame: FrameIndex,
    /// Short kind label, e.g. `"click"` or `"stage_completed"`.
    pub kind: String,
    /// Structured detail.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl EventRecord {
    /// Record with a payload.
    pub fn new(frame: FrameIndex, kind: impl Into<String>, payload: Value) -> Self {
        Self {
            frame,
            kind: kind.into(),
            payload,
        }
    }

    /// Record with no payload.
    pub fn bare(frame: FrameIndex, kind: impl Into<String>) -> Self {
        Self::new(frame, kind, Value::Null)
    }
}

/// Destination for trace events.
pub trait EventSink {
    /// Record one event.
    fn record(&mut self, event: &EventRecord) -> Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// First line of every JSONL trace.
#[derive(Debug, Serialize)]
struct TraceHeader<'a> {
    kind: &'static str,
    label: &'a str,
    started_at: String,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories, and write a
    /// header line naming the run.
    pub fn create<P: AsRef<Path>>(path: P, label: &str) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create trace directory {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create trace {}", path.display()))?;
        let mut sink = Self {
            writer: BufWriter::new(file),
        };
        let header = TraceHeader {
            kind: "trace_header",
            label,
            started_at: chrono::Utc::now().to_rfc3339(),
        };
        sink.write_line(&header)?;
        debug!(path = %path.display(), label, "trace opened");
        Ok(sink)
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl EventSink for JsonlSink {
    fn record(&mut self, event: &EventRecord) -> Result<()> {
        self.write_line(event)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Recorded events in order.
    pub events: Vec<EventRecord>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events with the given kind.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: &EventRecord) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Read a JSONL trace back, skipping the header line.
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<EventRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace {}", path.display()))?;
    contents
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).context("Malformed trace line"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn jsonl_sink_round_trips_through_read_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/trace.jsonl");
        let mut sink = JsonlSink::create(&path, "menu").unwrap();
        sink.record(&EventRecord::new(FrameIndex(3), "click", json!({"x": 1.0, "y": 2.0})))
            .unwrap();
        sink.record(&EventRecord::bare(FrameIndex(4), "chain_completed")).unwrap();
        sink.flush().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.lines().next().unwrap().contains("trace_header"));
        assert!(!raw.contains("null"));

        let events = read_trace(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "click");
        assert_eq!(events[0].payload["y"], 2.0);
        assert_eq!(events[1].payload, Value::Null);
    }

    #[test]
    fn memory_sink_filters_by_kind() {
        let mut sink = MemorySink::new();
        sink.record(&EventRecord::bare(FrameIndex(0), "hover")).unwrap();
        sink.record(&EventRecord::bare(FrameIndex(1), "click")).unwrap();
        sink.record(&EventRecord::bare(FrameIndex(2), "hover")).unwrap();
        assert_eq!(sink.of_kind("hover").count(), 2);
    }
}
