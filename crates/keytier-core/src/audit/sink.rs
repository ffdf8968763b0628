//! Audit sink backends

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use super::types::{AuditRecord, Severity};
use crate::error::{KeytierError, Result};

/// Trait for audit record destinations
pub trait AuditSink: Send + Sync {
    /// Persist one record; must be durable once this returns `Ok`
    fn record(&self, record: &AuditRecord) -> Result<()>;

    /// Get a human-readable name for this sink
    fn sink_name(&self) -> &'static str;
}

/// Emits records as `tracing` events on the `keytier::audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        match record.severity {
            Severity::Info => info!(
                target: "keytier::audit",
                id = %record.id,
                source = %record.source_label,
                database = ?record.database,
                "{}: {}", record.name, record.message
            ),
            Severity::Warning => warn!(
                target: "keytier::audit",
                id = %record.id,
                source = %record.source_label,
                database = ?record.database,
                "{}: {}", record.name, record.message
            ),
            Severity::Error => error!(
                target: "keytier::audit",
                id = %record.id,
                source = %record.source_label,
                database = ?record.database,
                "{}: {}", record.name, record.message
            ),
        }
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "tracing"
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| KeytierError::AuditError("audit buffer poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "memory"
    }
}

/// Appends one JSON document per line to a file
///
/// Each record is flushed and synced before `record` returns, so it
/// survives whatever happens to the caller's own work afterwards.
#[derive(Debug)]
pub struct JsonlAuditSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records back from the log file
    pub fn read_all(&self) -> Result<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(KeytierError::from))
            .collect()
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| KeytierError::AuditError("audit log lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        file.sync_data()?;

        debug!("Appended audit record {} to {:?}", record.id, self.path);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "jsonl"
    }
}

/// Forwards every record to several sinks
#[derive(Default)]
pub struct MultiAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl MultiAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Names of the wrapped sinks in order
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.sink_name()).collect()
    }
}

impl AuditSink for MultiAuditSink {
    /// Every sink is attempted; the first failure is reported
    fn record(&self, record: &AuditRecord) -> Result<()> {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = sink.record(record) {
                warn!("Audit sink '{}' failed: {}", sink.sink_name(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn sink_name(&self) -> &'static str {
        "multi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditContext;
    use tempfile::TempDir;

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn record(&self, _record: &AuditRecord) -> Result<()> {
            Err(KeytierError::AuditError("sink offline".to_string()))
        }

        fn sink_name(&self) -> &'static str {
            "failing"
        }
    }

    fn sample(label: &str) -> AuditRecord {
        AuditRecord::retrieved(label, &AuditContext::new("Google API Key"))
    }

    #[test]
    fn test_jsonl_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlAuditSink::new(temp_dir.path().join("logs").join("audit.jsonl"));

        sink.record(&sample("env")).unwrap();
        sink.record(&sample("config")).unwrap();

        let records = sink.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_label, "env");
        assert_eq!(records[1].source_label, "config");

        let raw = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn test_jsonl_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlAuditSink::new(temp_dir.path().join("audit.jsonl"));
        assert!(sink.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_multi_sink_attempts_all() {
        let memory = Arc::new(MemoryAuditSink::new());
        let multi = MultiAuditSink::new()
            .with(Arc::new(FailingSink))
            .with(memory.clone());

        assert!(multi.record(&sample("env")).is_err());
        assert_eq!(memory.len(), 1);
        assert_eq!(multi.sink_names(), vec!["failing", "memory"]);
    }

    #[test]
    fn test_tracing_sink_accepts_all_severities() {
        let sink = TracingAuditSink;
        let mut record = sample("env");
        for severity in [Severity::Info, Severity::Warning, Severity::Error] {
            record.severity = severity;
            assert!(sink.record(&record).is_ok());
        }
    }
}
