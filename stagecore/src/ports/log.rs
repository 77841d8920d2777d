//! Stage log persister trait and implementations.

use crate::core::LogSeverity;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Append-only sink for the log lines a stage shows to users.
///
/// Lines are kept in call order. Implementations must accept concurrent
/// callers, since the executor and interruption handling may both log.
pub trait LogPersister: Send + Sync {
    /// Appends a line with the given severity.
    fn append(&self, log: &str, severity: LogSeverity);

    /// Appends an informational line.
    fn append_info(&self, log: &str) {
        self.append(log, LogSeverity::Info);
    }

    /// Appends a success line.
    fn append_success(&self, log: &str) {
        self.append(log, LogSeverity::Success);
    }

    /// Appends an error line.
    fn append_error(&self, log: &str) {
        self.append(log, LogSeverity::Error);
    }
}

/// A log persister that discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogPersister;

impl LogPersister for NoOpLogPersister {
    fn append(&self, _log: &str, _severity: LogSeverity) {}
}

/// A log persister that forwards stage lines to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingLogPersister {
    stage_id: String,
}

impl TracingLogPersister {
    /// Creates a persister tagging every line with the stage ID.
    #[must_use]
    pub fn new(stage_id: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
        }
    }
}

impl LogPersister for TracingLogPersister {
    fn append(&self, log: &str, severity: LogSeverity) {
        match severity {
            LogSeverity::Error => error!(stage_id = %self.stage_id, %severity, "{}", log),
            LogSeverity::Info | LogSeverity::Success => {
                info!(stage_id = %self.stage_id, %severity, "{}", log);
            }
        }
    }
}

/// One persisted stage log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBlock {
    /// Position of the line in the stage log.
    pub index: u64,
    /// The line itself.
    pub log: String,
    /// Severity of the line.
    pub severity: LogSeverity,
    /// When the line was appended.
    pub created_at: DateTime<Utc>,
}

/// A log persister that keeps every line in memory.
#[derive(Debug, Default)]
pub struct InMemoryLogPersister {
    blocks: Mutex<Vec<LogBlock>>,
}

impl InMemoryLogPersister {
    /// Creates an empty persister.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all lines appended so far.
    #[must_use]
    pub fn blocks(&self) -> Vec<LogBlock> {
        self.blocks.lock().clone()
    }

    /// Returns the text of all lines appended so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.blocks.lock().iter().map(|b| b.log.clone()).collect()
    }

    /// Returns the text of lines with the given severity.
    #[must_use]
    pub fn lines_with(&self, severity: LogSeverity) -> Vec<String> {
        self.blocks
            .lock()
            .iter()
            .filter(|b| b.severity == severity)
            .map(|b| b.log.clone())
            .collect()
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.lock().len()
    }

    /// Returns true if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.lock().is_empty()
    }
}

impl LogPersister for InMemoryLogPersister {
    fn append(&self, log: &str, severity: LogSeverity) {
        let mut blocks = self.blocks.lock();
        let index = blocks.len() as u64;
        blocks.push(LogBlock {
            index,
            log: log.to_string(),
            severity,
            created_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_noop_persister() {
        let persister = NoOpLogPersister;
        persister.append_info("ignored");
        persister.append_error("ignored");
    }

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl CapturedOutput {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl std::io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_persister_forwards_lines() {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let persister = TracingLogPersister::new("stage-1");
        tracing::subscriber::with_default(subscriber, || {
            persister.append_success("done");
            persister.append_error("failed");
        });

        let lines: Vec<_> = output.contents().lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("done"));
        assert!(lines[0].contains("stage_id=stage-1"));
        assert!(lines[0].contains("severity=success"));
        assert!(lines[1].contains("ERROR"));
        assert!(lines[1].contains("failed"));
    }

    #[test]
    fn test_in_memory_persister_order_and_severity() {
        let persister = InMemoryLogPersister::new();
        assert!(persister.is_empty());

        persister.append_info("starting");
        persister.append_error("something broke");
        persister.append_success("recovered");

        assert_eq!(persister.lines(), vec!["starting", "something broke", "recovered"]);
        assert_eq!(persister.lines_with(LogSeverity::Error), vec!["something broke"]);

        let blocks = persister.blocks();
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[2].index, 2);
        assert_eq!(blocks[2].severity, LogSeverity::Success);
    }

    #[test]
    fn test_in_memory_persister_concurrent_callers() {
        let persister = Arc::new(InMemoryLogPersister::new());

        let threads: Vec<_> = (0..4)
            .map(|t| {
                let persister = persister.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        persister.append_info(&format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let blocks = persister.blocks();
        assert_eq!(blocks.len(), 100);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.index, i as u64);
        }
        // Each writer's own lines stay in call order.
        let first_writer: Vec<_> = persister
            .lines()
            .into_iter()
            .filter(|l| l.starts_with("0-"))
            .collect();
        let expected: Vec<_> = (0..25).map(|i| format!("0-{i}")).collect();
        assert_eq!(first_writer, expected);
    }
}
