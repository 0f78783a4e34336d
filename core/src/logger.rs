use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Shared capture buffer for tests; one JSONL record per line.
pub type LogBuffer = Arc<Mutex<String>>;

#[derive(Clone, Debug)]
pub struct Logger {
    rid: u64,
    output: Option<LogBuffer>,
}

impl Logger {
    /// Creates a new `Logger` that writes to stdout/stderr.
    ///
    /// # Panics
    ///
    /// Panics if `rid` is zero.
    #[must_use]
    pub fn new(rid: u64) -> Self {
        assert!(rid > 0, "Logger rid must be non-zero");
        Self { rid, output: None }
    }

    /// Creates a logger that appends records to `buffer` instead of printing.
    #[must_use]
    pub fn with_buffer(rid: u64, buffer: LogBuffer) -> Self {
        assert!(rid > 0, "Logger rid must be non-zero");
        Self { rid, output: Some(buffer) }
    }

    #[must_use]
    pub fn new_for_test(rid: u64, buffer: LogBuffer) -> Self {
        Self::with_buffer(rid, buffer)
    }

    #[must_use]
    pub fn rid(&self) -> u64 {
        self.rid
    }

    pub fn info(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("info", subsystem, action, message);
    }

    pub fn warn(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("warn", subsystem, action, message);
    }

    pub fn error(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("error", subsystem, action, message);
    }

    fn emit(&self, level: &str, subsystem: &str, action: &str, message: &str) {
        let log_entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "level": level,
            "rid": self.rid,
            "subsystem": subsystem,
            "action": action,
            "msg": message,
        });

        if let Some(buffer) = &self.output {
            if let Ok(mut writer) = buffer.lock() {
                writer.push_str(&log_entry.to_string());
                writer.push('\n');
            }
            return;
        }

        if level == "error" {
            eprintln!("{log_entry}");
        } else {
            println!("{log_entry}");
        }
    }
}
