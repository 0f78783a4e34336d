use crate::config::CppVersion;
use crate::error::{CodefluxError, ErrorCode, Result};
use crate::knowledge::PatternKnowledgeRecord;
use crate::logger::Logger;
use crate::pattern::PatternType;
use crate::perf::PerformanceData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_HISTORY_FILE_SIZE: u64 = 5_000_000; // 5 MB limit

/// One finished conversion, newest first in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub input_code: String,
    pub output_code: String,
    pub patterns: Vec<PatternType>,
    pub target_cpp: CppVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_data: Option<Vec<PerformanceData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_knowledge: Option<Vec<PatternKnowledgeRecord>>,
    /// md5 of the input snippet.
    pub input_hash: String,
    /// Share of output lines that differ from the input, 0.0..=1.0.
    #[serde(default)]
    pub changed_ratio: f32,
}

impl HistoryItem {
    #[must_use]
    pub fn new(input_code: &str, output_code: &str, patterns: Vec<PatternType>, target_cpp: CppVersion) -> Self {
        let timestamp = Utc::now();
        Self {
            id: timestamp.timestamp_millis().to_string(),
            timestamp,
            input_code: input_code.to_string(),
            output_code: output_code.to_string(),
            patterns,
            target_cpp,
            explanation: None,
            performance_data: None,
            pattern_knowledge: None,
            input_hash: format!("{:x}", md5::compute(input_code)),
            changed_ratio: changed_ratio(input_code, output_code),
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        self.explanation = (!explanation.is_empty()).then_some(explanation);
        self
    }

    #[must_use]
    pub fn with_performance(mut self, rows: Vec<PerformanceData>) -> Self {
        self.performance_data = Some(rows);
        self
    }

    #[must_use]
    pub fn with_knowledge(mut self, records: Vec<PatternKnowledgeRecord>) -> Self {
        self.pattern_knowledge = Some(records);
        self
    }
}

fn changed_ratio(before: &str, after: &str) -> f32 {
    if before.is_empty() {
        return if after.is_empty() { 0.0 } else { 1.0 };
    }
    let diff = TextDiff::from_lines(before, after);
    let changed = diff
        .iter_all_changes()
        .filter(|c| c.tag() == ChangeTag::Insert)
        .count();
    let total = after.lines().count().max(1);
    (changed as f32 / total as f32).min(1.0)
}

pub struct HistoryStore<'a> {
    items: Vec<HistoryItem>,
    path: PathBuf,
    max_items: usize,
    logger: &'a Logger,
}

impl<'a> HistoryStore<'a> {
    /// Loads the history file at `path`, or starts empty if there is none.
    pub fn load(path: &Path, max_items: usize, logger: &'a Logger) -> Result<Self> {
        if max_items == 0 {
            return Err(CodefluxError::Validation {
                code: ErrorCode::BoundsExceeded,
                message: "history max_items must be at least 1".to_string(),
                context: path.display().to_string(),
            });
        }

        let items = if path.exists() {
            let metadata = fs::metadata(path).map_err(|e| CodefluxError::History {
                code: ErrorCode::HistoryReadFailed,
                message: format!("Could not read history file metadata: {e}"),
                path: path.to_path_buf(),
            })?;
            if metadata.len() > MAX_HISTORY_FILE_SIZE {
                return Err(CodefluxError::History {
                    code: ErrorCode::BoundsExceeded,
                    message: "History file size exceeds limit".to_string(),
                    path: path.to_path_buf(),
                });
            }

            let content = fs::read_to_string(path).map_err(|e| CodefluxError::History {
                code: ErrorCode::HistoryReadFailed,
                message: format!("Could not read history file: {e}"),
                path: path.to_path_buf(),
            })?;

            serde_json::from_str::<Vec<HistoryItem>>(&content).map_err(|e| CodefluxError::History {
                code: ErrorCode::HistoryCorrupt,
                message: format!("Could not parse history file: {e}"),
                path: path.to_path_buf(),
            })?
        } else {
            Vec::new()
        };

        logger.info("history", "load", &format!("{} item(s) from {}", items.len(), path.display()));

        let mut store = Self {
            items,
            path: path.to_path_buf(),
            max_items,
            logger,
        };
        store.truncate();
        Ok(store)
    }

    #[must_use]
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Inserts `item` at the front and drops the oldest entries past the limit.
    /// Returns the id under which the item was stored.
    pub fn add(&mut self, mut item: HistoryItem) -> String {
        // Two conversions in the same millisecond would otherwise share an id.
        let base = item.id.clone();
        let mut suffix = 1;
        while self.get(&item.id).is_some() {
            item.id = format!("{base}-{suffix}");
            suffix += 1;
        }

        let id = item.id.clone();
        self.items.insert(0, item);
        self.truncate();
        id
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.items).map_err(|e| CodefluxError::History {
            code: ErrorCode::HistoryWriteFailed,
            message: format!("Could not serialize history: {e}"),
            path: self.path.clone(),
        })?;

        fs::write(&self.path, content).map_err(|e| CodefluxError::History {
            code: ErrorCode::HistoryWriteFailed,
            message: format!("Could not write history file: {e}"),
            path: self.path.clone(),
        })?;

        self.logger.info("history", "save", &format!("{} item(s)", self.items.len()));
        Ok(())
    }

    fn truncate(&mut self) {
        if self.items.len() > self.max_items {
            let evicted = self.items.len() - self.max_items;
            self.items.truncate(self.max_items);
            self.logger.info("history", "evict", &format!("dropped {evicted} oldest item(s)"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogBuffer;
    use tempfile::TempDir;

    fn item(n: usize) -> HistoryItem {
        HistoryItem::new(&format!("input {n}"), &format!("output {n}"), vec![PatternType::Map], CppVersion::Cpp20)
    }

    #[test]
    fn newest_first_and_bounded() {
        let tmp = TempDir::new().unwrap();
        let buffer = LogBuffer::default();
        let logger = Logger::new_for_test(1, buffer.clone());
        let mut store = HistoryStore::load(&tmp.path().join("h.json"), 3, &logger).unwrap();

        for n in 0..5 {
            store.add(item(n));
        }
        let inputs: Vec<&str> = store.items().iter().map(|i| i.input_code.as_str()).collect();
        assert_eq!(inputs, vec!["input 4", "input 3", "input 2"]);
        assert!(buffer.lock().unwrap().contains("\"evict\""));
    }

    #[test]
    fn ids_stay_unique() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::new_for_test(1, LogBuffer::default());
        let mut store = HistoryStore::load(&tmp.path().join("h.json"), 20, &logger).unwrap();

        let first = item(1);
        let mut second = item(2);
        second.id = first.id.clone();
        let a = store.add(first);
        let b = store.add(second);
        assert_ne!(a, b);
        assert_eq!(store.get(&b).unwrap().input_code, "input 2");
    }

    #[test]
    fn save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("h.json");
        let logger = Logger::new_for_test(1, LogBuffer::default());

        let mut store = HistoryStore::load(&path, 20, &logger).unwrap();
        let id = store.add(
            item(1)
                .with_explanation("uses std::transform")
                .with_knowledge(vec![PatternKnowledgeRecord {
                    pattern: "map".to_string(),
                    ..Default::default()
                }]),
        );
        store.save().unwrap();

        let reloaded = HistoryStore::load(&path, 20, &logger).unwrap();
        let got = reloaded.get(&id).unwrap();
        assert_eq!(got.explanation.as_deref(), Some("uses std::transform"));
        assert_eq!(got.pattern_knowledge.as_ref().unwrap()[0].pattern, "map");
        assert_eq!(got, &store.items()[0]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("h.json");
        fs::write(&path, "{ not a list").unwrap();
        let logger = Logger::new_for_test(1, LogBuffer::default());
        let err = HistoryStore::load(&path, 20, &logger).err().unwrap();
        assert_eq!(err.code(), ErrorCode::HistoryCorrupt);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::new_for_test(1, LogBuffer::default());
        let err = HistoryStore::load(&tmp.path().join("h.json"), 0, &logger).err().unwrap();
        assert_eq!(err.code(), ErrorCode::BoundsExceeded);
        assert!(err.to_string().contains("max_items"));
    }

    #[test]
    fn item_metadata() {
        let same = HistoryItem::new("a\nb\n", "a\nb\n", vec![], CppVersion::Cpp17);
        assert_eq!(same.changed_ratio, 0.0);
        assert_eq!(same.input_hash, format!("{:x}", md5::compute("a\nb\n")));

        let half = HistoryItem::new("a\nb\n", "a\nc\n", vec![], CppVersion::Cpp17);
        assert!((half.changed_ratio - 0.5).abs() < f32::EPSILON);

        assert_eq!(item(0).with_explanation("").explanation, None);
    }
}
