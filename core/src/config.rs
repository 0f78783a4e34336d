use crate::error::{CodefluxError, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_HISTORY_FILE: &str = ".codeflux_history.json";
pub const DEFAULT_MAX_HISTORY: usize = 20;
const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CppVersion {
    #[serde(rename = "17")]
    Cpp17,
    #[default]
    #[serde(rename = "20")]
    Cpp20,
    #[serde(rename = "23")]
    Cpp23,
}

impl CppVersion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpp17 => "17",
            Self::Cpp20 => "20",
            Self::Cpp23 => "23",
        }
    }
}

impl fmt::Display for CppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C++{}", self.as_str())
    }
}

impl FromStr for CppVersion {
    type Err = CodefluxError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches("C++").trim_start_matches("c++");
        match digits {
            "17" => Ok(Self::Cpp17),
            "20" => Ok(Self::Cpp20),
            "23" => Ok(Self::Cpp23),
            _ => Err(invalid("target_cpp", s, "expected 17, 20 or 23")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    #[default]
    High,
}

impl ReasoningEffort {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = CodefluxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(invalid("reasoning_effort", s, "expected low, medium or high")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub target_cpp: CppVersion,
    pub include_explanations: bool,
    pub reasoning_effort: ReasoningEffort,
    pub max_history: usize,
    pub history_path: PathBuf,
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self {
            target_cpp: CppVersion::default(),
            include_explanations: true,
            reasoning_effort: ReasoningEffort::default(),
            max_history: DEFAULT_MAX_HISTORY,
            history_path: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_history < 1 || self.max_history > MAX_HISTORY_LIMIT {
            return Err(invalid(
                "max_history",
                &self.max_history.to_string(),
                &format!("must be between 1 and {MAX_HISTORY_LIMIT}"),
            ));
        }
        if self.history_path.as_os_str().is_empty() {
            return Err(invalid("history_path", "", "must not be empty"));
        }
        Ok(())
    }

    /// Reads settings from a JSON file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CodefluxError::File {
            code: ErrorCode::FileReadFailed,
            message: format!("Could not read settings file: {e}"),
            path: path.to_path_buf(),
        })?;
        let settings: Self = serde_json::from_str(&content).map_err(|e| CodefluxError::Validation {
            code: ErrorCode::InvalidSetting,
            message: format!("Could not parse settings file: {e}"),
            context: path.display().to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| CodefluxError::Validation {
            code: ErrorCode::InvalidSetting,
            message: format!("Could not serialize settings: {e}"),
            context: path.display().to_string(),
        })?;
        fs::write(path, content).map_err(|e| CodefluxError::File {
            code: ErrorCode::FileWriteFailed,
            message: format!("Could not write settings file: {e}"),
            path: path.to_path_buf(),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> CodefluxError {
    CodefluxError::Validation {
        code: ErrorCode::InvalidSetting,
        message: format!("{field} = {value:?}: {reason}"),
        context: "settings".to_string(),
    }
}
