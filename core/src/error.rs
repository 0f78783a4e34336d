use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodefluxError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // --- Knowledge extraction ---
    JsonMalformed,
    ShapeUnrecognized,

    // --- Settings ---
    InvalidSetting,
    BoundsExceeded,

    // --- History ---
    HistoryReadFailed,
    HistoryWriteFailed,
    HistoryCorrupt,

    // --- File I/O ---
    FileReadFailed,
    FileWriteFailed,
}

#[derive(Debug, Error)]
pub enum CodefluxError {
    #[error("Parse Error: {message}")]
    Parse { code: ErrorCode, message: String, context: String },

    #[error("Validation Error: {message} (context: {context})")]
    Validation { code: ErrorCode, message: String, context: String },

    #[error("History Error: {message} (path: {path:?})")]
    History { code: ErrorCode, message: String, path: PathBuf },

    #[error("File Error: {message} (path: {path:?})")]
    File { code: ErrorCode, message: String, path: PathBuf },
}

impl CodefluxError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { code, .. }
            | Self::Validation { code, .. }
            | Self::History { code, .. }
            | Self::File { code, .. } => *code,
        }
    }

    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// The offending input for parse errors, the context string otherwise.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Parse { context, .. } | Self::Validation { context, .. } => Some(context),
            Self::History { .. } | Self::File { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_keeps_raw_content() {
        let err = CodefluxError::Parse {
            code: ErrorCode::JsonMalformed,
            message: "expected value at line 1 column 1".to_string(),
            context: "not json".to_string(),
        };
        assert!(err.is_parse());
        assert_eq!(err.code(), ErrorCode::JsonMalformed);
        assert_eq!(err.context(), Some("not json"));
        assert!(err.to_string().starts_with("Parse Error:"));
    }

    #[test]
    fn history_error_display_includes_path() {
        let err = CodefluxError::History {
            code: ErrorCode::HistoryCorrupt,
            message: "bad json".to_string(),
            path: PathBuf::from("h.json"),
        };
        assert!(!err.is_parse());
        assert!(err.to_string().contains("h.json"));
        assert_eq!(err.context(), None);
    }
}
