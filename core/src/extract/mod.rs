use serde::{Deserialize, Serialize};

mod fence;
mod shapes;

pub use fence::{fenced_blocks, strip_fenced_blocks, FencedBlock};
pub use shapes::{extract_pattern_knowledge, fallback_records};

/// Placeholder shown in the output pane when the model returned no code.
pub const MISSING_CODE_PLACEHOLDER: &str = "// Conversion failed or incomplete";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSplit {
    pub converted_code: String,
    pub explanation: String,
}

/// Splits a model reply into the first fenced block and the surrounding prose.
///
/// The first block's body (trimmed) becomes the converted code; the
/// explanation is the reply with every fenced block removed, trimmed. A reply
/// without fences is returned verbatim as the explanation.
#[must_use]
pub fn split_code_and_explanation(raw: &str) -> CodeSplit {
    match fenced_blocks(raw).first() {
        Some(first) => CodeSplit {
            converted_code: first.body.trim().to_string(),
            explanation: strip_fenced_blocks(raw).trim().to_string(),
        },
        None => CodeSplit {
            converted_code: String::new(),
            explanation: raw.to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub converted_code: String,
    pub explanation: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    /// Builds the result for one model reply. A reply without code counts as
    /// a failed conversion and carries the placeholder instead.
    #[must_use]
    pub fn from_response(raw: &str) -> Self {
        let CodeSplit { converted_code, explanation } = split_code_and_explanation(raw);
        if converted_code.is_empty() {
            let reason = if fenced_blocks(raw).is_empty() {
                "response contained no fenced code block"
            } else {
                "fenced code block was empty"
            };
            return Self {
                converted_code: MISSING_CODE_PLACEHOLDER.to_string(),
                explanation,
                success: false,
                error: Some(reason.to_string()),
            };
        }
        Self {
            converted_code,
            explanation,
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            converted_code: String::new(),
            explanation: String::new(),
            success: false,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_block_is_code_and_rest_is_prose() {
        let raw = "prefix text\n```cpp\nint x = 1;\n```\nsuffix text";
        let split = split_code_and_explanation(raw);
        assert_eq!(split.converted_code, "int x = 1;");
        assert!(split.explanation.contains("prefix text"));
        assert!(split.explanation.contains("suffix text"));
        assert!(!split.explanation.contains('`'));
    }

    #[test]
    fn later_blocks_are_dropped_from_explanation() {
        let raw = "```cpp\nfirst();\n```\nWhy:\n```cpp\nsecond();\n```\ndone";
        let split = split_code_and_explanation(raw);
        assert_eq!(split.converted_code, "first();");
        assert!(!split.explanation.contains("second"));
        assert!(split.explanation.starts_with("Why:"));
        assert!(split.explanation.ends_with("done"));
    }

    #[test]
    fn prose_without_fences_is_kept_verbatim() {
        let split = split_code_and_explanation("just prose, no code");
        assert_eq!(split.converted_code, "");
        assert_eq!(split.explanation, "just prose, no code");
    }

    #[test]
    fn empty_reply_does_not_fail() {
        let split = split_code_and_explanation("");
        assert_eq!(split.converted_code, "");
        assert_eq!(split.explanation, "");
    }

    #[test]
    fn conversion_result_marks_missing_code() {
        let result = ConversionResult::from_response("I could not convert this.");
        assert!(!result.success);
        assert_eq!(result.converted_code, MISSING_CODE_PLACEHOLDER);
        assert_eq!(result.explanation, "I could not convert this.");
        assert_eq!(result.error.as_deref(), Some("response contained no fenced code block"));

        let ok = ConversionResult::from_response("```cpp\nstd::reduce(b, e);\n```\nUses reduce.");
        assert!(ok.success);
        assert_eq!(ok.error, None);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["convertedCode"], "std::reduce(b, e);");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn empty_fence_is_reported_as_empty() {
        let result = ConversionResult::from_response("```\n\n```\ntext");
        assert!(!result.success);
        assert_eq!(result.converted_code, MISSING_CODE_PLACEHOLDER);
        assert_eq!(result.explanation, "text");
        assert_eq!(result.error.as_deref(), Some("fenced code block was empty"));
    }
}
