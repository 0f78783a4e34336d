pub mod align;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod history;
pub mod knowledge;
pub mod logger;
pub mod pattern;
pub mod perf;
pub mod prompts;

pub use align::{align, Alignment, DiffKind, DiffLine};
pub use error::{CodefluxError, ErrorCode, Result};
pub use extract::{extract_pattern_knowledge, split_code_and_explanation, CodeSplit, ConversionResult};
pub use knowledge::PatternKnowledgeRecord;
pub use logger::Logger;
pub use pattern::PatternType;
