use crate::config::{ReasoningEffort, Settings};
use crate::pattern::PatternType;
use once_cell::sync::Lazy;
use regex::Regex;

static EXTRA_BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());
static BLOCK_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*$").unwrap());

/// Above this many bytes, comments are elided before sending.
const LARGE_INPUT_BYTES: usize = 2000;
const MIN_COMPLETION_TOKENS: usize = 1500;
const MAX_COMPLETION_TOKENS: usize = 4000;
const KNOWLEDGE_MAX_TOKENS: usize = 8000;

/// Everything needed for one chat-completion call, minus transport and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub max_tokens: usize,
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Ask the endpoint for a JSON object reply.
    pub json_response: bool,
}

pub const SYSTEM_PROMPT: &str = r#"You are an expert C++ developer specializing in parallel programming.
Your task is to convert MPI and OpenMP code to modern C++ using standard parallelism features.

Follow these guidelines:
1. Identify parallel patterns in the input code (map, reduce, scan, stencil, etc.)
2. Convert MPI/OpenMP constructs to equivalent C++ standard parallel algorithms
3. Use appropriate execution policies (std::execution::seq, std::execution::par, std::execution::par_unseq)
4. Provide explanations for each transformation
5. Ensure the converted code maintains the same semantics and correctness
6. Produce concise code that uses modern C++ idioms
7. Avoid helper structures or functions unless they are required
8. Prefer lambda expressions directly in algorithm calls
9. Use counting_iterator when iterating over index ranges

For C++17, use the <execution> header and parallel algorithms such as for_each, transform and reduce.
For C++20, also consider ranges, std::jthread and counting_iterator.
For C++23, additionally use the extended execution policies.

Example input:
```cpp
#pragma omp parallel for
for (int i = 0; i < n; i++) {
    result[i] = process(data[i]);
}
```

Good conversion:
```cpp
std::transform(std::execution::par, data, data + n, result,
               [](auto x) { return process(x); });
```

Example reduction input:
```cpp
Real_t minVal = initialVal;
#pragma omp parallel for reduction(min:minVal)
for (Index_t i = 0; i < length; ++i) {
    Real_t val = compute(domain, regElemList[i]);
    if (val < minVal) minVal = val;
}
```

Good conversion:
```cpp
minVal = std::transform_reduce(
    std::execution::par,
    counting_iterator(0), counting_iterator(length),
    initialVal,
    [](Real_t a, Real_t b) { return std::min(a, b); },
    [&domain, regElemList](Index_t i) { return compute(domain, regElemList[i]); });
```

Avoid wrapping values in ad-hoc structs only to carry them through the reduction.
"#;

const KNOWLEDGE_SYSTEM_PROMPT: &str = r#"You are a C++ parallelism expert. Analyze the provided original and converted code snippets, focusing on the parallel patterns that were detected.
For each pattern, provide detailed knowledge that would be helpful for developers understanding these patterns.
Structure your response in JSON format containing the following for each pattern:
- pattern: The name of the pattern (exactly as provided in the detected patterns list)
- description: A technical description of what the pattern does and how it works
- useCases: Array of common use cases where this pattern is effective
- performance: Performance characteristics and expected speedups
- considerations: Array of key implementation considerations or potential pitfalls
"#;

/// Shrinks a snippet before it is sent: runs of blank lines collapse to one,
/// and large inputs get their comments elided.
#[must_use]
pub fn preprocess_code(code: &str) -> String {
    let collapsed = EXTRA_BLANK_LINES_RE.replace_all(code, "\n\n");
    if code.len() <= LARGE_INPUT_BYTES {
        return collapsed.into_owned();
    }
    let without_blocks = BLOCK_COMMENT_RE.replace_all(&collapsed, "/* ... */");
    LINE_COMMENT_RE.replace_all(&without_blocks, "// ...").into_owned()
}

/// Completion budget scaled to input size (about four bytes per token).
#[must_use]
pub fn max_completion_tokens(code: &str) -> usize {
    let input_tokens = code.len().div_ceil(4);
    (input_tokens * 2).clamp(MIN_COMPLETION_TOKENS, MAX_COMPLETION_TOKENS)
}

#[must_use]
pub fn build_conversion_prompt(code: &str, settings: &Settings) -> ChatPrompt {
    let source = preprocess_code(code);
    let mut user = format!(
        "Convert the following MPI/OpenMP code to C++{} using standard parallelism features:\n\n```cpp\n{}\n```\n\n",
        settings.target_cpp.as_str(),
        source
    );
    if settings.include_explanations {
        user.push_str("Please provide explanations for each transformation.\n");
    }
    user.push_str(
        "Return your answer in the following format:\n\
         1. First, provide the converted code in a code block with cpp syntax highlighting\n\
         2. Then, provide a detailed explanation of the transformations you made\n",
    );

    ChatPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        max_tokens: max_completion_tokens(&source),
        reasoning_effort: Some(settings.reasoning_effort),
        json_response: false,
    }
}

#[must_use]
pub fn build_knowledge_prompt(original: &str, converted: &str, patterns: &[PatternType]) -> ChatPrompt {
    let names: Vec<&str> = patterns.iter().map(|p| p.as_str()).collect();
    let user = format!(
        "Original Code:\n```cpp\n{original}\n```\n\n\
         Converted Code:\n```cpp\n{converted}\n```\n\n\
         Detected Patterns: {}\n\n\
         Provide pattern knowledge that would help a developer understand these patterns in the context of the code conversion.\n\
         Focus only on the detected patterns. Return your response in valid JSON format without any additional text.",
        names.join(", ")
    );

    ChatPrompt {
        system: KNOWLEDGE_SYSTEM_PROMPT.to_string(),
        user,
        max_tokens: KNOWLEDGE_MAX_TOKENS,
        reasoning_effort: None,
        json_response: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CppVersion;

    #[test]
    fn blank_line_runs_collapse() {
        assert_eq!(preprocess_code("a\n\n\n\nb\n  \n\t\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn small_inputs_keep_comments() {
        let code = "// keep me\nint x; /* and me */";
        assert_eq!(preprocess_code(code), code);
    }

    #[test]
    fn large_inputs_elide_comments() {
        let body = "x += 1; // step\n".repeat(200);
        let code = format!("/* header\n spanning lines */\n{body}");
        let out = preprocess_code(&code);
        assert!(out.starts_with("/* ... */\n"));
        assert!(out.contains("x += 1; // ...\n"));
        assert!(!out.contains("step"));
    }

    #[test]
    fn token_budget_is_clamped() {
        assert_eq!(max_completion_tokens(""), 1500);
        assert_eq!(max_completion_tokens(&"a".repeat(4000)), 2000);
        assert_eq!(max_completion_tokens(&"a".repeat(100_000)), 4000);
    }

    #[test]
    fn conversion_prompt_follows_settings() {
        let mut settings = Settings::default();
        settings.target_cpp = CppVersion::Cpp17;
        settings.include_explanations = false;
        let prompt = build_conversion_prompt("#pragma omp parallel for\nfor(;;){}", &settings);
        assert!(prompt.user.contains("to C++17 using"));
        assert!(prompt.user.contains("```cpp\n#pragma omp parallel for"));
        assert!(!prompt.user.contains("explanations for each"));
        assert_eq!(prompt.reasoning_effort, Some(ReasoningEffort::High));
        assert!(!prompt.json_response);
    }

    #[test]
    fn knowledge_prompt_lists_patterns() {
        let prompt = build_knowledge_prompt("orig", "conv", &[PatternType::Map, PatternType::Reduce]);
        assert!(prompt.user.contains("Detected Patterns: map, reduce"));
        assert!(prompt.json_response);
        assert_eq!(prompt.max_tokens, 8000);
    }
}
