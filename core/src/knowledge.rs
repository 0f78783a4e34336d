use crate::pattern::PatternType;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Reference material about one parallel pattern, as produced by the model
/// or taken from the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternKnowledgeRecord {
    pub pattern: String,
    pub description: String,
    #[serde(default)]
    pub use_cases: Vec<String>,
    pub performance: String,
    #[serde(default)]
    pub considerations: Vec<String>,
}

impl PatternKnowledgeRecord {
    #[must_use]
    pub fn kind(&self) -> PatternType {
        PatternType::from_label(&self.pattern)
    }
}

fn record(kind: PatternType, description: &str, use_cases: &[&str], performance: &str, considerations: &[&str]) -> PatternKnowledgeRecord {
    PatternKnowledgeRecord {
        pattern: kind.as_str().to_string(),
        description: description.to_string(),
        use_cases: use_cases.iter().map(ToString::to_string).collect(),
        performance: performance.to_string(),
        considerations: considerations.iter().map(ToString::to_string).collect(),
    }
}

/// Static reference text shown before (or instead of) model-generated knowledge.
#[must_use]
pub fn builtin_knowledge(kind: PatternType) -> PatternKnowledgeRecord {
    match kind {
        PatternType::Map => record(
            kind,
            "The Map pattern applies the same operation to each element of a collection independently, making it highly parallelizable.",
            &["Image processing (applying filters)", "Vector/matrix element-wise operations", "Data transformation tasks"],
            "Typically achieves linear speedup with number of cores due to minimal data dependencies.",
            &["Data locality can impact performance", "Consider chunk size for optimal cache usage", "Beware of false sharing in adjacent memory locations"],
        ),
        PatternType::Reduce => record(
            kind,
            "The Reduce pattern combines elements of a collection into a single result using an associative operation.",
            &["Computing sums or products", "Finding min/max values", "String concatenation"],
            "Logarithmic time complexity with sufficient parallel resources, limited by the associative operation.",
            &["Operation must be associative for correctness", "Consider tree-based reduction for better parallelism", "Balance work distribution across threads"],
        ),
        PatternType::Scan => record(
            kind,
            "The Scan (prefix sum) pattern computes running totals of a sequence, useful for cumulative operations.",
            &["Cumulative sums/products", "Line-of-sight calculations", "Dynamic programming problems"],
            "Can achieve O(log n) time with sufficient processors using work-efficient parallel scan.",
            &["Consider using exclusive vs. inclusive scan", "Memory access patterns affect performance", "May require multiple passes for work efficiency"],
        ),
        PatternType::Stencil => record(
            kind,
            "The Stencil pattern updates array elements based on neighboring values, common in scientific computing.",
            &["Finite difference methods", "Convolution operations", "Cellular automata"],
            "Performance heavily dependent on data locality and memory access patterns.",
            &["Ghost cells may be needed for boundary conditions", "Consider tiling for cache efficiency", "Memory bandwidth can be a bottleneck"],
        ),
        PatternType::Broadcast => record(
            kind,
            "The Broadcast pattern distributes data from one source to multiple destinations efficiently.",
            &["Sharing configuration data", "Distributing work parameters", "Updating shared state"],
            "Logarithmic time with tree-based implementation, can be bottlenecked by network.",
            &["Consider data size vs. communication overhead", "Network topology affects performance", "May require synchronization after broadcast"],
        ),
        PatternType::Gather => record(
            kind,
            "The Gather pattern collects distributed data into a single location.",
            &["Collecting partial results", "Centralized logging", "Data aggregation"],
            "Limited by network bandwidth and single destination bottleneck.",
            &["Consider data ordering requirements", "Memory capacity at destination", "Network congestion at receiver"],
        ),
        PatternType::Scatter => record(
            kind,
            "The Scatter pattern distributes portions of data to different processors for parallel processing.",
            &["Data partitioning", "Load balancing", "Distributed algorithms"],
            "Can achieve good speedup with balanced distribution and minimal communication.",
            &["Balance data distribution", "Consider data locality", "Communication overhead vs. computation"],
        ),
        PatternType::Unknown => record(
            kind,
            "Pattern could not be clearly identified or matches multiple patterns.",
            &["N/A"],
            "Performance characteristics cannot be determined.",
            &["Consider refactoring for clearer pattern matching"],
        ),
    }
}

/// Markdown rendering of knowledge records for the explanation pane.
#[must_use]
pub fn format_knowledge_markdown(records: &[PatternKnowledgeRecord]) -> String {
    records
        .iter()
        .map(|k| {
            let mut section = String::new();
            let _ = writeln!(section, "## {} Pattern\n", k.pattern);
            let _ = writeln!(section, "{}\n", k.description);
            section.push_str("### Common Use Cases:\n");
            for use_case in &k.use_cases {
                let _ = writeln!(section, "* {use_case}");
            }
            section.push_str("\n### Performance Characteristics:\n");
            let _ = writeln!(section, "{}\n", k.performance);
            section.push_str("### Key Considerations:\n");
            for consideration in &k.considerations {
                let _ = writeln!(section, "* {consideration}");
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n")
}
