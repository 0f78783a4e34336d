use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

mod render;

pub use render::{render_alignment, render_side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Unchanged,
}

impl DiffKind {
    /// Gutter symbol used by the dual-pane view.
    #[must_use]
    pub fn prefix(self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Unchanged => ' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    pub kind: DiffKind,
    pub content: String,
    /// 1-based position on this line's own side.
    pub line_number: usize,
}

/// Both sides of one alignment. Each side is sorted by `line_number` and
/// indexed independently of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    pub original_lines: Vec<DiffLine>,
    pub modified_lines: Vec<DiffLine>,
}

impl Alignment {
    #[must_use]
    pub fn matched_pairs(&self) -> usize {
        count_kind(&self.original_lines, DiffKind::Unchanged)
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        count_kind(&self.original_lines, DiffKind::Removed)
    }

    #[must_use]
    pub fn added(&self) -> usize {
        count_kind(&self.modified_lines, DiffKind::Added)
    }
}

fn count_kind(lines: &[DiffLine], kind: DiffKind) -> usize {
    lines.iter().filter(|l| l.kind == kind).count()
}

/// Splits on `\n` without producing a trailing empty line. `\r` is kept.
fn split_lines(text: &str) -> Vec<&str> {
    text.split_terminator('\n').collect()
}

/// Greedy line alignment of `original` against `modified`.
///
/// Each modified line, in order, claims the earliest unclaimed original line
/// with the same trimmed content. There is no lookahead, so inputs with many
/// repeated lines (closing braces, blank lines) can pair lines a minimal
/// diff would not. Stored content keeps its whitespace.
#[must_use]
pub fn align(original: &str, modified: &str) -> Alignment {
    let orig = split_lines(original);
    let modi = split_lines(modified);

    let mut by_content: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (idx, line) in orig.iter().enumerate() {
        by_content.entry(line.trim()).or_default().push_back(idx);
    }

    // Candidates are only ever taken from the front, so the front is always
    // the first unmatched original index for that content.
    let mut orig_match: Vec<Option<usize>> = vec![None; orig.len()];
    let mut mod_match: Vec<Option<usize>> = vec![None; modi.len()];
    for (mod_idx, line) in modi.iter().enumerate() {
        if let Some(orig_idx) = by_content.get_mut(line.trim()).and_then(VecDeque::pop_front) {
            orig_match[orig_idx] = Some(mod_idx);
            mod_match[mod_idx] = Some(orig_idx);
        }
    }

    Alignment {
        original_lines: build_side(&orig, &orig_match, DiffKind::Removed),
        modified_lines: build_side(&modi, &mod_match, DiffKind::Added),
    }
}

// Walking indices in order yields the side already sorted by line number.
fn build_side(lines: &[&str], matches: &[Option<usize>], unmatched: DiffKind) -> Vec<DiffLine> {
    lines
        .iter()
        .zip(matches)
        .enumerate()
        .map(|(idx, (content, partner))| DiffLine {
            kind: if partner.is_some() { DiffKind::Unchanged } else { unmatched },
            content: (*content).to_string(),
            line_number: idx + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lines: &[DiffLine]) -> Vec<DiffKind> {
        lines.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn identical_inputs_are_all_unchanged() {
        let text = "int main() {\n  #pragma omp parallel for\n  return 0;\n}\n";
        let result = align(text, text);
        assert_eq!(result.original_lines.len(), 4);
        assert_eq!(result.original_lines, result.modified_lines);
        for (line, expected) in result.original_lines.iter().zip(text.lines()) {
            assert_eq!(line.kind, DiffKind::Unchanged);
            assert_eq!(line.content, expected);
        }
    }

    #[test]
    fn empty_inputs_produce_empty_sides() {
        let result = align("", "");
        assert!(result.original_lines.is_empty());
        assert!(result.modified_lines.is_empty());
    }

    #[test]
    fn duplicate_lines_match_first_available() {
        let result = align("a\na\n", "a\n");
        assert_eq!(kinds(&result.original_lines), vec![DiffKind::Unchanged, DiffKind::Removed]);
        assert_eq!(result.original_lines[0].line_number, 1);
        assert_eq!(result.original_lines[1].line_number, 2);
        assert_eq!(kinds(&result.modified_lines), vec![DiffKind::Unchanged]);
    }

    #[test]
    fn trimmed_comparison_keeps_raw_content() {
        let result = align("    x = 1;\n", "x = 1;\n");
        assert_eq!(result.original_lines[0].kind, DiffKind::Unchanged);
        assert_eq!(result.original_lines[0].content, "    x = 1;");
        assert_eq!(result.modified_lines[0].content, "x = 1;");
    }

    #[test]
    fn added_and_removed_keep_their_own_numbering() {
        let original = "#pragma omp parallel for\nfor (int i = 0; i < n; i++)\n  y[i] = f(x[i]);\n";
        let modified = "std::transform(std::execution::par,\n  x, x + n, y, f);\n";
        let result = align(original, modified);
        assert_eq!(result.removed(), 3);
        assert_eq!(result.added(), 2);
        assert_eq!(result.matched_pairs(), 0);
        let numbers: Vec<usize> = result.modified_lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn greedy_pairing_can_cross() {
        // "b" claims original line 2 first, then "a" claims original line 1.
        let result = align("a\nb\n", "b\na\n");
        assert_eq!(result.matched_pairs(), 2);
        assert_eq!(result.removed(), 0);
        assert_eq!(result.added(), 0);
    }

    #[test]
    fn line_counts_are_conserved() {
        let original = "}\n}\nfoo();\n\n}\nbar();\n";
        let modified = "foo();\n}\n\nbaz();\n}\n}\n}\n";
        let result = align(original, modified);
        let pairs = result.matched_pairs();
        assert_eq!(result.removed() + pairs, original.lines().count());
        assert_eq!(result.added() + pairs, modified.lines().count());
        assert_eq!(
            result.modified_lines.iter().filter(|l| l.kind == DiffKind::Unchanged).count(),
            pairs
        );
    }

    #[test]
    fn carriage_returns_are_not_normalized() {
        let result = align("x\r\n", "x\n");
        // Trim strips the '\r' for comparison, the stored content keeps it.
        assert_eq!(result.original_lines[0].kind, DiffKind::Unchanged);
        assert_eq!(result.original_lines[0].content, "x\r");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let result = align("a\n", "b\n");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["originalLines"][0]["kind"], "removed");
        assert_eq!(json["modifiedLines"][0]["lineNumber"], 1);
    }
}
