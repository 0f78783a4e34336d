use super::{Alignment, DiffLine};
use std::fmt::Write;

/// Renders one side as `<prefix> <line number> | <content>` rows.
#[must_use]
pub fn render_side(lines: &[DiffLine]) -> String {
    let width = lines
        .iter()
        .map(|l| l.line_number)
        .max()
        .unwrap_or(0)
        .to_string()
        .len();

    let mut out = String::new();
    for line in lines {
        let _ = writeln!(
            out,
            "{} {:>width$} | {}",
            line.kind.prefix(),
            line.line_number,
            line.content
        );
    }
    out
}

/// Both panes one after the other, each under its own header.
#[must_use]
pub fn render_alignment(alignment: &Alignment) -> String {
    let mut out = String::new();
    out.push_str("--- original\n");
    out.push_str(&render_side(&alignment.original_lines));
    out.push_str("+++ modified\n");
    out.push_str(&render_side(&alignment.modified_lines));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;

    #[test]
    fn prefixes_follow_line_kind() {
        let alignment = align("keep\ndrop\n", "keep\nnew\n");
        assert_eq!(render_side(&alignment.original_lines), "  1 | keep\n- 2 | drop\n");
        assert_eq!(render_side(&alignment.modified_lines), "  1 | keep\n+ 2 | new\n");
    }

    #[test]
    fn numbers_are_right_aligned() {
        let text: String = (1..=10).map(|i| format!("line {i}\n")).collect();
        let alignment = align(&text, &text);
        let rendered = render_side(&alignment.original_lines);
        assert!(rendered.starts_with("   1 | line 1\n"));
        assert!(rendered.ends_with("  10 | line 10\n"));
    }

    #[test]
    fn alignment_has_both_headers() {
        let rendered = render_alignment(&align("a\n", "b\n"));
        assert_eq!(rendered, "--- original\n- 1 | a\n+++ modified\n+ 1 | b\n");
    }
}
