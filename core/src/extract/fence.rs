use once_cell::sync::Lazy;
use regex::Regex;

// Opening fence, optional language tag line, lazily matched body, closing fence.
// The tag only counts when a newline follows it, so "```x = 1;```" keeps its body.
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:([\w+#.\-]*)[ \t]*\r?\n)?(.*?)```").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// Language tag on the opening fence; never validated.
    pub language: Option<&'a str>,
    /// Raw text between the fences.
    pub body: &'a str,
}

/// All fenced blocks of `text`, in order of appearance.
#[must_use]
pub fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    FENCE_RE
        .captures_iter(text)
        .map(|caps| FencedBlock {
            language: caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()),
            body: caps.get(2).map_or("", |m| m.as_str()),
        })
        .collect()
}

/// `text` with every fenced block removed.
#[must_use]
pub fn strip_fenced_blocks(text: &str) -> String {
    FENCE_RE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_tag_and_body() {
        let blocks = fenced_blocks("intro\n```cpp\nint x;\n```\nmid\n```\nplain\n```");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, Some("cpp"));
        assert_eq!(blocks[0].body, "int x;\n");
        assert_eq!(blocks[1].language, None);
        assert_eq!(blocks[1].body, "plain\n");
    }

    #[test]
    fn inline_fence_keeps_first_word() {
        let blocks = fenced_blocks("```int x = 1;```");
        assert_eq!(blocks[0].language, None);
        assert_eq!(blocks[0].body, "int x = 1;");
    }

    #[test]
    fn unterminated_fence_is_not_a_block() {
        assert!(fenced_blocks("```cpp\nint x;").is_empty());
    }

    #[test]
    fn strip_removes_every_block() {
        let stripped = strip_fenced_blocks("a\n```\n1\n```\nb\n```c++\n2\n```\nc");
        assert_eq!(stripped, "a\n\nb\n\nc");
    }
}
