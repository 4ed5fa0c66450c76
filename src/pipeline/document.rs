/// Line-indexed snapshot of an open buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: String,
    pub lines: Vec<String>,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            uri: uri.into(),
            lines,
        }
    }

    /// Split `text` on line breaks (`\n` or `\r\n`).
    pub fn from_text(uri: impl Into<String>, text: &str) -> Self {
        Self::new(uri, text.lines().map(str::to_string).collect())
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joined back together with `\n`, keeping a trailing newline if `original`
    /// had one.
    pub fn to_text(&self, original: &str) -> String {
        let mut text = self.lines.join("\n");
        if original.ends_with('\n') {
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let doc = TextDocument::from_text("file:///a.codex", "one\r\ntwo\n");
        assert_eq!(doc.lines, vec!["one", "two"]);
        assert_eq!(doc.line(1), Some("two"));
        assert_eq!(doc.line(2), None);
        assert_eq!(doc.to_text("one\r\ntwo\n"), "one\ntwo\n");
    }

    #[test]
    fn test_empty_text() {
        assert!(TextDocument::from_text("file:///a.codex", "").is_empty());
    }
}
