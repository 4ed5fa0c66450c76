use crate::checker::dictionary::Level;
use lsp_types::Range;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Information,
    Hint,
}

/// Column span on a single line, in UTF-16 code units, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Reversed bounds are swapped, so a span is always well ordered.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }
}

/// Side effect a suggestion can trigger instead of, or besides, an edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionCommand {
    AddWords { words: Vec<String>, level: Level },
}

/// What an analyzer produces for the editor.
///
/// `line` is the document line the suggestion refers to. The registry fills it
/// in for line analyzers; document analyzers set it themselves. Without a
/// `span` the suggestion covers the whole line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub message: String,
    pub edit: Option<String>,
    pub source: String,
    pub severity: Severity,
    pub line: Option<usize>,
    pub span: Option<Span>,
    pub command: Option<SuggestionCommand>,
}

impl Suggestion {
    pub fn new(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            edit: None,
            source: source.into(),
            severity: Severity::default(),
            line: None,
            span: None,
            command: None,
        }
    }

    pub fn with_edit(mut self, edit: impl Into<String>) -> Self {
        self.edit = Some(edit.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn on_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_span(mut self, start: u32, end: u32) -> Self {
        self.span = Some(Span::new(start, end));
        self
    }

    pub fn with_command(mut self, command: SuggestionCommand) -> Self {
        self.command = Some(command);
        self
    }

    pub fn is_whole_line(&self) -> bool {
        self.span.is_none()
    }
}

/// A suggestion together with its range in editor coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSuggestion {
    pub suggestion: Suggestion,
    pub range: Range,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let suggestion = Suggestion::new("Unknown word", "spell-check");
        assert_eq!(suggestion.severity, Severity::Warning);
        assert!(suggestion.is_whole_line());
        assert!(suggestion.edit.is_none());
    }

    #[test]
    fn test_span_is_ordered() {
        let suggestion = Suggestion::new("x", "test").with_span(9, 4);
        assert_eq!(suggestion.span, Some(Span { start: 4, end: 9 }));
    }
}
