use crate::checker::tokenizer::utf16_len;
use crate::pipeline::document::TextDocument;
use crate::pipeline::suggestion::Suggestion;
use lsp_types::{Position, Range};

/// Converts line-relative suggestions into editor coordinates.
///
/// Whole-line suggestions cover the entire line, final character included.
/// Explicit spans pass through unchanged. A suggestion without a line maps to
/// the empty range at the start of the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeMapper;

impl RangeMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map(&self, suggestion: &Suggestion, document: &TextDocument) -> Range {
        let Some(line) = suggestion.line else {
            return Range::default();
        };
        let line_number = line as u32;

        match suggestion.span {
            Some(span) => Range::new(
                Position::new(line_number, span.start),
                Position::new(line_number, span.end),
            ),
            None => {
                let width = document.line(line).map(utf16_len).unwrap_or(0);
                Self::whole_line(line_number, width)
            }
        }
    }

    pub fn whole_line(line: u32, width: u32) -> Range {
        Range::new(Position::new(line, 0), Position::new(line, width))
    }
}
