use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offset of the token in the line
    pub byte_start: usize,
    /// UTF-16 column where the token starts
    pub start: u32,
    /// UTF-16 column one past the token's end
    pub end: u32,
}

/// Split a line into word tokens using Unicode word boundaries.
///
/// Whitespace and punctuation segments are dropped, so `"Hello, world"`
/// yields `Hello` and `world`. Combining marks stay with their base letter.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut column = 0u32;
    let mut consumed = 0usize;

    for (byte_start, segment) in line.split_word_bound_indices() {
        // Segments are contiguous, but keep the column honest if they ever aren't
        if byte_start > consumed {
            column += utf16_len(&line[consumed..byte_start]);
        }

        let width = utf16_len(segment);
        if segment.chars().any(char::is_alphanumeric) {
            tokens.push(Token {
                text: segment,
                byte_start,
                start: column,
                end: column + width,
            });
        }

        column += width;
        consumed = byte_start + segment.len();
    }

    tokens
}

/// Word running up to the end of the line. Empty if the line ends in
/// whitespace.
pub fn last_word(line: &str) -> &str {
    line.rsplit(char::is_whitespace).next().unwrap_or("")
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Byte offset of a UTF-16 column, clamped to the line's end.
pub fn byte_offset(line: &str, column: u32) -> usize {
    let mut units = 0u32;
    for (offset, c) in line.char_indices() {
        if units >= column {
            return offset;
        }
        units += c.len_utf16() as u32;
    }
    line.len()
}

/// Text between two UTF-16 columns.
pub fn utf16_slice(line: &str, start: u32, end: u32) -> &str {
    let start = byte_offset(line, start);
    let end = byte_offset(line, end).max(start);
    &line[start..end]
}

/// Replace one token in `line`, leaving everything around it intact.
pub fn replace_token(line: &str, token: &Token<'_>, replacement: &str) -> String {
    let end = token.byte_start + token.text.len();
    let mut result = String::with_capacity(line.len() + replacement.len());
    result.push_str(&line[..token.byte_start]);
    result.push_str(replacement);
    result.push_str(&line[end..]);
    result
}
