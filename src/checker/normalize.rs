use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Chapter:verse marker inside a single token, e.g. `3:16`
    static ref VERSE_MARKER: Regex = Regex::new(r"\d+:\d+").unwrap();
    // A scripture reference such as `GEN 1:1` or `1 JN 4:8`
    static ref SCRIPTURE_REFERENCE: Regex = Regex::new(r"\b\d*\s*[A-Z]+\s\d+:\d+\b").unwrap();
}

/// Punctuation as far as word comparison is concerned.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{2018}'..='\u{201F}' // curly quotes
                | '\u{2010}'..='\u{2015}' // hyphens and dashes
                | '\u{2026}' // ellipsis
                | '\u{00A1}' | '\u{00BF}' | '\u{00AB}' | '\u{00BB}' | '\u{00B7}'
                | '\u{0964}' | '\u{0965}' // danda, double danda
                | '\u{060C}' | '\u{061F}' // arabic comma, question mark
                | '\u{3001}' | '\u{3002}' // ideographic comma, full stop
        )
}

/// Strip surrounding whitespace and punctuation, keeping case.
pub fn surface_form(word: &str) -> &str {
    word.trim_matches(|c: char| c.is_whitespace() || is_punctuation(c))
}

/// Surface form folded to lowercase. Empty when the word is all punctuation.
pub fn normalize(word: &str) -> String {
    surface_form(word).to_lowercase()
}

/// `replacement` with its first letter capitalized when `original` starts
/// with a capital. Otherwise unchanged.
pub fn match_case(original: &str, replacement: &str) -> String {
    let starts_upper = surface_form(original)
        .chars()
        .next()
        .is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if starts_upper && first.is_lowercase() => {
            first.to_uppercase().chain(chars).collect()
        }
        _ => replacement.to_string(),
    }
}

/// True for tokens that are never candidates for correction regardless of
/// dictionary contents.
pub fn is_exempt(word: &str) -> bool {
    let surface = surface_form(word);

    if surface.is_empty() {
        return true;
    }

    // Numbers, verse numbers and the like
    if !surface.chars().any(char::is_alphabetic) {
        return true;
    }

    // Acronyms and book codes (scripts without case never hit this)
    if surface.chars().any(char::is_uppercase) && !surface.chars().any(char::is_lowercase) {
        return true;
    }

    VERSE_MARKER.is_match(surface)
}

/// True if the line carries a scripture reference and should not be checked.
pub fn is_scripture_reference(line: &str) -> bool {
    SCRIPTURE_REFERENCE.is_match(line)
}
