use std::cmp::min;

/// Calculate Levenshtein distance between two strings
///
/// Counts single-character insertions, deletions and substitutions at unit
/// cost. Characters are Unicode scalar values, not bytes.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rows of the full matrix are enough
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };

            curr[j + 1] = min(
                min(
                    prev[j + 1] + 1, // deletion
                    curr[j] + 1,     // insertion
                ),
                prev[j] + cost, // substitution
            );
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Edit distance divided by the length of `reference` (at least 1).
pub fn normalized_distance(reference: &str, word: &str) -> f64 {
    let len = reference.chars().count().max(1);
    edit_distance(reference, word) as f64 / len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("hello", "hallo"), 1);
        assert_eq!(edit_distance("hello", "hullo"), 1);
        assert_eq!(edit_distance("hello", "world"), 4);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", ""), 0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [("grace", "grac"), ("prayer", "pr"), ("नमस्ते", "नमस्तै"), ("", "x")];
        for (a, b) in pairs {
            assert_eq!(edit_distance(a, b), edit_distance(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // One vowel sign differs; both are multi-byte
        assert_eq!(edit_distance("नमस्ते", "नमस्तै"), 1);
        assert_eq!(edit_distance("", "é"), 1);
    }

    #[test]
    fn test_normalized_distance() {
        assert!((normalized_distance("grace", "grac") - 0.2).abs() < f64::EPSILON);
        assert!((normalized_distance("", "ab") - 2.0).abs() < f64::EPSILON);
    }
}
