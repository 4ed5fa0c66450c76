use crate::checker::normalize::{
    is_punctuation, is_scripture_reference, match_case, normalize, surface_form,
};
use crate::checker::tokenizer::{last_word, replace_token, tokenize, Token};
use crate::error::Result;
use crate::pipeline::suggestion::{Severity, Suggestion, SuggestionCommand};
use crate::pipeline::{AnalyzerFn, AnalyzerKind, AnalyzerMeta, DocumentView, SuggestionRegistry};
use crate::session::Workspace;

pub const SOURCE: &str = "spell-check";

pub fn register_spelling(registry: &mut SuggestionRegistry<Workspace>) -> Result<()> {
    registry.register(
        AnalyzerKind::Diagnostic,
        AnalyzerFn::document(|workspace: &Workspace, view: &DocumentView<'_>| {
            Ok(diagnose(workspace, view.lines))
        }),
        AnalyzerMeta::new(SOURCE).with_description("Flags words missing from the project dictionary"),
    )?;

    registry.register(
        AnalyzerKind::Action,
        AnalyzerFn::line(|workspace: &Workspace, line: &str| Ok(fix_line(workspace, line))),
        AnalyzerMeta::new(SOURCE).with_description("Offers corrections and dictionary additions"),
    )?;

    registry.register(
        AnalyzerKind::Completion,
        AnalyzerFn::document(|workspace: &Workspace, view: &DocumentView<'_>| {
            Ok(view
                .cursor_text()
                .map(|line| complete_word(workspace, line))
                .unwrap_or_default())
        }),
        AnalyzerMeta::new(SOURCE).with_description("Completes the word before the cursor"),
    )?;

    Ok(())
}

fn misspelled<'a>(workspace: &Workspace, line: &'a str) -> Vec<Token<'a>> {
    if is_scripture_reference(line) {
        return Vec::new();
    }

    let checker = workspace.checker();
    tokenize(line)
        .into_iter()
        .filter(|token| checker.is_correction_needed(token.text))
        .collect()
}

/// One warning per unknown word, spanning the word.
pub fn diagnose(workspace: &Workspace, lines: &[String]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        for token in misspelled(workspace, line) {
            suggestions.push(
                Suggestion::new(format!("Unknown word: '{}'", token.text), SOURCE)
                    .with_severity(Severity::Warning)
                    .on_line(index)
                    .with_span(token.start, token.end),
            );
        }
    }

    suggestions
}

/// Whole-line replacements for each unknown word, followed by commands that
/// add the words to the dictionary.
pub fn fix_line(workspace: &Workspace, line: &str) -> Vec<Suggestion> {
    let tokens = misspelled(workspace, line);
    if tokens.is_empty() {
        return Vec::new();
    }

    let checker = workspace.checker();
    let level = workspace.config.added_word_level;
    let mut suggestions = Vec::new();
    let mut unknown: Vec<String> = Vec::new();

    for token in &tokens {
        let key = normalize(token.text);

        for candidate in checker.check(token.text) {
            if normalize(&candidate) == key {
                continue;
            }
            let candidate = match_case(token.text, &candidate);
            suggestions.push(
                Suggestion::new(format!("{} → {}", token.text, candidate), SOURCE)
                    .with_edit(replace_token(line, token, &candidate)),
            );
        }

        if unknown.iter().any(|word| normalize(word) == key) {
            continue;
        }
        suggestions.push(
            Suggestion::new(format!("Add '{}' to dictionary", token.text), SOURCE).with_command(
                SuggestionCommand::AddWords {
                    words: vec![token.text.to_string()],
                    level,
                },
            ),
        );
        unknown.push(token.text.to_string());
    }

    if unknown.len() > 1 {
        suggestions.push(
            Suggestion::new(format!("Add all {} words to dictionary", unknown.len()), SOURCE)
                .with_command(SuggestionCommand::AddWords {
                    words: unknown,
                    level,
                }),
        );
    }

    suggestions
}

/// Completions for the last word before the cursor.
///
/// Suffixes are inserted at the cursor, so nothing is offered once the word
/// has trailing punctuation.
pub fn complete_word(workspace: &Workspace, line: &str) -> Vec<Suggestion> {
    let word = last_word(line);
    if word.ends_with(is_punctuation) {
        return Vec::new();
    }
    let prefix = surface_form(word);

    workspace
        .checker()
        .complete(word)
        .into_iter()
        .map(|suffix| {
            Suggestion::new(format!("{}{}", prefix, suffix), SOURCE)
                .with_severity(Severity::Hint)
                .with_edit(suffix)
        })
        .collect()
}
