pub mod output;

use crate::checker::distance::normalized_distance;
use crate::checker::normalize::{match_case, normalize};
use crate::checker::tokenizer::{byte_offset, utf16_slice};
use crate::pipeline::document::TextDocument;
use crate::pipeline::suggestion::PlacedSuggestion;
use crate::session::Session;
use crate::{CheckResult, Config, Finding};
use anyhow::{Context, Result};
use output::{prompt_action, Choice};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expand the given paths into the files to check.
///
/// Files named explicitly are always kept. Directories are walked and only
/// files with a configured document extension are picked up.
pub fn collect_files(paths: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let name = entry.path().to_string_lossy();
                    if config.accepts_document(&name) {
                        files.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping unreadable entry"),
            }
        }
    }

    files
}

fn read_document(file_path: &Path) -> Result<(String, TextDocument)> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))?;
    let document = TextDocument::from_text(file_path.display().to_string(), &content);
    Ok((content, document))
}

/// Near matches for a flagged word, without the fallback entry `check`
/// returns when nothing is close.
fn near_matches(session: &Session, word: &str) -> Vec<String> {
    let workspace = session.workspace();
    let key = normalize(word);
    workspace
        .checker()
        .check(word)
        .into_iter()
        .filter(|candidate| {
            let candidate_key = normalize(candidate);
            candidate_key != key
                && normalized_distance(&candidate_key, &key)
                    <= workspace.settings.max_normalized_distance
        })
        .map(|candidate| match_case(word, &candidate))
        .collect()
}

fn to_finding(session: &Session, document: &TextDocument, placed: &PlacedSuggestion) -> Finding {
    let range = placed.range;
    let context = document.line(range.start.line as usize).unwrap_or("");
    let word = match placed.suggestion.span {
        Some(_) => utf16_slice(context, range.start.character, range.end.character),
        None => "",
    };

    Finding {
        word: word.to_string(),
        message: placed.suggestion.message.clone(),
        source: placed.suggestion.source.clone(),
        severity: placed.suggestion.severity,
        line: range.start.line as usize + 1,
        column: range.start.character as usize + 1,
        context: context.trim().to_string(),
        suggestions: if word.is_empty() {
            Vec::new()
        } else {
            near_matches(session, word)
        },
    }
}

pub fn check_file(session: &Session, file_path: &Path) -> Result<CheckResult> {
    let (_, document) = read_document(file_path)?;

    let findings: Vec<Finding> = session
        .diagnostics(&document)
        .iter()
        .map(|placed| to_finding(session, &document, placed))
        .collect();
    debug!(file = %file_path.display(), findings = findings.len(), "Checked file");

    Ok(CheckResult {
        error_count: findings.len(),
        fixed_count: 0,
        findings,
    })
}

/// Replace the range of a single-line edit. Returns false if nothing changed.
fn apply_edit(document: &mut TextDocument, placed: &PlacedSuggestion) -> bool {
    let Some(edit) = &placed.suggestion.edit else {
        return false;
    };
    let range = placed.range;
    if range.start.line != range.end.line {
        return false;
    }
    let Some(line) = document.lines.get_mut(range.start.line as usize) else {
        return false;
    };

    let start = byte_offset(line, range.start.character);
    let end = byte_offset(line, range.end.character).max(start);
    if line[start..end] == **edit {
        return false;
    }
    line.replace_range(start..end, edit);
    true
}

fn write_document(file_path: &Path, original: &str, document: &TextDocument) -> Result<()> {
    fs::write(file_path, document.to_text(original))
        .with_context(|| format!("Failed to write file: {}", file_path.display()))
}

/// Replace every flagged word that has a near match with the closest one.
///
/// Words without a near match are left for the user.
pub fn fix_auto(session: &Session, file_path: &Path) -> Result<CheckResult> {
    let (content, mut document) = read_document(file_path)?;
    let diagnostics = session.diagnostics(&document);
    let mut fixed_count = 0;

    // Right to left, so earlier columns on the same line stay valid
    for placed in diagnostics.iter().rev() {
        if placed.suggestion.span.is_none() {
            continue;
        }
        let finding = to_finding(session, &document, placed);
        let Some(replacement) = finding.suggestions.first() else {
            continue;
        };

        let fix = PlacedSuggestion {
            suggestion: placed.suggestion.clone().with_edit(replacement.as_str()),
            range: placed.range,
        };
        if apply_edit(&mut document, &fix) {
            fixed_count += 1;
        }
    }

    if fixed_count > 0 {
        write_document(file_path, &content, &document)?;
    }

    Ok(CheckResult {
        error_count: diagnostics.len() - fixed_count,
        fixed_count,
        findings: Vec::new(),
    })
}

/// Outcome of an interactive pass over one file.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveOutcome {
    pub fixed_count: usize,
    pub words_added: usize,
    pub quit: bool,
}

/// Walk the flagged lines and let the user pick among the line's actions.
pub fn fix_interactive(
    session: &mut Session,
    file_path: &Path,
    colored: bool,
) -> Result<InteractiveOutcome> {
    let (content, mut document) = read_document(file_path)?;
    let mut outcome = InteractiveOutcome::default();

    'lines: for index in 0..document.line_count() {
        loop {
            let actions = session.actions(&document, index..=index);
            if actions.is_empty() {
                break;
            }

            match prompt_action(file_path, index + 1, &document.lines[index], &actions, colored)? {
                Choice::Apply(choice) => {
                    let placed = &actions[choice];
                    if apply_edit(&mut document, placed) {
                        outcome.fixed_count += 1;
                    }
                    if let Some(command) = &placed.suggestion.command {
                        outcome.words_added += session.apply_command(command)?;
                    }
                }
                Choice::Skip => break,
                Choice::Quit => {
                    outcome.quit = true;
                    break 'lines;
                }
            }
        }
    }

    if outcome.fixed_count > 0 {
        write_document(file_path, &content, &document)?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::{Dictionary, Level};
    use tempfile::tempdir;

    fn session(words: &[&str]) -> Session {
        let mut dictionary = Dictionary::in_memory();
        for word in words {
            dictionary.define(word, Level::Verified).unwrap();
        }
        let config = Config {
            max_normalized_distance: 0.3,
            ..Default::default()
        };
        Session::with_dictionary(config, dictionary).unwrap()
    }

    #[test]
    fn test_collect_files_filters_walked_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("drafts/GEN.codex"), "").unwrap();
        fs::write(dir.path().join("drafts/notes.md"), "").unwrap();
        let explicit = dir.path().join("notes.txt");
        fs::write(&explicit, "").unwrap();

        let files = collect_files(&[dir.path().join("drafts"), explicit.clone()], &Config::default());
        assert_eq!(files, vec![dir.path().join("drafts/GEN.codex"), explicit]);
    }

    #[test]
    fn test_check_file_findings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GEN.codex");
        fs::write(&path, "In the begining\nwas the Word\n").unwrap();

        let session = session(&["in", "the", "beginning", "was", "word"]);
        let result = check_file(&session, &path).unwrap();

        assert_eq!(result.error_count, 1);
        let finding = &result.findings[0];
        assert_eq!(finding.word, "begining");
        assert_eq!((finding.line, finding.column), (1, 8));
        assert_eq!(finding.suggestions, vec!["beginning".to_string()]);
    }

    #[test]
    fn test_findings_exclude_fallback_candidates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GEN.codex");
        fs::write(&path, "zzz").unwrap();

        let session = session(&["grace"]);
        let result = check_file(&session, &path).unwrap();
        assert_eq!(result.error_count, 1);
        assert!(result.findings[0].suggestions.is_empty());
    }

    #[test]
    fn test_fix_auto_rewrites_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GEN.codex");
        fs::write(&path, "grac and peece\nzzz\n").unwrap();

        let session = session(&["grace", "and", "peace"]);
        let result = fix_auto(&session, &path).unwrap();

        assert_eq!(result.fixed_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "grace and peace\nzzz\n");
    }

    #[test]
    fn test_fix_auto_keeps_sentence_capital() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GEN.codex");
        fs::write(&path, "Grac and peace").unwrap();

        let session = session(&["grace", "and", "peace"]);
        assert_eq!(fix_auto(&session, &path).unwrap().fixed_count, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Grace and peace");
    }

    #[test]
    fn test_apply_edit_whole_line() {
        let mut document = TextDocument::from_text("a.codex", "teh end");
        let placed = PlacedSuggestion {
            suggestion: crate::Suggestion::new("teh → the", "spell-check").with_edit("the end"),
            range: crate::pipeline::range::RangeMapper::whole_line(0, 7),
        };
        assert!(apply_edit(&mut document, &placed));
        assert_eq!(document.lines[0], "the end");
        assert!(!apply_edit(&mut document, &placed));
    }
}
