use crate::checker::dictionary::Level;
use crate::pipeline::document::TextDocument;
use crate::pipeline::suggestion::{PlacedSuggestion, Severity, SuggestionCommand};
use crate::pipeline::Publisher;
use crate::session::Session;
use anyhow::{bail, Context, Result};
use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Command, CompletionItem, CompletionItemKind,
    CompletionTextEdit, Diagnostic, DiagnosticSeverity, Position, Range, TextEdit, Uri,
    WorkspaceEdit,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// Command identifier for adding words to the project dictionary.
pub const ADD_WORDS_COMMAND: &str = "codexspell.addDictionaryEntry";
/// Alternative name accepted from older clients.
pub const ADD_WORDS_COMMAND_ALIAS: &str = "add-dictionary-entry";

pub fn severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

pub fn to_diagnostic(placed: &PlacedSuggestion) -> Diagnostic {
    Diagnostic {
        range: placed.range,
        severity: Some(severity(placed.suggestion.severity)),
        source: Some(placed.suggestion.source.clone()),
        message: placed.suggestion.message.clone(),
        ..Default::default()
    }
}

pub fn to_command(title: &str, command: &SuggestionCommand) -> Command {
    match command {
        SuggestionCommand::AddWords { words, level } => Command {
            title: title.to_string(),
            command: ADD_WORDS_COMMAND.to_string(),
            arguments: Some(vec![
                Value::from(words.clone()),
                Value::from(level.to_string()),
            ]),
        },
    }
}

/// Quick fix for a placed suggestion. `None` if it carries neither an edit
/// nor a command.
pub fn to_code_action(uri: &Uri, placed: &PlacedSuggestion) -> Option<CodeActionOrCommand> {
    let suggestion = &placed.suggestion;
    if suggestion.edit.is_none() && suggestion.command.is_none() {
        return None;
    }

    let edit = suggestion.edit.as_ref().map(|new_text| {
        let mut changes = HashMap::new();
        changes.insert(
            uri.clone(),
            vec![TextEdit {
                range: placed.range,
                new_text: new_text.clone(),
            }],
        );
        WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }
    });

    Some(CodeActionOrCommand::CodeAction(CodeAction {
        title: suggestion.message.clone(),
        kind: Some(CodeActionKind::QUICKFIX),
        edit,
        command: suggestion
            .command
            .as_ref()
            .map(|command| to_command(&suggestion.message, command)),
        ..Default::default()
    }))
}

pub fn to_completion_item(placed: &PlacedSuggestion) -> CompletionItem {
    let suggestion = &placed.suggestion;
    CompletionItem {
        label: suggestion.message.clone(),
        kind: Some(CompletionItemKind::TEXT),
        detail: Some(suggestion.source.clone()),
        text_edit: suggestion.edit.as_ref().map(|new_text| {
            CompletionTextEdit::Edit(TextEdit {
                range: placed.range,
                new_text: new_text.clone(),
            })
        }),
        ..Default::default()
    }
}

/// Adapt an LSP-level diagnostics sink into a registry publisher.
///
/// URIs that do not parse are logged and dropped.
pub fn diagnostic_publisher<F>(sink: F) -> Publisher
where
    F: Fn(Uri, Vec<Diagnostic>) + 'static,
{
    Box::new(move |uri: &str, placed: &[PlacedSuggestion]| match uri.parse::<Uri>() {
        Ok(uri) => sink(uri, placed.iter().map(to_diagnostic).collect()),
        Err(e) => warn!(uri, error = %e, "Cannot publish diagnostics for unparsable URI"),
    })
}

/// Protocol-facing wrapper around a [`Session`]. No transport: whatever owns
/// the connection feeds documents in and sends the results back out.
pub struct SpellService {
    session: Session,
}

impl SpellService {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn accepts(&self, uri: &Uri) -> bool {
        self.session.config().accepts_document(uri.as_str())
    }

    /// Quick fixes for every line touched by `range`.
    pub fn code_actions(
        &self,
        uri: &Uri,
        document: &TextDocument,
        range: Range,
    ) -> Vec<CodeActionOrCommand> {
        if !self.accepts(uri) {
            return Vec::new();
        }

        let lines = range.start.line as usize..=range.end.line as usize;
        self.session
            .actions(document, lines)
            .iter()
            .filter_map(|placed| to_code_action(uri, placed))
            .collect()
    }

    pub fn completions(
        &self,
        uri: &Uri,
        document: &TextDocument,
        position: Position,
    ) -> Vec<CompletionItem> {
        if !self.accepts(uri) {
            return Vec::new();
        }

        self.session
            .completions(document, position)
            .iter()
            .map(to_completion_item)
            .collect()
    }

    /// Diagnostics for a changed document. Also pushed through the session's
    /// publisher, if one is set.
    pub fn diagnostics(&self, uri: &Uri, document: &TextDocument) -> Vec<Diagnostic> {
        if !self.accepts(uri) {
            return Vec::new();
        }

        self.session
            .diagnostics(document)
            .iter()
            .map(to_diagnostic)
            .collect()
    }

    /// Run a workspace command. Returns how many words were added.
    ///
    /// Arguments for the add-word command: a word or a list of words, then
    /// an optional level name.
    pub fn execute_command(&mut self, command: &str, arguments: &[Value]) -> Result<usize> {
        if command != ADD_WORDS_COMMAND && command != ADD_WORDS_COMMAND_ALIAS {
            bail!("Unknown command: {}", command);
        }

        let words: Vec<String> = match arguments.first() {
            Some(Value::String(word)) => vec![word.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .context("Word list must contain only strings")
                })
                .collect::<Result<_>>()?,
            _ => bail!("{} expects a word or a list of words", command),
        };

        let level = match arguments.get(1) {
            Some(Value::String(level)) => Some(level.parse::<Level>()?),
            Some(Value::Null) | None => None,
            Some(other) => bail!("Invalid level argument: {}", other),
        };

        let added = self.session.add_words(&words, level)?;
        info!(added, requested = words.len(), "Dictionary updated");
        Ok(added)
    }
}
