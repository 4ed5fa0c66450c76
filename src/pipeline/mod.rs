pub mod document;
pub mod range;
pub mod suggestion;

use crate::checker::tokenizer::byte_offset;
use crate::error::{Error, Result};
use document::TextDocument;
use lsp_types::{Position, Range};
use range::RangeMapper;
use std::any::Any;
use std::fmt;
use std::ops::RangeInclusive;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use suggestion::{PlacedSuggestion, Severity, Suggestion};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerKind {
    Action,
    Completion,
    Diagnostic,
}

impl FromStr for AnalyzerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "action" => Ok(AnalyzerKind::Action),
            "completion" => Ok(AnalyzerKind::Completion),
            "diagnostic" => Ok(AnalyzerKind::Diagnostic),
            other => Err(Error::configuration(format!("Unknown analyzer kind: {}", other))),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerKind::Action => write!(f, "action"),
            AnalyzerKind::Completion => write!(f, "completion"),
            AnalyzerKind::Diagnostic => write!(f, "diagnostic"),
        }
    }
}

/// What a document analyzer gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    pub lines: &'a [String],
    /// Cursor position, for completion requests
    pub cursor: Option<Position>,
}

impl<'a> DocumentView<'a> {
    /// Text of the cursor line up to the cursor.
    pub fn cursor_text(&self) -> Option<&'a str> {
        let cursor = self.cursor?;
        let line = self.lines.get(cursor.line as usize)?;
        Some(&line[..byte_offset(line, cursor.character)])
    }
}

type LineFn<C> = Box<dyn Fn(&C, &str) -> anyhow::Result<Vec<Suggestion>>>;
type DocumentFn<C> = Box<dyn Fn(&C, &DocumentView<'_>) -> anyhow::Result<Vec<Suggestion>>>;

/// The two analyzer shapes.
pub enum AnalyzerFn<C> {
    /// Sees one line at a time. Used for actions.
    Line(LineFn<C>),
    /// Sees the whole document. Used for completions and diagnostics.
    Document(DocumentFn<C>),
}

impl<C> AnalyzerFn<C> {
    pub fn line<F>(f: F) -> Self
    where
        F: Fn(&C, &str) -> anyhow::Result<Vec<Suggestion>> + 'static,
    {
        AnalyzerFn::Line(Box::new(f))
    }

    pub fn document<F>(f: F) -> Self
    where
        F: Fn(&C, &DocumentView<'_>) -> anyhow::Result<Vec<Suggestion>> + 'static,
    {
        AnalyzerFn::Document(Box::new(f))
    }

    fn shape(&self) -> &'static str {
        match self {
            AnalyzerFn::Line(_) => "line",
            AnalyzerFn::Document(_) => "document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerMeta {
    /// Identity used in logs and in failure diagnostics
    pub name: String,
    pub description: Option<String>,
}

impl AnalyzerMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalyzerHandle {
    pub kind: AnalyzerKind,
    id: usize,
}

struct Registered<C> {
    id: usize,
    meta: AnalyzerMeta,
    analyzer: AnalyzerFn<C>,
}

pub type Publisher = Box<dyn Fn(&str, &[PlacedSuggestion])>;

/// Fans editor requests out to registered analyzers, synchronously on the
/// caller's thread. Analyzers get a shared `&C` and never mutate it.
///
/// A failing analyzer (an `Err` or a panic) is logged and its siblings keep
/// running; diagnostic runs also report it as an error diagnostic.
pub struct SuggestionRegistry<C> {
    actions: Vec<Registered<C>>,
    completions: Vec<Registered<C>>,
    diagnostics: Vec<Registered<C>>,
    next_id: usize,
    mapper: RangeMapper,
    completion_until_first_valid: bool,
    publisher: Option<Publisher>,
}

impl<C> Default for SuggestionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SuggestionRegistry<C> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            completions: Vec::new(),
            diagnostics: Vec::new(),
            next_id: 0,
            mapper: RangeMapper::new(),
            completion_until_first_valid: false,
            publisher: None,
        }
    }

    /// Stop completion runs at the first analyzer that returns something.
    pub fn completion_until_first_valid(mut self, enabled: bool) -> Self {
        self.completion_until_first_valid = enabled;
        self
    }

    /// Side channel every diagnostic run is pushed through, keyed by URI.
    pub fn with_publisher<F>(mut self, publisher: F) -> Self
    where
        F: Fn(&str, &[PlacedSuggestion]) + 'static,
    {
        self.publisher = Some(Box::new(publisher));
        self
    }

    pub fn set_publisher(&mut self, publisher: Option<Publisher>) {
        self.publisher = publisher;
    }

    fn slot(&self, kind: AnalyzerKind) -> &Vec<Registered<C>> {
        match kind {
            AnalyzerKind::Action => &self.actions,
            AnalyzerKind::Completion => &self.completions,
            AnalyzerKind::Diagnostic => &self.diagnostics,
        }
    }

    fn slot_mut(&mut self, kind: AnalyzerKind) -> &mut Vec<Registered<C>> {
        match kind {
            AnalyzerKind::Action => &mut self.actions,
            AnalyzerKind::Completion => &mut self.completions,
            AnalyzerKind::Diagnostic => &mut self.diagnostics,
        }
    }

    /// Register an analyzer.
    ///
    /// Actions take line analyzers, completions and diagnostics take document
    /// analyzers. Names must be non-empty and unique per kind.
    pub fn register(
        &mut self,
        kind: AnalyzerKind,
        analyzer: AnalyzerFn<C>,
        meta: AnalyzerMeta,
    ) -> Result<AnalyzerHandle> {
        if meta.name.trim().is_empty() {
            return Err(Error::configuration(format!(
                "{} analyzer registered without a name",
                kind
            )));
        }

        let expected = match kind {
            AnalyzerKind::Action => "line",
            AnalyzerKind::Completion | AnalyzerKind::Diagnostic => "document",
        };
        if analyzer.shape() != expected {
            return Err(Error::configuration(format!(
                "{} analyzer '{}' must be a {} analyzer, got a {} analyzer",
                kind,
                meta.name,
                expected,
                analyzer.shape()
            )));
        }

        if self.slot(kind).iter().any(|r| r.meta.name == meta.name) {
            return Err(Error::configuration(format!(
                "{} analyzer '{}' is already registered",
                kind, meta.name
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        debug!(%kind, name = %meta.name, "Registered analyzer");
        self.slot_mut(kind).push(Registered { id, meta, analyzer });

        Ok(AnalyzerHandle { kind, id })
    }

    /// Returns false if the handle was already gone.
    pub fn unregister(&mut self, handle: AnalyzerHandle) -> bool {
        let slot = self.slot_mut(handle.kind);
        let before = slot.len();
        slot.retain(|r| r.id != handle.id);
        slot.len() != before
    }

    /// Metadata of the analyzers of `kind`, in registration order.
    pub fn analyzers(&self, kind: AnalyzerKind) -> Vec<&AnalyzerMeta> {
        self.slot(kind).iter().map(|r| &r.meta).collect()
    }

    /// Run every action analyzer on each line of `lines` (clamped to the document).
    ///
    /// Results come in line order, then registration order.
    pub fn run_actions(
        &self,
        context: &C,
        document: &TextDocument,
        lines: RangeInclusive<usize>,
    ) -> Vec<PlacedSuggestion> {
        let mut placed = Vec::new();
        let Some(last) = document.line_count().checked_sub(1) else {
            return placed;
        };
        let (first, last) = (*lines.start(), (*lines.end()).min(last));

        for index in first..=last {
            let line = document.lines[index].as_str();
            for entry in &self.actions {
                let AnalyzerFn::Line(analyzer) = &entry.analyzer else {
                    continue;
                };
                match invoke(&entry.meta, || analyzer(context, line)) {
                    Ok(suggestions) => {
                        for mut suggestion in suggestions {
                            suggestion.line = Some(index);
                            placed.push(self.place(suggestion, document));
                        }
                    }
                    Err(e) => warn!(analyzer = %entry.meta.name, line = index, error = %e, "Action analyzer failed"),
                }
            }
        }

        placed
    }

    /// Run completion analyzers for a cursor position.
    ///
    /// Suggestions without their own line are placed as an insertion at the
    /// cursor.
    pub fn run_completions(
        &self,
        context: &C,
        document: &TextDocument,
        cursor: Position,
    ) -> Vec<PlacedSuggestion> {
        let view = DocumentView {
            lines: &document.lines,
            cursor: Some(cursor),
        };
        let mut placed = Vec::new();

        for entry in &self.completions {
            let AnalyzerFn::Document(analyzer) = &entry.analyzer else {
                continue;
            };
            let suggestions = match invoke(&entry.meta, || analyzer(context, &view)) {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    warn!(analyzer = %entry.meta.name, error = %e, "Completion analyzer failed");
                    continue;
                }
            };

            let produced = !suggestions.is_empty();
            for suggestion in suggestions {
                if suggestion.line.is_some() {
                    placed.push(self.place(suggestion, document));
                } else {
                    placed.push(PlacedSuggestion {
                        suggestion,
                        range: Range::new(cursor, cursor),
                    });
                }
            }

            if produced && self.completion_until_first_valid {
                break;
            }
        }

        placed
    }

    /// Run every diagnostic analyzer over the whole document and publish the
    /// aggregate for the document's URI.
    pub fn run_diagnostics(&self, context: &C, document: &TextDocument) -> Vec<PlacedSuggestion> {
        let mut placed = Vec::new();

        if !document.is_empty() {
            let view = DocumentView {
                lines: &document.lines,
                cursor: None,
            };

            for entry in &self.diagnostics {
                let AnalyzerFn::Document(analyzer) = &entry.analyzer else {
                    continue;
                };
                match invoke(&entry.meta, || analyzer(context, &view)) {
                    Ok(suggestions) => {
                        placed.extend(suggestions.into_iter().map(|s| self.place(s, document)));
                    }
                    Err(e) => {
                        warn!(analyzer = %entry.meta.name, error = %e, "Diagnostic analyzer failed");
                        let failure = Suggestion::new(e.to_string(), entry.meta.name.clone())
                            .with_severity(Severity::Error);
                        placed.push(self.place(failure, document));
                    }
                }
            }
        }

        if let Some(publish) = &self.publisher {
            debug!(uri = %document.uri, count = placed.len(), "Publishing diagnostics");
            publish(&document.uri, &placed);
        }

        placed
    }

    fn place(&self, suggestion: Suggestion, document: &TextDocument) -> PlacedSuggestion {
        let range = self.mapper.map(&suggestion, document);
        PlacedSuggestion { suggestion, range }
    }
}

/// Call an analyzer, turning both errors and panics into [`Error::Analyzer`].
fn invoke<F>(meta: &AnalyzerMeta, f: F) -> Result<Vec<Suggestion>>
where
    F: FnOnce() -> anyhow::Result<Vec<Suggestion>>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(suggestions)) => Ok(suggestions),
        Ok(Err(e)) => Err(Error::analyzer(&meta.name, format!("{:#}", e))),
        Err(payload) => Err(Error::analyzer(&meta.name, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn doc(lines: &[&str]) -> TextDocument {
        TextDocument::new(
            "file:///draft.codex",
            lines.iter().map(|l| l.to_string()).collect(),
        )
    }

    fn upper_line() -> AnalyzerFn<()> {
        AnalyzerFn::line(|_, line: &str| {
            Ok(vec![Suggestion::new("Uppercase", "upper").with_edit(line.to_uppercase())])
        })
    }

    #[test]
    fn test_register_rejects_wrong_shape() {
        let mut registry = SuggestionRegistry::<()>::new();
        let err = registry
            .register(AnalyzerKind::Diagnostic, upper_line(), AnalyzerMeta::new("upper"))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = registry
            .register(
                AnalyzerKind::Action,
                AnalyzerFn::document(|_, _| Ok(Vec::new())),
                AnalyzerMeta::new("doc"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_register_rejects_duplicates_and_blank_names() {
        let mut registry = SuggestionRegistry::<()>::new();
        registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("upper"))
            .unwrap();
        assert!(registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("upper"))
            .is_err());
        assert!(registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("  "))
            .is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Action".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Action);
        assert!(matches!(
            "hover".parse::<AnalyzerKind>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_run_actions_line_then_registration_order() {
        let mut registry = SuggestionRegistry::<()>::new();
        registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("upper"))
            .unwrap();
        registry
            .register(
                AnalyzerKind::Action,
                AnalyzerFn::line(|_, line: &str| {
                    Ok(if line.starts_with('b') {
                        vec![Suggestion::new("Starts with b", "b")]
                    } else {
                        Vec::new()
                    })
                }),
                AnalyzerMeta::new("b"),
            )
            .unwrap();

        let document = doc(&["alpha", "beta", "gamma"]);
        let placed = registry.run_actions(&(), &document, 0..=1);
        let summary: Vec<_> = placed
            .iter()
            .map(|p| (p.suggestion.source.as_str(), p.range.start.line))
            .collect();
        assert_eq!(summary, vec![("upper", 0), ("upper", 1), ("b", 1)]);

        // Whole-line range covers the final character
        assert_eq!(placed[0].range.end, Position::new(0, 5));
        assert_eq!(placed[0].suggestion.edit.as_deref(), Some("ALPHA"));
    }

    #[test]
    fn test_run_actions_clamps_range() {
        let mut registry = SuggestionRegistry::<()>::new();
        registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("upper"))
            .unwrap();

        assert_eq!(registry.run_actions(&(), &doc(&["one"]), 0..=10).len(), 1);
        assert!(registry.run_actions(&(), &doc(&[]), 0..=0).is_empty());
        assert!(registry.run_actions(&(), &doc(&["one"]), 3..=5).is_empty());
    }

    #[test]
    fn test_failing_action_is_isolated() {
        let mut registry = SuggestionRegistry::<()>::new();
        registry
            .register(
                AnalyzerKind::Action,
                AnalyzerFn::line(|_, _| anyhow::bail!("broken")),
                AnalyzerMeta::new("broken"),
            )
            .unwrap();
        registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("upper"))
            .unwrap();

        let placed = registry.run_actions(&(), &doc(&["x"]), 0..=0);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].suggestion.source, "upper");
    }

    #[test]
    fn test_completions_until_first_valid() {
        let build = |until_first| {
            let mut registry = SuggestionRegistry::<()>::new().completion_until_first_valid(until_first);
            registry
                .register(
                    AnalyzerKind::Completion,
                    AnalyzerFn::document(|_, _| Ok(Vec::new())),
                    AnalyzerMeta::new("empty"),
                )
                .unwrap();
            for name in ["first", "second"] {
                registry
                    .register(
                        AnalyzerKind::Completion,
                        AnalyzerFn::document(move |_, view: &DocumentView<'_>| {
                            let word = view.cursor_text().unwrap_or_default();
                            Ok(vec![Suggestion::new(format!("{word}!"), name).with_edit("!")])
                        }),
                        AnalyzerMeta::new(name),
                    )
                    .unwrap();
            }
            registry
        };

        let document = doc(&["", "hello"]);
        let cursor = Position::new(1, 5);

        let all = build(false).run_completions(&(), &document, cursor);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].suggestion.message, "hello!");
        assert_eq!(all[0].range, Range::new(cursor, cursor));

        let first = build(true).run_completions(&(), &document, cursor);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].suggestion.source, "first");
    }

    #[test]
    fn test_diagnostics_isolate_failures() {
        let mut registry = SuggestionRegistry::<()>::new();
        registry
            .register(
                AnalyzerKind::Diagnostic,
                AnalyzerFn::document(|_, view: &DocumentView<'_>| {
                    Ok(view
                        .lines
                        .iter()
                        .enumerate()
                        .filter(|(_, line)| line.contains("TODO"))
                        .map(|(i, _)| Suggestion::new("Leftover TODO", "todo").on_line(i).with_span(0, 4))
                        .collect())
                }),
                AnalyzerMeta::new("todo"),
            )
            .unwrap();
        registry
            .register(
                AnalyzerKind::Diagnostic,
                AnalyzerFn::document(|_, _| -> anyhow::Result<Vec<Suggestion>> {
                    panic!("index out of range")
                }),
                AnalyzerMeta::new("panicky"),
            )
            .unwrap();
        registry
            .register(
                AnalyzerKind::Diagnostic,
                AnalyzerFn::document(|_, _| anyhow::bail!("no data")),
                AnalyzerMeta::new("failing"),
            )
            .unwrap();

        let placed = registry.run_diagnostics(&(), &doc(&["fine", "TODO later"]));
        assert_eq!(placed.len(), 3);

        assert_eq!(placed[0].suggestion.source, "todo");
        assert_eq!(placed[0].range, Range::new(Position::new(1, 0), Position::new(1, 4)));

        assert_eq!(placed[1].suggestion.source, "panicky");
        assert_eq!(placed[1].suggestion.severity, Severity::Error);
        assert!(placed[1].suggestion.message.contains("index out of range"));

        assert_eq!(placed[2].suggestion.source, "failing");
        assert_eq!(
            placed[2].suggestion.message,
            "Analyzer 'failing' failed: no data"
        );
    }

    #[test]
    fn test_diagnostics_publish() {
        let published: Rc<RefCell<Vec<(String, usize)>>> = Rc::default();
        let sink = Rc::clone(&published);

        let mut registry = SuggestionRegistry::<()>::new().with_publisher(move |uri, items| {
            sink.borrow_mut().push((uri.to_string(), items.len()));
        });
        registry
            .register(
                AnalyzerKind::Diagnostic,
                AnalyzerFn::document(|_, _| anyhow::bail!("always fails")),
                AnalyzerMeta::new("failing"),
            )
            .unwrap();

        assert!(registry.run_diagnostics(&(), &doc(&[])).is_empty());
        assert_eq!(registry.run_diagnostics(&(), &doc(&["text"])).len(), 1);

        assert_eq!(
            *published.borrow(),
            vec![
                ("file:///draft.codex".to_string(), 0),
                ("file:///draft.codex".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_unregister() {
        let mut registry = SuggestionRegistry::<()>::new();
        let handle = registry
            .register(AnalyzerKind::Action, upper_line(), AnalyzerMeta::new("upper"))
            .unwrap();
        assert_eq!(registry.analyzers(AnalyzerKind::Action).len(), 1);

        assert!(registry.unregister(handle));
        assert!(!registry.unregister(handle));
        assert!(registry.run_actions(&(), &doc(&["x"]), 0..=0).is_empty());
    }
}
