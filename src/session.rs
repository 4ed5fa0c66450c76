use crate::checker::analyzers;
use crate::checker::dictionary::{Dictionary, Level};
use crate::checker::{CheckerSettings, SpellChecker};
use crate::error::Result;
use crate::pipeline::document::TextDocument;
use crate::pipeline::suggestion::{PlacedSuggestion, SuggestionCommand};
use crate::pipeline::SuggestionRegistry;
use crate::Config;
use lsp_types::Position;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

/// State shared read-only with every analyzer call.
#[derive(Debug)]
pub struct Workspace {
    pub config: Config,
    pub settings: CheckerSettings,
    pub dictionary: Dictionary,
}

impl Workspace {
    pub fn checker(&self) -> SpellChecker<'_> {
        SpellChecker::new(&self.dictionary, &self.settings)
    }
}

pub struct Session {
    workspace: Workspace,
    registry: SuggestionRegistry<Workspace>,
}

impl Session {
    /// Load the project's dictionary and register the spelling analyzers.
    ///
    /// Configuration problems fail here. Storage problems do not: the session
    /// starts with an empty in-memory dictionary instead.
    pub fn open(project_root: &Path, config: Config) -> Result<Self> {
        let dictionary = Dictionary::load_or_empty(
            &config.dictionary_dir(project_root),
            config.language.as_deref(),
        );
        info!(root = %project_root.display(), words = dictionary.len(), "Opened session");
        Self::with_dictionary(config, dictionary)
    }

    pub fn with_dictionary(config: Config, dictionary: Dictionary) -> Result<Self> {
        let settings = CheckerSettings::from_config(&config)?;
        let mut registry = SuggestionRegistry::new()
            .completion_until_first_valid(config.completion_until_first_valid);
        analyzers::register_spelling(&mut registry)?;

        Ok(Self {
            workspace: Workspace {
                config,
                settings,
                dictionary,
            },
            registry,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.workspace.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.workspace.dictionary
    }

    /// For maintenance commands; analyzers never get this.
    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.workspace.dictionary
    }

    pub fn registry(&self) -> &SuggestionRegistry<Workspace> {
        &self.registry
    }

    /// Register extra analyzers or set the diagnostic publisher.
    pub fn registry_mut(&mut self) -> &mut SuggestionRegistry<Workspace> {
        &mut self.registry
    }

    pub fn actions(
        &self,
        document: &TextDocument,
        lines: RangeInclusive<usize>,
    ) -> Vec<PlacedSuggestion> {
        self.registry.run_actions(&self.workspace, document, lines)
    }

    pub fn completions(&self, document: &TextDocument, cursor: Position) -> Vec<PlacedSuggestion> {
        self.registry.run_completions(&self.workspace, document, cursor)
    }

    pub fn diagnostics(&self, document: &TextDocument) -> Vec<PlacedSuggestion> {
        self.registry.run_diagnostics(&self.workspace, document)
    }

    /// Add words to the dictionary. `None` uses the configured level.
    ///
    /// Returns how many were new.
    pub fn add_words<S: AsRef<str>>(&mut self, words: &[S], level: Option<Level>) -> Result<usize> {
        let level = level.unwrap_or(self.workspace.config.added_word_level);
        let mut added = 0;
        for word in words {
            if self.workspace.dictionary.define(word.as_ref(), level)? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn apply_command(&mut self, command: &SuggestionCommand) -> Result<usize> {
        match command {
            SuggestionCommand::AddWords { words, level } => self.add_words(words.as_slice(), Some(*level)),
        }
    }
}
