use crate::checker::dictionary::Level;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE: &str = ".codexspell.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language scope inside the data directory, if dictionaries are split by language
    pub language: Option<String>,

    /// Dictionary directory, relative to the project root
    pub data_dir: String,

    /// Accept `verified_auto` entries as correct, not just `verified`
    pub relative_checking: bool,

    pub max_suggestions: usize,

    /// Edit distance divided by candidate length; candidates above it are dropped
    pub max_normalized_distance: f64,

    pub max_completions: usize,

    pub completion_until_first_valid: bool,

    /// Level given to words added from the editor
    pub added_word_level: Level,

    pub ignore_patterns: Vec<String>,

    /// Only documents with these extensions are analyzed
    pub document_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: None,
            data_dir: "project_data".to_string(),
            relative_checking: false,
            max_suggestions: 5,
            max_normalized_distance: 0.08,
            max_completions: 5,
            completion_until_first_valid: false,
            added_word_level: Level::Verified,
            ignore_patterns: vec![
                r"https?://\S+".to_string(),                                   // URLs
                r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(), // Emails
            ],
            document_extensions: vec!["codex".to_string(), "scripture".to_string()],
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > project config > global config > defaults
    pub fn load(
        project_root: &Path,
        language: Option<String>,
        relative_checking: Option<bool>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load project config (overrides global)
        let local_path = project_root.join(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        // Apply CLI overrides
        if language.is_some() {
            config.language = language;
        }
        if let Some(relative) = relative_checking {
            config.relative_checking = relative;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        let defaults = Self::default();

        if other.language.is_some() {
            self.language = other.language;
        }
        if other.data_dir != defaults.data_dir {
            self.data_dir = other.data_dir;
        }
        if other.max_suggestions != defaults.max_suggestions {
            self.max_suggestions = other.max_suggestions;
        }
        if other.max_normalized_distance != defaults.max_normalized_distance {
            self.max_normalized_distance = other.max_normalized_distance;
        }
        if other.max_completions != defaults.max_completions {
            self.max_completions = other.max_completions;
        }
        if other.added_word_level != defaults.added_word_level {
            self.added_word_level = other.added_word_level;
        }
        if other.ignore_patterns != defaults.ignore_patterns {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.document_extensions != defaults.document_extensions {
            self.document_extensions = other.document_extensions;
        }
        self.relative_checking = other.relative_checking;
        self.completion_until_first_valid = other.completion_until_first_valid;
        self
    }

    /// Directory the dictionary files live in, before language scoping.
    pub fn dictionary_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.data_dir)
    }

    /// True if a document at `uri` (or path) should be analyzed.
    pub fn accepts_document(&self, uri: &str) -> bool {
        let name = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
        match name.rsplit_once('.') {
            Some((_, ext)) => self
                .document_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "codexspell").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
