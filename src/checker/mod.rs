pub mod analyzers;
pub mod dictionary;
pub mod distance;
pub mod normalize;
pub mod tokenizer;

use crate::error::{Error, Result};
use crate::Config;
use dictionary::{Dictionary, Level};
use distance::{edit_distance, normalized_distance};
use normalize::{is_exempt, normalize, surface_form};
use regex::Regex;

/// Tuning for [`SpellChecker`], compiled from [`Config`].
#[derive(Debug, Clone)]
pub struct CheckerSettings {
    pub relative_checking: bool,
    pub max_suggestions: usize,
    pub max_normalized_distance: f64,
    pub max_completions: usize,
    pub ignore_patterns: Vec<Regex>,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            relative_checking: false,
            max_suggestions: 5,
            max_normalized_distance: 0.08,
            max_completions: 5,
            ignore_patterns: Vec::new(),
        }
    }
}

impl CheckerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.max_normalized_distance.is_finite() || config.max_normalized_distance < 0.0 {
            return Err(Error::configuration(format!(
                "max_normalized_distance must be a non-negative number, got {}",
                config.max_normalized_distance
            )));
        }

        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            let re = Regex::new(pattern).map_err(|e| {
                Error::configuration(format!("Invalid ignore pattern '{}': {}", pattern, e))
            })?;
            ignore_patterns.push(re);
        }

        Ok(Self {
            relative_checking: config.relative_checking,
            max_suggestions: config.max_suggestions,
            max_normalized_distance: config.max_normalized_distance,
            max_completions: config.max_completions,
            ignore_patterns,
        })
    }

    /// Levels treated as correct in the current mode.
    pub fn accepted_levels(&self) -> &'static [Level] {
        if self.relative_checking {
            &[Level::Verified, Level::VerifiedAuto]
        } else {
            &[Level::Verified]
        }
    }
}

/// Read-only view over a [`Dictionary`] that decides correctness and ranks
/// correction candidates.
pub struct SpellChecker<'a> {
    dictionary: &'a Dictionary,
    settings: &'a CheckerSettings,
}

impl<'a> SpellChecker<'a> {
    pub fn new(dictionary: &'a Dictionary, settings: &'a CheckerSettings) -> Self {
        Self {
            dictionary,
            settings,
        }
    }

    fn is_accepted(&self, level: Level) -> bool {
        self.settings.accepted_levels().contains(&level)
    }

    fn should_ignore(&self, word: &str) -> bool {
        if is_exempt(word) {
            return true;
        }

        let surface = surface_form(word);
        self.settings
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.is_match(surface))
    }

    /// False iff the word is exempt or an accepted-level entry matches it.
    pub fn is_correction_needed(&self, word: &str) -> bool {
        if self.should_ignore(word) {
            return false;
        }

        match self.dictionary.get(word) {
            Some(entry) => !self.is_accepted(entry.level),
            None => true,
        }
    }

    /// Up to `max_suggestions` head words ranked by length-normalized distance.
    ///
    /// Returns `[normalized word]` when nothing needs correcting. When no entry
    /// is close enough, returns the first accepted entry in head word order
    /// (or the first entry of any level) so the caller always gets something
    /// to offer while the dictionary has entries.
    pub fn check(&self, word: &str) -> Vec<String> {
        let normalized = normalize(word);

        if !self.is_correction_needed(word) {
            return vec![normalized];
        }

        let accepted = self
            .dictionary
            .entries_at_level(self.settings.accepted_levels());

        let mut candidates: Vec<(f64, &str)> = accepted
            .iter()
            .filter_map(|entry| {
                let score = normalized_distance(&entry.key(), &normalized);
                (score <= self.settings.max_normalized_distance)
                    .then_some((score, entry.head_word.as_str()))
            })
            .collect();

        if candidates.is_empty() {
            return accepted
                .first()
                .copied()
                .or_else(|| self.dictionary.entries().next())
                .map(|entry| vec![entry.head_word.clone()])
                .unwrap_or_default();
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates
            .into_iter()
            .take(self.settings.max_suggestions)
            .map(|(_, head_word)| head_word.to_string())
            .collect()
    }

    /// Up to `max_completions` suffixes of Verified head words containing `prefix`.
    ///
    /// The prefix may occur anywhere in the head word; the suffix is whatever
    /// follows its first occurrence. Results are ordered by edit distance
    /// between suffix and prefix.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = surface_form(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut completions: Vec<(usize, String)> = self
            .dictionary
            .entries_at_level(&[Level::Verified])
            .iter()
            .filter_map(|entry| {
                let at = entry.head_word.find(prefix)?;
                let suffix = &entry.head_word[at + prefix.len()..];
                Some((edit_distance(suffix, prefix), suffix.to_string()))
            })
            .collect();

        completions.sort_by_key(|(distance, _)| *distance);
        completions
            .into_iter()
            .take(self.settings.max_completions)
            .map(|(_, suffix)| suffix)
            .collect()
    }
}
