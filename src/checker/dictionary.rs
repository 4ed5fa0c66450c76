use crate::checker::normalize::{normalize, surface_form};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, error, info};
use uuid::Uuid;

/// File every project starts with, and where new words land.
pub const DEFAULT_FILE_NAME: &str = "project.dictionary";
pub const FILE_EXTENSION: &str = "dictionary";

/// Trust tier of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Unverified,
    Verified,
    VerifiedAuto,
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "unverified" => Ok(Level::Unverified),
            "verified" => Ok(Level::Verified),
            "verified_auto" | "auto" => Ok(Level::VerifiedAuto),
            other => Err(Error::configuration(format!(
                "Unknown verification level: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Unverified => write!(f, "unverified"),
            Level::Verified => write!(f, "verified"),
            Level::VerifiedAuto => write!(f, "verified_auto"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One word of the project dictionary, in its on-disk shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub head_word: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub translation_equivalents: Vec<String>,
    #[serde(default)]
    pub links: BTreeSet<Uuid>,
    #[serde(default)]
    pub linked_entries: Vec<Uuid>,
    #[serde(default)]
    pub metadata: EntryMetadata,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DictionaryEntry {
    pub fn new(head_word: &str, level: Level) -> Self {
        Self {
            head_word: head_word.to_string(),
            level,
            id: Uuid::new_v4(),
            definition: None,
            translation_equivalents: Vec::new(),
            links: BTreeSet::new(),
            linked_entries: Vec::new(),
            metadata: EntryMetadata::default(),
            notes: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Identity key: punctuation stripped, case folded.
    pub fn key(&self) -> String {
        normalize(&self.head_word)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    entries: Vec<DictionaryEntry>,
}

#[derive(Debug)]
struct BackingFile {
    path: PathBuf,
    entries: Vec<DictionaryEntry>,
}

/// Project-scoped word store.
///
/// The in-memory index is the union of every backing file in scope; the first
/// file (in name order) wins when two files define the same word. Mutations are
/// written through before they return.
#[derive(Debug)]
pub struct Dictionary {
    entries: BTreeMap<String, DictionaryEntry>,
    files: Vec<BackingFile>,
    primary: Option<usize>,
}

impl Dictionary {
    /// Dictionary with no backing storage. Mutations only touch memory.
    pub fn in_memory() -> Self {
        Self {
            entries: BTreeMap::new(),
            files: Vec::new(),
            primary: None,
        }
    }

    /// Directory holding the backing files for a project and optional language.
    pub fn storage_dir(project_path: &Path, language: Option<&str>) -> PathBuf {
        match language {
            Some(language) if !language.is_empty() => project_path.join(language),
            _ => project_path.to_path_buf(),
        }
    }

    /// Load every backing file under `project_path` (scoped by `language`).
    ///
    /// Creates the directory and an empty default file if nothing is there yet.
    pub fn load(project_path: &Path, language: Option<&str>) -> Result<Self> {
        let dir = Self::storage_dir(project_path, language);

        fs::create_dir_all(&dir).map_err(|e| Error::storage(&dir, e))?;

        let mut paths = Self::backing_paths(&dir)?;
        if paths.is_empty() {
            let path = dir.join(DEFAULT_FILE_NAME);
            write_atomic(&path, &DictionaryFile::default())?;
            info!(path = %path.display(), "Created empty dictionary");
            paths.push(path);
        }

        let mut dictionary = Self::in_memory();
        for path in paths {
            let entries = read_file(&path)?;
            dictionary.attach(path, entries);
        }

        info!(
            dir = %dir.display(),
            files = dictionary.files.len(),
            entries = dictionary.entries.len(),
            "Loaded dictionary"
        );

        Ok(dictionary)
    }

    /// Like [`Dictionary::load`], but storage failures fall back to an empty
    /// in-memory dictionary so the session can carry on.
    pub fn load_or_empty(project_path: &Path, language: Option<&str>) -> Self {
        match Self::load(project_path, language) {
            Ok(dictionary) => dictionary,
            Err(e) => {
                error!(error = %e, "Dictionary unavailable, using an empty in-memory dictionary");
                Self::in_memory()
            }
        }
    }

    fn backing_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::storage(dir, e))? {
            let path = entry.map_err(|e| Error::storage(dir, e))?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(FILE_EXTENSION)
            {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn attach(&mut self, path: PathBuf, entries: Vec<DictionaryEntry>) {
        let index = self.files.len();
        for entry in &entries {
            let key = entry.key();
            if key.is_empty() {
                continue;
            }
            self.entries.entry(key).or_insert_with(|| entry.clone());
        }

        let is_default = path.file_name().and_then(|s| s.to_str()) == Some(DEFAULT_FILE_NAME);
        if self.primary.is_none() || is_default {
            self.primary = Some(index);
        }

        self.files.push(BackingFile { path, entries });
    }

    /// Add `word` at `level` unless an entry with the same normalized form exists.
    ///
    /// Returns true if an entry was added.
    pub fn define(&mut self, word: &str, level: Level) -> Result<bool> {
        let key = normalize(word);
        if key.is_empty() || self.entries.contains_key(&key) {
            return Ok(false);
        }

        let entry = DictionaryEntry::new(surface_form(word), level);
        self.entries.insert(key.clone(), entry.clone());

        if let Some(index) = self.primary {
            self.files[index].entries.push(entry);
            if let Err(e) = self.persist(index) {
                self.files[index].entries.pop();
                self.entries.remove(&key);
                return Err(e);
            }
        }

        debug!(word = %key, %level, "Defined word");
        Ok(true)
    }

    /// Delete every entry whose normalized form matches `word`, in every file.
    ///
    /// Returns the number of entries removed from storage (or memory when
    /// there is no storage). Absent words are not an error.
    pub fn remove(&mut self, word: &str) -> Result<usize> {
        let key = normalize(word);
        let Some(removed) = self.entries.remove(&key) else {
            return Ok(0);
        };

        let mut count = 0;
        let mut written: Vec<(usize, Vec<DictionaryEntry>)> = Vec::new();
        for index in 0..self.files.len() {
            if !self.files[index].entries.iter().any(|e| e.key() == key) {
                continue;
            }
            let before = self.files[index].entries.clone();
            self.files[index].entries.retain(|e| e.key() != key);
            let dropped = before.len() - self.files[index].entries.len();

            if let Err(e) = self.persist(index) {
                self.files[index].entries = before;
                self.restore(written);
                self.entries.insert(key, removed);
                return Err(e);
            }
            written.push((index, before));
            count += dropped;
        }

        debug!(word = %key, removed = count, "Removed word");
        Ok(count.max(1))
    }

    /// Put back files already rewritten by a mutation that failed part way.
    fn restore(&mut self, written: Vec<(usize, Vec<DictionaryEntry>)>) {
        for (index, entries) in written.into_iter().rev() {
            self.files[index].entries = entries;
            if let Err(e) = self.persist(index) {
                error!(error = %e, "Failed to restore dictionary file");
            }
        }
    }

    fn persist(&self, index: usize) -> Result<()> {
        let file = &self.files[index];
        let document = DictionaryFile {
            entries: file.entries.clone(),
        };
        write_atomic(&file.path, &document)
    }

    /// Entry stored under the normalized form of `word`.
    pub fn get(&self, word: &str) -> Option<&DictionaryEntry> {
        self.entries.get(&normalize(word))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&normalize(word))
    }

    /// Entries whose level is in `levels`, ordered by normalized head word.
    pub fn entries_at_level(&self, levels: &[Level]) -> Vec<&DictionaryEntry> {
        self.entries
            .values()
            .filter(|entry| levels.contains(&entry.level))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backing files, in load order.
    pub fn source_paths(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    /// File new words are written to, if any.
    pub fn primary_path(&self) -> Option<&Path> {
        self.primary.map(|index| self.files[index].path.as_path())
    }
}

fn read_file(path: &Path) -> Result<Vec<DictionaryEntry>> {
    let file = fs::File::open(path).map_err(|e| Error::storage(path, e))?;
    let reader = BufReader::new(file);
    let document: DictionaryFile =
        serde_json::from_reader(reader).map_err(|e| Error::storage(path, e))?;
    Ok(document.entries)
}

/// Write to a temporary file next to `path`, then move it over `path`.
fn write_atomic(path: &Path, document: &DictionaryFile) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp = NamedTempFile::new_in(dir).map_err(|e| Error::storage(path, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, document).map_err(|e| Error::storage(path, e))?;
        writer.flush().map_err(|e| Error::storage(path, e))?;
    }
    temp.persist(path).map_err(|e| Error::storage(path, e.error))?;
    Ok(())
}
