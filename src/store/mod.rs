//! Vocabulary record store
//!
//! The word list lives in a single CSV file with the columns
//! `Wort`, `Niveau` and `Hinzugefügt am`. The file is read once when the
//! store is opened and rewritten in full after every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const MIN_LEVEL: i32 = 0;
pub const MAX_LEVEL: i32 = 5;

const COLUMNS: [&str; 3] = ["Wort", "Niveau", "Hinzugefügt am"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("word list io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("word list csv failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum AddWordError {
    #[error("word is empty")]
    Empty,
    #[error("word '{0}' is already in the list")]
    Duplicate(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One row of the word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    #[serde(rename = "Wort")]
    pub word: String,
    #[serde(rename = "Niveau")]
    pub level: i32,
    /// Kept as the raw cell text so malformed dates survive a rewrite.
    #[serde(rename = "Hinzugefügt am")]
    pub last_reviewed: String,
}

impl VocabEntry {
    pub fn new(word: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            word: word.into(),
            level: MIN_LEVEL,
            last_reviewed: format_date(today),
        }
    }

    pub fn reviewed_on(&self) -> Option<NaiveDate> {
        parse_date(&self.last_reviewed).ok()
    }

    pub fn mark_reviewed(&mut self, today: NaiveDate) {
        self.last_reviewed = format_date(today);
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

pub struct WordStore {
    path: PathBuf,
    entries: Vec<VocabEntry>,
}

impl WordStore {
    /// Loads the word list from `path`. A missing file yields an empty store;
    /// the file is created on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            info!(path = %path.display(), "word list not found, starting empty");
            return Ok(Self { path, entries: Vec::new() });
        }

        let content = fs::read(&path)?;
        let entries = read_entries(&content)?;
        info!(path = %path.display(), count = entries.len(), "word list loaded");

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VocabEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, word: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.word == word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.position(word).is_some()
    }

    /// Appends a fresh entry at level 0 and persists the list. The word is
    /// stored and compared exactly as given; blank input is rejected.
    pub fn add_word(&mut self, word: &str, today: NaiveDate) -> Result<VocabEntry, AddWordError> {
        if word.trim().is_empty() {
            return Err(AddWordError::Empty);
        }
        if self.contains(word) {
            return Err(AddWordError::Duplicate(word.to_string()));
        }

        let entry = VocabEntry::new(word, today);
        let added = entry.clone();
        self.commit(move |entries| entries.push(entry))?;
        Ok(added)
    }

    /// Applies `mutate` to a copy of the entries, writes the copy to disk and
    /// only then swaps it in. On a failed write the in-memory list is untouched.
    pub fn commit<F>(&mut self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<VocabEntry>),
    {
        let mut next = self.entries.clone();
        mutate(&mut next);
        write_entries(&self.path, &next)?;
        self.entries = next;
        Ok(())
    }

    pub fn save(&self) -> Result<(), StoreError> {
        write_entries(&self.path, &self.entries)
    }
}

fn read_entries(content: &[u8]) -> Result<Vec<VocabEntry>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(content);

    let mut entries = Vec::new();
    for record in reader.deserialize::<VocabEntry>() {
        entries.push(record?);
    }
    Ok(entries)
}

fn encode_entries(entries: &[VocabEntry]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // Header is written by hand so an empty list still carries its columns.
    writer.write_record(COLUMNS)?;
    for entry in entries {
        writer.serialize(entry)?;
    }

    writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))
}

fn write_entries(path: &Path, entries: &[VocabEntry]) -> Result<(), StoreError> {
    let bytes = encode_entries(entries)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    debug!(path = %path.display(), count = entries.len(), "word list written");
    Ok(())
}
