//! Training session state machine
//!
//! `Idle → Selecting → AwaitingExamples → Reviewing → Grading → Idle`.
//! Selecting, AwaitingExamples and Grading only exist inside a single call;
//! between calls a session is either idle or reviewing.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::services::due::pick_due;
use crate::services::generator::{GenerationError, SentenceGenerator};
use crate::store::{StoreError, WordStore, MAX_LEVEL, MIN_LEVEL};

/// Number of example sentences requested per session.
pub const EXAMPLE_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Selecting,
    AwaitingExamples,
    Reviewing,
    Grading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Good,
    Medium,
    Bad,
}

impl Grade {
    /// Next level for an entry currently at `level`, always within 0..=5.
    pub fn apply(self, level: i32) -> i32 {
        let next = match self {
            Self::Good => level.saturating_add(1),
            Self::Medium => level,
            Self::Bad => level.saturating_sub(1),
        };
        next.clamp(MIN_LEVEL, MAX_LEVEL)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Medium => "medium",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "medium" => Ok(Self::Medium),
            "bad" => Ok(Self::Bad),
            other => Err(format!("unknown grade '{other}'")),
        }
    }
}

/// The word picked for a session, before examples exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub word: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    target_word: String,
    target_level: i32,
    target_index: usize,
    sentences: Vec<String>,
    translations: Vec<String>,
}

impl ActiveSession {
    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    pub fn target_level(&self) -> i32 {
        self.target_level
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Always a prefix-companion of [`Self::sentences`]: entry `i` translates sentence `i`.
    pub fn translations(&self) -> &[String] {
        &self.translations
    }

    pub fn next_untranslated(&self) -> Option<&str> {
        self.sentences.get(self.translations.len()).map(String::as_str)
    }

    pub fn is_fully_translated(&self) -> bool {
        self.translations.len() >= self.sentences.len()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no training session is active")]
    NoActiveSession,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("word '{0}' is no longer in the list")]
    TargetMissing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateOutcome {
    Revealed { index: usize, translation: String },
    AllRevealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub word: String,
    pub grade: Grade,
    pub previous_level: i32,
    pub new_level: i32,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingSession {
    active: Option<ActiveSession>,
}

impl TrainingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.active.is_some() {
            SessionPhase::Reviewing
        } else {
            SessionPhase::Idle
        }
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(word = %active.target_word, "session discarded");
        }
    }

    /// Picks one due word uniformly at random, or `None` when nothing is due.
    pub fn select<R: Rng + ?Sized>(store: &WordStore, today: NaiveDate, rng: &mut R) -> Option<Selection> {
        let index = pick_due(store.entries(), today, rng)?;
        let entry = store.get(index)?;
        Some(Selection {
            index,
            word: entry.word.clone(),
            level: entry.level,
        })
    }

    /// Fetches examples for `selection` and enters Reviewing. Any previous
    /// session is discarded first; on failure the session stays idle.
    pub async fn begin<G>(&mut self, selection: Selection, generator: &G) -> Result<&ActiveSession, SessionError>
    where
        G: SentenceGenerator + ?Sized,
    {
        self.reset();
        transition(SessionPhase::Selecting, SessionPhase::AwaitingExamples, &selection.word);

        let sentences = match generator.generate_examples(&selection.word, EXAMPLE_COUNT).await {
            Ok(sentences) => sentences,
            Err(err) => {
                transition(SessionPhase::AwaitingExamples, SessionPhase::Idle, &selection.word);
                return Err(err.into());
            }
        };

        transition(SessionPhase::AwaitingExamples, SessionPhase::Reviewing, &selection.word);
        info!(word = %selection.word, level = selection.level, sentences = sentences.len(), "session started");

        Ok(&*self.active.insert(ActiveSession {
            target_word: selection.word,
            target_level: selection.level,
            target_index: selection.index,
            sentences,
            translations: Vec::new(),
        }))
    }

    /// Translates the first sentence without a translation and appends it.
    /// No-op once every sentence is translated; a failure leaves the list as is.
    pub async fn translate_next<G>(&mut self, generator: &G) -> Result<TranslateOutcome, SessionError>
    where
        G: SentenceGenerator + ?Sized,
    {
        let active = self.active.as_mut().ok_or(SessionError::NoActiveSession)?;
        let Some(sentence) = active.next_untranslated().map(str::to_string) else {
            return Ok(TranslateOutcome::AllRevealed);
        };

        let translation = generator.translate(&sentence, &active.target_word).await?;
        let index = active.translations.len();
        active.translations.push(translation.clone());
        debug!(word = %active.target_word, index, "translation revealed");

        Ok(TranslateOutcome::Revealed { index, translation })
    }

    /// Applies `grade` to the target word, persists the store and ends the
    /// session. If the write fails, neither the store nor the session change.
    pub fn grade(&mut self, store: &mut WordStore, grade: Grade, today: NaiveDate) -> Result<GradeOutcome, SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NoActiveSession)?;
        let word = active.target_word.clone();
        let target_index = active.target_index;
        let target_level = active.target_level;
        transition(SessionPhase::Reviewing, SessionPhase::Grading, &word);

        let index = match store.get(target_index) {
            Some(entry) if entry.word == word => Some(target_index),
            _ => store.position(&word),
        };
        let Some(index) = index else {
            // Nothing left to grade against, so the session cannot continue.
            self.active = None;
            transition(SessionPhase::Grading, SessionPhase::Idle, &word);
            return Err(SessionError::TargetMissing(word));
        };
        let previous_level = store.get(index).map(|e| e.level).unwrap_or(target_level);
        let new_level = grade.apply(previous_level);

        store.commit(|entries| {
            if let Some(entry) = entries.get_mut(index) {
                entry.level = new_level;
                entry.mark_reviewed(today);
            }
        })?;

        self.active = None;
        transition(SessionPhase::Grading, SessionPhase::Idle, &word);
        info!(word = %word, %grade, previous_level, new_level, "word graded");

        Ok(GradeOutcome { word, grade, previous_level, new_level })
    }
}

fn transition(from: SessionPhase, to: SessionPhase, word: &str) {
    debug!(?from, ?to, word, "session transition");
}
