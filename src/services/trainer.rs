//! Interactive-action dispatcher
//!
//! Owns the word store and the training session, and turns each actor
//! action into an [`ActionOutcome`] message for display.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::services::due::due_indices;
use crate::services::generator::SentenceGenerator;
use crate::services::session::{
    Grade, GradeOutcome, SessionError, SessionPhase, TrainingSession, TranslateOutcome,
};
use crate::store::{AddWordError, VocabEntry, WordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddWord(String),
    StartSession,
    RequestNextTranslation,
    Grade(Grade),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCode {
    WordAdded,
    EmptyWord,
    DuplicateWord,
    NothingDue,
    SessionStarted,
    TranslationRevealed,
    AllTranslated,
    Graded,
    NoActiveSession,
    ExternalService,
    TargetMissing,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub level: OutcomeLevel,
    pub code: OutcomeCode,
    pub message: String,
}

impl ActionOutcome {
    fn new(level: OutcomeLevel, code: OutcomeCode, message: impl Into<String>) -> Self {
        Self { level, code, message: message.into() }
    }

    /// True when the action was rejected or failed. A "bad" grade is a
    /// warning-level message but still a completed action.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.code,
            OutcomeCode::EmptyWord
                | OutcomeCode::DuplicateWord
                | OutcomeCode::NoActiveSession
                | OutcomeCode::ExternalService
                | OutcomeCode::TargetMissing
                | OutcomeCode::Persistence
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhase,
    pub word: Option<String>,
    pub level: Option<i32>,
    pub sentences: Vec<String>,
    pub translations: Vec<String>,
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct Trainer {
    store: WordStore,
    session: TrainingSession,
    generator: Arc<dyn SentenceGenerator>,
}

impl Trainer {
    pub fn new(store: WordStore, generator: Arc<dyn SentenceGenerator>) -> Self {
        Self {
            store,
            session: TrainingSession::new(),
            generator,
        }
    }

    pub fn store(&self) -> &WordStore {
        &self.store
    }

    pub fn session(&self) -> &TrainingSession {
        &self.session
    }

    pub fn due_words(&self, today: NaiveDate) -> Vec<VocabEntry> {
        due_indices(self.store.entries(), today)
            .into_iter()
            .filter_map(|index| self.store.get(index).cloned())
            .collect()
    }

    pub fn view(&self) -> SessionView {
        match self.session.active() {
            Some(active) => SessionView {
                phase: self.session.phase(),
                word: Some(active.target_word().to_string()),
                level: Some(active.target_level()),
                sentences: active.sentences().to_vec(),
                translations: active.translations().to_vec(),
            },
            None => SessionView {
                phase: self.session.phase(),
                word: None,
                level: None,
                sentences: Vec::new(),
                translations: Vec::new(),
            },
        }
    }

    pub async fn dispatch(&mut self, action: Action) -> ActionOutcome {
        self.dispatch_on(action, local_today()).await
    }

    pub async fn dispatch_on(&mut self, action: Action, today: NaiveDate) -> ActionOutcome {
        match action {
            Action::AddWord(word) => self.add_word(&word, today),
            Action::StartSession => self.start_session(today).await,
            Action::RequestNextTranslation => self.translate_next().await,
            Action::Grade(grade) => self.grade(grade, today),
        }
    }

    pub fn add_word(&mut self, word: &str, today: NaiveDate) -> ActionOutcome {
        match self.store.add_word(word, today) {
            Ok(entry) => {
                info!(word = %entry.word, "word added");
                ActionOutcome::new(
                    OutcomeLevel::Success,
                    OutcomeCode::WordAdded,
                    format!("Word '{}' added", entry.word),
                )
            }
            Err(AddWordError::Empty) => ActionOutcome::new(
                OutcomeLevel::Warning,
                OutcomeCode::EmptyWord,
                "Enter a word before adding it",
            ),
            Err(AddWordError::Duplicate(word)) => ActionOutcome::new(
                OutcomeLevel::Warning,
                OutcomeCode::DuplicateWord,
                format!("Word '{word}' is already in the list"),
            ),
            Err(AddWordError::Store(err)) => {
                error!(error = %err, "failed to persist new word");
                ActionOutcome::new(
                    OutcomeLevel::Error,
                    OutcomeCode::Persistence,
                    format!("Could not save the word list: {err}"),
                )
            }
        }
    }

    pub async fn start_session(&mut self, today: NaiveDate) -> ActionOutcome {
        self.session.reset();
        let selection = {
            let mut rng = rand::rng();
            TrainingSession::select(&self.store, today, &mut rng)
        };
        let Some(selection) = selection else {
            return ActionOutcome::new(
                OutcomeLevel::Info,
                OutcomeCode::NothingDue,
                "No words need training right now",
            );
        };

        match self.session.begin(selection, self.generator.as_ref()).await {
            Ok(active) => ActionOutcome::new(
                OutcomeLevel::Success,
                OutcomeCode::SessionStarted,
                format!("Training word '{}'", active.target_word()),
            ),
            Err(err) => session_failure(err),
        }
    }

    pub async fn translate_next(&mut self) -> ActionOutcome {
        match self.session.translate_next(self.generator.as_ref()).await {
            Ok(TranslateOutcome::Revealed { index, translation }) => ActionOutcome::new(
                OutcomeLevel::Success,
                OutcomeCode::TranslationRevealed,
                format!("{}. {translation}", index + 1),
            ),
            Ok(TranslateOutcome::AllRevealed) => ActionOutcome::new(
                OutcomeLevel::Info,
                OutcomeCode::AllTranslated,
                "All sentences are already translated",
            ),
            Err(err) => session_failure(err),
        }
    }

    pub fn grade(&mut self, grade: Grade, today: NaiveDate) -> ActionOutcome {
        match self.session.grade(&mut self.store, grade, today) {
            Ok(outcome) => graded(outcome),
            Err(err) => session_failure(err),
        }
    }
}

fn graded(outcome: GradeOutcome) -> ActionOutcome {
    let GradeOutcome { word, grade, new_level, .. } = outcome;
    match grade {
        Grade::Good => ActionOutcome::new(
            OutcomeLevel::Success,
            OutcomeCode::Graded,
            format!("Great! '{word}' moved up to level {new_level}"),
        ),
        Grade::Medium => ActionOutcome::new(
            OutcomeLevel::Info,
            OutcomeCode::Graded,
            format!("Level of '{word}' unchanged, review date updated"),
        ),
        Grade::Bad => ActionOutcome::new(
            OutcomeLevel::Warning,
            OutcomeCode::Graded,
            format!("'{word}' moved down to level {new_level}"),
        ),
    }
}

fn session_failure(err: SessionError) -> ActionOutcome {
    match err {
        SessionError::NoActiveSession => ActionOutcome::new(
            OutcomeLevel::Warning,
            OutcomeCode::NoActiveSession,
            "Start a training session first",
        ),
        SessionError::Generation(err) => {
            warn!(error = %err, "generation service failed");
            ActionOutcome::new(OutcomeLevel::Error, OutcomeCode::ExternalService, err.to_string())
        }
        SessionError::TargetMissing(word) => ActionOutcome::new(
            OutcomeLevel::Error,
            OutcomeCode::TargetMissing,
            format!("Word '{word}' is no longer in the list"),
        ),
        SessionError::Store(err) => {
            error!(error = %err, "failed to persist grade");
            ActionOutcome::new(
                OutcomeLevel::Error,
                OutcomeCode::Persistence,
                format!("Could not save the word list: {err}"),
            )
        }
    }
}
