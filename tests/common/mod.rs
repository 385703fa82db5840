#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use wortschatz_trainer::services::generator::{GenerationError, SentenceGenerator};
use wortschatz_trainer::services::llm_provider::LLMError;
use wortschatz_trainer::services::trainer::Trainer;
use wortschatz_trainer::store::WordStore;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Writes a word list with the given `(word, level, date)` rows and opens it.
pub fn seeded_store(path: &Path, rows: &[(&str, i32, &str)]) -> WordStore {
    let mut content = String::from("Wort,Niveau,Hinzugefügt am\n");
    for (word, level, date) in rows {
        content.push_str(&format!("{word},{level},{date}\n"));
    }
    std::fs::write(path, content).unwrap();
    WordStore::open(path).unwrap()
}

pub fn translation_of(sentence: &str) -> String {
    format!("DE: {sentence}")
}

/// Generator with queued answers. When a queue is empty it falls back to
/// `default_examples` and to [`translation_of`].
pub struct ScriptedGenerator {
    default_examples: Vec<String>,
    examples: Mutex<VecDeque<Result<Vec<String>, GenerationError>>>,
    translations: Mutex<VecDeque<Result<String, GenerationError>>>,
    example_calls: AtomicUsize,
    translate_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(default_examples: &[&str]) -> Self {
        Self {
            default_examples: default_examples.iter().map(|s| s.to_string()).collect(),
            examples: Mutex::new(VecDeque::new()),
            translations: Mutex::new(VecDeque::new()),
            example_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
        }
    }

    pub fn numbered(count: usize) -> Self {
        let sentences: Vec<String> = (1..=count).map(|i| format!("Предложение {i}.")).collect();
        let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        Self::new(&refs)
    }

    pub fn fail_next_examples(&self) {
        self.examples
            .lock()
            .unwrap()
            .push_back(Err(GenerationError::Examples(LLMError::MissingContent)));
    }

    pub fn fail_next_translation(&self) {
        self.translations
            .lock()
            .unwrap()
            .push_back(Err(GenerationError::Translation(LLMError::MissingContent)));
    }

    pub fn example_calls(&self) -> usize {
        self.example_calls.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentenceGenerator for ScriptedGenerator {
    async fn generate_examples(&self, _word: &str, count: usize) -> Result<Vec<String>, GenerationError> {
        self.example_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.examples.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => Ok(self.default_examples.iter().take(count).cloned().collect()),
        }
    }

    async fn translate(&self, sentence: &str, _word: &str) -> Result<String, GenerationError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.translations.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => Ok(translation_of(sentence)),
        }
    }
}

pub fn trainer_with(store: WordStore, generator: &Arc<ScriptedGenerator>) -> Trainer {
    let generator: Arc<dyn SentenceGenerator> = generator.clone();
    Trainer::new(store, generator)
}
