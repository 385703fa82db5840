//! Example-sentence and translation generation
//!
//! [`SentenceGenerator`] is the seam the training session talks to. The
//! production implementation asks a chat-completion service for plain-text
//! answers and validates every response before handing it on.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::services::llm_provider::{LLMError, LLMProvider};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not fetch examples: {0}")]
    Examples(#[source] LLMError),
    #[error("could not fetch translation: {0}")]
    Translation(#[source] LLMError),
    #[error("service returned no usable sentences")]
    NoSentences,
    #[error("service returned an empty translation")]
    EmptyTranslation,
}

#[async_trait]
pub trait SentenceGenerator: Send + Sync {
    /// Up to `count` short native-language sentences built around `word`.
    async fn generate_examples(&self, word: &str, count: usize) -> Result<Vec<String>, GenerationError>;

    /// German rendering of `sentence`, given the word being trained.
    async fn translate(&self, sentence: &str, word: &str) -> Result<String, GenerationError>;
}

pub fn examples_prompt(word: &str, count: usize) -> String {
    format!(
        "Придумай {count} коротких предложений из нескольких слов на русском языке \
         с использованием слова '{word}' (перевода этого немецкого слова). \
         Никаких заголовков, вводных фраз, подписей или нумерации: только сами фразы, \
         каждая с новой строки. Ответ читает программа, поэтому формат строго такой:\n\
         фраза 1\nфраза 2\nфраза 3\n..."
    )
}

pub fn translation_prompt(sentence: &str, word: &str) -> String {
    format!(
        "Переведи на немецкий: '{sentence}', с учётом того, что я тренирую слово {word}. \
         Ответ читает программа, поэтому никаких других подписей: только перевод на немецкий."
    )
}

/// Splits a model answer into sentences: one per line, blanks dropped,
/// at most `count` kept.
pub fn parse_sentences(content: &str, count: usize) -> Vec<String> {
    content
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(count)
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct LlmSentenceGenerator {
    provider: LLMProvider,
}

impl LlmSentenceGenerator {
    pub fn new(provider: LLMProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SentenceGenerator for LlmSentenceGenerator {
    async fn generate_examples(&self, word: &str, count: usize) -> Result<Vec<String>, GenerationError> {
        let content = self
            .provider
            .complete(&examples_prompt(word, count))
            .await
            .map_err(|err| {
                warn!(word, error = %err, "example generation failed");
                GenerationError::Examples(err)
            })?;

        let sentences = parse_sentences(&content, count);
        if sentences.is_empty() {
            return Err(GenerationError::NoSentences);
        }
        debug!(word, count = sentences.len(), "examples generated");
        Ok(sentences)
    }

    async fn translate(&self, sentence: &str, word: &str) -> Result<String, GenerationError> {
        let content = self
            .provider
            .complete(&translation_prompt(sentence, word))
            .await
            .map_err(|err| {
                warn!(word, error = %err, "translation failed");
                GenerationError::Translation(err)
            })?;

        let translation = content.trim();
        if translation.is_empty() {
            return Err(GenerationError::EmptyTranslation);
        }
        Ok(translation.to_string())
    }
}
