//! Model interface consumed by the generation pipeline.
//!
//! Transport, authentication and retry belong to implementors. The pipeline
//! only needs to know whether a backend speaks chat and how to ask it for
//! one or more completions.

use serde::{Deserialize, Serialize};

/// Default token budget for a single completion.
pub const MAX_TOKENS_DEFAULT: u32 = 1024;

/// Raw model output.
///
/// Backends return a single text when one completion was requested and a
/// list when several were. Callers check the shape instead of guessing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Exactly one completion.
    One(String),
    /// Several completions, in the order the backend produced them.
    Many(Vec<String>),
}

impl Completion {
    /// Short name of the variant, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Completion::One(_) => "one",
            Completion::Many(_) => "many",
        }
    }

    /// Get the single text, if this is `One`.
    pub fn as_one(&self) -> Option<&str> {
        match self {
            Completion::One(text) => Some(text),
            Completion::Many(_) => None,
        }
    }

    /// Apply `f` to every text, keeping the shape.
    pub fn map<F>(self, mut f: F) -> Completion
    where
        F: FnMut(String) -> String,
    {
        match self {
            Completion::One(text) => Completion::One(f(text)),
            Completion::Many(texts) => Completion::Many(texts.into_iter().map(f).collect()),
        }
    }

    /// Flatten into a list regardless of shape.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Completion::One(text) => vec![text],
            Completion::Many(texts) => texts,
        }
    }
}

/// Sampling parameters forwarded verbatim to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Number of completions requested (1 = single text)
    pub num_comps: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Token budget per completion
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            num_comps: 1,
            temperature: 0.0,
            max_tokens: MAX_TOKENS_DEFAULT,
        }
    }
}

impl SamplingParams {
    /// Single completion with the given temperature and token budget.
    #[must_use]
    pub fn single(temperature: f32, max_tokens: u32) -> Self {
        Self {
            num_comps: 1,
            temperature,
            max_tokens,
        }
    }

    /// Same parameters with a different completion count.
    #[must_use]
    pub fn with_num_comps(self, num_comps: u32) -> Self {
        Self { num_comps, ..self }
    }
}

/// Errors raised by a model backend.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model `{0}` does not support chat requests")]
    ChatUnsupported(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A code-generating language model.
///
/// Calls block until the backend answers.
pub trait LanguageModel {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Whether the backend takes a system/user message pair.
    fn is_chat(&self) -> bool;

    /// Complete a single prompt.
    fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<Completion, ModelError>;

    /// Answer a system instruction plus user message.
    fn generate_chat(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<Completion, ModelError> {
        let _ = (system, user, params);
        Err(ModelError::ChatUnsupported(self.name().to_string()))
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_chat(&self) -> bool {
        (**self).is_chat()
    }

    fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<Completion, ModelError> {
        (**self).generate(prompt, params)
    }

    fn generate_chat(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<Completion, ModelError> {
        (**self).generate_chat(system, user, params)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_chat(&self) -> bool {
        (**self).is_chat()
    }

    fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<Completion, ModelError> {
        (**self).generate(prompt, params)
    }

    fn generate_chat(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<Completion, ModelError> {
        (**self).generate_chat(system, user, params)
    }
}
