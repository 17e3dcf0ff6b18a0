//! Scripted model for tests and dry runs.
//!
//! Replays queued responses in order and records every request it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::model::{Completion, LanguageModel, ModelError, SamplingParams};

/// A request observed by [`ScriptedModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// Completion-style request
    Completion {
        prompt: String,
        params: SamplingParams,
    },
    /// Chat-style request
    Chat {
        system: String,
        user: String,
        params: SamplingParams,
    },
}

/// Model double that returns queued responses.
///
/// Running out of responses is reported as a backend error.
#[derive(Debug)]
pub struct ScriptedModel {
    chat: bool,
    responses: Mutex<VecDeque<Result<Completion, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    /// Chat-capable scripted model.
    pub fn chat() -> Self {
        Self::new(true)
    }

    /// Completion-only scripted model.
    pub fn completion() -> Self {
        Self::new(false)
    }

    fn new(chat: bool) -> Self {
        Self {
            chat,
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response.
    #[must_use]
    pub fn respond(self, completion: Completion) -> Self {
        self.lock_responses().push_back(Ok(completion));
        self
    }

    /// Queue a single-text response.
    #[must_use]
    pub fn respond_text(self, text: impl Into<String>) -> Self {
        self.respond(Completion::One(text.into()))
    }

    /// Queue a backend failure.
    #[must_use]
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.lock_responses().push_back(Err(message.into()));
        self
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    fn next_response(&self, call: RecordedCall) -> Result<Completion, ModelError> {
        self.lock_calls().push(call);
        match self.lock_responses().pop_front() {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(message)) => Err(ModelError::Backend(message)),
            None => Err(ModelError::Backend("scripted responses exhausted".to_string())),
        }
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Completion, String>>> {
        self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        if self.chat {
            "scripted-chat"
        } else {
            "scripted-completion"
        }
    }

    fn is_chat(&self) -> bool {
        self.chat
    }

    fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<Completion, ModelError> {
        self.next_response(RecordedCall::Completion {
            prompt: prompt.to_string(),
            params: *params,
        })
    }

    fn generate_chat(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<Completion, ModelError> {
        if !self.chat {
            return Err(ModelError::ChatUnsupported(self.name().to_string()));
        }
        self.next_response(RecordedCall::Chat {
            system: system.to_string(),
            user: user.to_string(),
            params: *params,
        })
    }
}
