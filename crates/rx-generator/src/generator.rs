//! Generation pipeline.
//!
//! One [`CodeGenerator`] binds a model, a language kit, its templates and a
//! seeded sampler. Calls are synchronous; each is a pure function of its
//! inputs, the model's answer and the sampler state.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rx_core::{
    Completion, LanguageModel, ModelError, SamplingParams, TemplateError, TemplateSet,
    MAX_TOKENS_DEFAULT,
};
use rx_lang::{Language, LanguageError, LanguageKit};
use rx_sample::{sample_n, DeterministicRng, SampleError};

use crate::postprocess::{clean_body, compose};
use crate::prompt::{ImplRequest, Prompt, PromptBuilder};

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Token budget per implementation completion
    pub impl_max_tokens: u32,
    /// Token budget for the single test generation call
    pub test_max_tokens: u32,
    /// Token budget for a self-reflection
    pub reflection_max_tokens: u32,
    /// Temperature for test generation and self-reflection
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            impl_max_tokens: MAX_TOKENS_DEFAULT,
            test_max_tokens: MAX_TOKENS_DEFAULT,
            reflection_max_tokens: MAX_TOKENS_DEFAULT,
            temperature: 0.0,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: &Path) -> Result<Self, GeneratorError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GeneratorError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| GeneratorError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// LLM-backed generator for implementations, tests and self-reflections.
pub struct CodeGenerator<M, K> {
    model: M,
    kit: K,
    templates: TemplateSet,
    config: GeneratorConfig,
    rng: DeterministicRng,
}

impl<M: LanguageModel> CodeGenerator<M, Box<dyn LanguageKit>> {
    /// Create a generator with a language's kit and preset templates.
    pub fn for_language(
        model: M,
        language: Language,
        config: GeneratorConfig,
        rng: DeterministicRng,
    ) -> Self {
        Self::new(model, language.kit(), language.templates(), config, rng)
    }
}

impl<M: LanguageModel, K: LanguageKit> CodeGenerator<M, K> {
    /// Create a new generator.
    pub fn new(
        model: M,
        kit: K,
        templates: TemplateSet,
        config: GeneratorConfig,
        rng: DeterministicRng,
    ) -> Self {
        Self {
            model,
            kit,
            templates,
            config,
            rng,
        }
    }

    /// Seed of the sampler, for reproduction.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Generate one or more implementations of `request.signature`.
    ///
    /// Every returned string is the signature followed by a cleaned body.
    /// `num_comps == 1` yields `Completion::One`, larger counts yield
    /// `Completion::Many` in backend order. The backend must answer in the
    /// matching shape.
    pub fn generate_implementation(
        &self,
        request: &ImplRequest<'_>,
    ) -> Result<Completion, GeneratorError> {
        if request.num_comps == 0 {
            return Err(GeneratorError::InvalidArgument(
                "num_comps must be at least 1".to_string(),
            ));
        }

        let prompt = PromptBuilder::build_impl_prompt(
            request,
            &self.templates.implementation,
            self.model.is_chat(),
        )?;
        let params = SamplingParams::single(request.temperature, self.config.impl_max_tokens)
            .with_num_comps(request.num_comps);

        info!(
            model = self.model.name(),
            language = self.kit.name(),
            strategy = %request.strategy,
            num_comps = request.num_comps,
            "Generating implementation"
        );

        let raw = self.dispatch(&prompt, &params)?;
        let raw = expect_shape(request.num_comps, raw)?;

        let signature = request.signature;
        let codes = raw.map(|body| compose(signature, &clean_body(&self.kit, signature, &body)));

        match &codes {
            Completion::One(code) => debug!("Generated implementation:\n{}", code),
            Completion::Many(codes) => debug!("Generated implementations:\n{:#?}", codes),
        }

        Ok(codes)
    }

    /// Generate unit tests for `signature`.
    ///
    /// Issues one model call, parses and filters the output with the
    /// language kit, then samples at most `max_num_tests` survivors.
    /// `committee_size` is accepted for interface compatibility; a single
    /// generation is made regardless.
    pub fn generate_tests(
        &mut self,
        signature: &str,
        committee_size: u32,
        max_num_tests: usize,
        is_react: bool,
    ) -> Result<Vec<String>, GeneratorError> {
        let chat = self.model.is_chat();
        let prompt = PromptBuilder::build_test_prompt(signature, &self.templates.tests, chat, is_react);
        let params = SamplingParams::single(self.config.temperature, self.config.test_max_tokens);

        info!(
            model = self.model.name(),
            language = self.kit.name(),
            committee_size,
            max_num_tests,
            is_react,
            "Generating unit tests"
        );

        let raw = self.dispatch(&prompt, &params)?;
        let output = one_text(raw)?;
        if is_react && chat {
            debug!("React test generation output:\n{}", output);
        }

        let candidates = self.kit.parse_tests(&output);
        let candidates_count = candidates.len();
        let valid: Vec<String> = candidates
            .into_iter()
            .filter(|test| self.kit.is_syntax_valid(test))
            .collect();
        debug!(
            candidates = candidates_count,
            valid = valid.len(),
            "Parsed generated tests"
        );

        let sampled = sample_n(valid, max_num_tests, &mut self.rng);
        debug!(
            seed = self.rng.seed(),
            draws = self.rng.calls_count(),
            kept = sampled.len(),
            "Sampled generated tests"
        );
        Ok(sampled)
    }

    /// Generate a self-reflection on a failed implementation.
    ///
    /// The model's text is returned verbatim.
    pub fn generate_self_reflection(
        &self,
        implementation: &str,
        feedback: &str,
    ) -> Result<String, GeneratorError> {
        let prompt = PromptBuilder::build_reflection_prompt(
            implementation,
            feedback,
            &self.templates.reflection,
            self.model.is_chat(),
        );
        let params =
            SamplingParams::single(self.config.temperature, self.config.reflection_max_tokens);

        info!(model = self.model.name(), "Generating self-reflection");

        let raw = self.dispatch(&prompt, &params)?;
        let reflection = one_text(raw)?;
        debug!("Self reflection output:\n{}", reflection);
        Ok(reflection)
    }

    fn dispatch(&self, prompt: &Prompt, params: &SamplingParams) -> Result<Completion, GeneratorError> {
        let completion = match prompt {
            Prompt::Chat { system, user } => {
                debug!("System message:\n{}", system);
                debug!("User message:\n{}", user);
                self.model.generate_chat(system, user, params)?
            }
            Prompt::Completion(text) => {
                debug!("Prompt:\n{}", text);
                self.model.generate(text, params)?
            }
        };
        Ok(completion)
    }
}

/// Check the response shape against the requested completion count.
fn expect_shape(requested: u32, completion: Completion) -> Result<Completion, GeneratorError> {
    let matches = match &completion {
        Completion::One(_) => requested == 1,
        Completion::Many(_) => requested > 1,
    };
    if matches {
        Ok(completion)
    } else {
        Err(GeneratorError::ShapeMismatch {
            requested,
            received: completion.shape(),
        })
    }
}

fn one_text(completion: Completion) -> Result<String, GeneratorError> {
    match completion {
        Completion::One(text) => Ok(text),
        other => Err(GeneratorError::ShapeMismatch {
            requested: 1,
            received: other.shape(),
        }),
    }
}

/// Generator errors.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Response shape mismatch: requested {requested} completion(s) but backend returned `{received}`")]
    ShapeMismatch {
        requested: u32,
        received: &'static str,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Templates(#[from] TemplateError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read input: {0}")]
    Input(String),
}
