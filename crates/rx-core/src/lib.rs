//! # rx-core
//!
//! Shared types for reflexion-style code generation.
//!
//! - [`LanguageModel`]: the backend seam. Chat and completion backends both
//!   answer with a [`Completion`], which is either one text or many.
//! - [`TemplateSet`]: instruction and few-shot strings for one target
//!   language, grouped by pipeline stage.
//! - [`ScriptedModel`]: a replaying backend for tests and dry runs.

pub mod mock;
pub mod model;
pub mod templates;

pub use mock::{RecordedCall, ScriptedModel};
pub use model::{Completion, LanguageModel, ModelError, SamplingParams, MAX_TOKENS_DEFAULT};
pub use templates::{
    ImplTemplates, ReflectionTemplates, TemplateError, TemplateSet, TestTemplates,
};
