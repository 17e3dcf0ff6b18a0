//! # rx-generator
//!
//! Prompt assembly, response cleanup and the generation pipeline for
//! code-generating language models.
//!
//! ## Strategies
//!
//! - **simple**: the model sees only the signature.
//! - **reflexion**: the model also sees its previous implementation, the
//!   unit test results for it, and a self-reflection on what went wrong.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Signature  │ ──> │   Prompt    │ ──> │    Model    │
//! │ + templates │     │  Builder    │     │  Interface  │
//! └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                │
//!                     ┌──────────────────────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │ extract  →  │
//!              │ strip sig → │
//!              │ normalize   │
//!              └──────┬──────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     ▼                               ▼
//! ┌─────────────┐               ┌─────────────┐
//! │ signature + │               │ parse/filter│
//! │    body     │               │  → sample_n │
//! └─────────────┘               └─────────────┘
//!  implementations                   tests
//! ```

pub mod generator;
pub mod postprocess;
pub mod prompt;

pub use generator::{CodeGenerator, GeneratorConfig, GeneratorError};
pub use postprocess::{clean_body, compose, extract_code, strip_duplicate_signature, FENCE};
pub use prompt::{ImplRequest, Prompt, PromptBuilder, Strategy};
