//! # rx-lang
//!
//! Per-language collaborators for the generation pipeline.
//!
//! Each target language supplies three pure functions through
//! [`LanguageKit`] and a preset [`TemplateSet`]:
//!
//! | Language | Body normalization | Test parser | Syntax check |
//! |----------|--------------------|-------------|--------------|
//! | Python | indentation repair | `assert` lines | tree-sitter parse |
//! | Rust | none | `assert` lines | parses as a statement (`syn`) |

use std::fmt;
use std::str::FromStr;

use rx_core::TemplateSet;

pub mod python;
pub mod rust;

pub use python::PythonKit;
pub use rust::RustKit;

/// Language-specific text functions used around model calls.
pub trait LanguageKit {
    /// Language name as accepted by [`Language::from_str`].
    fn name(&self) -> &'static str;

    /// Fix up a generated body so it sits under its signature.
    fn normalize_body(&self, body: &str) -> String;

    /// Split raw test-generation output into individual tests.
    fn parse_tests(&self, raw: &str) -> Vec<String>;

    /// Whether a single test is syntactically acceptable.
    fn is_syntax_valid(&self, test: &str) -> bool;
}

impl<K: LanguageKit + ?Sized> LanguageKit for &K {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn normalize_body(&self, body: &str) -> String {
        (**self).normalize_body(body)
    }

    fn parse_tests(&self, raw: &str) -> Vec<String> {
        (**self).parse_tests(raw)
    }

    fn is_syntax_valid(&self, test: &str) -> bool {
        (**self).is_syntax_valid(test)
    }
}

impl<K: LanguageKit + ?Sized> LanguageKit for Box<K> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn normalize_body(&self, body: &str) -> String {
        (**self).normalize_body(body)
    }

    fn parse_tests(&self, raw: &str) -> Vec<String> {
        (**self).parse_tests(raw)
    }

    fn is_syntax_valid(&self, test: &str) -> bool {
        (**self).is_syntax_valid(test)
    }
}

/// Supported target languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Rust,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 2] = [Language::Python, Language::Rust];

    /// Collaborators for this language.
    pub fn kit(self) -> Box<dyn LanguageKit> {
        match self {
            Language::Python => Box::new(PythonKit),
            Language::Rust => Box::new(RustKit),
        }
    }

    /// Preset templates for this language.
    pub fn templates(self) -> TemplateSet {
        match self {
            Language::Python => python::templates(),
            Language::Rust => rust::templates(),
        }
    }

    /// Get the name of this language.
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(LanguageError::Unsupported(s.to_string())),
        }
    }
}

/// Language selection errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("Invalid argument: unsupported language `{0}` (expected `python` or `rust`)")]
    Unsupported(String),
}

/// Keep trimmed lines that mention `assert`.
pub(crate) fn assert_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| line.contains("assert"))
        .map(|line| line.trim().to_string())
        .collect()
}
