//! Prompt assembly for implementations, tests and self-reflections.
//!
//! Every builder returns a [`Prompt`]: a system/user pair for chat backends
//! or a single completion prompt otherwise. Field order inside a prompt is
//! fixed.

use std::fmt;
use std::str::FromStr;

use rx_core::{ImplTemplates, ReflectionTemplates, TestTemplates};

use crate::generator::GeneratorError;

/// Generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Generate from the signature alone
    Simple,
    /// Refine a previous attempt using its test feedback and a reflection
    Reflexion,
}

impl Strategy {
    /// Get the name of this strategy.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Simple => "simple",
            Strategy::Reflexion => "reflexion",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Strategy::Simple),
            "reflexion" => Ok(Strategy::Reflexion),
            other => Err(GeneratorError::InvalidArgument(format!(
                "invalid strategy: given `{}` but expected one of `reflexion` or `simple`",
                other
            ))),
        }
    }
}

/// An implementation request.
///
/// `Reflexion` needs the previous implementation, its feedback and a
/// reflection; they are checked when the prompt is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplRequest<'a> {
    /// Signature to complete
    pub signature: &'a str,
    /// Generation strategy
    pub strategy: Strategy,
    /// Previous implementation (reflexion)
    pub prev_impl: Option<&'a str>,
    /// Unit test results for the previous implementation (reflexion)
    pub feedback: Option<&'a str>,
    /// Self-reflection on the previous implementation (reflexion)
    pub reflection: Option<&'a str>,
    /// Number of completions to request
    pub num_comps: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl<'a> ImplRequest<'a> {
    /// Request with no history.
    pub fn new(signature: &'a str, strategy: Strategy) -> Self {
        Self {
            signature,
            strategy,
            prev_impl: None,
            feedback: None,
            reflection: None,
            num_comps: 1,
            temperature: 0.0,
        }
    }

    /// Simple-strategy request.
    pub fn simple(signature: &'a str) -> Self {
        Self::new(signature, Strategy::Simple)
    }

    /// Reflexion-strategy request with full history.
    pub fn reflexion(
        signature: &'a str,
        prev_impl: &'a str,
        feedback: &'a str,
        reflection: &'a str,
    ) -> Self {
        Self {
            prev_impl: Some(prev_impl),
            feedback: Some(feedback),
            reflection: Some(reflection),
            ..Self::new(signature, Strategy::Reflexion)
        }
    }

    /// Set the number of completions.
    #[must_use]
    pub fn with_num_comps(mut self, num_comps: u32) -> Self {
        self.num_comps = num_comps;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// An assembled prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// System instruction plus user message
    Chat { system: String, user: String },
    /// Single completion prompt
    Completion(String),
}

impl Prompt {
    /// Render for display, e.g. in a dry run.
    pub fn render(&self) -> String {
        match self {
            Prompt::Chat { system, user } => format!(
                "----------------------- SYSTEM MESSAGE -----------------------\n{}\n\
                 ----------------------- USER MESSAGE -----------------------\n{}",
                system, user
            ),
            Prompt::Completion(prompt) => prompt.clone(),
        }
    }
}

/// Prompt builder.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the implementation prompt.
    ///
    /// Fails with `InvalidArgument` when a reflexion request is missing any
    /// of its history.
    pub fn build_impl_prompt(
        request: &ImplRequest<'_>,
        templates: &ImplTemplates,
        chat: bool,
    ) -> Result<Prompt, GeneratorError> {
        let signature = request.signature;

        let prompt = match request.strategy {
            Strategy::Simple if chat => Prompt::Chat {
                system: templates.simple_chat_instruction.clone(),
                user: signature.to_string(),
            },
            Strategy::Simple => Prompt::Completion(format!(
                "{}\n{}",
                templates.simple_completion_instruction, signature
            )),
            Strategy::Reflexion => {
                let (prev_impl, feedback, reflection) = match (
                    request.prev_impl,
                    request.feedback,
                    request.reflection,
                ) {
                    (Some(p), Some(f), Some(r)) => (p, f, r),
                    _ => {
                        return Err(GeneratorError::InvalidArgument(
                            "given `strategy=reflexion` but `prev_impl`, `feedback`, or \
                             `reflection` is missing"
                                .to_string(),
                        ))
                    }
                };

                if chat {
                    Prompt::Chat {
                        system: templates.reflexion_chat_instruction.clone(),
                        user: format!(
                            "{few_shot}\n[previous impl]:\n{prev_impl}\n\n\
                             [unit test results from previous impl]:\n{feedback}\n\n\
                             [reflection on previous impl]:\n{reflection}\n\n\
                             [improved impl]:\n{signature}",
                            few_shot = templates.reflexion_few_shot,
                        ),
                    }
                } else {
                    Prompt::Completion(format!(
                        "{instruction}\n{prev_impl}\n\nunit tests:\n{feedback}\n\n\
                         hint:\n{reflection}\n\n# improved implementation\n{signature}",
                        instruction = templates.reflexion_completion_instruction,
                    ))
                }
            }
        };

        Ok(prompt)
    }

    /// Build the test generation prompt.
    ///
    /// `react` selects the think-first message shape and only applies to
    /// chat backends.
    pub fn build_test_prompt(
        signature: &str,
        templates: &TestTemplates,
        chat: bool,
        react: bool,
    ) -> Prompt {
        if !chat {
            return Prompt::Completion(format!(
                "{}\n\nfunc signature:\n{}\nunit tests:",
                templates.completion_instruction, signature
            ));
        }

        let user = if react {
            format!(
                "{}\n\n[func signature]:\n{}\n\n[think]:",
                templates.few_shot, signature
            )
        } else {
            format!(
                "{}\n\nfunc signature:\n{}\nunit tests:",
                templates.few_shot, signature
            )
        };

        Prompt::Chat {
            system: templates.chat_instruction.clone(),
            user,
        }
    }

    /// Build the self-reflection prompt.
    ///
    /// Chat backends get the bracketed shape when a few-shot block is
    /// configured and a plain labelled shape otherwise.
    pub fn build_reflection_prompt(
        implementation: &str,
        feedback: &str,
        templates: &ReflectionTemplates,
        chat: bool,
    ) -> Prompt {
        if !chat {
            return Prompt::Completion(format!(
                "{}\n{}\n\n{}\n\nExplanation:",
                templates.completion_instruction, implementation, feedback
            ));
        }

        let user = match templates.few_shot.as_deref() {
            Some(few_shot) => format!(
                "{few_shot}\n\n[function impl]:\n{implementation}\n\n\
                 [unit test results]:\n{feedback}\n\n[self-reflection]:"
            ),
            None => format!(
                "Function implementation:\n{implementation}\n\n\
                 Unit test results:\n{feedback}\n\nSelf-reflection:"
            ),
        };

        Prompt::Chat {
            system: templates.chat_instruction.clone(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impl_templates() -> ImplTemplates {
        ImplTemplates {
            simple_chat_instruction: "SIMPLE_CHAT".to_string(),
            simple_completion_instruction: "SIMPLE_COMPLETION".to_string(),
            reflexion_chat_instruction: "REFLEXION_CHAT".to_string(),
            reflexion_completion_instruction: "REFLEXION_COMPLETION".to_string(),
            reflexion_few_shot: "FEW_SHOT".to_string(),
        }
    }

    fn test_templates() -> TestTemplates {
        TestTemplates {
            chat_instruction: "TEST_CHAT".to_string(),
            completion_instruction: "TEST_COMPLETION".to_string(),
            few_shot: "TEST_FEW_SHOT".to_string(),
        }
    }

    fn reflection_templates(few_shot: Option<&str>) -> ReflectionTemplates {
        ReflectionTemplates {
            chat_instruction: "REFLECT_CHAT".to_string(),
            completion_instruction: "REFLECT_COMPLETION".to_string(),
            few_shot: few_shot.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("simple".parse::<Strategy>().unwrap(), Strategy::Simple);
        assert_eq!("reflexion".parse::<Strategy>().unwrap(), Strategy::Reflexion);

        let err = "bogus".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidArgument(ref msg) if msg.contains("bogus")));
        assert!("Simple".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_simple_chat() {
        let prompt =
            PromptBuilder::build_impl_prompt(&ImplRequest::simple("def f():"), &impl_templates(), true)
                .unwrap();
        assert_eq!(
            prompt,
            Prompt::Chat {
                system: "SIMPLE_CHAT".to_string(),
                user: "def f():".to_string(),
            }
        );
    }

    #[test]
    fn test_simple_completion() {
        let prompt = PromptBuilder::build_impl_prompt(
            &ImplRequest::simple("def f():"),
            &impl_templates(),
            false,
        )
        .unwrap();
        assert_eq!(prompt, Prompt::Completion("SIMPLE_COMPLETION\ndef f():".to_string()));
    }

    #[test]
    fn test_reflexion_chat_field_order() {
        let request = ImplRequest::reflexion("def f():", "PREV", "FEEDBACK", "REFLECTION");
        let prompt = PromptBuilder::build_impl_prompt(&request, &impl_templates(), true).unwrap();

        let expected_user = "FEW_SHOT\n[previous impl]:\nPREV\n\n\
[unit test results from previous impl]:\nFEEDBACK\n\n\
[reflection on previous impl]:\nREFLECTION\n\n\
[improved impl]:\ndef f():";
        assert_eq!(
            prompt,
            Prompt::Chat {
                system: "REFLEXION_CHAT".to_string(),
                user: expected_user.to_string(),
            }
        );
    }

    #[test]
    fn test_reflexion_completion_field_order() {
        let request = ImplRequest::reflexion("def f():", "PREV", "FEEDBACK", "REFLECTION");
        let prompt = PromptBuilder::build_impl_prompt(&request, &impl_templates(), false).unwrap();
        assert_eq!(
            prompt,
            Prompt::Completion(
                "REFLEXION_COMPLETION\nPREV\n\nunit tests:\nFEEDBACK\n\nhint:\nREFLECTION\n\n\
# improved implementation\ndef f():"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_reflexion_requires_full_history() {
        let full = ImplRequest::reflexion("def f():", "PREV", "FEEDBACK", "REFLECTION");

        for missing in 0..3 {
            let mut request = full.clone();
            match missing {
                0 => request.prev_impl = None,
                1 => request.feedback = None,
                _ => request.reflection = None,
            }
            for chat in [true, false] {
                let err = PromptBuilder::build_impl_prompt(&request, &impl_templates(), chat)
                    .unwrap_err();
                assert!(matches!(err, GeneratorError::InvalidArgument(_)));
            }
        }
    }

    #[test]
    fn test_test_prompts() {
        let templates = test_templates();

        assert_eq!(
            PromptBuilder::build_test_prompt("def f():", &templates, true, false),
            Prompt::Chat {
                system: "TEST_CHAT".to_string(),
                user: "TEST_FEW_SHOT\n\nfunc signature:\ndef f():\nunit tests:".to_string(),
            }
        );
        assert_eq!(
            PromptBuilder::build_test_prompt("def f():", &templates, true, true),
            Prompt::Chat {
                system: "TEST_CHAT".to_string(),
                user: "TEST_FEW_SHOT\n\n[func signature]:\ndef f():\n\n[think]:".to_string(),
            }
        );

        let completion = Prompt::Completion(
            "TEST_COMPLETION\n\nfunc signature:\ndef f():\nunit tests:".to_string(),
        );
        assert_eq!(
            PromptBuilder::build_test_prompt("def f():", &templates, false, false),
            completion
        );
        // react has no effect without chat
        assert_eq!(
            PromptBuilder::build_test_prompt("def f():", &templates, false, true),
            completion
        );
    }

    #[test]
    fn test_reflection_prompts() {
        let with_few_shot = PromptBuilder::build_reflection_prompt(
            "IMPL",
            "FEEDBACK",
            &reflection_templates(Some("EXAMPLES")),
            true,
        );
        assert_eq!(
            with_few_shot,
            Prompt::Chat {
                system: "REFLECT_CHAT".to_string(),
                user: "EXAMPLES\n\n[function impl]:\nIMPL\n\n[unit test results]:\nFEEDBACK\n\n\
[self-reflection]:"
                    .to_string(),
            }
        );

        let without = PromptBuilder::build_reflection_prompt(
            "IMPL",
            "FEEDBACK",
            &reflection_templates(None),
            true,
        );
        assert_eq!(
            without,
            Prompt::Chat {
                system: "REFLECT_CHAT".to_string(),
                user: "Function implementation:\nIMPL\n\nUnit test results:\nFEEDBACK\n\n\
Self-reflection:"
                    .to_string(),
            }
        );

        let completion = PromptBuilder::build_reflection_prompt(
            "IMPL",
            "FEEDBACK",
            &reflection_templates(Some("EXAMPLES")),
            false,
        );
        assert_eq!(
            completion,
            Prompt::Completion("REFLECT_COMPLETION\nIMPL\n\nFEEDBACK\n\nExplanation:".to_string())
        );
    }

    #[test]
    fn test_render() {
        let chat = Prompt::Chat {
            system: "S".to_string(),
            user: "U".to_string(),
        };
        let rendered = chat.render();
        assert!(rendered.contains("SYSTEM MESSAGE -----------------------\nS\n"));
        assert!(rendered.ends_with("USER MESSAGE -----------------------\nU"));
        assert_eq!(Prompt::Completion("P".to_string()).render(), "P");
    }
}
