//! Rust collaborators and prompt presets.

use rx_core::{ImplTemplates, ReflectionTemplates, TemplateSet, TestTemplates};

use crate::{assert_lines, LanguageKit};

/// Rust language kit.
///
/// Rust bodies are not whitespace-sensitive, so normalization is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustKit;

impl LanguageKit for RustKit {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn normalize_body(&self, body: &str) -> String {
        body.to_string()
    }

    fn parse_tests(&self, raw: &str) -> Vec<String> {
        assert_lines(raw)
    }

    /// A test is valid when it parses as the contents of a block.
    fn is_syntax_valid(&self, test: &str) -> bool {
        if test.trim().is_empty() {
            return false;
        }
        match syn::parse_str::<syn::Block>(&format!("{{ {} }}", test)) {
            Ok(block) => !block.stmts.is_empty(),
            Err(_) => false,
        }
    }
}

/// Preset templates for Rust targets.
pub fn templates() -> TemplateSet {
    TemplateSet {
        implementation: ImplTemplates {
            simple_chat_instruction: "You are an AI that only responds with Rust code, not English. \
You will be given a function signature and its doc comment. \
Write your full implementation, restating the function signature."
                .to_string(),
            simple_completion_instruction: "// Write the body of this function only.".to_string(),
            reflexion_chat_instruction: "You are an AI Rust assistant. \
You will be given your previous implementation of a function, a series of unit test results, \
and your self-reflection on that implementation. \
Write your full improved implementation, restating the function signature."
                .to_string(),
            reflexion_completion_instruction: "You are a Rust writing assistant. \
You will be given your previous implementation of a function, a series of unit test results, \
and your self-reflection on that implementation. \
Apply the changes below by writing the body of this function only.\n\n-----"
                .to_string(),
            reflexion_few_shot: RS_REFLEXION_FEW_SHOT.to_string(),
        },
        tests: TestTemplates {
            chat_instruction: "You are an AI coding assistant that writes unique, diverse and \
intuitive unit tests for Rust functions given the signature and doc comment. \
Write one `assert!` or `assert_eq!` statement per line."
                .to_string(),
            completion_instruction: "You are an expert Rust programmer. \
Write unique, diverse and intuitive unit tests for the function below, \
one `assert_eq!` statement per line.\n\n// Example\nfunc signature:\nfn add3(a: i32) -> i32\n\
unit tests:\nassert_eq!(add3(1), 4);\nassert_eq!(add3(-3), 0);"
                .to_string(),
            few_shot: RS_TEST_FEW_SHOT.to_string(),
        },
        reflection: ReflectionTemplates {
            chat_instruction: "You are a Rust programming assistant. \
You will be given a function implementation and a series of unit test results. \
Write a few sentences explaining why the implementation is wrong, as indicated by the tests. \
You will need this later as a hint when you try again. \
Only provide the few sentence description in your answer, not the implementation."
                .to_string(),
            completion_instruction: "You are a Rust programming assistant. \
You will be given a function implementation and a series of unit tests. \
Explain why the implementation is wrong as indicated by the tests.\n\n-----"
                .to_string(),
            few_shot: None,
        },
    }
}

const RS_REFLEXION_FEW_SHOT: &str = r#"Example 1:
[previous impl]:
```rust
fn add(a: i32, b: i32) -> i32 {
    // Given integers a and b, return the total value of a and b.
    a - b
}
```

[unit test results from previous impl]:
Tested passed:

Tests failed:
assert_eq!(add(1, 2), 3); // output: -1
assert_eq!(add(1, 2), 4); // output: -1

[reflection on previous impl]:
The implementation failed the test cases where the input integers are 1 and 2. The issue arises because the code does not add the two integers together, but instead subtracts the second integer from the first. To fix this issue, we should change the operator from `-` to `+` in the return expression.

[improved impl]:
```rust
fn add(a: i32, b: i32) -> i32 {
    // Given integers a and b, return the total value of a and b.
    a + b
}
```
END EXAMPLES
"#;

const RS_TEST_FEW_SHOT: &str = r#"Examples:
func signature:
/// Add three numbers together.
/// This function takes three numbers as input and returns the sum of the three numbers.
fn add3_numbers(x: i32, y: i32, z: i32) -> i32 {

unit tests:
assert_eq!(add3_numbers(1, 2, 3), 6);
assert_eq!(add3_numbers(-1, 2, 3), 4);
assert_eq!(add3_numbers(1, -2, 3), 2);
assert_eq!(add3_numbers(1, 2, -3), 0);
assert_eq!(add3_numbers(-3, -2, -1), -6);
assert_eq!(add3_numbers(0, 0, 0), 0);"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_identity() {
        let body = "a + b\n}";
        assert_eq!(RustKit.normalize_body(body), body);
    }

    #[test]
    fn test_parse_tests() {
        let raw = "```rust\nassert_eq!(add(1, 2), 3);\n  assert!(is_even(4));\nlet x = 1;\n```";
        assert_eq!(
            RustKit.parse_tests(raw),
            vec!["assert_eq!(add(1, 2), 3);", "assert!(is_even(4));"]
        );
    }

    #[test]
    fn test_syntax_valid() {
        assert!(RustKit.is_syntax_valid("assert_eq!(add(1, 2), 3);"));
        assert!(RustKit.is_syntax_valid("assert!(is_even(4))"));
        assert!(RustKit.is_syntax_valid("assert_eq!(f(vec![1, 2]), Some(\"x\"));"));
    }

    #[test]
    fn test_syntax_invalid() {
        assert!(!RustKit.is_syntax_valid("assert_eq!(add(1, 2), 3"));
        assert!(!RustKit.is_syntax_valid("assert_eq!(add(1, 2), 3)) }"));
        assert!(!RustKit.is_syntax_valid("   "));
    }

    #[test]
    fn test_templates_have_no_reflection_few_shot() {
        let set = templates();
        assert!(set.reflection.few_shot.is_none());
        assert!(set.implementation.reflexion_few_shot.contains("```rust"));
    }
}
