//! Python collaborators and prompt presets.

use rx_core::{ImplTemplates, ReflectionTemplates, TemplateSet, TestTemplates};
use tree_sitter::{Node, Parser, Tree};

use crate::{assert_lines, LanguageKit};

const INDENT: &str = "    ";

/// Header placed above a body so it can be parsed as a function.
const BODY_HOST: &str = "def _f():\n";

/// Python language kit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonKit;

impl LanguageKit for PythonKit {
    fn name(&self) -> &'static str {
        "python"
    }

    /// Repair indentation in up to two steps.
    ///
    /// A body that already parses as the block of a function is returned as
    /// is. Otherwise the first line is indented (models often drop it); if
    /// the result still does not parse, every line of the original is
    /// indented.
    fn normalize_body(&self, body: &str) -> String {
        if body.trim().is_empty() || is_function_body(body) {
            return body.to_string();
        }

        let first_fixed = indent_first_line(body);
        if is_function_body(&first_fixed) {
            return first_fixed;
        }

        indent_every_line(body)
    }

    fn parse_tests(&self, raw: &str) -> Vec<String> {
        assert_lines(raw)
    }

    /// A test is valid when it parses cleanly and its first statement is an
    /// `assert`.
    fn is_syntax_valid(&self, test: &str) -> bool {
        let Some(tree) = parse(test.trim()) else {
            return false;
        };
        let root = tree.root_node();
        if root.has_error() {
            return false;
        }
        statements(root)
            .first()
            .is_some_and(|stmt| stmt.kind() == "assert_statement")
    }
}

fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    parser.parse(source, None)
}

/// Top-level statements of a module, comments excluded.
fn statements(root: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .filter(|node| node.kind() != "comment")
        .collect()
}

/// `body` parses as the whole block of a single function definition.
///
/// Lines dedented past the block would otherwise parse as module-level
/// statements, so the module must hold nothing but the function.
fn is_function_body(body: &str) -> bool {
    let source = format!("{BODY_HOST}{body}\n");
    let Some(tree) = parse(&source) else {
        return false;
    };
    let root = tree.root_node();
    if root.has_error() {
        return false;
    }
    match statements(root).as_slice() {
        [function] => function.kind() == "function_definition",
        _ => false,
    }
}

fn indent_first_line(body: &str) -> String {
    if body.starts_with(INDENT) {
        return body.to_string();
    }
    match body.split_once('\n') {
        Some((first, rest)) => format!("{INDENT}{first}\n{rest}"),
        None => format!("{INDENT}{body}"),
    }
}

fn indent_every_line(body: &str) -> String {
    body.split('\n')
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Preset templates for Python targets.
pub fn templates() -> TemplateSet {
    TemplateSet {
        implementation: ImplTemplates {
            simple_chat_instruction: "You are an AI that only responds with Python code, not English. \
You will be given a function signature and its docstring. \
Write your full implementation, restating the function signature."
                .to_string(),
            simple_completion_instruction: "# Write the body of this function only.".to_string(),
            reflexion_chat_instruction: "You are an AI Python assistant. \
You will be given your previous implementation of a function, a series of unit test results, \
and your self-reflection on that implementation. \
Write your full improved implementation, restating the function signature."
                .to_string(),
            reflexion_completion_instruction: "You are a Python writing assistant. \
You will be given your previous implementation of a function, a series of unit test results, \
and your self-reflection on that implementation. \
Apply the changes below by writing the body of this function only.\n\n-----"
                .to_string(),
            reflexion_few_shot: PY_REFLEXION_FEW_SHOT.to_string(),
        },
        tests: TestTemplates {
            chat_instruction: "You are an AI coding assistant that writes unique, diverse and \
intuitive unit tests for functions given the signature and docstring."
                .to_string(),
            completion_instruction: "You are an expert Python programmer. \
Write unique, diverse and intuitive unit tests for the function below, \
one `assert` statement per line.\n\n# Example\nfunc signature:\ndef add3(a: int) -> int:\n    \
\"\"\"Add 3 to the input.\"\"\"\nunit tests:\nassert add3(1) == 4\nassert add3(-3) == 0"
                .to_string(),
            few_shot: PY_TEST_FEW_SHOT.to_string(),
        },
        reflection: ReflectionTemplates {
            chat_instruction: "You are a Python programming assistant. \
You will be given a function implementation and a series of unit test results. \
Write a few sentences explaining why the implementation is wrong, as indicated by the tests. \
You will need this later as a hint when you try again. \
Only provide the few sentence description in your answer, not the implementation."
                .to_string(),
            completion_instruction: "You are a Python programming assistant. \
You will be given a function implementation and a series of unit tests. \
Explain why the implementation is wrong as indicated by the tests.\n\n-----"
                .to_string(),
            few_shot: Some(PY_REFLECTION_FEW_SHOT.to_string()),
        },
    }
}

const PY_REFLEXION_FEW_SHOT: &str = r#"Example 1:
[previous impl]:
```python
def add(a: int, b: int) -> int:
    """
    Given integers a and b, return the total value of a and b.
    """
    return a - b
```

[unit test results from previous impl]:
Tested passed:

Tests failed:
assert add(1, 2) == 3 # output: -1
assert add(1, 2) == 4 # output: -1

[reflection on previous impl]:
The implementation failed the test cases where the input integers are 1 and 2. The issue arises because the code does not add the two integers together, but instead subtracts the second integer from the first. To fix this issue, we should change the operator from `-` to `+` in the return statement.

[improved impl]:
```python
def add(a: int, b: int) -> int:
    """
    Given integers a and b, return the total value of a and b.
    """
    return a + b
```
END EXAMPLES
"#;

const PY_TEST_FEW_SHOT: &str = r#"Examples:
func signature:
def add3Numbers(x, y, z):
    """ Add three numbers together.
    This function takes three numbers as input and returns the sum of the three numbers.
    """
unit tests:
assert add3Numbers(1, 2, 3) == 6
assert add3Numbers(-1, 2, 3) == 4
assert add3Numbers(1, -2, 3) == 2
assert add3Numbers(1, 2, -3) == 0
assert add3Numbers(-3, -2, -1) == -6
assert add3Numbers(0, 0, 0) == 0"#;

const PY_REFLECTION_FEW_SHOT: &str = r#"Example 1:
[function impl]:
```python
def longest_subarray_with_sum_limit(nums: List[int], target: int) -> List[int]:
    n = len(nums)
    left, right = 0, 0
    max_length = 0
    current_sum = 0
    result = []
    while right < n:
        current_sum += nums[right]
        while current_sum > target:
            current_sum -= nums[left]
            left += 1
        if right - left + 1 >= max_length:
            max_length = right - left + 1
            result = nums[left:right+1]
        right += 1
    return result
```
[unit test results]:
Tests passing:
assert longest_subarray_with_sum_limit([1, 2, 3, 4, 5], 8) == [1, 2, 3]
assert longest_subarray_with_sum_limit([], 10) == []

Tests failing:
assert longest_subarray_with_sum_limit([5, 6, 7, 8, 9], 4) == [] # output: [5]

[self-reflection]:
The implementation fails when no subarray fulfills the condition. The inner while loop can move `left` past `right`, after which the length check records a subarray whose sum exceeds the target. The loop should also require `left <= right` before shrinking the window, and the result should only be updated while the current sum is within the limit.
END OF EXAMPLES
"#;
