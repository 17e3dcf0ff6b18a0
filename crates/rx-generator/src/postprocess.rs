//! Cleanup of raw model responses.
//!
//! Order is fixed: extract fenced code, strip a repeated signature, then
//! let the language normalize the body.

use rx_lang::LanguageKit;

/// Markdown code fence.
pub const FENCE: &str = "```";

/// Extract code from a possibly fenced response.
///
/// Text without a fence is returned unchanged. Otherwise the lines inside
/// the first fenced block are returned; later blocks are ignored. A line
/// counts as a fence if it contains the marker anywhere.
pub fn extract_code(text: &str) -> String {
    if !text.contains(FENCE) {
        return text.to_string();
    }

    let mut inside = false;
    let mut code_lines: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if line.contains(FENCE) {
            if inside {
                break;
            }
            inside = true;
            continue;
        }
        if inside {
            code_lines.push(line);
        }
    }

    code_lines.join("\n")
}

/// Remove every line that repeats the signature.
///
/// Bodies that never mention the signature pass through unchanged. An
/// empty signature matches nothing.
pub fn strip_duplicate_signature(signature: &str, body: &str) -> String {
    if signature.is_empty() || !body.contains(signature) {
        return body.to_string();
    }

    body.split('\n')
        .filter(|line| !line.contains(signature))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn a raw completion into a clean body for `signature`.
pub fn clean_body<K>(kit: &K, signature: &str, raw: &str) -> String
where
    K: LanguageKit + ?Sized,
{
    let code = extract_code(raw);
    let body = strip_duplicate_signature(signature, &code);
    kit.normalize_body(&body)
}

/// Join a signature and its body into one implementation.
pub fn compose(signature: &str, body: &str) -> String {
    if body.is_empty() || body.starts_with('\n') || signature.ends_with('\n') {
        format!("{}{}", signature, body)
    } else {
        format!("{}\n{}", signature, body)
    }
}
