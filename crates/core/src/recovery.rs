//! JSON Recovery Engine
//!
//! Extracts one complete JSON value from a buffer of streamed agent text.
//! Two independent strategies: a balanced-brace scan over the raw buffer,
//! and a case-insensitive ```json fenced block. The balanced scan is tried
//! first; both are pure functions of the buffer, so calling them repeatedly
//! on a growing buffer is safe and yields a stable result once the value is
//! syntactically complete.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn fence_regex() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"(?is)```json(.*?)```").unwrap())
}

/// Extract a JSON value embedded in a case-insensitive ```json fence.
///
/// The fence interior is parsed as-is; a fence whose interior does not parse
/// yields `None` without falling back to any other region of the buffer.
pub fn try_parse_fenced_json(buffer: &str) -> Option<Value> {
    let captures = fence_regex().captures(buffer)?;
    let interior = captures.get(1)?.as_str();
    if interior.is_empty() {
        return None;
    }

    serde_json::from_str(interior).ok()
}

/// Extract a JSON object by scanning braces from the first `{`.
///
/// Tracks `{`/`}` nesting depth only. The scan is not string-aware: a literal
/// brace inside a JSON string value is counted as structural, so a payload
/// containing one can close the candidate span early and fail to parse. This
/// matches the upstream agent contract and is a documented limitation rather
/// than a bug.
pub fn try_parse_balanced_json(buffer: &str) -> Option<Value> {
    let first = buffer.find('{')?;
    let mut depth = 0i32;

    for (offset, byte) in buffer.as_bytes()[first..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &buffer[first..first + offset + 1];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }

    None
}

/// Recover a single JSON value from buffered stream text.
///
/// Tries the balanced-brace scan first, then the fenced block. `None` means
/// "not yet available": the stream is still incomplete, or irrecoverable
/// until a final attempt after end-of-stream.
pub fn recover_json(buffer: &str) -> Option<Value> {
    try_parse_balanced_json(buffer).or_else(|| try_parse_fenced_json(buffer))
}
