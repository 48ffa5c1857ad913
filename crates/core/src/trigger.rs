//! Strict report trigger phrase.
//!
//! One exact phrase switches an outgoing message into strict structured
//! report mode. Matching ignores surrounding whitespace and letter case
//! but nothing else; any extra words make it an ordinary chat message.

/// The phrase that requests a full structured report from the agent.
pub const STRICT_REPORT_TRIGGER: &str = "generate full structured business analytics report";

/// Returns true when `message` is exactly the strict report trigger,
/// ignoring surrounding whitespace and case.
pub fn is_strict_report_trigger(message: &str) -> bool {
    message.trim().to_lowercase() == STRICT_REPORT_TRIGGER
}
