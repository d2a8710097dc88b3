//! User input for interactive sessions.

use std::collections::VecDeque;

use crate::error::{InvalidAction, LogSinkError};
use crate::events::ActionCode;
use crate::schedule::ScheduleItem;

use super::Outcome;

/// What the session is currently asking about.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Zero-based cursor position.
    pub position: usize,
    /// Current schedule length, including reinserted items.
    pub total: usize,
    pub item: ScheduleItem,
}

/// Supplier of user actions.
///
/// `next_input` and `extend_amount` return raw text; parsing and validation
/// happen in the session. Returning `None` means the source is exhausted
/// and ends the session early.
pub trait ActionSource {
    /// Next action token for the current item.
    fn next_input(&mut self, prompt: &Prompt) -> Option<String>;

    /// Minutes to add after an extend token.
    fn extend_amount(&mut self, prompt: &Prompt) -> Option<String>;

    /// Input was rejected; the same item will be prompted again.
    fn rejected(&mut self, _prompt: &Prompt, _error: &InvalidAction) {}

    /// The log sink refused the event for an action that still applied.
    fn log_failed(&mut self, _error: &LogSinkError) {}

    /// An action was applied.
    fn applied(&mut self, _outcome: &Outcome) {}
}

/// Parse an action token: `c`/`complete`, `s`/`skip`, `d`/`defer`,
/// `e`/`extend`, case-insensitive.
///
/// # Errors
/// Returns [`InvalidAction::UnknownToken`] for anything else.
pub fn parse_action_token(token: &str) -> Result<ActionCode, InvalidAction> {
    let normalized = token.trim().to_lowercase();
    match normalized.as_str() {
        "c" | "complete" => Ok(ActionCode::Complete),
        "s" | "skip" => Ok(ActionCode::Skip),
        "d" | "defer" => Ok(ActionCode::Defer),
        "e" | "extend" => Ok(ActionCode::Extend),
        _ => Err(InvalidAction::UnknownToken(token.trim().to_string())),
    }
}

/// Parse a non-negative extend amount in minutes.
///
/// # Errors
/// Returns [`InvalidAction::InvalidExtendAmount`] for negative, non-numeric
/// or out-of-range input.
pub fn parse_extend_amount(raw: &str) -> Result<u32, InvalidAction> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| InvalidAction::InvalidExtendAmount(raw.trim().to_string()))
}

/// Pre-recorded inputs, consumed in order.
///
/// Extend amounts are taken from the same queue, so `["e", "5", "c"]`
/// extends the current item by five minutes and then completes it.
#[derive(Debug, Default, Clone)]
pub struct ScriptedActions {
    inputs: VecDeque<String>,
    rejections: Vec<InvalidAction>,
}

impl ScriptedActions {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            rejections: Vec::new(),
        }
    }

    /// Inputs the session rejected, in order.
    pub fn rejections(&self) -> &[InvalidAction] {
        &self.rejections
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl ActionSource for ScriptedActions {
    fn next_input(&mut self, _prompt: &Prompt) -> Option<String> {
        self.inputs.pop_front()
    }

    fn extend_amount(&mut self, _prompt: &Prompt) -> Option<String> {
        self.inputs.pop_front()
    }

    fn rejected(&mut self, _prompt: &Prompt, error: &InvalidAction) {
        self.rejections.push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_tokens() {
        assert_eq!(parse_action_token("c"), Ok(ActionCode::Complete));
        assert_eq!(parse_action_token(" SKIP "), Ok(ActionCode::Skip));
        assert_eq!(parse_action_token("Defer"), Ok(ActionCode::Defer));
        assert_eq!(parse_action_token("e\n"), Ok(ActionCode::Extend));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(
            parse_action_token("x"),
            Err(InvalidAction::UnknownToken("x".into()))
        );
        assert!(parse_action_token("").is_err());
    }

    #[test]
    fn extend_amount_must_be_non_negative_integer() {
        assert_eq!(parse_extend_amount("5"), Ok(5));
        assert_eq!(parse_extend_amount(" 0 "), Ok(0));
        assert!(parse_extend_amount("-3").is_err());
        assert!(parse_extend_amount("ten").is_err());
        assert!(parse_extend_amount("2.5").is_err());
    }
}
