//! Administrative workflows
//!
//! Each workflow is a small closed state machine. A step takes the user's
//! text and either stays in the workflow with a prompt (the same step on bad
//! input, the next one otherwise) or finishes. Sending [`CANCEL_TOKEN`] at any
//! step finishes without touching the store.

mod add;
mod delete;
mod edit;
mod import;
mod operator;

pub use add::AddWorkflow;
pub use delete::DeleteWorkflow;
pub use edit::EditWorkflow;
pub use import::ImportWorkflow;
pub use operator::OperatorWorkflow;

use refdesk_common::RecordStore;

use crate::reply::{self, Reply};

/// Abort token accepted at every step
pub const CANCEL_TOKEN: &str = "0";

const CONFIRM_TOKENS: [&str; 2] = ["да", "yes"];
const NO_LINK_TOKENS: [&str; 3] = ["нет", "no", "-"];

/// What the session should do after one workflow step
#[derive(Debug, Clone)]
pub enum Transition<W> {
    /// Keep the workflow (possibly advanced) and show the prompt
    Continue(W, Reply),
    /// Workflow is over; the session goes back to idle
    Finished(Reply),
}

pub fn is_cancel(text: &str) -> bool {
    text.trim() == CANCEL_TOKEN
}

/// Affirmative reply to a destructive confirmation (case-insensitive)
pub fn is_confirmation(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    CONFIRM_TOKENS.contains(&text.as_str())
}

/// "No link" reply at the link step (case-insensitive)
pub fn is_no_link(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    NO_LINK_TOKENS.contains(&text.as_str())
}

fn cancelled(what: &str) -> Reply {
    Reply::text(format!("❌ {} cancelled.", what))
}

/// Parse a 1-based record number against the current store size
fn parse_record_number(text: &str, len: usize) -> Option<usize> {
    let n: usize = text.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

fn number_prompt(store: &RecordStore, action: &str) -> Reply {
    Reply::text(format!(
        "{}\n\nEnter the number of the record to {} (or {} to cancel):",
        reply::record_list(store.records()),
        action,
        CANCEL_TOKEN
    ))
}

fn number_out_of_range(len: usize) -> Reply {
    Reply::text(format!(
        "Enter a number from 1 to {} (or {} to cancel).",
        len, CANCEL_TOKEN
    ))
}

fn record_not_found() -> Reply {
    Reply::text("❌ Record not found.")
}

fn empty_store() -> Reply {
    Reply::text("Database is empty.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_case_insensitive() {
        assert!(is_confirmation("ДА"));
        assert!(is_confirmation(" Yes "));
        assert!(!is_confirmation("нет"));
        assert!(is_no_link("НЕТ"));
        assert!(is_no_link("-"));
        assert!(is_no_link("No"));
        assert!(!is_no_link("https://example.com"));
        assert!(is_cancel(" 0 "));
        assert!(!is_cancel("00"));
    }

    #[test]
    fn test_parse_record_number_range() {
        assert_eq!(parse_record_number("1", 3), Some(0));
        assert_eq!(parse_record_number("3", 3), Some(2));
        assert_eq!(parse_record_number("0", 3), None);
        assert_eq!(parse_record_number("4", 3), None);
        assert_eq!(parse_record_number("two", 3), None);
    }
}
