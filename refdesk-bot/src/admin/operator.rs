//! Add-operator workflow

use tracing::info;

use refdesk_common::{OperatorRegistry, UserId};

use super::{cancelled, is_cancel, Transition, CANCEL_TOKEN};
use crate::reply::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatorWorkflow;

impl OperatorWorkflow {
    pub fn start() -> (Self, Reply) {
        (
            OperatorWorkflow,
            Reply::text(format!(
                "Enter the numeric user id of the new operator ({} to cancel):",
                CANCEL_TOKEN
            )),
        )
    }

    pub fn handle_text(self, text: &str, operators: &mut OperatorRegistry) -> Transition<Self> {
        if is_cancel(text) {
            return Transition::Finished(cancelled("Adding an operator"));
        }

        let Ok(id) = text.trim().parse::<i64>() else {
            return Transition::Continue(
                self,
                Reply::text("User id must be a number. Try again:"),
            );
        };
        let id = UserId(id);

        if !operators.add(id) {
            return Transition::Finished(Reply::text(format!("{} is already an operator.", id)));
        }

        info!("Operator {} added (until restart)", id);
        Transition::Finished(Reply::text(format!(
            "✅ {} is now an operator. This lasts until the service restarts.",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_new_operator() {
        let mut operators = OperatorRegistry::new([UserId(1)]);
        let result = OperatorWorkflow.handle_text("42", &mut operators);
        assert!(matches!(result, Transition::Finished(_)));
        assert!(operators.is_operator(UserId(42)));
    }

    #[test]
    fn test_non_numeric_reprompts() {
        let mut operators = OperatorRegistry::new([UserId(1)]);
        assert!(matches!(
            OperatorWorkflow.handle_text("alice", &mut operators),
            Transition::Continue(..)
        ));
        assert_eq!(operators.list(), &[UserId(1)]);
    }

    #[test]
    fn test_existing_operator_ends_with_notice() {
        let mut operators = OperatorRegistry::new([UserId(1)]);
        match OperatorWorkflow.handle_text("1", &mut operators) {
            Transition::Finished(reply) => assert!(reply.text.contains("already")),
            Transition::Continue(..) => panic!("should finish"),
        }
    }
}
