//! Delete workflow: pick a record number, then confirm explicitly

use tracing::info;

use refdesk_common::RecordStore;

use super::{
    cancelled, empty_store, is_cancel, is_confirmation, number_out_of_range, number_prompt,
    parse_record_number, record_not_found, Transition, CANCEL_TOKEN,
};
use crate::reply::{self, Reply};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteWorkflow {
    AwaitingNumber,
    /// 0-based index of the record shown for confirmation
    AwaitingConfirmation { index: usize },
}

impl DeleteWorkflow {
    /// Show the numbered list; refuses to start on an empty store
    pub fn start(store: &RecordStore) -> Transition<Self> {
        if store.is_empty() {
            return Transition::Finished(empty_store());
        }
        Transition::Continue(DeleteWorkflow::AwaitingNumber, number_prompt(store, "delete"))
    }

    pub fn handle_text(self, text: &str, store: &mut RecordStore) -> Transition<Self> {
        if is_cancel(text) {
            return Transition::Finished(cancelled("Deletion"));
        }

        match self {
            DeleteWorkflow::AwaitingNumber => {
                let Some(index) = parse_record_number(text, store.len()) else {
                    return Transition::Continue(self, number_out_of_range(store.len()));
                };
                let Some(record) = store.get(index) else {
                    return Transition::Finished(record_not_found());
                };
                let prompt = Reply::text(format!(
                    "Delete this record?\n\n{}\n\nSend \"ДА\" or \"yes\" to confirm ({} to cancel).",
                    reply::info_card(record),
                    CANCEL_TOKEN
                ));
                Transition::Continue(DeleteWorkflow::AwaitingConfirmation { index }, prompt)
            }
            DeleteWorkflow::AwaitingConfirmation { index } => {
                if !is_confirmation(text) {
                    return Transition::Continue(
                        self,
                        Reply::text(format!(
                            "Send \"ДА\" or \"yes\" to confirm, or {} to cancel.",
                            CANCEL_TOKEN
                        )),
                    );
                }
                match store.remove(index) {
                    Ok(removed) => {
                        info!("Operator deleted record #{}: {}", index + 1, removed.summary());
                        Transition::Finished(Reply::text(format!(
                            "✅ Record deleted: {}",
                            removed.summary()
                        )))
                    }
                    // The store shrank since the record was shown
                    Err(_) => Transition::Finished(record_not_found()),
                }
            }
        }
    }
}
