//! Import workflow: wait for a JSON document and merge it into the store

use tracing::info;

use refdesk_common::store::parse_import_payload;
use refdesk_common::RecordStore;

use super::{cancelled, is_cancel, Transition, CANCEL_TOKEN};
use crate::reply::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportWorkflow;

impl ImportWorkflow {
    pub fn start() -> (Self, Reply) {
        (
            ImportWorkflow,
            Reply::text(format!(
                "📥 Send a JSON file to import (same format as /export), or {} to cancel.",
                CANCEL_TOKEN
            )),
        )
    }

    /// Free text is only meaningful as a cancellation
    pub fn handle_text(self, text: &str) -> Transition<Self> {
        if is_cancel(text) {
            return Transition::Finished(cancelled("Import"));
        }
        Transition::Continue(self, Reply::text("Please attach a JSON file."))
    }

    pub fn handle_document(self, file_name: &str, content: &str, store: &mut RecordStore) -> Transition<Self> {
        let payload = match parse_import_payload(content) {
            Ok(payload) => payload,
            Err(rejection) => {
                return Transition::Finished(Reply::text(format!(
                    "❌ Import of {} failed: {}",
                    file_name, rejection
                )))
            }
        };

        match store.bulk_import(&payload) {
            Ok(count) => {
                info!("Operator imported {} records from {}", count, file_name);
                Transition::Finished(Reply::text(format!(
                    "✅ Imported {} record(s). Database now holds {}.",
                    count,
                    store.len()
                )))
            }
            Err(rejection) => Transition::Finished(Reply::text(format!(
                "❌ Import of {} failed: {}. Nothing was imported.",
                file_name, rejection
            ))),
        }
    }
}
