//! Edit workflow: record number, field number, new value

use tracing::info;

use refdesk_common::record::RecordField;
use refdesk_common::{Error, RecordStore};

use super::{
    cancelled, empty_store, is_cancel, is_no_link, number_out_of_range, number_prompt,
    parse_record_number, record_not_found, Transition, CANCEL_TOKEN,
};
use crate::reply::{self, Reply};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditWorkflow {
    AwaitingNumber,
    AwaitingField { index: usize },
    AwaitingValue { index: usize, field: RecordField },
}

fn field_menu() -> String {
    RecordField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{}. {}", i + 1, field))
        .collect::<Vec<_>>()
        .join("\n")
}

impl EditWorkflow {
    /// Show the numbered list; refuses to start on an empty store
    pub fn start(store: &RecordStore) -> Transition<Self> {
        if store.is_empty() {
            return Transition::Finished(empty_store());
        }
        Transition::Continue(EditWorkflow::AwaitingNumber, number_prompt(store, "edit"))
    }

    pub fn handle_text(self, text: &str, store: &mut RecordStore) -> Transition<Self> {
        if is_cancel(text) {
            return Transition::Finished(cancelled("Editing"));
        }

        match self {
            EditWorkflow::AwaitingNumber => {
                let Some(index) = parse_record_number(text, store.len()) else {
                    return Transition::Continue(self, number_out_of_range(store.len()));
                };
                let Some(record) = store.get(index) else {
                    return Transition::Finished(record_not_found());
                };
                let prompt = Reply::text(format!(
                    "{}\n\nWhich field should change?\n{}\n\nEnter 1-{} ({} to cancel):",
                    reply::info_card(record),
                    field_menu(),
                    RecordField::ALL.len(),
                    CANCEL_TOKEN
                ));
                Transition::Continue(EditWorkflow::AwaitingField { index }, prompt)
            }
            EditWorkflow::AwaitingField { index } => {
                let Some(field) = RecordField::from_menu_choice(text) else {
                    return Transition::Continue(
                        self,
                        Reply::text(format!(
                            "Enter a field number from 1 to {} (or {} to cancel).",
                            RecordField::ALL.len(),
                            CANCEL_TOKEN
                        )),
                    );
                };
                let Some(record) = store.get(index) else {
                    return Transition::Finished(record_not_found());
                };
                let current = record.field_value(field);
                let prompt = Reply::text(format!(
                    "Current {}: {}\n\nEnter the new value ({} to cancel):",
                    field,
                    if current.is_empty() { "(none)" } else { current.as_str() },
                    CANCEL_TOKEN
                ));
                Transition::Continue(EditWorkflow::AwaitingValue { index, field }, prompt)
            }
            EditWorkflow::AwaitingValue { index, field } => {
                let value = text.trim();
                let value = if field == RecordField::Link && is_no_link(value) {
                    ""
                } else if value.is_empty() {
                    return Transition::Continue(
                        self,
                        Reply::text("Value cannot be empty. Try again:"),
                    );
                } else {
                    value
                };

                match store.replace_field(index, field, value) {
                    Ok(old) => {
                        info!("Operator edited record #{} field '{}'", index + 1, field);
                        Transition::Finished(Reply::text(format!(
                            "✅ Record updated.\n\nField: {}\nOld value: {}\nNew value: {}",
                            field,
                            old,
                            value
                        )))
                    }
                    Err(Error::InvalidInput(reason)) => Transition::Continue(
                        self,
                        Reply::text(format!("❌ {}. Try again ({} to cancel):", reason, CANCEL_TOKEN)),
                    ),
                    Err(Error::IndexOutOfRange { .. }) => Transition::Finished(record_not_found()),
                    Err(e) => Transition::Finished(Reply::text(format!("❌ Update failed: {}", e))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdesk_common::record::Semester;
    use tempfile::TempDir;

    fn seeded(dir: &TempDir) -> RecordStore {
        RecordStore::open(dir.path().join("records.json"))
    }

    fn continue_with(step: Transition<EditWorkflow>) -> EditWorkflow {
        match step {
            Transition::Continue(w, _) => w,
            Transition::Finished(r) => panic!("finished early: {}", r.text),
        }
    }

    #[test]
    fn test_edit_subject_reports_old_and_new() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded(&dir);

        let w = continue_with(EditWorkflow::AwaitingNumber.handle_text("1", &mut store));
        let w = continue_with(w.handle_text("3", &mut store));
        assert_eq!(
            w,
            EditWorkflow::AwaitingValue {
                index: 0,
                field: RecordField::Subject
            }
        );

        match w.handle_text("Алгебра", &mut store) {
            Transition::Finished(reply) => {
                assert!(reply.text.contains("Old value: Математика"));
                assert!(reply.text.contains("New value: Алгебра"));
            }
            Transition::Continue(..) => panic!("should finish"),
        }
        assert_eq!(store.records()[0].subject, "Алгебра");
    }

    #[test]
    fn test_invalid_semester_reprompts_value_step() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded(&dir);
        let w = EditWorkflow::AwaitingValue {
            index: 0,
            field: RecordField::Semester,
        };

        let w = continue_with(w.handle_text("7", &mut store));

        assert_eq!(
            w,
            EditWorkflow::AwaitingValue {
                index: 0,
                field: RecordField::Semester
            }
        );
        assert_eq!(store.records()[0].semester, Semester::First);
    }

    #[test]
    fn test_bad_field_number_reprompts() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded(&dir);
        let w = continue_with(EditWorkflow::AwaitingField { index: 0 }.handle_text("8", &mut store));
        assert_eq!(w, EditWorkflow::AwaitingField { index: 0 });
    }

    #[test]
    fn test_link_can_be_cleared() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded(&dir);
        let w = EditWorkflow::AwaitingValue {
            index: 0,
            field: RecordField::Link,
        };
        assert!(matches!(w.handle_text("нет", &mut store), Transition::Finished(_)));
        assert_eq!(store.records()[0].link, None);
    }

    #[test]
    fn test_refuses_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::with_records(dir.path().join("records.json"), Vec::new());
        assert!(matches!(EditWorkflow::start(&store), Transition::Finished(_)));
    }
}
