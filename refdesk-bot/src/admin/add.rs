//! Add workflow: one prompt per field, in record field order

use tracing::info;

use refdesk_common::record::{normalize_link, Record, RecordField, Semester};
use refdesk_common::RecordStore;

use super::{cancelled, is_cancel, is_no_link, Transition, CANCEL_TOKEN};
use crate::reply::{self, Reply};

/// Record under construction and the field asked for next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWorkflow {
    field: RecordField,
    draft: Record,
}

impl AddWorkflow {
    pub fn start() -> (Self, Reply) {
        let workflow = Self {
            field: RecordField::Class,
            draft: Record {
                class_name: String::new(),
                semester: Semester::First,
                subject: String::new(),
                exam_type: String::new(),
                material_type: String::new(),
                info: String::new(),
                link: None,
            },
        };
        let prompt = prompt(RecordField::Class);
        (workflow, prompt)
    }

    /// Field the next message fills in
    pub fn field(&self) -> RecordField {
        self.field
    }

    pub fn handle_text(mut self, text: &str, store: &mut RecordStore) -> Transition<Self> {
        if is_cancel(text) {
            return Transition::Finished(cancelled("Adding"));
        }

        let value = text.trim();
        if value.is_empty() {
            return Transition::Continue(self, Reply::text("Value cannot be empty. Try again:"));
        }

        if self.field == RecordField::Link {
            self.draft.link = if is_no_link(value) {
                None
            } else {
                normalize_link(value)
            };
            let record = self.draft;
            let card = reply::info_card(&record);
            info!("Operator added record: {}", record.summary());
            store.append(record);
            return Transition::Finished(Reply::text(format!("✅ Record added.\n\n{}", card)));
        }

        if let Err(e) = self.draft.set_field(self.field, value) {
            let retry = Reply::text(format!("❌ {}\n\n{}", e, prompt_text(self.field)));
            return Transition::Continue(self, retry);
        }

        self.field = next_field(self.field);
        let prompt = prompt(self.field);
        Transition::Continue(self, prompt)
    }
}

fn next_field(field: RecordField) -> RecordField {
    let position = RecordField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or(0);
    RecordField::ALL
        .get(position + 1)
        .copied()
        .unwrap_or(RecordField::Link)
}

fn prompt_text(field: RecordField) -> &'static str {
    match field {
        RecordField::Class => "Enter the class (for example 9А):",
        RecordField::Semester => "Enter the semester (1 or 2):",
        RecordField::Subject => "Enter the subject:",
        RecordField::ExamType => "Enter the exam type:",
        RecordField::MaterialType => "Enter the material type:",
        RecordField::Info => "Enter the information text:",
        RecordField::Link => "Enter a link to the materials (or \"нет\" / \"no\" for none):",
    }
}

fn prompt(field: RecordField) -> Reply {
    Reply::text(format!("{} ({} to cancel)", prompt_text(field), CANCEL_TOKEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_store(dir: &TempDir) -> RecordStore {
        RecordStore::with_records(dir.path().join("records.json"), Vec::new())
    }

    fn feed(mut workflow: AddWorkflow, inputs: &[&str], store: &mut RecordStore) -> Transition<AddWorkflow> {
        let (last, rest) = inputs.split_last().unwrap();
        for input in rest {
            workflow = match workflow.handle_text(input, store) {
                Transition::Continue(w, _) => w,
                Transition::Finished(r) => panic!("finished early: {}", r.text),
            };
        }
        workflow.handle_text(last, store)
    }

    #[test]
    fn test_full_add_without_link() {
        let dir = TempDir::new().unwrap();
        let mut store = empty_store(&dir);
        let (workflow, _) = AddWorkflow::start();

        let result = feed(
            workflow,
            &["10Б", "2", "Физика", "Контрольная", "Таблицы", "Кабинет 301", "НЕТ"],
            &mut store,
        );

        assert!(matches!(result, Transition::Finished(_)));
        assert_eq!(store.len(), 1);
        let record = &store.records()[0];
        assert_eq!(record.semester, Semester::Second);
        assert_eq!(record.link, None);
    }

    #[test]
    fn test_invalid_semester_reprompts_same_step() {
        let dir = TempDir::new().unwrap();
        let mut store = empty_store(&dir);
        let (workflow, _) = AddWorkflow::start();

        match feed(workflow, &["10Б", "3"], &mut store) {
            Transition::Continue(w, reply) => {
                assert_eq!(w.field(), RecordField::Semester);
                assert!(reply.text.contains("1 or 2"));
            }
            Transition::Finished(_) => panic!("should stay in the workflow"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_value_reprompts() {
        let dir = TempDir::new().unwrap();
        let mut store = empty_store(&dir);
        let (workflow, _) = AddWorkflow::start();

        match workflow.handle_text("   ", &mut store) {
            Transition::Continue(w, _) => assert_eq!(w.field(), RecordField::Class),
            Transition::Finished(_) => panic!("should stay in the workflow"),
        }
    }

    #[test]
    fn test_cancel_at_any_step_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let mut store = empty_store(&dir);
        let (workflow, _) = AddWorkflow::start();

        let result = feed(workflow, &["10Б", "2", "Физика", "0"], &mut store);

        assert!(matches!(result, Transition::Finished(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_link_is_stored() {
        let dir = TempDir::new().unwrap();
        let mut store = empty_store(&dir);
        let (workflow, _) = AddWorkflow::start();

        feed(
            workflow,
            &["9А", "1", "Математика", "Зачёт", "Формулы", "x", "https://example.com/m"],
            &mut store,
        );

        assert_eq!(
            store.records()[0].link.as_deref(),
            Some("https://example.com/m")
        );
    }
}
