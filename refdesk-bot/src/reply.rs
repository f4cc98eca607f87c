//! Outbound replies and their text rendering
//!
//! A [`Reply`] is what the transport sends back to the user for one update:
//! message text, an optional inline keyboard, an optional document and any
//! notifications addressed to other users. An empty `text` means there is
//! nothing to send.

use serde::Serialize;

use refdesk_common::record::Record;
use refdesk_common::search::Stats;
use refdesk_common::UserId;

use crate::command::CallbackData;
use crate::session::{BrowseOutcome, BrowseStep};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    /// Rows of inline buttons
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keyboard: Vec<Vec<Button>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

/// Serialized as `callback_data` or `url` next to the button text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    CallbackData(String),
    Url(String),
}

/// File attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub file_name: String,
    pub content: String,
}

/// Message the transport should deliver to another user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub user_id: UserId,
    pub text: String,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Nothing to send
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        self.keyboard.push(row);
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.keyboard.is_empty()
            && self.document.is_none()
            && self.notifications.is_empty()
    }
}

impl Button {
    pub fn callback(text: impl Into<String>, data: &CallbackData) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::CallbackData(data.to_string()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

// =============================================================================
// Browse rendering
// =============================================================================

fn step_prompt(step: BrowseStep) -> &'static str {
    match step {
        BrowseStep::SelectingClass => "Choose a class:",
        BrowseStep::SelectingSemester => "Choose a semester:",
        BrowseStep::SelectingSubject => "Choose a subject:",
        BrowseStep::SelectingExam => "Choose an exam type:",
        BrowseStep::SelectingMaterial => "Choose a material type:",
        BrowseStep::Viewing => "",
    }
}

fn no_data_text(step: BrowseStep) -> &'static str {
    match step {
        BrowseStep::SelectingClass => "No classes available yet.",
        BrowseStep::SelectingSemester => "No semesters available for this class.",
        BrowseStep::SelectingSubject => "No subjects available for this semester.",
        BrowseStep::SelectingExam => "No exam types available for this subject.",
        BrowseStep::SelectingMaterial | BrowseStep::Viewing => {
            "No information found for this selection."
        }
    }
}

fn back_button() -> Button {
    Button::callback("⬅️ Back", &CallbackData::Back)
}

/// Menu for one browse step: one button per option, plus "back" past step one
pub fn menu(step: BrowseStep, options: &[String]) -> Reply {
    let mut reply = Reply::text(step_prompt(step));
    if step.callback_prefix().is_some() {
        for option in options {
            let data = CallbackData::Select {
                step,
                value: option.clone(),
            };
            reply = reply.with_row(vec![Button::callback(option.clone(), &data)]);
        }
    }
    if step != BrowseStep::SelectingClass {
        reply = reply.with_row(vec![back_button()]);
    }
    reply
}

/// Formatted record card
pub fn info_card(record: &Record) -> String {
    let mut card = format!(
        "📋 Reference information\n\n\
         Class: {}\n\
         Semester: {}\n\
         Subject: {}\n\
         Exam type: {}\n\
         Materials: {}\n\n\
         {}",
        record.class_name,
        record.semester,
        record.subject,
        record.exam_type,
        record.material_type,
        record.info
    );
    if let Some(link) = &record.link {
        card.push_str(&format!("\n\nLink: {}", link));
    }
    card
}

/// Record card with its navigation keyboard
pub fn record_view(record: &Record) -> Reply {
    let mut reply = Reply::text(info_card(record));
    if let Some(link) = &record.link {
        reply = reply.with_row(vec![Button::url("🔗 Open materials", link.clone())]);
    }
    reply
        .with_row(vec![Button::callback(
            "⬅️ Back to material types",
            &CallbackData::BackToMaterials,
        )])
        .with_row(vec![Button::callback("🏠 Start over", &CallbackData::BackToStart)])
}

/// Render a browse outcome (`Ignored` renders as an empty reply)
pub fn browse(outcome: &BrowseOutcome) -> Reply {
    match outcome {
        BrowseOutcome::Menu { step, options } => menu(*step, options),
        BrowseOutcome::NoData { step } => {
            let reply = Reply::text(no_data_text(*step));
            if *step == BrowseStep::SelectingClass {
                reply
            } else {
                reply.with_row(vec![back_button()])
            }
        }
        BrowseOutcome::Viewing(record) => record_view(record),
        BrowseOutcome::Rejected => Reply::text("Please choose one of the offered options."),
        BrowseOutcome::Ignored => Reply::none(),
    }
}

// =============================================================================
// Listings and reports
// =============================================================================

/// 1-based indexed listing of `(index, record)` pairs
pub fn indexed_list<'a>(entries: impl IntoIterator<Item = (usize, &'a Record)>) -> String {
    entries
        .into_iter()
        .map(|(i, record)| format!("{}. {}", i + 1, record.summary()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn record_list(records: &[Record]) -> String {
    if records.is_empty() {
        return "Database is empty.".to_string();
    }
    format!(
        "Records ({}):\n\n{}",
        records.len(),
        indexed_list(records.iter().enumerate())
    )
}

pub fn search_results(query: &str, hits: &[(usize, &Record)]) -> String {
    if hits.is_empty() {
        return format!("Nothing found for \"{}\".", query.trim());
    }
    format!(
        "Found {} record(s) for \"{}\":\n\n{}",
        hits.len(),
        query.trim(),
        indexed_list(hits.iter().copied())
    )
}

pub fn stats(stats: &Stats) -> String {
    let mut text = format!(
        "📊 Statistics\n\n\
         Total records: {}\n\
         Classes: {}\n\
         Subjects: {}\n\
         Exam types: {}",
        stats.total_records, stats.distinct_classes, stats.distinct_subjects, stats.distinct_exam_types
    );
    if !stats.per_class.is_empty() {
        text.push_str("\n\nRecords per class:");
        for (class_name, count) in &stats.per_class {
            text.push_str(&format!("\n{}: {}", class_name, count));
        }
    }
    text
}

pub fn analytics(top: &[(String, usize)]) -> String {
    if top.is_empty() {
        return "📈 Analytics\n\nNo records yet.".to_string();
    }
    let lines: Vec<String> = top
        .iter()
        .enumerate()
        .map(|(i, (subject, count))| format!("{}. {}: {}", i + 1, subject, count))
        .collect();
    format!("📈 Analytics\n\nTop subjects by record count:\n{}", lines.join("\n"))
}

pub fn operator_list(ids: &[UserId]) -> String {
    if ids.is_empty() {
        return "No operators configured.".to_string();
    }
    let lines: Vec<String> = ids.iter().map(|id| format!("• {}", id)).collect();
    format!("Operators:\n{}", lines.join("\n"))
}
