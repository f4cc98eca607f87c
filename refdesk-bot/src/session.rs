//! Per-user conversation state
//!
//! The browse flow walks class → semester → subject → exam type → material
//! type → record. Each [`BrowseState`] variant carries exactly the selections
//! made so far, so a step can never be reached without the choices it depends
//! on. Candidate sets are always recomputed from the live record list.

use refdesk_common::navigator;
use refdesk_common::record::{Record, Semester};

use crate::admin::{AddWorkflow, DeleteWorkflow, EditWorkflow, ImportWorkflow, OperatorWorkflow};

/// Step of the browse flow, without the selections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowseStep {
    SelectingClass,
    SelectingSemester,
    SelectingSubject,
    SelectingExam,
    SelectingMaterial,
    Viewing,
}

impl BrowseStep {
    /// Callback prefix for selections made at this step (`None` at `Viewing`)
    pub fn callback_prefix(&self) -> Option<&'static str> {
        match self {
            BrowseStep::SelectingClass => Some("class"),
            BrowseStep::SelectingSemester => Some("semester"),
            BrowseStep::SelectingSubject => Some("subject"),
            BrowseStep::SelectingExam => Some("exam"),
            BrowseStep::SelectingMaterial => Some("material"),
            BrowseStep::Viewing => None,
        }
    }

    pub fn from_callback_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "class" => Some(BrowseStep::SelectingClass),
            "semester" => Some(BrowseStep::SelectingSemester),
            "subject" => Some(BrowseStep::SelectingSubject),
            "exam" => Some(BrowseStep::SelectingExam),
            "material" => Some(BrowseStep::SelectingMaterial),
            _ => None,
        }
    }
}

/// Browse position together with the selections accumulated so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseState {
    SelectingClass,
    SelectingSemester {
        class_name: String,
    },
    SelectingSubject {
        class_name: String,
        semester: Semester,
    },
    SelectingExam {
        class_name: String,
        semester: Semester,
        subject: String,
    },
    SelectingMaterial {
        class_name: String,
        semester: Semester,
        subject: String,
        exam_type: String,
    },
    Viewing {
        class_name: String,
        semester: Semester,
        subject: String,
        exam_type: String,
        material_type: String,
    },
}

/// Result of feeding one input to the browse machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome {
    /// Now at `step`; show these options
    Menu { step: BrowseStep, options: Vec<String> },
    /// Now at `step` but nothing is available there
    NoData { step: BrowseStep },
    /// The full key resolved to this record
    Viewing(Record),
    /// Input does not belong to the current step; state unchanged
    Rejected,
    /// Input has no effect at the current step; state unchanged
    Ignored,
}

impl BrowseState {
    /// Entry point of the flow (also the full reset)
    pub fn start() -> Self {
        BrowseState::SelectingClass
    }

    pub fn step(&self) -> BrowseStep {
        match self {
            BrowseState::SelectingClass => BrowseStep::SelectingClass,
            BrowseState::SelectingSemester { .. } => BrowseStep::SelectingSemester,
            BrowseState::SelectingSubject { .. } => BrowseStep::SelectingSubject,
            BrowseState::SelectingExam { .. } => BrowseStep::SelectingExam,
            BrowseState::SelectingMaterial { .. } => BrowseStep::SelectingMaterial,
            BrowseState::Viewing { .. } => BrowseStep::Viewing,
        }
    }

    /// Valid choices at the current step (empty at `Viewing`)
    pub fn candidates(&self, records: &[Record]) -> Vec<String> {
        match self {
            BrowseState::SelectingClass => navigator::classes(records),
            BrowseState::SelectingSemester { class_name } => navigator::semesters(records, class_name)
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            BrowseState::SelectingSubject {
                class_name,
                semester,
            } => navigator::subjects(records, class_name, *semester),
            BrowseState::SelectingExam {
                class_name,
                semester,
                subject,
            } => navigator::exam_types(records, class_name, *semester, subject),
            BrowseState::SelectingMaterial {
                class_name,
                semester,
                subject,
                exam_type,
            } => navigator::material_types(records, class_name, *semester, subject, exam_type),
            BrowseState::Viewing { .. } => Vec::new(),
        }
    }

    /// Menu (or "no data") for the current step; the record card at `Viewing`
    pub fn present(&self, records: &[Record]) -> BrowseOutcome {
        let step = self.step();
        if let BrowseState::Viewing {
            class_name,
            semester,
            subject,
            exam_type,
            material_type,
        } = self
        {
            return match navigator::resolve(
                records,
                class_name,
                *semester,
                subject,
                exam_type,
                material_type,
            ) {
                Some(record) => BrowseOutcome::Viewing(record.clone()),
                None => BrowseOutcome::NoData { step },
            };
        }
        let options = self.candidates(records);
        if options.is_empty() {
            BrowseOutcome::NoData { step }
        } else {
            BrowseOutcome::Menu { step, options }
        }
    }

    /// Apply a selection made for `step`
    pub fn select(&mut self, step: BrowseStep, value: &str, records: &[Record]) -> BrowseOutcome {
        if step != self.step() {
            return BrowseOutcome::Rejected;
        }

        if let BrowseState::SelectingMaterial {
            class_name,
            semester,
            subject,
            exam_type,
        } = &*self
        {
            let Some(record) =
                navigator::resolve(records, class_name, *semester, subject, exam_type, value)
            else {
                return BrowseOutcome::NoData { step };
            };
            let viewing = BrowseState::Viewing {
                class_name: class_name.clone(),
                semester: *semester,
                subject: subject.clone(),
                exam_type: exam_type.clone(),
                material_type: value.to_string(),
            };
            let record = record.clone();
            *self = viewing;
            return BrowseOutcome::Viewing(record);
        }

        if !self.candidates(records).iter().any(|c| c == value) {
            return BrowseOutcome::Rejected;
        }

        let next = match &*self {
            BrowseState::SelectingClass => BrowseState::SelectingSemester {
                class_name: value.to_string(),
            },
            BrowseState::SelectingSemester { class_name } => match value.parse::<Semester>() {
                Ok(semester) => BrowseState::SelectingSubject {
                    class_name: class_name.clone(),
                    semester,
                },
                Err(_) => return BrowseOutcome::Rejected,
            },
            BrowseState::SelectingSubject {
                class_name,
                semester,
            } => BrowseState::SelectingExam {
                class_name: class_name.clone(),
                semester: *semester,
                subject: value.to_string(),
            },
            BrowseState::SelectingExam {
                class_name,
                semester,
                subject,
            } => BrowseState::SelectingMaterial {
                class_name: class_name.clone(),
                semester: *semester,
                subject: subject.clone(),
                exam_type: value.to_string(),
            },
            BrowseState::SelectingMaterial { .. } | BrowseState::Viewing { .. } => {
                return BrowseOutcome::Rejected
            }
        };

        *self = next;
        self.present(records)
    }

    /// Step back to the immediate predecessor
    ///
    /// The predecessor's own selection (and everything deeper) is cleared and
    /// its menu is rebuilt from the selections above it.
    pub fn back(&mut self, records: &[Record]) -> BrowseOutcome {
        let previous = match &*self {
            BrowseState::SelectingClass => return BrowseOutcome::Ignored,
            BrowseState::Viewing { .. } => return self.back_to_materials(records),
            BrowseState::SelectingSemester { .. } => BrowseState::SelectingClass,
            BrowseState::SelectingSubject { class_name, .. } => BrowseState::SelectingSemester {
                class_name: class_name.clone(),
            },
            BrowseState::SelectingExam {
                class_name,
                semester,
                ..
            } => BrowseState::SelectingSubject {
                class_name: class_name.clone(),
                semester: *semester,
            },
            BrowseState::SelectingMaterial {
                class_name,
                semester,
                subject,
                ..
            } => BrowseState::SelectingExam {
                class_name: class_name.clone(),
                semester: *semester,
                subject: subject.clone(),
            },
        };

        *self = previous;
        self.present(records)
    }

    /// Return from a record card to its material menu, keeping the other
    /// four selections
    pub fn back_to_materials(&mut self, records: &[Record]) -> BrowseOutcome {
        let materials = match &*self {
            BrowseState::Viewing {
                class_name,
                semester,
                subject,
                exam_type,
                ..
            } => BrowseState::SelectingMaterial {
                class_name: class_name.clone(),
                semester: *semester,
                subject: subject.clone(),
                exam_type: exam_type.clone(),
            },
            BrowseState::SelectingMaterial { .. } => return self.present(records),
            _ => return BrowseOutcome::Ignored,
        };

        *self = materials;
        self.present(records)
    }

    /// Full reset to the class menu
    pub fn back_to_start(&mut self, records: &[Record]) -> BrowseOutcome {
        *self = BrowseState::start();
        self.present(records)
    }
}

/// Everything a single user can be in the middle of
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Idle,
    Browse(BrowseState),
    Add(AddWorkflow),
    Delete(DeleteWorkflow),
    Edit(EditWorkflow),
    Import(ImportWorkflow),
    AddOperator(OperatorWorkflow),
}

impl Session {
    /// Short name for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::Browse(_) => "browse",
            Session::Add(_) => "add",
            Session::Delete(_) => "delete",
            Session::Edit(_) => "edit",
            Session::Import(_) => "import",
            Session::AddOperator(_) => "addadmin",
        }
    }
}
