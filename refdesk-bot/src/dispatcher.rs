//! Update routing
//!
//! The [`Dispatcher`] owns every piece of mutable state: the record store,
//! the operator registry and one [`Session`] per user. Each inbound
//! [`Update`] is routed by its kind and the sender's session:
//!
//! - slash commands always interrupt the current session (operator-only
//!   commands are authorized before anything changes)
//! - button callbacks drive the browse machine
//! - free text and documents feed the active admin workflow

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info, warn};

use refdesk_common::{search, OperatorRegistry, RecordStore, UserId};

use crate::admin::{
    AddWorkflow, DeleteWorkflow, EditWorkflow, ImportWorkflow, OperatorWorkflow, Transition,
};
use crate::command::{CallbackData, Command};
use crate::reply::{self, Document, Notification, Reply};
use crate::session::{BrowseOutcome, BrowseState, Session};

/// Number of subjects listed by `/analytics`
const ANALYTICS_TOP: usize = 10;

/// One inbound event from the chat transport
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    Message { text: String },
    Callback { data: String },
    Document { file_name: String, content: String },
}

const REFUSAL: &str = "❌ You don't have permission to use this command.";

pub struct Dispatcher {
    store: RecordStore,
    operators: OperatorRegistry,
    sessions: HashMap<UserId, Session>,
    backup_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(store: RecordStore, operators: OperatorRegistry, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            operators,
            sessions: HashMap::new(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    /// Current session of `user` (idle when never seen)
    pub fn session(&self, user: UserId) -> Session {
        self.sessions.get(&user).cloned().unwrap_or_default()
    }

    /// Process one update and produce the reply for its sender
    pub fn handle(&mut self, user: UserId, update: Update) -> Reply {
        match update {
            Update::Message { text } => match Command::parse(&text) {
                Some(command) => self.handle_command(user, command),
                None => self.handle_text(user, &text),
            },
            Update::Callback { data } => self.handle_callback(user, &data),
            Update::Document { file_name, content } => {
                self.handle_document(user, &file_name, &content)
            }
        }
    }

    fn take_session(&mut self, user: UserId) -> Session {
        self.sessions.remove(&user).unwrap_or_default()
    }

    fn set_session(&mut self, user: UserId, session: Session) {
        match session {
            Session::Idle => {
                self.sessions.remove(&user);
            }
            session => {
                self.sessions.insert(user, session);
            }
        }
    }

    /// Store the workflow back into the session or drop to idle
    fn apply<W>(&mut self, user: UserId, transition: Transition<W>, wrap: fn(W) -> Session) -> Reply {
        match transition {
            Transition::Continue(workflow, reply) => {
                self.set_session(user, wrap(workflow));
                reply
            }
            Transition::Finished(reply) => {
                self.set_session(user, Session::Idle);
                reply
            }
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn handle_command(&mut self, user: UserId, command: Command) -> Reply {
        if command.requires_operator() && !self.operators.is_operator(user) {
            warn!("Refused /{} for non-operator {}", command.name(), user);
            return Reply::text(REFUSAL);
        }

        if let Command::Unknown(name) = &command {
            debug!("Unknown command /{} from {}", name, user);
            return Reply::text("Unknown command. Send /help for the list of commands.");
        }

        let previous = self.take_session(user);
        debug!(
            "User {} ran /{} (interrupting {} session)",
            user,
            command.name(),
            previous.label()
        );

        match command {
            Command::Start => {
                let state = BrowseState::start();
                let outcome = state.present(self.store.records());
                self.set_session(user, Session::Browse(state));
                let mut reply = reply::browse(&outcome);
                reply.text = format!("👋 Welcome to the reference desk!\n\n{}", reply.text);
                reply
            }
            Command::Help => Reply::text(self.help_text(user)),
            Command::Add => {
                let (workflow, prompt) = AddWorkflow::start();
                self.set_session(user, Session::Add(workflow));
                prompt
            }
            Command::Delete => {
                let transition = DeleteWorkflow::start(&self.store);
                self.apply(user, transition, Session::Delete)
            }
            Command::Edit => {
                let transition = EditWorkflow::start(&self.store);
                self.apply(user, transition, Session::Edit)
            }
            Command::List => Reply::text(reply::record_list(self.store.records())),
            Command::Search(query) => {
                if query.trim().is_empty() {
                    return Reply::text("Usage: /search <text>");
                }
                let hits = search::search(self.store.records(), &query);
                Reply::text(reply::search_results(&query, &hits))
            }
            Command::Stats => Reply::text(reply::stats(&search::stats(self.store.records()))),
            Command::Analytics => Reply::text(reply::analytics(&search::top_subjects(
                self.store.records(),
                ANALYTICS_TOP,
            ))),
            Command::Import => {
                let (workflow, prompt) = ImportWorkflow::start();
                self.set_session(user, Session::Import(workflow));
                prompt
            }
            Command::Export => self.export(),
            Command::Backup => match self.store.backup(&self.backup_dir) {
                Ok(path) => Reply::text(format!("✅ Backup created: {}", path.display())),
                Err(e) => Reply::text(format!("❌ Backup failed: {}", e)),
            },
            Command::AddOperator => {
                let (workflow, prompt) = OperatorWorkflow::start();
                self.set_session(user, Session::AddOperator(workflow));
                prompt
            }
            Command::ListOperators => Reply::text(reply::operator_list(self.operators.list())),
            Command::Notify(text) => self.notify(user, &text),
            Command::Unknown(_) => Reply::none(),
        }
    }

    fn help_text(&self, user: UserId) -> String {
        let mut text = String::from(
            "Commands:\n\
             /start - browse reference materials\n\
             /help - this message",
        );
        if self.operators.is_operator(user) {
            text.push_str(
                "\n\nOperator commands:\n\
                 /add - add a record\n\
                 /delete - delete a record\n\
                 /edit - edit a record\n\
                 /list - list all records\n\
                 /search <text> - search records\n\
                 /stats - statistics\n\
                 /analytics - top subjects\n\
                 /import - import records from a JSON file\n\
                 /export - export the database as JSON\n\
                 /backup - write a backup snapshot\n\
                 /addadmin - add an operator\n\
                 /listadmins - list operators\n\
                 /notify <text> - notify all operators",
            );
        }
        text
    }

    fn export(&self) -> Reply {
        match self.store.export_json() {
            Ok(content) => {
                let file_name = self
                    .store
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "records.json".to_string());
                info!("Exported {} records", self.store.len());
                Reply::text(format!("📤 Database export ({} records)", self.store.len()))
                    .with_document(Document { file_name, content })
            }
            Err(e) => Reply::text(format!("❌ Export failed: {}", e)),
        }
    }

    fn notify(&self, sender: UserId, text: &str) -> Reply {
        let text = text.trim();
        if text.is_empty() {
            return Reply::text("Usage: /notify <text>");
        }
        let message = format!("🔔 Notification from operator {}:\n\n{}", sender, text);
        let mut reply = Reply::text(format!(
            "✅ Notification queued for {} operator(s).",
            self.operators.list().len()
        ));
        reply.notifications = self
            .operators
            .list()
            .iter()
            .map(|id| Notification {
                user_id: *id,
                text: message.clone(),
            })
            .collect();
        info!("Operator {} sent a notification", sender);
        reply
    }

    // =========================================================================
    // Free text, callbacks and documents
    // =========================================================================

    fn handle_text(&mut self, user: UserId, text: &str) -> Reply {
        match self.take_session(user) {
            Session::Add(workflow) => {
                let transition = workflow.handle_text(text, &mut self.store);
                self.apply(user, transition, Session::Add)
            }
            Session::Delete(workflow) => {
                let transition = workflow.handle_text(text, &mut self.store);
                self.apply(user, transition, Session::Delete)
            }
            Session::Edit(workflow) => {
                let transition = workflow.handle_text(text, &mut self.store);
                self.apply(user, transition, Session::Edit)
            }
            Session::Import(workflow) => {
                let transition = workflow.handle_text(text);
                self.apply(user, transition, Session::Import)
            }
            Session::AddOperator(workflow) => {
                let transition = workflow.handle_text(text, &mut self.operators);
                self.apply(user, transition, Session::AddOperator)
            }
            session @ (Session::Idle | Session::Browse(_)) => {
                self.set_session(user, session);
                Reply::text("I didn't recognize that. Send /start to browse or /help for commands.")
            }
        }
    }

    fn handle_callback(&mut self, user: UserId, data: &str) -> Reply {
        let callback = match data.parse::<CallbackData>() {
            Ok(callback) => callback,
            Err(e) => {
                debug!("Ignoring callback from {}: {}", user, e);
                return Reply::none();
            }
        };

        let mut state = match self.take_session(user) {
            Session::Browse(state) => state,
            other => {
                self.set_session(user, other);
                return Reply::text("This menu is no longer active. Send /start to browse.");
            }
        };

        let records = self.store.records();
        let outcome = match callback {
            CallbackData::Select { step, value } => state.select(step, &value, records),
            CallbackData::Back => state.back(records),
            CallbackData::BackToMaterials => state.back_to_materials(records),
            CallbackData::BackToStart => state.back_to_start(records),
        };
        debug!("User {} browse -> {:?}", user, state.step());

        let reply = match &outcome {
            BrowseOutcome::Rejected => {
                let mut retry = reply::browse(&state.present(records));
                retry.text = format!("Please choose one of the offered options.\n\n{}", retry.text);
                retry
            }
            outcome => reply::browse(outcome),
        };
        self.set_session(user, Session::Browse(state));
        reply
    }

    fn handle_document(&mut self, user: UserId, file_name: &str, content: &str) -> Reply {
        match self.take_session(user) {
            Session::Import(workflow) => {
                let transition = workflow.handle_document(file_name, content, &mut self.store);
                self.apply(user, transition, Session::Import)
            }
            other => {
                self.set_session(user, other);
                Reply::text("I wasn't expecting a file. Operators can use /import first.")
            }
        }
    }
}
