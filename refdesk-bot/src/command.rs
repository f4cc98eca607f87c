//! Inbound text and callback parsing
//!
//! Slash commands may carry a `@botname` suffix and an argument tail
//! (`/search математика`). Callback payloads are the `prefix:value` strings
//! produced by [`crate::reply::menu`] plus the three navigation tokens.

use std::fmt;
use std::str::FromStr;

use refdesk_common::Error;

use crate::session::BrowseStep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add,
    Delete,
    Edit,
    List,
    Search(String),
    Stats,
    Analytics,
    Import,
    Export,
    Backup,
    AddOperator,
    ListOperators,
    Notify(String),
    Unknown(String),
}

impl Command {
    /// Parse a message; `None` if it is not a slash command
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;
        let (head, args) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "add" => Command::Add,
            "delete" => Command::Delete,
            "edit" => Command::Edit,
            "list" => Command::List,
            "search" => Command::Search(args.to_string()),
            "stats" => Command::Stats,
            "analytics" => Command::Analytics,
            "import" => Command::Import,
            "export" => Command::Export,
            "backup" => Command::Backup,
            "addadmin" => Command::AddOperator,
            "listadmins" => Command::ListOperators,
            "notify" => Command::Notify(args.to_string()),
            _ => Command::Unknown(name),
        };
        Some(command)
    }

    /// Operator-only commands
    pub fn requires_operator(&self) -> bool {
        !matches!(self, Command::Start | Command::Help | Command::Unknown(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Add => "add",
            Command::Delete => "delete",
            Command::Edit => "edit",
            Command::List => "list",
            Command::Search(_) => "search",
            Command::Stats => "stats",
            Command::Analytics => "analytics",
            Command::Import => "import",
            Command::Export => "export",
            Command::Backup => "backup",
            Command::AddOperator => "addadmin",
            Command::ListOperators => "listadmins",
            Command::Notify(_) => "notify",
            Command::Unknown(name) => name,
        }
    }
}

/// Button payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    Select { step: BrowseStep, value: String },
    Back,
    BackToMaterials,
    BackToStart,
}

impl FromStr for CallbackData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "back" => return Ok(CallbackData::Back),
            "back_to_materials" => return Ok(CallbackData::BackToMaterials),
            "back_to_start" => return Ok(CallbackData::BackToStart),
            _ => {}
        }

        // Values may themselves contain ':'; only the first one separates
        let (prefix, value) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidInput(format!("unrecognized callback '{}'", s)))?;
        let step = BrowseStep::from_callback_prefix(prefix)
            .ok_or_else(|| Error::InvalidInput(format!("unknown callback prefix '{}'", prefix)))?;

        Ok(CallbackData::Select {
            step,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::Select { step, value } => {
                write!(f, "{}:{}", step.callback_prefix().unwrap_or("view"), value)
            }
            CallbackData::Back => f.write_str("back"),
            CallbackData::BackToMaterials => f.write_str("back_to_materials"),
            CallbackData::BackToStart => f.write_str("back_to_start"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /HELP "), Some(Command::Help));
        assert_eq!(Command::parse("/addadmin"), Some(Command::AddOperator));
        assert_eq!(Command::parse("/listadmins"), Some(Command::ListOperators));
    }

    #[test]
    fn test_parse_strips_bot_suffix() {
        assert_eq!(Command::parse("/list@refdesk_bot"), Some(Command::List));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            Command::parse("/search  математика 9А"),
            Some(Command::Search("математика 9А".to_string()))
        );
        assert_eq!(Command::parse("/search"), Some(Command::Search(String::new())));
        assert_eq!(
            Command::parse("/notify Exams moved"),
            Some(Command::Notify("Exams moved".to_string()))
        );
    }

    #[test]
    fn test_non_commands() {
        assert_eq!(Command::parse("9А"), None);
        assert_eq!(Command::parse("0"), None);
        assert_eq!(Command::parse("/frobnicate"), Some(Command::Unknown("frobnicate".to_string())));
    }

    #[test]
    fn test_operator_gate() {
        assert!(!Command::Start.requires_operator());
        assert!(!Command::Help.requires_operator());
        assert!(Command::Search("x".to_string()).requires_operator());
        assert!(Command::Delete.requires_operator());
    }

    #[test]
    fn test_callback_parse() {
        assert_eq!("back".parse::<CallbackData>().unwrap(), CallbackData::Back);
        assert_eq!(
            "semester:2".parse::<CallbackData>().unwrap(),
            CallbackData::Select {
                step: BrowseStep::SelectingSemester,
                value: "2".to_string()
            }
        );
        assert_eq!(
            "material:Формулы: часть 1".parse::<CallbackData>().unwrap(),
            CallbackData::Select {
                step: BrowseStep::SelectingMaterial,
                value: "Формулы: часть 1".to_string()
            }
        );
        assert!("bogus".parse::<CallbackData>().is_err());
        assert!("view:x".parse::<CallbackData>().is_err());
    }

    #[test]
    fn test_callback_display_matches_parse() {
        let data = CallbackData::Select {
            step: BrowseStep::SelectingExam,
            value: "Зачёт".to_string(),
        };
        assert_eq!(data.to_string(), "exam:Зачёт");
        assert_eq!(data.to_string().parse::<CallbackData>().unwrap(), data);
        assert_eq!(CallbackData::BackToMaterials.to_string(), "back_to_materials");
    }
}
