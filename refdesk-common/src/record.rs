//! Reference-material record model
//!
//! A [`Record`] is one addressable unit of reference material, keyed by the
//! five-level hierarchy class → semester → subject → exam type → material
//! type. The on-disk representation is a flat JSON object using the keys in
//! [`RecordField::key`]; an absent link is written as the empty string.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Keys every imported record object must carry (`link` is optional)
pub const REQUIRED_KEYS: [&str; 6] = [
    "class_name",
    "semester",
    "subject",
    "exam_type",
    "material_type",
    "info",
];

/// Half-year a record belongs to
///
/// Closed set: only `"1"` and `"2"` are valid. Ordering matches the
/// lexicographic order of the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    /// Wire/display value (`"1"` or `"2"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::First => "1",
            Semester::Second => "2",
        }
    }

    fn from_number(n: u64) -> Option<Self> {
        match n {
            1 => Some(Semester::First),
            2 => Some(Semester::Second),
            _ => None,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(Semester::First),
            "2" => Ok(Semester::Second),
            other => Err(Error::InvalidInput(format!(
                "semester must be 1 or 2, got '{}'",
                other
            ))),
        }
    }
}

impl Serialize for Semester {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Semester {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Hand-edited files sometimes carry the semester as a bare number
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
            Raw::Number(n) => Semester::from_number(n)
                .ok_or_else(|| de::Error::custom(format!("semester must be 1 or 2, got {}", n))),
        }
    }
}

/// One reference-material entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub class_name: String,
    pub semester: Semester,
    pub subject: String,
    pub exam_type: String,
    pub material_type: String,
    pub info: String,
    #[serde(default, with = "link_field")]
    pub link: Option<String>,
}

impl Record {
    /// Current value of `field` as text (absent link renders as "")
    pub fn field_value(&self, field: RecordField) -> String {
        match field {
            RecordField::Class => self.class_name.clone(),
            RecordField::Semester => self.semester.to_string(),
            RecordField::Subject => self.subject.clone(),
            RecordField::ExamType => self.exam_type.clone(),
            RecordField::MaterialType => self.material_type.clone(),
            RecordField::Info => self.info.clone(),
            RecordField::Link => self.link.clone().unwrap_or_default(),
        }
    }

    /// Replace a single field from raw text, returning the previous value
    ///
    /// Semester input is validated against the closed set; on failure the
    /// record is left untouched. A blank link clears it.
    pub fn set_field(&mut self, field: RecordField, raw: &str) -> Result<String> {
        let old = self.field_value(field);
        let value = raw.trim().to_string();
        match field {
            RecordField::Class => self.class_name = value,
            RecordField::Semester => self.semester = value.parse()?,
            RecordField::Subject => self.subject = value,
            RecordField::ExamType => self.exam_type = value,
            RecordField::MaterialType => self.material_type = value,
            RecordField::Info => self.info = value,
            RecordField::Link => self.link = normalize_link(&value),
        }
        Ok(old)
    }

    /// Does this record sit at the given natural key?
    pub fn matches_key(
        &self,
        class_name: &str,
        semester: Semester,
        subject: &str,
        exam_type: &str,
        material_type: &str,
    ) -> bool {
        self.class_name == class_name
            && self.semester == semester
            && self.subject == subject
            && self.exam_type == exam_type
            && self.material_type == material_type
    }

    /// One-line summary used in indexed listings
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.class_name, self.subject, self.exam_type, self.material_type
        )
    }

    /// All field values joined by spaces, lowercased (search haystack)
    pub fn search_text(&self) -> String {
        RecordField::ALL
            .iter()
            .map(|f| self.field_value(*f))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Trim a link and map blank input to "no link"
pub fn normalize_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Editable record fields, in menu order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Class,
    Semester,
    Subject,
    ExamType,
    MaterialType,
    Info,
    Link,
}

impl RecordField {
    /// All fields in menu order (menu number = position + 1)
    pub const ALL: [RecordField; 7] = [
        RecordField::Class,
        RecordField::Semester,
        RecordField::Subject,
        RecordField::ExamType,
        RecordField::MaterialType,
        RecordField::Info,
        RecordField::Link,
    ];

    /// JSON key in the record file
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Class => "class_name",
            RecordField::Semester => "semester",
            RecordField::Subject => "subject",
            RecordField::ExamType => "exam_type",
            RecordField::MaterialType => "material_type",
            RecordField::Info => "info",
            RecordField::Link => "link",
        }
    }

    /// Resolve a 1-based menu choice ("1".."7")
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        let n: usize = choice.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Empty-string sentinel for "no link" on the wire
mod link_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(link: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(link.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| super::normalize_link(&s)))
    }
}
