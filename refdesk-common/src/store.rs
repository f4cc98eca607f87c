//! File-backed record store
//!
//! Owns the ordered record list and its JSON file. Insertion order is
//! preserved and exposed: listings, edit and delete all address records by
//! position.
//!
//! # Persistence policy
//!
//! - `load` never fails: a missing file is seeded and written, an unreadable
//!   file is logged and the in-memory list is kept as it was.
//! - Every mutation is followed by a full persist. Write failures are logged
//!   and absorbed so the conversation keeps running on in-memory state.
//! - Writes go to a sibling `.tmp` file that is then renamed over the target,
//!   so a reader never observes a half-written file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::record::{normalize_link, Record, RecordField, Semester, REQUIRED_KEYS};
use crate::{Error, Result};

/// Why a bulk import batch was refused
///
/// Positions are 1-based, matching what operators see in listings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportRejection {
    /// Payload is not parseable JSON
    #[error("file is not valid JSON: {0}")]
    Malformed(String),

    /// Payload parsed but is not a list
    #[error("expected a list of records")]
    NotAList,

    #[error("record #{position} is not an object")]
    NotAnObject { position: usize },

    #[error("record #{position} is missing required field '{field}'")]
    MissingField { position: usize, field: &'static str },

    #[error("record #{position} has an invalid '{field}': {reason}")]
    InvalidField {
        position: usize,
        field: &'static str,
        reason: String,
    },
}

/// Parse raw document text into a JSON value for [`RecordStore::bulk_import`]
pub fn parse_import_payload(content: &str) -> std::result::Result<Value, ImportRejection> {
    serde_json::from_str(content).map_err(|e| ImportRejection::Malformed(e.to_string()))
}

/// Ordered, file-backed record list
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<Record>,
}

impl RecordStore {
    /// Bind a store to `path` and load it (seeding when the file is absent)
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::with_records(path, Vec::new());
        store.load();
        store
    }

    /// Bind a store to `path` with the given records, without touching disk
    pub fn with_records(path: impl Into<PathBuf>, records: Vec<Record>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    /// Records written on first run
    pub fn default_seed() -> Vec<Record> {
        vec![Record {
            class_name: "9А".to_string(),
            semester: Semester::First,
            subject: "Математика".to_string(),
            exam_type: "Зачёт".to_string(),
            material_type: "Формулы".to_string(),
            info: "Учебник: Алгебра 9 класс\nУчитель: Иванов И.И.\nКабинет: 205".to_string(),
            link: Some("https://example.com/math-materials".to_string()),
        }]
    }

    /// Read the record file into memory
    ///
    /// Missing file: seed with [`RecordStore::default_seed`] and persist.
    /// Read or parse failure: log and keep the current in-memory records.
    pub fn load(&mut self) {
        if !self.path.exists() {
            info!(
                "Record file {} not found, seeding default records",
                self.path.display()
            );
            self.records = Self::default_seed();
            self.persist();
            return;
        }

        match read_records(&self.path) {
            Ok(records) => {
                info!(
                    "Loaded {} records from {}",
                    records.len(),
                    self.path.display()
                );
                self.records = records;
            }
            Err(e) => {
                error!(
                    "Failed to load records from {}: {} (keeping {} in-memory records)",
                    self.path.display(),
                    e,
                    self.records.len()
                );
            }
        }
    }

    /// Write the full list to the record file, surfacing the result
    pub fn try_persist(&self) -> Result<()> {
        write_records(&self.path, &self.records)
    }

    /// Write the full list to the record file; failures are logged only
    pub fn persist(&self) {
        if let Err(e) = self.try_persist() {
            error!(
                "Failed to persist {} records to {}: {}",
                self.records.len(),
                self.path.display(),
                e
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at 0-based `index`
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Append one record and persist
    pub fn append(&mut self, record: Record) {
        info!("Appending record: {}", record.summary());
        self.records.push(record);
        self.persist();
    }

    /// Replace a single field of the record at `index` and persist
    ///
    /// Returns the previous value as text. The caller validates `index`;
    /// an out-of-range index is reported rather than panicking.
    pub fn replace_field(&mut self, index: usize, field: RecordField, value: &str) -> Result<String> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        let old = record.set_field(field, value)?;
        info!("Record #{} field '{}' updated", index + 1, field);
        self.persist();
        Ok(old)
    }

    /// Remove the record at `index` and persist
    pub fn remove(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        info!("Removed record #{}: {}", index + 1, removed.summary());
        self.persist();
        Ok(removed)
    }

    /// Write a copy of the current list to `path` without altering the store
    pub fn snapshot_to(&self, path: &Path) -> Result<()> {
        write_records(path, &self.records)
    }

    /// Write a timestamped snapshot into `dir`, returning its path
    ///
    /// Backups are write-once: if a snapshot with the same timestamp already
    /// exists a numeric suffix is added.
    pub fn backup(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let mut target = dir.join(format!("backup_{}.json", stamp));
        let mut suffix = 1;
        while target.exists() {
            target = dir.join(format!("backup_{}_{}.json", stamp, suffix));
            suffix += 1;
        }

        self.snapshot_to(&target)?;
        info!("Backup written to {}", target.display());
        Ok(target)
    }

    /// Persist, then return the serialized record list for export
    pub fn export_json(&self) -> Result<String> {
        self.persist();
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Validate and append a batch of records (all-or-nothing)
    ///
    /// Every element is checked before anything is appended. On rejection the
    /// store is unchanged. On success the batch is appended in order and the
    /// store is persisted once. Returns the number of records added.
    pub fn bulk_import(&mut self, payload: &Value) -> std::result::Result<usize, ImportRejection> {
        let batch = match validate_batch(payload) {
            Ok(batch) => batch,
            Err(rejection) => {
                warn!("Import rejected: {}", rejection);
                return Err(rejection);
            }
        };

        let count = batch.len();
        self.records.extend(batch);
        self.persist();
        info!("Imported {} records (store now holds {})", count, self.records.len());
        Ok(count)
    }
}

/// Check every element of an import payload and build typed records
pub fn validate_batch(payload: &Value) -> std::result::Result<Vec<Record>, ImportRejection> {
    let items = payload.as_array().ok_or(ImportRejection::NotAList)?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let position = i + 1;
            let object = item
                .as_object()
                .ok_or(ImportRejection::NotAnObject { position })?;
            record_from_object(position, object)
        })
        .collect()
}

fn record_from_object(
    position: usize,
    object: &Map<String, Value>,
) -> std::result::Result<Record, ImportRejection> {
    if let Some(field) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
        return Err(ImportRejection::MissingField {
            position,
            field: *field,
        });
    }

    let text = |field: &'static str| -> std::result::Result<String, ImportRejection> {
        object[field]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ImportRejection::InvalidField {
                position,
                field,
                reason: "expected text".to_string(),
            })
    };

    let semester: Semester = serde_json::from_value(object["semester"].clone()).map_err(|e| {
        ImportRejection::InvalidField {
            position,
            field: "semester",
            reason: e.to_string(),
        }
    })?;

    let link = match object.get("link") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => normalize_link(s),
        Some(_) => {
            return Err(ImportRejection::InvalidField {
                position,
                field: "link",
                reason: "expected text".to_string(),
            })
        }
    };

    Ok(Record {
        class_name: text("class_name")?,
        semester,
        subject: text("subject")?,
        exam_type: text("exam_type")?,
        material_type: text("material_type")?,
        info: text("info")?,
        link,
    })
}

fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(records)?;
    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("records.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
