//! Search and reporting queries
//!
//! Stateless linear scans over the record list. No caching: the data set is
//! small enough that every call recomputes from scratch.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::record::Record;

/// Case-insensitive substring search over all fields of every record
///
/// Returns `(index, record)` pairs in store order; `index` is 0-based.
/// An empty result simply means nothing matched.
pub fn search<'a>(records: &'a [Record], query: &str) -> Vec<(usize, &'a Record)> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.search_text().contains(&needle))
        .collect()
}

/// Aggregate counts over the record list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_records: usize,
    pub distinct_classes: usize,
    pub distinct_subjects: usize,
    pub distinct_exam_types: usize,
    /// Record count per class, ordered by class name
    pub per_class: Vec<(String, usize)>,
}

/// Compute [`Stats`] by a single pass
pub fn stats(records: &[Record]) -> Stats {
    let mut per_class: BTreeMap<&str, usize> = BTreeMap::new();
    let mut subjects = BTreeSet::new();
    let mut exams = BTreeSet::new();

    for record in records {
        *per_class.entry(record.class_name.as_str()).or_default() += 1;
        subjects.insert(record.subject.as_str());
        exams.insert(record.exam_type.as_str());
    }

    Stats {
        total_records: records.len(),
        distinct_classes: per_class.len(),
        distinct_subjects: subjects.len(),
        distinct_exam_types: exams.len(),
        per_class: per_class
            .into_iter()
            .map(|(class, count)| (class.to_string(), count))
            .collect(),
    }
}

/// Subjects ranked by record count, descending; ties broken by name
pub fn top_subjects(records: &[Record], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.subject.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(subject, count)| (subject.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
