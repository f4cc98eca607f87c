//! Hierarchy derivation
//!
//! Pure, read-only functions that compute the candidate set for each level of
//! the browse hierarchy from the full record list and the selections made so
//! far. Every level filters on all previously chosen levels, projects the next
//! field, deduplicates and sorts. An empty vector means "no data at this
//! level" and is a normal outcome.

use std::collections::BTreeSet;

use crate::record::{Record, Semester};

fn distinct<T: Ord + Clone>(values: impl Iterator<Item = T>) -> Vec<T> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Distinct class names across all records
pub fn classes(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|r| r.class_name.clone()))
}

/// Distinct semesters for a class
pub fn semesters(records: &[Record], class_name: &str) -> Vec<Semester> {
    distinct(
        records
            .iter()
            .filter(|r| r.class_name == class_name)
            .map(|r| r.semester),
    )
}

/// Distinct subjects for (class, semester)
pub fn subjects(records: &[Record], class_name: &str, semester: Semester) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|r| r.class_name == class_name && r.semester == semester)
            .map(|r| r.subject.clone()),
    )
}

/// Distinct exam types for (class, semester, subject)
pub fn exam_types(
    records: &[Record],
    class_name: &str,
    semester: Semester,
    subject: &str,
) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|r| r.class_name == class_name && r.semester == semester && r.subject == subject)
            .map(|r| r.exam_type.clone()),
    )
}

/// Distinct material types for (class, semester, subject, exam)
pub fn material_types(
    records: &[Record],
    class_name: &str,
    semester: Semester,
    subject: &str,
    exam_type: &str,
) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|r| {
                r.class_name == class_name
                    && r.semester == semester
                    && r.subject == subject
                    && r.exam_type == exam_type
            })
            .map(|r| r.material_type.clone()),
    )
}

/// First record at the full natural key, if any
///
/// Duplicate keys are allowed in storage; the earliest one in store order wins.
pub fn resolve<'a>(
    records: &'a [Record],
    class_name: &str,
    semester: Semester,
    subject: &str,
    exam_type: &str,
    material_type: &str,
) -> Option<&'a Record> {
    records
        .iter()
        .find(|r| r.matches_key(class_name, semester, subject, exam_type, material_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(class: &str, sem: Semester, subject: &str, exam: &str, material: &str) -> Record {
        Record {
            class_name: class.to_string(),
            semester: sem,
            subject: subject.to_string(),
            exam_type: exam.to_string(),
            material_type: material.to_string(),
            info: format!("{} {}", subject, material),
            link: None,
        }
    }

    fn fixture() -> Vec<Record> {
        vec![
            rec("9А", Semester::First, "Математика", "Зачёт", "Формулы"),
            rec("10Б", Semester::Second, "Физика", "Контрольная", "Таблицы"),
            rec("9А", Semester::Second, "Математика", "Семестровая", "Конспекты"),
            rec("9А", Semester::First, "Биология", "Зачёт", "Конспекты"),
            rec("9А", Semester::First, "Математика", "Зачёт", "Таблицы"),
            rec("9А", Semester::First, "Математика", "Зачёт", "Формулы"),
            rec("10Б", Semester::Second, "Физика", "Зачёт", "Формулы"),
        ]
    }

    fn assert_sorted_unique<T: Ord + std::fmt::Debug>(values: &[T]) {
        assert!(
            values.windows(2).all(|w| w[0] < w[1]),
            "expected strictly ascending values, got {:?}",
            values
        );
    }

    #[test]
    fn test_classes_sorted_and_deduplicated() {
        let records = fixture();
        let result = classes(&records);
        assert_eq!(result, vec!["10Б".to_string(), "9А".to_string()]);
        assert_sorted_unique(&result);
    }

    #[test]
    fn test_semesters_filtered_by_class() {
        let records = fixture();
        assert_eq!(
            semesters(&records, "9А"),
            vec![Semester::First, Semester::Second]
        );
        assert_eq!(semesters(&records, "10Б"), vec![Semester::Second]);
    }

    #[test]
    fn test_every_level_is_sorted_and_unique() {
        let records = fixture();
        for class in classes(&records) {
            for sem in semesters(&records, &class) {
                let subjects = subjects(&records, &class, sem);
                assert_sorted_unique(&subjects);
                for subject in &subjects {
                    let exams = exam_types(&records, &class, sem, subject);
                    assert_sorted_unique(&exams);
                    for exam in &exams {
                        let materials = material_types(&records, &class, sem, subject, exam);
                        assert_sorted_unique(&materials);
                        assert!(!materials.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_subjects_and_materials() {
        let records = fixture();
        assert_eq!(
            subjects(&records, "9А", Semester::First),
            vec!["Биология".to_string(), "Математика".to_string()]
        );
        assert_eq!(
            material_types(&records, "9А", Semester::First, "Математика", "Зачёт"),
            vec!["Таблицы".to_string(), "Формулы".to_string()]
        );
    }

    #[test]
    fn test_unknown_selection_yields_empty_set() {
        let records = fixture();
        assert!(semesters(&records, "11В").is_empty());
        assert!(subjects(&records, "10Б", Semester::First).is_empty());
        assert!(exam_types(&records, "9А", Semester::First, "Химия").is_empty());
    }

    #[test]
    fn test_empty_store_yields_empty_classes() {
        assert!(classes(&[]).is_empty());
    }

    #[test]
    fn test_resolve_returns_first_duplicate() {
        let mut records = fixture();
        records[5].info = "second copy".to_string();
        let found = resolve(&records, "9А", Semester::First, "Математика", "Зачёт", "Формулы")
            .expect("record should resolve");
        assert_eq!(found.info, "Математика Формулы");
    }

    #[test]
    fn test_resolve_missing_key() {
        let records = fixture();
        assert!(resolve(&records, "9А", Semester::First, "Математика", "Зачёт", "Шпаргалки").is_none());
    }
}
