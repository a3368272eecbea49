//! Substring search over attribute and assignment records.
//!
//! Plain case-insensitive filtering, no ranking. An empty query matches
//! nothing so a cleared search box clears its results.

use crate::records::{AmbientRecord, Assignment};

pub fn search_ambients<'a>(records: &'a [AmbientRecord], query: &str) -> Vec<&'a AmbientRecord> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.description.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn search_assignments<'a>(assignments: &'a [Assignment], query: &str) -> Vec<&'a Assignment> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    assignments
        .iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle)
                || a.groups
                    .iter()
                    .any(|g| g.professor.name.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{search_ambients, search_assignments};
    use crate::records::{AmbientRecord, Assignment, CourseGroup, Professor};

    fn ambient(name: &str, description: &str) -> AmbientRecord {
        AmbientRecord {
            ambient_id: "A1".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: "classroom".to_string(),
        }
    }

    fn assignment(name: &str, professor: &str) -> Assignment {
        Assignment {
            name: name.to_string(),
            groups: vec![CourseGroup {
                ambient_id: "A1".to_string(),
                professor: Professor {
                    name: professor.to_string(),
                },
                enrolled: 0,
                schedules: vec![],
            }],
        }
    }

    #[test]
    fn matches_name_and_description_case_insensitively() {
        let records = vec![
            ambient("Room 101", "Networks laboratory"),
            ambient("Auditorium", "Main hall"),
        ];
        let hits = search_ambients(&records, "LABORATORY");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Room 101");
    }

    #[test]
    fn empty_query_matches_nothing() {
        let records = vec![ambient("Room 101", "Lab")];
        assert!(search_ambients(&records, "").is_empty());
        assert!(search_assignments(&[], "").is_empty());
    }

    #[test]
    fn assignments_match_by_course_or_professor() {
        let assignments = vec![
            assignment("Algorithms", "P. Rivas"),
            assignment("Databases", "M. Osorio"),
        ];
        assert_eq!(search_assignments(&assignments, "algo").len(), 1);
        assert_eq!(search_assignments(&assignments, "osorio").len(), 1);
        assert!(search_assignments(&assignments, "chemistry").is_empty());
    }
}
