use serde::{Deserialize, Serialize};

/// Attribute record for one room/space, fetched independently of geometry
/// and joined onto floor features by `ambient_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientRecord {
    pub ambient_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

/// Categories that hold scheduled teaching groups.
pub fn is_teaching_space(category: &str) -> bool {
    matches!(category, "classroom" | "laboratory")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    #[serde(rename = "Name")]
    pub name: String,
}

/// A weekly time slot: 1-based day index, wall-clock times as `HHMM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: u8,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGroup {
    pub ambient_id: String,
    pub professor: Professor,
    pub enrolled: u32,
    pub schedules: Vec<ScheduleSlot>,
}

/// A course with its teaching groups, as served by the assignments endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub groups: Vec<CourseGroup>,
}

const DAY_NAMES: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Day name for a 1-based teaching-week day index.
pub fn day_name(day: u8) -> Option<&'static str> {
    if day == 0 {
        return None;
    }
    DAY_NAMES.get(day as usize - 1).copied()
}

/// `"0830"` → `"08:30"`. Anything that is not four digits is rejected.
pub fn format_clock(hhmm: &str) -> Option<String> {
    if hhmm.len() != 4 || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}:{}", &hhmm[..2], &hhmm[2..]))
}

fn kind_label(kind: &str) -> &'static str {
    if kind == "T" { "Lecture" } else { "Practical" }
}

/// One formatted line per slot, e.g. `"Monday Lecture 08:00 - 10:00"`.
///
/// Slots with an out-of-range day or malformed times are dropped.
pub fn format_slot(slot: &ScheduleSlot) -> Option<String> {
    let day = day_name(slot.day)?;
    let from = format_clock(&slot.from)?;
    let to = format_clock(&slot.to)?;
    Some(format!("{day} {} {from} - {to}", kind_label(&slot.kind)))
}

#[cfg(test)]
mod tests {
    use super::{
        AmbientRecord, ScheduleSlot, day_name, format_clock, format_slot, is_teaching_space,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_ambient_records() {
        let payload = r#"[{
            "ambient_id": "A1",
            "name": "Room 101",
            "description": "Lab",
            "category": "laboratory"
        }]"#;
        let records: Vec<AmbientRecord> = serde_json::from_str(payload).expect("parse");
        assert_eq!(
            records,
            vec![AmbientRecord {
                ambient_id: "A1".to_string(),
                name: "Room 101".to_string(),
                description: "Lab".to_string(),
                category: "laboratory".to_string(),
            }]
        );
    }

    #[test]
    fn deserializes_assignments_with_renamed_fields() {
        let payload = r#"{
            "name": "Algorithms",
            "groups": [{
                "ambient_id": "A1",
                "professor": { "Name": "P. Rivas" },
                "enrolled": 32,
                "schedules": [{ "day": 1, "from": "0800", "to": "1000", "type": "T" }]
            }]
        }"#;
        let assignment: super::Assignment = serde_json::from_str(payload).expect("parse");
        assert_eq!(assignment.groups[0].professor.name, "P. Rivas");
        assert_eq!(assignment.groups[0].schedules[0].kind, "T");
    }

    #[test]
    fn teaching_space_categories() {
        assert!(is_teaching_space("classroom"));
        assert!(is_teaching_space("laboratory"));
        assert!(!is_teaching_space("office"));
    }

    #[test]
    fn day_names_are_one_based() {
        assert_eq!(day_name(1), Some("Monday"));
        assert_eq!(day_name(6), Some("Saturday"));
        assert_eq!(day_name(0), None);
        assert_eq!(day_name(7), None);
    }

    #[test]
    fn clock_formatting_zero_pads() {
        assert_eq!(format_clock("0800").as_deref(), Some("08:00"));
        assert_eq!(format_clock("2210").as_deref(), Some("22:10"));
        assert_eq!(format_clock("800"), None);
        assert_eq!(format_clock("ab00"), None);
    }

    #[test]
    fn formats_whole_slots() {
        let slot = ScheduleSlot {
            day: 3,
            from: "1400".to_string(),
            to: "1600".to_string(),
            kind: "P".to_string(),
        };
        assert_eq!(
            format_slot(&slot).as_deref(),
            Some("Wednesday Practical 14:00 - 16:00")
        );
    }
}
