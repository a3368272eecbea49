use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::geojson::FeatureCollection;
use crate::records::AmbientRecord;

/// Attribute records indexed by `ambient_id`.
#[derive(Debug, Default, Clone)]
pub struct AmbientIndex {
    by_id: BTreeMap<String, AmbientRecord>,
}

impl AmbientIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ambient_id` is unique upstream; a duplicate in the payload keeps the
    /// last record seen.
    pub fn from_records(records: Vec<AmbientRecord>) -> Self {
        let mut by_id = BTreeMap::new();
        for record in records {
            by_id.insert(record.ambient_id.clone(), record);
        }
        Self { by_id }
    }

    pub fn get(&self, ambient_id: &str) -> Option<&AmbientRecord> {
        self.by_id.get(ambient_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &AmbientRecord> {
        self.by_id.values()
    }
}

/// What a merge pass did, for reporting by the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub matched: usize,
    /// `ambient_id`s present on features but absent from the attribute set.
    pub unmatched: Vec<String>,
}

/// Joins attribute records onto floor features by `ambient_id`.
///
/// A matched feature's properties are replaced wholesale by the record's
/// fields; unmatched features (and features without an `ambient_id` at all)
/// keep their authored properties untouched.
pub fn merge_ambients(collection: &mut FeatureCollection, index: &AmbientIndex) -> MergeReport {
    let mut report = MergeReport::default();

    for feature in &mut collection.features {
        let Some(ambient_id) = feature.property_str("ambient_id") else {
            continue;
        };

        match index.get(ambient_id) {
            Some(record) => {
                feature.properties = record_properties(record);
                report.matched += 1;
            }
            None => report.unmatched.push(ambient_id.to_string()),
        }
    }

    report
}

fn record_properties(record: &AmbientRecord) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        "ambient_id".to_string(),
        Value::String(record.ambient_id.clone()),
    );
    props.insert("name".to_string(), Value::String(record.name.clone()));
    props.insert(
        "description".to_string(),
        Value::String(record.description.clone()),
    );
    props.insert(
        "category".to_string(),
        Value::String(record.category.clone()),
    );
    props
}
