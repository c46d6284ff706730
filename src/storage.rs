/// Composite storage value: every mapping under one key

use crate::mapping::{Mapping, null_as_empty};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version tag written into export bundles
pub const EXPORT_VERSION: &str = "1.0";

/// Root storage structure, keyed by short name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingCollection {
    pub mappings: BTreeMap<String, Mapping>,
}

impl MappingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode whatever sits at the storage key.
    ///
    /// Anything that is not an object is treated as an empty collection.
    /// Entries that do not decode as a mapping are dropped.
    pub fn from_stored(value: Option<Value>) -> Self {
        let object = match value {
            None | Some(Value::Null) => return Self::new(),
            Some(Value::Object(object)) => object,
            Some(other) => {
                log::warn!("Stored mapping collection is not an object ({other}), treating as empty");
                return Self::new();
            }
        };

        let mappings = object
            .into_iter()
            .filter_map(|(short_name, entry)| match serde_json::from_value::<Mapping>(entry) {
                Ok(mapping) => Some((short_name, mapping)),
                Err(e) => {
                    log::warn!("Dropping unreadable mapping for go/{short_name}: {e}");
                    None
                }
            })
            .collect();

        MappingCollection { mappings }
    }

    pub fn to_stored(&self) -> Value {
        Value::Object(
            self.mappings
                .iter()
                .filter_map(|(short_name, mapping)| {
                    serde_json::to_value(mapping)
                        .ok()
                        .map(|value| (short_name.clone(), value))
                })
                .collect(),
        )
    }

    pub fn get(&self, short_name: &str) -> Option<&Mapping> {
        self.mappings.get(short_name)
    }

    /// Insert or overwrite, keeping the original `created_at` on overwrite
    pub fn upsert(&mut self, short_name: &str, url: String, description: String, now: i64) -> Mapping {
        self.mappings
            .entry(short_name.to_string())
            .and_modify(|existing| existing.revise(url.clone(), description.clone(), now))
            .or_insert_with(|| Mapping::new(short_name.to_string(), url, description, now))
            .clone()
    }

    pub fn remove(&mut self, short_name: &str) -> bool {
        self.mappings.remove(short_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// File format produced by export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub version: String,
    pub exported: String,
    pub mappings: BTreeMap<String, Mapping>,
}

/// Accepted import shape; an export bundle decodes as one.
///
/// Entries stay raw so one unreadable entry cannot sink the whole file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportBundle {
    pub mappings: BTreeMap<String, Value>,
}

/// Imported entries only need a URL; timestamps are rebuilt on import
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportEntry {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<RejectedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEntry {
    pub short_name: String,
    pub error: String,
}
