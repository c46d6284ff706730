/// Omnibox suggestions over the stored mappings

use crate::mapping::Mapping;
use serde::Serialize;
use std::collections::BTreeMap;

/// One omnibox suggestion: `content` is what gets entered when picked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub content: String,
    pub description: String,
}

impl From<&Mapping> for Suggestion {
    fn from(mapping: &Mapping) -> Self {
        let mut description = format!("{} → {}", mapping.short_name, mapping.url);
        if !mapping.description.is_empty() {
            description.push_str(" - ");
            description.push_str(&mapping.description);
        }

        Suggestion {
            content: mapping.short_name.clone(),
            description,
        }
    }
}

/// Case-insensitive substring match on short name or description.
///
/// No ranking: results follow collection order, truncated to `limit`.
pub fn suggest(mappings: &BTreeMap<String, Mapping>, input: &str, limit: usize) -> Vec<Suggestion> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    mappings
        .iter()
        .filter(|(short_name, mapping)| {
            short_name.to_lowercase().contains(&needle)
                || mapping.description.to_lowercase().contains(&needle)
        })
        .map(|(_, mapping)| Suggestion::from(mapping))
        .take(limit)
        .collect()
}
