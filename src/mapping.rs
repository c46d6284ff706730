/// Data structures and write-boundary validation for go-link mappings
use crate::error::{GoLinkError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use url::Url;

static SHORT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static pattern"));

/// A persisted go-link: short name → target URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    pub short_name: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Epoch milliseconds, set once
    #[serde(deserialize_with = "epoch_millis")]
    pub created_at: i64,
    /// Epoch milliseconds, set on every save
    #[serde(deserialize_with = "epoch_millis")]
    pub updated_at: i64,
}

/// `null` and a missing field both read as an empty string
pub(crate) fn null_as_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// JS hands every number over as a double
fn epoch_millis<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    f64::deserialize(deserializer).map(|millis| millis as i64)
}

impl Mapping {
    pub fn new(short_name: String, url: String, description: String, now: i64) -> Mapping {
        Mapping {
            short_name,
            url,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields, keeping `created_at`.
    ///
    /// `updated_at` never moves backwards, even if the clock does.
    pub fn revise(&mut self, url: String, description: String, now: i64) {
        self.url = url;
        self.description = description;
        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }
}

/// Short names are non-empty and limited to `[A-Za-z0-9_-]`
pub fn validate_short_name(short_name: &str) -> Result<()> {
    if short_name.is_empty() {
        return Err(GoLinkError::InvalidShortName(
            "short name cannot be empty".to_string(),
        ));
    }

    if !SHORT_NAME.is_match(short_name) {
        return Err(GoLinkError::InvalidShortName(format!(
            "{short_name:?} may only contain letters, numbers, hyphens and underscores"
        )));
    }

    Ok(())
}

/// Targets must be absolute `http` or `https` URLs
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| GoLinkError::InvalidUrl(format!("{url:?} is not an absolute URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(GoLinkError::InvalidUrl(format!(
            "scheme must be http or https, got {scheme:?}"
        ))),
    }
}
