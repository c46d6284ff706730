/// Runtime configuration handed over by the background page
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Key holding the composite mapping collection
    pub storage_key: String,
    /// Extension-relative path of the creation page
    pub create_page: String,
    /// Maximum number of omnibox suggestions
    pub suggestion_limit: usize,
    pub log_level: String,
}

impl Config {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_key: "golinks".to_string(),
            create_page: "create.html".to_string(),
            suggestion_limit: 5,
            log_level: "info".to_string(),
        }
    }
}
