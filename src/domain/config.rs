use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a notebook.
///
/// This struct holds settings that control which files are treated as
/// documents, how new documents are written, and how export behaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The file extension of documents, without the dot.
    extension: String,

    /// The `Wiki-Format` header written into new documents.
    wiki_format: String,

    /// Whether to skip files that cannot be parsed as documents instead of
    /// failing to open the notebook.
    pub allow_unrecognised: bool,

    /// The page name of the index written by an export, if any.
    ///
    /// For example `index` produces `index.html` at the export root.
    pub index_page: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            wiki_format: default_wiki_format(),
            allow_unrecognised: false,
            index_page: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the document file extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the `Wiki-Format` header value for new documents.
    #[must_use]
    pub fn wiki_format(&self) -> &str {
        &self.wiki_format
    }

    /// Sets the document file extension.
    ///
    /// A leading dot is stripped, so `.txt` and `txt` are equivalent.
    pub fn set_extension(&mut self, extension: &str) {
        self.extension = extension.trim_start_matches('.').to_string();
    }
}

fn default_extension() -> String {
    "txt".to_string()
}

fn default_wiki_format() -> String {
    "zim 0.4".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_extension")]
        extension: String,

        #[serde(default = "default_wiki_format")]
        wiki_format: String,

        #[serde(default)]
        allow_unrecognised: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        index_page: Option<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                extension,
                wiki_format,
                allow_unrecognised,
                index_page,
            } => Self {
                extension,
                wiki_format,
                allow_unrecognised,
                index_page,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            extension: config.extension,
            wiki_format: config.wiki_format,
            allow_unrecognised: config.allow_unrecognised,
            index_page: config.index_page,
        }
    }
}
