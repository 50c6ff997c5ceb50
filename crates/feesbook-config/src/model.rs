use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Admin-managed lookup lists the registration form draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogs {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub colleges: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
}

impl Catalogs {
    /// Adds a name to a list, ignoring duplicates after trimming.
    pub fn add(list: &mut Vec<String>, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || list.iter().any(|existing| existing == name) {
            return false;
        }
        list.push(name.to_string());
        true
    }

    /// Removes a name from a list; returns whether anything was removed.
    pub fn remove(list: &mut Vec<String>, name: &str) -> bool {
        let before = list.len();
        list.retain(|existing| existing != name.trim());
        list.len() != before
    }
}

/// Application configuration persisted between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalogs: Catalogs,

    /// Default operator name stamped as `received` when none is supplied on
    /// the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<String>,

    /// Custom root for student documents and their backups. Defaults to a
    /// `feesbook` directory under the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
}

impl Config {
    /// Resolves the document-store root: explicit config value, then the
    /// `FEESBOOK_DATA_DIR` environment override, then the platform default.
    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        if let Some(path) = std::env::var_os("FEESBOOK_DATA_DIR") {
            return PathBuf::from(path);
        }
        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("feesbook")
    }
}
