//! Browser release identification from snapshot file names
//!
//! Capture runs write one file per release, named
//! `window_<browser>_<browserVersion>_<os>_<osVersion>.json`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{GraphError, Result};

const FILE_PREFIX: &str = "window";
const FILE_SUFFIX: &str = ".json";

/// The browser/OS combination a snapshot was captured from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub browser_name: String,
    pub browser_version: String,
    pub os_name: String,
    pub os_version: String,
}

impl ReleaseInfo {
    /// Parse `window_Chrome_56.0.2924.87_Windows_10.0.json`
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let invalid = || GraphError::InvalidFileName(file_name.to_string());

        let stem = file_name.strip_suffix(FILE_SUFFIX).ok_or_else(invalid)?;
        let parts: Vec<&str> = stem.split('_').collect();
        match parts.as_slice() {
            [FILE_PREFIX, browser, browser_version, os, os_version]
                if [browser, browser_version, os, os_version]
                    .iter()
                    .all(|part| !part.is_empty()) =>
            {
                Ok(Self {
                    browser_name: browser.to_string(),
                    browser_version: browser_version.to_string(),
                    os_name: os.to_string(),
                    os_version: os_version.to_string(),
                })
            }
            _ => Err(invalid()),
        }
    }

    /// Parse the file name component of `path`
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| GraphError::InvalidFileName(path.display().to_string()))?;
        Self::from_file_name(file_name)
    }

    /// Whether `file_name` follows the snapshot naming convention
    pub fn is_snapshot_file_name(file_name: &str) -> bool {
        file_name.starts_with(FILE_PREFIX) && Self::from_file_name(file_name).is_ok()
    }
}

impl fmt::Display for ReleaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {} {}",
            self.browser_name, self.browser_version, self.os_name, self.os_version
        )
    }
}
