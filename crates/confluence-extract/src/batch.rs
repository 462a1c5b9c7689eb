//! Parallel extraction over snapshot files
//!
//! Each snapshot is an independent pass on the rayon pool. A failing
//! snapshot is logged and reported in its [`SnapshotOutcome`]; siblings are
//! unaffected.

use std::path::{Path, PathBuf};

use confluence_graph::{ReleaseInfo, SnapshotGraph};
use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{extract_catalog_with_provenance, ExtractError, Extraction, ExtractionConfig, Result};

/// Result of one snapshot's pass
#[derive(Debug)]
pub struct SnapshotOutcome {
    pub path: PathBuf,
    /// Parsed from the file name, when it follows the capture convention
    pub release: Option<ReleaseInfo>,
    pub result: Result<Extraction>,
}

impl SnapshotOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Snapshot files (`window_*.json`) directly inside `dir`, sorted by path
pub fn discover_snapshots(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ExtractError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if ReleaseInfo::is_snapshot_file_name(&entry.file_name().to_string_lossy()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load one snapshot file and extract its catalog
pub fn extract_file(path: &Path, config: &ExtractionConfig) -> Result<Extraction> {
    let graph = SnapshotGraph::load(path)?;
    extract_catalog_with_provenance(&graph, config)
}

/// Extract every snapshot in parallel; outcomes keep the order of `paths`
pub fn extract_snapshots(paths: &[PathBuf], config: &ExtractionConfig) -> Vec<SnapshotOutcome> {
    paths
        .par_iter()
        .map(|path| {
            let release = ReleaseInfo::from_path(path).ok();
            let result = extract_file(path, config);
            match &result {
                Ok(extraction) => info!(
                    path = %path.display(),
                    interfaces = extraction.catalog.len(),
                    apis = extraction.catalog.api_count(),
                    "extracted snapshot"
                ),
                Err(err) => warn!(
                    path = %path.display(),
                    code = err.code(),
                    error = %err,
                    "snapshot extraction failed"
                ),
            }
            SnapshotOutcome {
                path: path.clone(),
                release,
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SNAPSHOT: &str = r#"{
        "root": 1,
        "data": {
            "1": {"Foo": 2},
            "2": {"prototype": 3},
            "3": {"+constructor+": 2, "bar": 4},
            "4": {}
        },
        "protos": {"3": 5},
        "types": {"5": "null"},
        "functions": {"2": "Foo", "4": "bar"}
    }"#;

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "window_Safari_10.0_OSX_10.12.json",
            "window_Chrome_56.0_Windows_10.0.json",
            "notes.txt",
            "config.json",
        ] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("window_Edge_14_Windows_10.json")).unwrap();

        let found = discover_snapshots(dir.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "window_Chrome_56.0_Windows_10.0.json",
                "window_Safari_10.0_OSX_10.12.json"
            ]
        );
    }

    #[test]
    fn test_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("window_Chrome_56.0_Windows_10.0.json");
        let bad = dir.path().join("window_Firefox_50.0_Linux_4.4.json");
        fs::write(&good, SNAPSHOT).unwrap();
        fs::write(&bad, r#"{"root": 1, "data": {"1": {"x": 2}}}"#).unwrap();

        let outcomes = extract_snapshots(&[bad.clone(), good.clone()], &ExtractionConfig::default());
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].path, bad);
        assert!(!outcomes[0].is_ok());
        assert_eq!(outcomes[1].release.as_ref().unwrap().browser_name, "Chrome");

        let extraction = outcomes[1].result.as_ref().unwrap();
        assert_eq!(extraction.catalog.get("Foo").unwrap(), ["bar"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_file(&dir.path().join("absent.json"), &ExtractionConfig::default())
            .unwrap_err();
        assert!(err.is_input_error());
    }
}
