//! Batch extraction over a directory of snapshots

mod common;

use std::fs;

use common::fixtures::*;

use confluence::extract::batch::{discover_snapshots, extract_snapshots};
use confluence::extract::{extract_catalog, locate_api, ExtractionConfig};
use confluence::graph::{NodeId, ReleaseInfo};

#[test]
fn test_directory_batch() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = load_fixture(CHROME_SNAPSHOT);
    fs::write(dir.path().join("window_Chrome_56.0_Windows_10.0.json"), &snapshot).unwrap();
    fs::write(dir.path().join("window_Chrome_57.0_Windows_10.0.json"), &snapshot).unwrap();
    fs::write(dir.path().join("window_Safari_10.0_OSX_10.12.json"), "not json").unwrap();
    fs::write(dir.path().join("README.md"), "# snapshots").unwrap();

    let paths = discover_snapshots(dir.path()).unwrap();
    assert_eq!(paths.len(), 3);

    let config = ExtractionConfig::default();
    let outcomes = extract_snapshots(&paths, &config);
    let ok: Vec<_> = outcomes.iter().filter(|o| o.is_ok()).collect();
    assert_eq!(ok.len(), 2);

    let failed = outcomes.iter().find(|o| !o.is_ok()).unwrap();
    assert_eq!(
        failed.release,
        Some(ReleaseInfo::from_file_name("window_Safari_10.0_OSX_10.12.json").unwrap())
    );
    assert!(failed.result.as_ref().unwrap_err().is_input_error());

    // Same capture, same catalog, independent of the batch
    let expected = extract_catalog(&chrome_graph(), &config).unwrap();
    for outcome in ok {
        let extraction = outcome.result.as_ref().unwrap();
        assert_eq!(extraction.catalog, expected);
        assert_eq!(outcome.release.as_ref().unwrap().browser_name, "Chrome");
    }
}

#[test]
fn test_locate_missing_api() {
    let graph = chrome_graph();

    let location = locate_api(&graph, "Window#postMessage").unwrap();
    assert!(location.likely.is_empty());
    assert_eq!(location.possible.len(), 1);
    assert_eq!(location.possible[0].id, NodeId(30));
    assert!(location.possible[0]
        .paths
        .contains(&"Window.prototype.postMessage".to_string()));

    let location = locate_api(&graph, "body#textContent").unwrap();
    // The shared string primitive is reached from many places
    assert_eq!(location.likely.len(), 1);
    assert_eq!(location.likely[0].id, NodeId(41));
    assert!(location.likely[0]
        .paths
        .contains(&"document.body.textContent".to_string()));

    assert!(locate_api(&graph, "Window#nonexistent").unwrap().is_empty());
}
