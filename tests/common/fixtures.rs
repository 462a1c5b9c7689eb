use std::fs;
use std::path::{Path, PathBuf};

use confluence::graph::SnapshotGraph;

/// The browser-shaped snapshot most tests run against
pub const CHROME_SNAPSHOT: &str = "window_Chrome_56.0_Windows_10.0.json";

/// Get path to a fixture under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture's text
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Load and validate a fixture snapshot
pub fn load_snapshot(name: &str) -> SnapshotGraph {
    SnapshotGraph::load(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load snapshot {}: {}", name, e))
}

pub fn chrome_graph() -> SnapshotGraph {
    load_snapshot(CHROME_SNAPSHOT)
}
