//! Snapshot fixtures written to a temporary directory

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding a `stack.json` snapshot
pub struct StackFixture {
    dir: TempDir,
}

impl StackFixture {
    /// Empty fixture directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Fixture with the four-branch sample stack:
    /// main -> feature-1 -> feature-2 (current), main -> feature-b
    pub fn sample() -> Self {
        let fixture = Self::new();
        fixture.write(&sample_snapshot());
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.path().join("stack.json")
    }

    /// Overwrite the snapshot file
    pub fn write(&self, snapshot: &Value) {
        std::fs::write(self.snapshot_path(), snapshot.to_string())
            .expect("Failed to write snapshot");
    }

    /// Overwrite the snapshot file with raw text
    pub fn write_raw(&self, text: &str) {
        std::fs::write(self.snapshot_path(), text).expect("Failed to write snapshot");
    }
}

pub fn sample_snapshot() -> Value {
    json!({
        "branches": [
            { "name": "main", "up": [{ "name": "feature-1" }, { "name": "feature-b" }] },
            { "name": "feature-1", "down": { "name": "main" }, "up": [{ "name": "feature-2" }] },
            { "name": "feature-2", "current": true, "down": { "name": "feature-1" } },
            { "name": "feature-b", "down": { "name": "main" } }
        ]
    })
}

/// Sample stack with a dirty working copy and commits on feature-1
pub fn busy_snapshot() -> Value {
    let mut snapshot = sample_snapshot();
    snapshot["workingCopy"] = json!({
        "files": [
            { "path": "src/lib.rs", "status": "M" },
            { "path": "README.md", "status": "A" }
        ]
    });
    snapshot["branches"][1]["commits"] = json!([
        { "sha": "1111111aaaa", "message": "third" },
        { "sha": "2222222bbbb", "message": "second" },
        { "sha": "3333333cccc", "message": "first" }
    ]);
    snapshot["branches"][1]["change"] = json!({ "id": "#42", "status": "open", "title": "Add feature" });
    snapshot
}
