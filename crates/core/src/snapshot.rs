//! Stack snapshot input format
//!
//! A snapshot is the JSON document produced by the branch-data source:
//!
//! ```json
//! {
//!   "branches": [
//!     { "name": "main", "up": [{ "name": "feature" }] },
//!     { "name": "feature", "current": true,
//!       "down": { "name": "main", "needsRestack": true } }
//!   ],
//!   "workingCopy": { "files": [{ "path": "src/lib.rs", "status": "M" }] }
//! }
//! ```

use crate::model::{BranchRecord, WorkingCopy};
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;

/// Errors raised while reading a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed for one render pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub branches: Vec<BranchRecord>,
    #[serde(default)]
    pub working_copy: Option<WorkingCopy>,
}

impl Snapshot {
    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a snapshot from any reader (file, stdin)
    pub fn from_reader(mut reader: impl Read) -> Result<Self, SnapshotError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json(&buf)
    }

    /// Name of the checked-out branch, if it is part of the snapshot
    pub fn current_branch(&self) -> Option<&str> {
        self.branches
            .iter()
            .find(|branch| branch.current)
            .map(|branch| branch.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_snapshot() {
        let snapshot = Snapshot::from_json(r#"{"branches":[{"name":"main"}]}"#).unwrap();
        assert_eq!(snapshot.branches.len(), 1);
        assert_eq!(snapshot.branches[0].name, "main");
        assert!(!snapshot.branches[0].current);
        assert!(snapshot.branches[0].up.is_empty());
        assert!(snapshot.working_copy.is_none());
    }

    #[test]
    fn test_parse_links_and_working_copy() {
        let json = r##"{
            "branches": [
                {"name": "main", "up": [{"name": "feature", "needsRestack": true}]},
                {"name": "feature", "current": true,
                 "down": {"name": "main", "needsRestack": true},
                 "change": {"id": "#42", "status": "open"},
                 "commits": [{"sha": "abc1234def", "message": "Add feature"}]}
            ],
            "workingCopy": {"files": [{"path": "a.rs", "status": "M"}]}
        }"##;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.current_branch(), Some("feature"));

        let feature = &snapshot.branches[1];
        assert!(feature.needs_restack());
        assert_eq!(feature.change.as_ref().unwrap().id, "#42");
        assert_eq!(feature.commits.as_ref().unwrap().len(), 1);
        assert!(snapshot.working_copy.unwrap().is_dirty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = Snapshot::from_json("{\"branches\": [").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[test]
    fn test_from_reader() {
        let data = br#"{"branches":[]}"#;
        let snapshot = Snapshot::from_reader(&data[..]).unwrap();
        assert!(snapshot.branches.is_empty());
    }
}
