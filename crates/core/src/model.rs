//! Branch records as handed to us by the branch-data source

use serde::{Deserialize, Serialize};

/// Link from a branch to a neighbouring branch in the stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchLink {
    /// Name of the linked branch
    pub name: String,
    /// Whether the edge is out of date and needs a restack
    #[serde(default)]
    pub needs_restack: bool,
}

impl BranchLink {
    /// Create a link that does not need restacking
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            needs_restack: false,
        }
    }

    /// Create a link flagged as needing a restack
    pub fn restack(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            needs_restack: true,
        }
    }
}

/// Summary of an external change (pull request) attached to a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    /// Identifier shown to the user (usually the PR number)
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single commit on a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub sha: String,
    pub message: String,
}

impl CommitSummary {
    /// Abbreviated sha for display
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map(|(idx, _)| idx)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }
}

/// One branch of the stack, immutable for the duration of a render pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    /// Branch name, unique within a snapshot
    pub name: String,
    /// Whether this branch is checked out
    #[serde(default)]
    pub current: bool,
    /// Parent branch
    #[serde(default)]
    pub down: Option<BranchLink>,
    /// Child branches
    #[serde(default)]
    pub up: Vec<BranchLink>,
    #[serde(default)]
    pub change: Option<ChangeSummary>,
    /// Commits unique to this branch, newest first
    #[serde(default)]
    pub commits: Option<Vec<CommitSummary>>,
}

impl BranchRecord {
    /// Create a bare record with no links
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: false,
            down: None,
            up: Vec::new(),
            change: None,
            commits: None,
        }
    }

    /// Mark the record as the checked-out branch
    pub fn current(mut self) -> Self {
        self.current = true;
        self
    }

    /// Set the parent link
    pub fn down(mut self, link: BranchLink) -> Self {
        self.down = Some(link);
        self
    }

    /// Append a child link
    pub fn up(mut self, link: BranchLink) -> Self {
        self.up.push(link);
        self
    }

    /// Whether the edge to this branch's parent needs restacking
    pub fn needs_restack(&self) -> bool {
        self.down.as_ref().is_some_and(|link| link.needs_restack)
    }
}

/// A file with uncommitted modifications in the working copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    /// Short status code as reported by git (`M`, `A`, `D`, `??`, ...)
    pub status: String,
}

/// Working-copy status of the checked-out branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingCopy {
    #[serde(default)]
    pub files: Vec<FileChange>,
}

impl WorkingCopy {
    /// Whether there is anything uncommitted
    pub fn is_dirty(&self) -> bool {
        !self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha_truncates() {
        let commit = CommitSummary {
            sha: "0123456789abcdef".to_string(),
            message: "msg".to_string(),
        };
        assert_eq!(commit.short_sha(), "0123456");

        let short = CommitSummary {
            sha: "abc".to_string(),
            message: "msg".to_string(),
        };
        assert_eq!(short.short_sha(), "abc");
    }

    #[test]
    fn test_needs_restack_follows_down_link() {
        let record = BranchRecord::new("feature").down(BranchLink::restack("main"));
        assert!(record.needs_restack());
        assert!(!BranchRecord::new("main").needs_restack());
    }
}
