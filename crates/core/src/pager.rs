//! Commit paging ("show more") per branch

use crate::model::CommitSummary;
use ahash::AHashMap;

/// Default number of commits revealed per page
pub const DEFAULT_COMMIT_CHUNK: usize = 5;

/// View configuration owned by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Commits revealed per "show more"
    pub commit_chunk: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            commit_chunk: DEFAULT_COMMIT_CHUNK,
        }
    }
}

/// The revealed part of a branch's commit list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitPage<'a> {
    pub visible: &'a [CommitSummary],
    /// Commits still behind "show more"
    pub hidden: usize,
}

/// Tracks how many pages of commits each branch has revealed
#[derive(Debug, Clone)]
pub struct CommitPager {
    chunk: usize,
    pages: AHashMap<String, usize>,
}

impl CommitPager {
    /// Create a pager revealing `chunk` commits at a time (at least one)
    pub fn new(chunk: usize) -> Self {
        Self {
            chunk: chunk.max(1),
            pages: AHashMap::new(),
        }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(config.commit_chunk)
    }

    /// Number of pages currently revealed for a branch (one by default)
    pub fn pages(&self, branch: &str) -> usize {
        self.pages.get(branch).copied().unwrap_or(1)
    }

    /// Slice of `commits` that should be displayed for `branch`
    pub fn visible<'a>(&self, branch: &str, commits: &'a [CommitSummary]) -> CommitPage<'a> {
        let shown = self
            .pages(branch)
            .saturating_mul(self.chunk)
            .min(commits.len());
        CommitPage {
            visible: &commits[..shown],
            hidden: commits.len() - shown,
        }
    }

    /// Reveal one more page for a branch
    pub fn show_more(&mut self, branch: &str) {
        let pages = self.pages(branch) + 1;
        self.pages.insert(branch.to_string(), pages);
    }

    /// Collapse a branch back to its first page
    pub fn reset(&mut self, branch: &str) {
        self.pages.remove(branch);
    }

    /// Forget state for branches that are no longer present
    pub fn retain<'b>(&mut self, live: impl IntoIterator<Item = &'b str>) {
        let live: ahash::AHashSet<&str> = live.into_iter().collect();
        self.pages.retain(|name, _| live.contains(name.as_str()));
    }
}

impl Default for CommitPager {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits(count: usize) -> Vec<CommitSummary> {
        (0..count)
            .map(|i| CommitSummary {
                sha: format!("{:040x}", i),
                message: format!("commit {}", i),
            })
            .collect()
    }

    #[test]
    fn test_first_page_only_by_default() {
        let pager = CommitPager::new(3);
        let list = commits(7);
        let page = pager.visible("feature", &list);
        assert_eq!(page.visible.len(), 3);
        assert_eq!(page.hidden, 4);
    }

    #[test]
    fn test_show_more_reveals_chunks() {
        let mut pager = CommitPager::new(3);
        let list = commits(7);

        pager.show_more("feature");
        assert_eq!(pager.visible("feature", &list).visible.len(), 6);

        pager.show_more("feature");
        let page = pager.visible("feature", &list);
        assert_eq!(page.visible.len(), 7);
        assert_eq!(page.hidden, 0);

        // Other branches are unaffected
        assert_eq!(pager.visible("other", &list).visible.len(), 3);
    }

    #[test]
    fn test_reset_and_retain() {
        let mut pager = CommitPager::new(2);
        pager.show_more("a");
        pager.show_more("b");

        pager.reset("a");
        assert_eq!(pager.pages("a"), 1);

        pager.retain(["a"]);
        assert_eq!(pager.pages("b"), 1);
    }

    #[test]
    fn test_zero_chunk_is_clamped() {
        let pager = CommitPager::new(0);
        let list = commits(2);
        assert_eq!(pager.visible("x", &list).visible.len(), 1);
    }
}
