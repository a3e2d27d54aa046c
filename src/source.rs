use crate::error::Result;
use crate::model::{Commit, DateRange};
use std::cell::Cell;

pub type CommitIter<'a> = Box<dyn Iterator<Item = Result<Commit>> + 'a>;

/// Anything that can enumerate a repository's history.
///
/// Implementations yield each commit once, in their own history order, and
/// only commits whose timestamp falls inside `range`. An `Err` item ends the
/// traversal.
pub trait CommitSource {
    fn commits<'a>(&'a self, range: &DateRange) -> Result<CommitIter<'a>>;
}

/// A fixed, in-memory history.
#[derive(Debug, Default)]
pub struct MemorySource {
    commits: Vec<Commit>,
    traversals: Cell<usize>,
}

impl MemorySource {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self { commits, traversals: Cell::new(0) }
    }

    /// How many times [`CommitSource::commits`] has been called.
    pub fn traversals(&self) -> usize {
        self.traversals.get()
    }
}

impl CommitSource for MemorySource {
    fn commits<'a>(&'a self, range: &DateRange) -> Result<CommitIter<'a>> {
        self.traversals.set(self.traversals.get() + 1);
        let range = *range;
        Ok(Box::new(
            self.commits
                .iter()
                .filter(move |c| range.contains(&c.timestamp))
                .cloned()
                .map(Ok),
        ))
    }
}
