use crate::cache::Cache;
use crate::error::{HotspotError, Result};
use crate::model::{Commit, DateRange, FileChange};
use crate::source::{CommitIter, CommitSource};
use chrono::{DateTime, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BinaryHeap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
    progress: bool,
    cache: Option<Cache>,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!(path = %path.display(), "opened repository");

        Ok(Self {
            repo,
            path,
            progress: false,
            cache: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// HEAD plus every local and remote-tracking branch.
    fn tips(&self) -> Result<Vec<ObjectId>> {
        let mut tips = Vec::new();

        let mut head = self.repo.head()?;
        if !head.is_unborn() {
            tips.push(head.peel_to_commit_in_place()?.id);
        }

        let platform = self.repo.references().map_err(access)?;
        let local = platform.local_branches().map_err(access)?;
        let remote = platform.remote_branches().map_err(access)?;
        for reference in local.chain(remote) {
            let mut reference = reference.map_err(access)?;
            let id = reference.peel_to_id_in_place().map_err(access)?;
            tips.push(id.detach());
        }

        debug!(count = tips.len(), "collected history tips");
        Ok(tips)
    }

    fn load_commit(
        &self,
        id: ObjectId,
        commit: &gix::Commit<'_>,
        timestamp: DateTime<Utc>,
        parent: Option<ObjectId>,
    ) -> Result<(Commit, bool)> {
        let key = id.to_string();
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_commit(&key)? {
                return Ok((cached, true));
            }
        }

        let author = commit.author()?;
        let message = commit.message_raw()?;
        let loaded = Commit {
            id: key,
            message: message.to_string(),
            author_name: author.name.to_string(),
            timestamp,
            changes: self.file_changes(id, parent)?,
        };

        if let Some(cache) = &self.cache {
            cache.store_commit(&loaded)?;
        }
        Ok((loaded, false))
    }

    /// Root commits are diffed against the empty tree.
    fn file_changes(&self, commit_id: ObjectId, parent_id: Option<ObjectId>) -> Result<Vec<FileChange>> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let parent_tree = match parent_id {
            Some(pid) => Some(self.repo.find_commit(pid)?.tree()?),
            None => None,
        };

        let changes: Vec<ChangeDetached> =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)?;

        Ok(changes.into_iter().filter_map(file_change).collect())
    }
}

impl CommitSource for GitRepo {
    fn commits<'a>(&'a self, range: &DateRange) -> Result<CommitIter<'a>> {
        let mut walk = CommitWalk::new(self, *range);
        for tip in self.tips()? {
            walk.push(tip)?;
        }
        Ok(Box::new(walk))
    }
}

/// Newest-first walk over every commit reachable from the tips, each
/// commit visited once.
struct CommitWalk<'repo> {
    git: &'repo GitRepo,
    range: DateRange,
    queue: BinaryHeap<(i64, ObjectId)>,
    seen: HashSet<ObjectId>,
    pb: ProgressBar,
    yielded: u64,
    cache_hits: u64,
    done: bool,
}

impl<'repo> CommitWalk<'repo> {
    fn new(git: &'repo GitRepo, range: DateRange) -> Self {
        let pb = if git.progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} {pos}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Walking commits...");
            pb
        } else {
            ProgressBar::hidden()
        };

        Self {
            git,
            range,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            pb,
            yielded: 0,
            cache_hits: 0,
            done: false,
        }
    }

    fn push(&mut self, id: ObjectId) -> Result<()> {
        if !self.seen.insert(id) {
            return Ok(());
        }
        let git = self.git;
        let secs = git.repo.find_commit(id)?.time()?.seconds;
        self.queue.push((secs, id));
        Ok(())
    }

    fn step(&mut self, commit_id: ObjectId) -> Result<Option<Commit>> {
        let git = self.git;
        let commit = git.repo.find_commit(commit_id)?;
        let secs = commit.time()?.seconds;
        let timestamp = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| HotspotError::RepositoryAccess(format!("Invalid timestamp: {secs}")))?;

        let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();
        for pid in &parents {
            self.push(*pid)?;
        }

        if !self.range.contains(&timestamp) {
            return Ok(None);
        }
        // A merge contributes no file changes of its own; its branch commits
        // are walked separately.
        if parents.len() > 1 {
            return Ok(None);
        }

        let (loaded, cached) =
            git.load_commit(commit_id, &commit, timestamp, parents.first().copied())?;
        if cached {
            self.cache_hits += 1;
        }
        self.yielded += 1;
        self.pb.inc(1);
        Ok(Some(loaded))
    }

    fn finish(&mut self) {
        self.done = true;
        self.pb.finish_and_clear();
        info!(
            commits = self.yielded,
            cache_hits = self.cache_hits,
            "history walk finished"
        );
    }
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some((_, commit_id)) = self.queue.pop() {
            match self.step(commit_id) {
                Ok(Some(commit)) => return Some(Ok(commit)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    self.pb.abandon();
                    return Some(Err(e));
                }
            }
        }
        self.finish();
        None
    }
}

fn file_change(change: ChangeDetached) -> Option<FileChange> {
    match change {
        ChangeDetached::Addition { location, entry_mode, .. } => {
            (!entry_mode.is_tree()).then(|| FileChange::added(location.to_string()))
        }
        ChangeDetached::Deletion { location, entry_mode, .. } => {
            (!entry_mode.is_tree()).then(|| FileChange::deleted(location.to_string()))
        }
        ChangeDetached::Modification { location, entry_mode, .. } => {
            (!entry_mode.is_tree()).then(|| FileChange::modified(location.to_string()))
        }
        ChangeDetached::Rewrite {
            source_location,
            location,
            entry_mode,
            ..
        } => (!entry_mode.is_tree())
            .then(|| FileChange::renamed(source_location.to_string(), location.to_string())),
    }
}

fn access<E: std::fmt::Display>(err: E) -> HotspotError {
    HotspotError::RepositoryAccess(err.to_string())
}
