use super::{Acceptor, Error, Job, JobContext, JobKind, Outcome, Result};

use crate::id::Id;

use std::collections::HashSet;
use std::sync::Arc;

use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// Number of executed jobs between two flushes of the queue.
const COMMIT_FREQUENCY: usize = 1024;
/// Number of executed jobs between two progress reports.
const EXECUTE_STATUS_FREQUENCY: usize = 5000;

#[derive(Clone, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Key {
    hash: [u8; 32],
}

impl Key {
    pub fn new(id: &Id) -> Key {
        Key { hash: id.bytes() }
    }
}

/// Statistics of a call to [Jobs::execute_all].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ExecuteStats {
    pub accepted: usize,
    pub dropped: usize,
}

impl ExecuteStats {
    pub fn executed(&self) -> usize {
        self.accepted + self.dropped
    }
}

/// A persisted queue of jobs of one kind.
///
/// Layout (each tree is prefixed with the kind of the queue):
///  - `jobs`: job id -> job bytes, for every job not executed yet
///  - `runnable`: job id -> (), jobs without missing dependencies
///  - `dependencies`: dependency id ++ dependent id -> (), jobs blocked on a dependency
///  - `missing`: id -> (), elements known to be needed which are not available locally
///
/// Changes to the missing ids are buffered in memory until [Jobs::commit].
pub struct Jobs {
    kind: JobKind,
    cx: JobContext,
    db: sled::Db,
    jobs: sled::Tree,
    runnable: sled::Tree,
    dependencies: sled::Tree,
    missing: sled::Tree,
    num_pending: usize,
    missing_ids: HashSet<Id>,
    added_missing: HashSet<Id>,
    removed_missing: HashSet<Id>,
}

impl Jobs {
    /// Opens the queue of `kind`, restoring any state persisted in `db`.
    pub fn new(db: &sled::Db, kind: JobKind, cx: JobContext) -> Result<Self> {
        let tree = |suffix: &str| db.open_tree(format!("{}_{}", kind.name(), suffix));
        let jobs = tree("jobs")?;
        let runnable = tree("runnable")?;
        let dependencies = tree("dependencies")?;
        let missing = tree("missing")?;

        let mut missing_ids = HashSet::new();
        for kv in missing.iter() {
            let (k, _) = kv?;
            let _ = missing_ids.insert(Id::from_slice(&k).ok_or(Error::InvalidKey)?);
        }
        let num_pending = jobs.len();

        let queue = Jobs {
            kind,
            cx,
            db: db.clone(),
            jobs,
            runnable,
            dependencies,
            missing,
            num_pending,
            missing_ids,
            added_missing: HashSet::new(),
            removed_missing: HashSet::new(),
        };
        queue.restore_runnable()?;
        Ok(queue)
    }

    /// Marks every queued job whose dependencies are all accepted as runnable. An execution
    /// interrupted between accepting a job and unblocking its dependents leaves such jobs behind.
    fn restore_runnable(&self) -> Result<()> {
        let mut restored = 0;
        for kv in self.jobs.iter() {
            let (key, bytes) = kv?;
            if self.runnable.contains_key(&key)? {
                continue;
            }
            let job = Job::parse(self.kind, &bytes, &self.cx)?;
            if !job.has_missing_dependencies(&self.cx)? {
                let _ = self.runnable.insert(&key, Vec::<u8>::new())?;
                restored += 1;
            }
        }
        if restored > 0 {
            debug!("[{}] restored {} runnable {} jobs", "queue".cyan(), restored, self.kind.name());
        }
        Ok(())
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Adds a job to the queue. Returns `false` if the job was already queued.
    pub fn push(&mut self, job: Job) -> Result<bool> {
        let id = job.id();
        let key = Key::new(&id);
        if self.jobs.contains_key(key.as_bytes())? {
            return Ok(false);
        }
        let _ = self.jobs.insert(key.as_bytes(), job.bytes())?;
        self.num_pending += 1;

        let deps = job.missing_dependencies(&self.cx)?;
        if deps.is_empty() {
            let _ = self.runnable.insert(key.as_bytes(), Vec::<u8>::new())?;
        } else {
            for dep in deps {
                let _ = self.dependencies.insert(&id.prefix_id(dep)[..], Vec::<u8>::new())?;
            }
        }
        Ok(true)
    }

    /// The number of jobs which have not been executed yet.
    pub fn pending_jobs(&self) -> usize {
        self.num_pending
    }

    pub fn missing_ids(&self) -> Vec<Id> {
        self.missing_ids.iter().cloned().collect()
    }

    pub fn num_missing_ids(&self) -> usize {
        self.missing_ids.len()
    }

    pub fn has_missing_id(&self, id: &Id) -> bool {
        self.missing_ids.contains(id)
    }

    pub fn add_missing_id(&mut self, id: Id) {
        if self.missing_ids.insert(id) {
            let _ = self.removed_missing.remove(&id);
            let _ = self.added_missing.insert(id);
        }
    }

    pub fn remove_missing_id(&mut self, id: &Id) {
        if self.missing_ids.remove(id) {
            let _ = self.added_missing.remove(id);
            let _ = self.removed_missing.insert(*id);
        }
    }

    /// Persists the buffered missing ids and flushes the queue to disk.
    pub fn commit(&mut self) -> Result<()> {
        for id in self.added_missing.drain() {
            let _ = self.missing.insert(Key::new(&id).as_bytes(), Vec::<u8>::new())?;
        }
        for id in self.removed_missing.drain() {
            let _ = self.missing.remove(Key::new(&id).as_bytes())?;
        }
        let _ = self.db.flush()?;
        Ok(())
    }

    /// Drops every job and missing id of this queue.
    pub fn clear(&mut self) -> Result<()> {
        self.jobs.clear()?;
        self.runnable.clear()?;
        self.dependencies.clear()?;
        self.missing.clear()?;
        self.num_pending = 0;
        self.missing_ids.clear();
        self.added_missing.clear();
        self.removed_missing.clear();
        self.commit()
    }

    /// Executes runnable jobs until none is left or `halter` is cancelled. Every acceptor is
    /// invoked before a job is executed; executing a job may make its dependents runnable.
    pub fn execute_all(
        &mut self,
        halter: &CancellationToken,
        restarted: bool,
        acceptors: &[Arc<dyn Acceptor>],
    ) -> Result<ExecuteStats> {
        let mut stats = ExecuteStats::default();
        loop {
            if halter.is_cancelled() {
                info!(
                    "[{}] interrupted execution after {} {} jobs",
                    "queue".yellow(),
                    stats.executed(),
                    self.kind.name()
                );
                self.commit()?;
                return Ok(stats);
            }
            // removed from `runnable` only after its dependents are unblocked
            let key = match self.runnable.first()? {
                Some((k, _)) => k,
                None => break,
            };
            let id = Id::from_slice(&key).ok_or(Error::InvalidKey)?;
            let bytes = match self.jobs.get(&key)? {
                Some(bytes) => bytes,
                None => {
                    let _ = self.runnable.remove(&key)?;
                    continue;
                }
            };
            let job = Job::parse(self.kind, &bytes, &self.cx)?;

            for acceptor in acceptors.iter() {
                acceptor.accept(&id, job.bytes())?;
            }
            match job.execute(&self.cx)? {
                Outcome::Accepted => stats.accepted += 1,
                Outcome::Dropped => stats.dropped += 1,
            }
            self.unblock_dependents(&id)?;
            let _ = self.runnable.remove(&key)?;
            let _ = self.jobs.remove(&key)?;
            self.num_pending = self.num_pending.saturating_sub(1);

            let executed = stats.executed();
            if executed % COMMIT_FREQUENCY == 0 {
                self.commit()?;
            }
            if executed % EXECUTE_STATUS_FREQUENCY == 0 {
                if restarted {
                    debug!("[{}] executed {} {} jobs", "queue".cyan(), executed, self.kind.name());
                } else {
                    info!("[{}] executed {} {} jobs", "queue".cyan(), executed, self.kind.name());
                }
            }
        }
        self.commit()?;
        if restarted {
            debug!("[{}] executed {} {} jobs", "queue".cyan(), stats.executed(), self.kind.name());
        } else {
            info!("[{}] executed {} {} jobs", "queue".cyan(), stats.executed(), self.kind.name());
        }
        Ok(stats)
    }

    /// Removes the dependency records of `id`, marking dependents without any other missing
    /// dependency as runnable.
    fn unblock_dependents(&mut self, id: &Id) -> Result<()> {
        let mut dependents = vec![];
        for kv in self.dependencies.scan_prefix(id.as_bytes()) {
            let (k, _) = kv?;
            dependents.push(k);
        }
        for k in dependents {
            let _ = self.dependencies.remove(&k)?;
            let dependent = Id::from_slice(&k[32..]).ok_or(Error::InvalidKey)?;
            let bytes = match self.jobs.get(Key::new(&dependent).as_bytes())? {
                Some(bytes) => bytes,
                None => continue,
            };
            let job = Job::parse(self.kind, &bytes, &self.cx)?;
            if !job.has_missing_dependencies(&self.cx)? {
                let _ = self.runnable.insert(Key::new(&dependent).as_bytes(), Vec::<u8>::new())?;
            }
        }
        Ok(())
    }
}
