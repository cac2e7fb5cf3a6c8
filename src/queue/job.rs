use super::{Error, Result};

use crate::choices::Status;
use crate::id::Id;
use crate::storage;
use crate::vertex::{Manager, StatelessVertex, Vertex};
use crate::vm::{Tx, Vm};

use std::sync::Arc;

use colored::Colorize;
use tracing::warn;

/// The collaborators a job needs to resolve and execute itself.
#[derive(Clone)]
pub struct JobContext {
    pub manager: Arc<dyn Manager>,
    pub vm: Arc<dyn Vm>,
}

impl JobContext {
    pub fn new(manager: Arc<dyn Manager>, vm: Arc<dyn Vm>) -> Self {
        JobContext { manager, vm }
    }

    /// Parses a vertex received from a peer. The vertex is only stored once every transaction it
    /// carries has been parsed by the VM.
    pub fn parse_vtx(&self, bytes: &[u8]) -> Result<Vertex> {
        let (_, inner) = StatelessVertex::parse(bytes).map_err(storage::Error::from)?;
        for tx in inner.txs.iter() {
            let _ = self.vm.parse_tx(tx)?;
        }
        Ok(self.manager.parse_vtx(bytes)?)
    }
}

/// A hook invoked with the id and bytes of every job right before it is executed.
pub trait Acceptor {
    fn accept(&self, id: &Id, bytes: &[u8]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobKind {
    Vertex,
    Tx,
}

impl JobKind {
    /// The prefix of the `sled` trees holding a queue of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Vertex => "vertex",
            JobKind::Tx => "tx",
        }
    }
}

/// What became of an executed job.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    Accepted,
    /// The job could not be accepted and was dropped from the queue.
    Dropped,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Job {
    /// Accepts a vertex once its parents are accepted.
    Vertex(Vertex),
    /// Accepts a transaction once its inputs are accepted.
    Tx(Tx),
}

impl Job {
    /// Restores a job from its persisted bytes.
    pub fn parse(kind: JobKind, bytes: &[u8], cx: &JobContext) -> Result<Job> {
        match kind {
            JobKind::Vertex => Ok(Job::Vertex(cx.manager.parse_vtx(bytes)?)),
            JobKind::Tx => Ok(Job::Tx(cx.vm.parse_tx(bytes)?)),
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Job::Vertex(vtx) => vtx.id(),
            Job::Tx(tx) => tx.id(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Job::Vertex(vtx) => vtx.bytes(),
            Job::Tx(tx) => tx.bytes(),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Job::Vertex(_) => JobKind::Vertex,
            Job::Tx(_) => JobKind::Tx,
        }
    }

    /// The dependencies of this job which are not accepted yet.
    pub fn missing_dependencies(&self, cx: &JobContext) -> Result<Vec<Id>> {
        let mut missing = vec![];
        match self {
            Job::Vertex(vtx) => {
                for parent in vtx.parent_ids() {
                    let status = cx.manager.get_vtx(parent)?.map(|p| p.status());
                    if status != Some(Status::Accepted) {
                        missing.push(*parent);
                    }
                }
            }
            Job::Tx(tx) => {
                for input in tx.inputs() {
                    if cx.vm.tx_status(input)? != Status::Accepted {
                        missing.push(*input);
                    }
                }
            }
        }
        Ok(missing)
    }

    pub fn has_missing_dependencies(&self, cx: &JobContext) -> Result<bool> {
        Ok(!self.missing_dependencies(cx)?.is_empty())
    }

    /// Accepts the element behind this job. The job must not have missing dependencies.
    pub fn execute(&self, cx: &JobContext) -> Result<Outcome> {
        if self.has_missing_dependencies(cx)? {
            return Err(Error::MissingDependencies(self.id()));
        }
        match self {
            Job::Vertex(vtx) => {
                let vtx_id = vtx.id();
                for tx_bytes in vtx.txs() {
                    let tx = cx.vm.parse_tx(tx_bytes)?;
                    if cx.vm.tx_status(&tx.id())? != Status::Accepted {
                        warn!(
                            "[{}] dropping vertex {} with unaccepted tx {}",
                            "queue".yellow(),
                            vtx_id,
                            tx.id()
                        );
                        return Ok(Outcome::Dropped);
                    }
                }
                let status = cx.manager.get_vtx(&vtx_id)?.map(|v| v.status());
                match status {
                    Some(Status::Processing) => {
                        cx.manager.accept_vtx(&vtx_id)?;
                        Ok(Outcome::Accepted)
                    }
                    Some(Status::Accepted) => Ok(Outcome::Accepted),
                    Some(status) => Err(Error::InvalidStatus(vtx_id, status)),
                    None => Err(Error::InvalidStatus(vtx_id, Status::Unknown)),
                }
            }
            Job::Tx(tx) => match cx.vm.tx_status(&tx.id())? {
                Status::Processing => {
                    cx.vm.accept_tx(tx)?;
                    Ok(Outcome::Accepted)
                }
                Status::Accepted => Ok(Outcome::Accepted),
                status => Err(Error::InvalidStatus(tx.id(), status)),
            },
        }
    }
}
