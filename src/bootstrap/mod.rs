//! Bootstrapping of the vertex DAG.
//!
//! A [Bootstrapper] brings a node from an empty (or partially synchronised) DAG to the accepted
//! frontier reported by its beacons. It fetches missing vertices together with their ancestors,
//! traverses the fetched DAG from the top down while queueing every vertex and transaction as a
//! durable job, executes the jobs in dependency order once nothing is missing any more and
//! finally hands the linearized DAG over to the VM.

mod actor;
mod ancestors;
mod bootstrapper;
mod cache;
mod config;
mod fetcher;
mod requests;
mod sender;
mod traversal;

#[cfg(test)]
mod tests;

pub use actor::{
    Ancestors, Clear, Connected, Disconnected, ForceAccepted, GetAncestorsFailed, GetHealth, Halt,
    Start,
};
pub use bootstrapper::{Bootstrapper, Collaborators, Health, Metrics, OnFinished, Phase};
pub use cache::ProcessedCache;
pub use config::Config;
pub use requests::OutstandingRequests;
pub use sender::{Frontier, Sender};

use crate::id::VertexId;
use crate::queue;
use crate::storage;
use crate::vm;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Storage(storage::Error),
    Vm(vm::Error),
    Queue(queue::Error),
    InvalidConfig(String),
    /// No validator could be sampled to fetch the vertex from.
    NoValidators(VertexId),
    /// There are no beacons to learn the accepted frontier from.
    NoBeacons,
    /// A vertex which was rejected before is part of the accepted DAG.
    RejectedVertex(VertexId),
    /// The DAG is linearized but its frontier is empty.
    EmptyEdge,
}

impl std::error::Error for Error {}

impl std::convert::From<storage::Error> for Error {
    fn from(error: storage::Error) -> Self {
        Error::Storage(error)
    }
}

impl std::convert::From<vm::Error> for Error {
    fn from(error: vm::Error) -> Self {
        Error::Vm(error)
    }
}

impl std::convert::From<queue::Error> for Error {
    fn from(error: queue::Error) -> Self {
        Error::Queue(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
