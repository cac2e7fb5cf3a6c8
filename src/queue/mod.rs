//! Durable queues of jobs blocked on their dependencies.
//!
//! The bootstrapper pushes one job per fetched vertex and one per contained transaction. A job
//! becomes runnable once all of its dependencies are accepted, and [Jobs::execute_all] drains the
//! runnable jobs in dependency order. All state lives in `sled` so that a bootstrap attempt can be
//! resumed after a crash.

mod job;
mod jobs;

pub use job::{Acceptor, Job, JobContext, JobKind, Outcome};
pub use jobs::{ExecuteStats, Jobs};

use crate::choices::Status;
use crate::id::Id;
use crate::storage;
use crate::vm;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Sled(sled::Error),
    Storage(storage::Error),
    Vm(vm::Error),
    InvalidKey,
    MissingDependencies(Id),
    InvalidStatus(Id, Status),
    Acceptor(String),
}

impl std::error::Error for Error {}

impl std::convert::From<sled::Error> for Error {
    fn from(error: sled::Error) -> Self {
        Error::Sled(error)
    }
}

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

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
