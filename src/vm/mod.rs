//! The virtual machine interface which receives accepted transactions.
//!
//! During bootstrapping the VM only parses and accepts transactions in dependency order; once the
//! DAG is linearized it is told the id of the stop vertex and switches to normal operation.

mod ledger;
mod tx;

pub use ledger::Ledger;
pub use tx::{Tx, UnsignedTx};

use crate::choices::Status;
use crate::id::{NodeId, TxId, VertexId};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Bootstrapping,
    NormalOp,
}

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Bincode(String),
    Sled(sled::Error),
    Poisoned,
    DuplicateInput(TxId),
    UnknownTx(TxId),
    MissingInput(TxId, TxId),
    InvalidTransition(TxId, Status, Status),
    NotBootstrapping,
}

impl std::error::Error for Error {}

impl std::convert::From<Box<bincode::ErrorKind>> for Error {
    fn from(error: Box<bincode::ErrorKind>) -> Self {
        Error::Bincode(format!("{:?}", error))
    }
}

impl std::convert::From<sled::Error> for Error {
    fn from(error: sled::Error) -> Self {
        Error::Sled(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The VM as seen by the bootstrapper.
pub trait Vm {
    /// Notifies the VM about the engine state it is running under.
    fn set_state(&self, state: EngineState) -> Result<()>;

    /// Parses a transaction carried by a vertex. A transaction seen for the first time is stored
    /// as `Processing`.
    fn parse_tx(&self, bytes: &[u8]) -> Result<Tx>;

    /// The locally known status of a transaction, `Unknown` if it was never parsed.
    fn tx_status(&self, tx_id: &TxId) -> Result<Status>;

    /// Accepts a processing transaction. All of its inputs must already be accepted.
    fn accept_tx(&self, tx: &Tx) -> Result<()>;

    /// Hands over the linearized DAG, ending at `stop_vertex_id`.
    fn linearize(&self, stop_vertex_id: VertexId) -> Result<()>;

    fn connected(&self, node_id: &NodeId) -> Result<()>;

    fn disconnected(&self, node_id: &NodeId) -> Result<()>;
}
