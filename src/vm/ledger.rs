use super::{EngineState, Error, Result, Tx, Vm};

use crate::choices::Status;
use crate::id::{Id, NodeId, TxId, VertexId};

use std::collections::HashSet;
use std::sync::Mutex;

use colored::Colorize;
use tracing::{debug, info};
use zerocopy::{AsBytes, FromBytes, Unaligned};

const STATE_KEY: &[u8] = b"state";
const LINEARIZED_KEY: &[u8] = b"linearized";

#[derive(Clone, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Key {
    hash: [u8; 32],
}

impl Key {
    pub fn new(id: &TxId) -> Key {
        Key { hash: id.bytes() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTx {
    status: Status,
    bytes: Vec<u8>,
}

/// A `sled` backed transaction ledger.
///
/// Transactions form a dependency graph through their inputs: a transaction may only be accepted
/// once every input has been accepted.
pub struct Ledger {
    txs: sled::Tree,
    meta: sled::Tree,
    peers: Mutex<HashSet<NodeId>>,
}

impl Ledger {
    pub fn new(db: &sled::Db) -> Result<Self> {
        let txs = db.open_tree("txs")?;
        let meta = db.open_tree("ledger_meta")?;
        Ok(Ledger { txs, meta, peers: Mutex::new(HashSet::new()) })
    }

    /// Stores a transaction with the given status unless it is already known.
    pub fn insert_tx(&self, bytes: &[u8], status: Status) -> Result<Tx> {
        let tx = Tx::parse(bytes)?;
        if self.load(&tx.id())?.is_none() {
            self.store(&tx.id(), &StoredTx { status, bytes: bytes.to_vec() })?;
        }
        Ok(tx)
    }

    pub fn state(&self) -> Result<Option<EngineState>> {
        match self.meta.get(STATE_KEY)? {
            Some(v) => Ok(Some(bincode::deserialize(v.as_bytes())?)),
            None => Ok(None),
        }
    }

    /// The stop vertex the ledger was linearized on, if any.
    pub fn linearized(&self) -> Result<Option<VertexId>> {
        match self.meta.get(LINEARIZED_KEY)? {
            Some(v) => Ok(Id::from_slice(v.as_bytes())),
            None => Ok(None),
        }
    }

    pub fn num_connected(&self) -> Result<usize> {
        let peers = self.peers.lock().map_err(|_| Error::Poisoned)?;
        Ok(peers.len())
    }

    fn load(&self, tx_id: &TxId) -> Result<Option<StoredTx>> {
        match self.txs.get(Key::new(tx_id).as_bytes())? {
            Some(v) => Ok(Some(bincode::deserialize(v.as_bytes())?)),
            None => Ok(None),
        }
    }

    fn store(&self, tx_id: &TxId, stored: &StoredTx) -> Result<()> {
        let encoded = bincode::serialize(stored)?;
        let _ = self.txs.insert(Key::new(tx_id).as_bytes(), encoded)?;
        Ok(())
    }
}

impl Vm for Ledger {
    fn set_state(&self, state: EngineState) -> Result<()> {
        debug!("[{}] engine state = {:?}", "ledger".green(), state);
        let encoded = bincode::serialize(&state)?;
        let _ = self.meta.insert(STATE_KEY, encoded)?;
        Ok(())
    }

    fn parse_tx(&self, bytes: &[u8]) -> Result<Tx> {
        self.insert_tx(bytes, Status::Processing)
    }

    fn tx_status(&self, tx_id: &TxId) -> Result<Status> {
        Ok(self.load(tx_id)?.map(|stored| stored.status).unwrap_or(Status::Unknown))
    }

    fn accept_tx(&self, tx: &Tx) -> Result<()> {
        let stored = self.load(&tx.id())?.ok_or(Error::UnknownTx(tx.id()))?;
        if !stored.status.can_transition(Status::Accepted) {
            return Err(Error::InvalidTransition(tx.id(), stored.status, Status::Accepted));
        }
        for input in tx.inputs() {
            if self.tx_status(input)? != Status::Accepted {
                return Err(Error::MissingInput(tx.id(), *input));
            }
        }
        self.store(&tx.id(), &StoredTx { status: Status::Accepted, bytes: stored.bytes })
    }

    fn linearize(&self, stop_vertex_id: VertexId) -> Result<()> {
        if self.state()? != Some(EngineState::Bootstrapping) {
            return Err(Error::NotBootstrapping);
        }
        let _ = self.meta.insert(LINEARIZED_KEY, stop_vertex_id.as_bytes())?;
        let _ = self.meta.flush()?;
        info!("[{}] linearized at stop vertex {}", "ledger".green(), stop_vertex_id);
        Ok(())
    }

    fn connected(&self, node_id: &NodeId) -> Result<()> {
        let mut peers = self.peers.lock().map_err(|_| Error::Poisoned)?;
        let _ = peers.insert(*node_id);
        Ok(())
    }

    fn disconnected(&self, node_id: &NodeId) -> Result<()> {
        let mut peers = self.peers.lock().map_err(|_| Error::Poisoned)?;
        let _ = peers.remove(node_id);
        Ok(())
    }
}
