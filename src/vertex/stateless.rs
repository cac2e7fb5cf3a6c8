use super::{Error, Result};

use crate::id::{Id, VertexId};

use std::collections::HashSet;

/// Maximum number of parents a vertex may reference.
pub const MAX_PARENTS: usize = 128;
/// Maximum number of transactions a vertex may carry.
pub const MAX_TXS: usize = 128;

/// The encoded form of a vertex. The identity of a vertex is the hash of these bytes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatelessVertex {
    /// The chain this vertex belongs to.
    pub chain_id: Id,
    /// The distance from the genesis of the DAG.
    pub height: u64,
    /// Whether this is the stop vertex which ends the DAG and marks its linearization.
    pub stop: bool,
    /// The parents of this vertex, strictly ascending.
    pub parent_ids: Vec<VertexId>,
    /// The encoded transactions contained in this vertex.
    pub txs: Vec<Vec<u8>>,
}

impl StatelessVertex {
    /// Creates a regular vertex, normalising the order of its parents.
    pub fn new(chain_id: Id, height: u64, parent_ids: Vec<VertexId>, txs: Vec<Vec<u8>>) -> Self {
        StatelessVertex { chain_id, height, stop: false, parent_ids: sorted(parent_ids), txs }
    }

    /// Creates a stop vertex referencing `parent_ids` (usually the accepted frontier).
    pub fn stop_vertex(chain_id: Id, height: u64, parent_ids: Vec<VertexId>) -> Self {
        StatelessVertex { chain_id, height, stop: true, parent_ids: sorted(parent_ids), txs: vec![] }
    }

    /// Performs the syntactic checks every vertex has to pass before it is stored.
    pub fn verify(&self) -> Result<()> {
        if self.parent_ids.len() > MAX_PARENTS {
            return Err(Error::TooManyParents(self.parent_ids.len()));
        }
        if self.txs.len() > MAX_TXS {
            return Err(Error::TooManyTxs(self.txs.len()));
        }
        if !self.parent_ids.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::UnsortedParents);
        }
        if !self.parent_ids.is_empty() && self.height == 0 {
            return Err(Error::InvalidHeight);
        }
        if self.stop {
            if !self.txs.is_empty() {
                return Err(Error::StopVertexWithTxs);
            }
        } else if self.txs.is_empty() {
            return Err(Error::MissingTxs);
        }
        let mut seen = HashSet::new();
        for tx in self.txs.iter() {
            if !seen.insert(tx.as_slice()) {
                return Err(Error::DuplicateTx);
            }
        }
        Ok(())
    }

    /// Verifies and encodes the vertex.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.verify()?;
        Ok(bincode::serialize(self)?)
    }

    /// Decodes and verifies a vertex, returning it together with its identity.
    pub fn parse(bytes: &[u8]) -> Result<(VertexId, StatelessVertex)> {
        let vtx: StatelessVertex = bincode::deserialize(bytes)?;
        vtx.verify()?;
        Ok((Id::new(bytes), vtx))
    }
}

fn sorted(mut ids: Vec<VertexId>) -> Vec<VertexId> {
    ids.sort();
    ids.dedup();
    ids
}
