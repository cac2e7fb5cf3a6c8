use super::{Error, Result};

use crate::id::{Id, TxId};

use std::collections::HashSet;

/// The encoded form of a transaction. Its `inputs` name the transactions it spends from, which
/// have to be accepted before it can be.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub inputs: Vec<TxId>,
    pub memo: Vec<u8>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tx {
    id: TxId,
    inner: UnsignedTx,
    bytes: Vec<u8>,
}

impl UnsignedTx {
    pub fn new(inputs: Vec<TxId>, memo: Vec<u8>) -> Self {
        UnsignedTx { inputs, memo }
    }

    pub fn verify(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for input in self.inputs.iter() {
            if !seen.insert(*input) {
                return Err(Error::DuplicateInput(*input));
            }
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        self.verify()?;
        Ok(bincode::serialize(self)?)
    }
}

impl Tx {
    /// Decodes and verifies a transaction.
    pub fn parse(bytes: &[u8]) -> Result<Tx> {
        let inner: UnsignedTx = bincode::deserialize(bytes)?;
        inner.verify()?;
        Ok(Tx { id: Id::new(bytes), inner, bytes: bytes.to_vec() })
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn inputs(&self) -> &[TxId] {
        &self.inner.inputs
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
