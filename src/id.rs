//! Content-addressed identifiers for vertices, transactions and peers
//!
//! See the documentation of [Id] for details.

use std::convert::TryInto;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base58check::{FromBase58Check, ToBase58Check};
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use rand::{self, Rng};

/// Generic hash-based ID
///
/// The `Id` wraps a 32-byte blake2b digest. A vertex or a transaction is identified by the
/// digest of its encoded bytes, which makes every identity verifiable by whoever holds the
/// bytes. Ids are ordered byte-wise, which gives the traversal heap a deterministic tie-break.
///
/// They are displayed using the Base58check format.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Default)]
pub struct Id([u8; 32]);

/// Identity of a DAG vertex.
pub type VertexId = Id;
/// Identity of a transaction carried by a vertex.
pub type TxId = Id;
/// Identity of a network peer.
pub type NodeId = Id;

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl FromStr for Id {
    type Err = crate::Error;

    /// Converts a base58check encoded string to bytes of an Id
    fn from_str(id_str: &str) -> Result<Self, crate::Error> {
        let (vsn, bytes) =
            id_str.from_base58check().map_err(|_| crate::Error::TryFromStringError)?;
        if vsn != 0 {
            return Err(crate::Error::TryFromStringError);
        }
        let bytes: [u8; 32] =
            bytes.as_slice().try_into().map_err(|_| crate::Error::TryFromStringError)?;
        Ok(Id(bytes))
    }
}

impl Id {
    /// Creates the id of some content by hashing its bytes.
    pub fn new(bytes: &[u8]) -> Id {
        Id(hash(bytes))
    }

    /// Wraps an existing 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Id {
        Id(bytes)
    }

    /// Reads an id back from a storage key, `None` if the slice has the wrong length.
    pub fn from_slice(bytes: &[u8]) -> Option<Id> {
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        Some(Id(bytes))
    }

    /// The id of a peer which was only given by its address.
    pub fn from_ip(ip: &SocketAddr) -> Id {
        Id::new(format!("{:?}", ip).as_bytes())
    }

    /// Generate a random `Id`
    pub fn generate() -> Id {
        let mut rng = rand::thread_rng();
        let v: [u8; 32] = rng.gen();
        Id(v)
    }

    /// All-zeroes `Id` (for testing)
    pub fn zero() -> Id {
        Id([0u8; 32])
    }

    /// All-ones `Id` (for testing)
    pub fn one() -> Id {
        Id([1u8; 32])
    }

    /// All-twos `Id` (for testing)
    pub fn two() -> Id {
        Id([2u8; 32])
    }

    /// Returns the wrapped byte array containing the hash
    pub fn bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Returns a slice to the contained byte array
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Prefixes an Id with another id, used for composite storage keys.
    pub fn prefix_id(&self, prefix: Id) -> [u8; 64] {
        let mut prefixed = [0u8; 64];
        prefixed[..32].clone_from_slice(&prefix.0[..]);
        prefixed[32..64].clone_from_slice(&self.0[..]);
        prefixed
    }
}

fn hash(input: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2bVar::new(32).unwrap();
    hasher.update(input);
    let mut buf = [0u8; 32];
    hasher.finalize_variable(&mut buf).unwrap();
    buf
}
