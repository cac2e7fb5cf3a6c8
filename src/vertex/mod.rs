//! DAG vertices as seen by the bootstrapper.
//!
//! A [StatelessVertex] is the wire representation of a vertex, a [Vertex] couples it with the
//! locally known [Status][crate::choices::Status]. The [Manager] trait is the storage interface
//! the bootstrapper depends on.

mod heap;
mod manager;
mod stateless;
#[allow(clippy::module_inception)]
mod vertex;

pub use heap::VertexHeap;
pub use manager::Manager;
pub use stateless::*;
pub use vertex::Vertex;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    Bincode(String),
    UnsortedParents,
    TooManyParents(usize),
    TooManyTxs(usize),
    DuplicateTx,
    MissingTxs,
    StopVertexWithTxs,
    InvalidHeight,
}

impl std::error::Error for Error {}

impl std::convert::From<Box<bincode::ErrorKind>> for Error {
    fn from(error: Box<bincode::ErrorKind>) -> Self {
        Error::Bincode(format!("{:?}", error))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
