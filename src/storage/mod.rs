//! Database storage layer using [`sled`](http://docs.rs/sled/) as backend
use crate::choices::Status;
use crate::id::Id;
use crate::vertex;

/// Vertex storage and the accepted frontier of the DAG
pub mod vertex_store;

pub use vertex_store::VertexStore;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Bincode(String),
    Sled(sled::Error),
    Vertex(vertex::Error),
    InvalidKey,
    WrongChain(Id),
    UnknownVertex(Id),
    InvalidTransition(Id, Status, Status),
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

impl std::convert::From<vertex::Error> for Error {
    fn from(error: vertex::Error) -> Self {
        Error::Vertex(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
