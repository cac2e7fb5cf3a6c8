use super::StatelessVertex;

use crate::choices::Status;
use crate::id::VertexId;

/// A vertex together with its locally known status.
///
/// Vertices which were referenced but never fetched are represented with `Status::Unknown` and
/// carry no content.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Vertex {
    id: VertexId,
    status: Status,
    inner: Option<StatelessVertex>,
    bytes: Vec<u8>,
}

impl Vertex {
    pub fn new(id: VertexId, status: Status, inner: StatelessVertex, bytes: Vec<u8>) -> Self {
        Vertex { id, status, inner: Some(inner), bytes }
    }

    /// A vertex which is referenced by the DAG but not stored locally.
    pub fn unknown(id: VertexId) -> Self {
        Vertex { id, status: Status::Unknown, inner: None, bytes: vec![] }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The height of the vertex, `0` while its content is unknown.
    pub fn height(&self) -> u64 {
        self.inner.as_ref().map(|vtx| vtx.height).unwrap_or(0)
    }

    pub fn parent_ids(&self) -> &[VertexId] {
        match &self.inner {
            Some(vtx) => &vtx.parent_ids,
            None => &[],
        }
    }

    /// The encoded transactions of this vertex.
    pub fn txs(&self) -> &[Vec<u8>] {
        match &self.inner {
            Some(vtx) => &vtx.txs,
            None => &[],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_stop_vertex(&self) -> bool {
        self.inner.as_ref().map(|vtx| vtx.stop).unwrap_or(false)
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}
