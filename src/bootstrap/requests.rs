use crate::id::{NodeId, VertexId};

use std::collections::HashMap;

/// In-flight `GetAncestors` requests, indexed both by `(peer, request id)` and by the requested
/// vertex. At most one request is tracked per vertex.
#[derive(Debug, Default)]
pub struct OutstandingRequests {
    by_request: HashMap<(NodeId, u32), VertexId>,
    by_vertex: HashMap<VertexId, (NodeId, u32)>,
}

impl OutstandingRequests {
    pub fn new() -> Self {
        OutstandingRequests::default()
    }

    pub fn add(&mut self, peer: NodeId, request_id: u32, vtx_id: VertexId) {
        let _ = self.remove_any(&vtx_id);
        let _ = self.remove(&peer, request_id);
        let _ = self.by_request.insert((peer, request_id), vtx_id);
        let _ = self.by_vertex.insert(vtx_id, (peer, request_id));
    }

    /// Resolves a request, returning the vertex it was sent for.
    pub fn remove(&mut self, peer: &NodeId, request_id: u32) -> Option<VertexId> {
        let vtx_id = self.by_request.remove(&(*peer, request_id))?;
        let _ = self.by_vertex.remove(&vtx_id);
        Some(vtx_id)
    }

    /// Drops the request sent for a vertex, returning the peer and request id it was sent with.
    pub fn remove_any(&mut self, vtx_id: &VertexId) -> Option<(NodeId, u32)> {
        let request = self.by_vertex.remove(vtx_id)?;
        let _ = self.by_request.remove(&request);
        Some(request)
    }

    pub fn contains(&self, vtx_id: &VertexId) -> bool {
        self.by_vertex.contains_key(vtx_id)
    }

    pub fn len(&self) -> usize {
        self.by_request.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_request.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_request.clear();
        self.by_vertex.clear();
    }
}
