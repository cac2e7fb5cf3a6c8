use crate::id::{NodeId, VertexId};

/// Outbound fetch requests of the bootstrapper. Sends are fire-and-forget: the response (or a
/// timeout) is delivered back as an `Ancestors` or `GetAncestorsFailed` event.
pub trait Sender {
    fn send_get_ancestors(&mut self, peer: NodeId, request_id: u32, vtx_id: VertexId);
}

/// Queries the beacons for their accepted frontier, which is delivered back as a
/// `ForceAccepted` event.
pub trait Frontier {
    fn request_frontier(&mut self);
}
