use crate::id::{Id, VertexId};

/// Asks a peer for a vertex together with as many of its ancestors as it is willing to send.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GetAncestors {
    pub chain_id: Id,
    pub vertex_id: VertexId,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Message)]
#[rtype(result = "Response")]
pub enum Request {
    // Liveness
    Ping,
    // DAG Bootstrapping
    GetAcceptedFrontier { chain_id: Id },
    GetAncestors(GetAncestors),
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, MessageResponse)]
pub enum Response {
    // Liveness
    Pong,
    // DAG Bootstrapping
    AcceptedFrontier(Vec<VertexId>),
    /// Encoded vertices, the requested vertex first.
    Ancestors(Vec<Vec<u8>>),
    // Error
    Unknown,
}
