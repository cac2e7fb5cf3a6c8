use super::Vertex;

use crate::id::VertexId;
use crate::storage::Result;

/// The vertex storage interface used while bootstrapping.
///
/// Implementations persist every vertex they parse, so that a vertex handed to the bootstrapper
/// can later be loaded again by id when its job is executed.
pub trait Manager {
    /// Parses (and stores) a vertex received from the network.
    fn parse_vtx(&self, bytes: &[u8]) -> Result<Vertex>;

    /// Loads a vertex, `None` if it has never been stored.
    fn get_vtx(&self, vtx_id: &VertexId) -> Result<Option<Vertex>>;

    /// The accepted frontier of the DAG.
    fn edge(&self) -> Result<Vec<VertexId>>;

    /// Builds (and stores) a stop vertex on top of `parent_ids`.
    fn build_stop_vtx(&self, parent_ids: Vec<VertexId>) -> Result<Vertex>;

    /// Whether a stop vertex has been accepted, i.e. whether the DAG is linearized.
    fn stop_vertex_accepted(&self) -> Result<bool>;

    /// Marks a vertex as accepted and moves the accepted frontier past it.
    fn accept_vtx(&self, vtx_id: &VertexId) -> Result<()>;
}
