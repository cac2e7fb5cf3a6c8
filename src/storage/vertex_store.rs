use super::{Error, Result};

use crate::choices::Status;
use crate::id::{Id, VertexId};
use crate::vertex::{Manager, StatelessVertex, Vertex};

use std::collections::{HashSet, VecDeque};

use zerocopy::{AsBytes, FromBytes, Unaligned};

const EDGE_KEY: &[u8] = b"edge";
const STOP_VERTEX_KEY: &[u8] = b"stop_vertex";

#[derive(Clone, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Key {
    hash: [u8; 32],
}

impl Key {
    pub fn new(id: &VertexId) -> Key {
        Key { hash: id.bytes() }
    }
}

/// The value stored for each vertex: its decision status and its raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVertex {
    status: Status,
    bytes: Vec<u8>,
}

/// Stores the vertices of a single chain together with its accepted frontier.
///
/// Vertices live in the `vertices` tree keyed by their id; the frontier (`edge`) and the id of
/// the accepted stop vertex live in `vertex_meta`.
#[derive(Clone)]
pub struct VertexStore {
    chain_id: Id,
    vertices: sled::Tree,
    meta: sled::Tree,
}

impl VertexStore {
    pub fn new(db: &sled::Db, chain_id: Id) -> Result<Self> {
        let vertices = db.open_tree("vertices")?;
        let meta = db.open_tree("vertex_meta")?;
        Ok(VertexStore { chain_id, vertices, meta })
    }

    pub fn chain_id(&self) -> Id {
        self.chain_id
    }

    /// Parses `bytes` and stores the vertex with `status`, unless it is already known.
    /// Used to seed a store with a DAG (e.g. the genesis vertex or a peer's full history).
    pub fn insert_vtx(&self, bytes: &[u8], status: Status) -> Result<Vertex> {
        let (id, inner) = self.parse_stateless(bytes)?;
        if let Some(vtx) = self.load(&id)? {
            return Ok(vtx);
        }
        self.store(&id, &StoredVertex { status, bytes: bytes.to_vec() })?;
        if status == Status::Accepted {
            self.advance_edge(&id, &inner)?;
        }
        Ok(Vertex::new(id, status, inner, bytes.to_vec()))
    }

    /// Marks a processing vertex as rejected.
    pub fn reject_vtx(&self, vtx_id: &VertexId) -> Result<()> {
        let _ = self.set_status(vtx_id, Status::Rejected)?;
        Ok(())
    }

    /// Collects the bytes of `vtx_id` followed by its stored ancestors in breadth-first order,
    /// bounded by the number of containers and their total size. Every returned vertex after
    /// the first is a parent of a vertex returned before it.
    pub fn get_ancestors(
        &self,
        vtx_id: &VertexId,
        max_containers: usize,
        max_bytes: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let mut ancestors = vec![];
        let mut total_bytes = 0usize;
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(*vtx_id);
        let _ = visited.insert(*vtx_id);

        while let Some(id) = queue.pop_front() {
            if ancestors.len() >= max_containers {
                break;
            }
            let vtx = match self.load(&id)? {
                Some(vtx) if vtx.status().fetched() => vtx,
                _ => continue,
            };
            if total_bytes + vtx.bytes().len() > max_bytes {
                break;
            }
            total_bytes += vtx.bytes().len();
            for parent in vtx.parent_ids() {
                if visited.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
            ancestors.push(vtx.bytes().to_vec());
        }
        Ok(ancestors)
    }

    fn parse_stateless(&self, bytes: &[u8]) -> Result<(VertexId, StatelessVertex)> {
        let (id, inner) = StatelessVertex::parse(bytes)?;
        if inner.chain_id != self.chain_id {
            return Err(Error::WrongChain(inner.chain_id));
        }
        Ok((id, inner))
    }

    fn load(&self, vtx_id: &VertexId) -> Result<Option<Vertex>> {
        match self.vertices.get(Key::new(vtx_id).as_bytes())? {
            Some(v) => {
                let stored: StoredVertex = bincode::deserialize(v.as_bytes())?;
                let (id, inner) = StatelessVertex::parse(&stored.bytes)?;
                Ok(Some(Vertex::new(id, stored.status, inner, stored.bytes)))
            }
            None => Ok(None),
        }
    }

    fn store(&self, vtx_id: &VertexId, stored: &StoredVertex) -> Result<()> {
        let encoded = bincode::serialize(stored)?;
        let _ = self.vertices.insert(Key::new(vtx_id).as_bytes(), encoded)?;
        Ok(())
    }

    fn set_status(&self, vtx_id: &VertexId, status: Status) -> Result<Vertex> {
        let vtx = self.load(vtx_id)?.ok_or(Error::UnknownVertex(*vtx_id))?;
        if !vtx.status().can_transition(status) {
            return Err(Error::InvalidTransition(*vtx_id, vtx.status(), status));
        }
        self.store(vtx_id, &StoredVertex { status, bytes: vtx.bytes().to_vec() })?;
        Ok(vtx.with_status(status))
    }

    fn write_edge(&self, edge: &[VertexId]) -> Result<()> {
        let encoded = bincode::serialize(edge)?;
        let _ = self.meta.insert(EDGE_KEY, encoded)?;
        Ok(())
    }

    /// Replaces the parents of an accepted vertex in the frontier with the vertex itself.
    fn advance_edge(&self, vtx_id: &VertexId, inner: &StatelessVertex) -> Result<()> {
        let mut edge = self.edge()?;
        edge.retain(|id| !inner.parent_ids.contains(id));
        if let Err(i) = edge.binary_search(vtx_id) {
            edge.insert(i, *vtx_id);
        }
        self.write_edge(&edge)?;
        if inner.stop {
            let _ = self.meta.insert(STOP_VERTEX_KEY, vtx_id.as_bytes())?;
        }
        Ok(())
    }
}

impl Manager for VertexStore {
    fn parse_vtx(&self, bytes: &[u8]) -> Result<Vertex> {
        let (id, inner) = self.parse_stateless(bytes)?;
        match self.load(&id)? {
            // A vertex only known as a reference is upgraded once its bytes arrive.
            Some(vtx) if vtx.status().fetched() => Ok(vtx),
            _ => {
                self.store(&id, &StoredVertex { status: Status::Processing, bytes: bytes.to_vec() })?;
                Ok(Vertex::new(id, Status::Processing, inner, bytes.to_vec()))
            }
        }
    }

    fn get_vtx(&self, vtx_id: &VertexId) -> Result<Option<Vertex>> {
        self.load(vtx_id)
    }

    fn edge(&self) -> Result<Vec<VertexId>> {
        match self.meta.get(EDGE_KEY)? {
            Some(v) => Ok(bincode::deserialize(v.as_bytes())?),
            None => Ok(vec![]),
        }
    }

    fn build_stop_vtx(&self, parent_ids: Vec<VertexId>) -> Result<Vertex> {
        let mut height = 0;
        for parent in parent_ids.iter() {
            let vtx = self.load(parent)?.ok_or(Error::UnknownVertex(*parent))?;
            height = std::cmp::max(height, vtx.height() + 1);
        }
        let inner = StatelessVertex::stop_vertex(self.chain_id, height, parent_ids);
        let bytes = inner.encode()?;
        let id = Id::new(&bytes);
        if let Some(vtx) = self.load(&id)? {
            return Ok(vtx);
        }
        self.store(&id, &StoredVertex { status: Status::Processing, bytes: bytes.clone() })?;
        Ok(Vertex::new(id, Status::Processing, inner, bytes))
    }

    fn stop_vertex_accepted(&self) -> Result<bool> {
        Ok(self.meta.contains_key(STOP_VERTEX_KEY)?)
    }

    fn accept_vtx(&self, vtx_id: &VertexId) -> Result<()> {
        let vtx = self.load(vtx_id)?.ok_or(Error::UnknownVertex(*vtx_id))?;
        if vtx.status() == Status::Accepted {
            return Ok(());
        }
        let vtx = self.set_status(vtx_id, Status::Accepted)?;
        let (_, inner) = StatelessVertex::parse(vtx.bytes())?;
        self.advance_edge(vtx_id, &inner)
    }
}
