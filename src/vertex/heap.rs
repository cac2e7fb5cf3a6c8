use super::Vertex;

use crate::id::VertexId;

use priority_queue::PriorityQueue;

use std::cmp::Reverse;
use std::collections::HashMap;

/// Ordering of the traversal: unfetched vertices first, then the highest vertex, then the
/// smallest id.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct Priority {
    unfetched: bool,
    height: u64,
    id: Reverse<VertexId>,
}

impl Priority {
    fn of(vtx: &Vertex) -> Self {
        Priority {
            unfetched: !vtx.status().fetched(),
            height: vtx.height(),
            id: Reverse(vtx.id()),
        }
    }
}

/// A max-heap of vertices keyed by id.
///
/// Popping always yields unknown vertices first (so they are marked missing before the traversal
/// goes any deeper) and then fetched vertices by decreasing height. Vertices at the same height
/// are popped in ascending id order. A vertex can be contained at most once.
pub struct VertexHeap {
    queue: PriorityQueue<VertexId, Priority>,
    vertices: HashMap<VertexId, Vertex>,
}

impl VertexHeap {
    pub fn new() -> Self {
        VertexHeap { queue: PriorityQueue::new(), vertices: HashMap::default() }
    }

    /// Pushes a vertex onto the heap, returns `false` if it was already contained.
    pub fn push(&mut self, vtx: Vertex) -> bool {
        let id = vtx.id();
        if self.vertices.contains_key(&id) {
            return false;
        }
        let _ = self.queue.push(id, Priority::of(&vtx));
        let _ = self.vertices.insert(id, vtx);
        true
    }

    /// Removes the vertex which should be traversed next.
    pub fn pop(&mut self) -> Option<Vertex> {
        let (id, _) = self.queue.pop()?;
        self.vertices.remove(&id)
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for VertexHeap {
    fn default() -> Self {
        VertexHeap::new()
    }
}
