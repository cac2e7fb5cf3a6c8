use super::{Bootstrapper, Error, Result};

use crate::choices::Status;
use crate::id::VertexId;
use crate::queue::Job;
use crate::vertex::{Vertex, VertexHeap};

use std::collections::HashSet;

use colored::Colorize;
use tracing::{debug, info};

impl Bootstrapper {
    /// Loads a vertex, representing vertices which are not stored locally as unknown.
    pub(super) fn load_vertex(&self, vtx_id: &VertexId) -> Result<Vertex> {
        let vtx = self.cx.manager.get_vtx(vtx_id)?;
        Ok(vtx.unwrap_or_else(|| Vertex::unknown(*vtx_id)))
    }

    /// Traverses the DAG below `vtxs`, queueing a job for every fetched vertex and contained
    /// transaction and marking unknown vertices to be fetched. The traversal always continues
    /// with the highest vertex, so a shared ancestor is only reached once all of its descendants
    /// in the traversal have been queued.
    pub(super) fn process(&mut self, vtxs: Vec<Vertex>) -> Result<()> {
        let mut to_process = VertexHeap::new();
        for vtx in vtxs {
            if self.processed_cache.contains(&vtx.id()) {
                self.vtx_blocked.remove_missing_id(&vtx.id());
            } else {
                let _ = to_process.push(vtx);
            }
        }

        // vertices seen at the height currently being traversed
        let mut height_set: HashSet<VertexId> = HashSet::new();
        let mut prev_height = 0u64;

        while let Some(vtx) = to_process.pop() {
            if self.halted() {
                return Ok(());
            }
            let vtx_id = vtx.id();
            match vtx.status() {
                Status::Unknown => {
                    self.vtx_blocked.add_missing_id(vtx_id);
                    let _ = self.need_to_fetch.insert(vtx_id);
                }
                Status::Rejected => return Err(Error::RejectedVertex(vtx_id)),
                Status::Accepted => (),
                Status::Processing => {
                    let _ = self.need_to_fetch.remove(&vtx_id);
                    self.vtx_blocked.remove_missing_id(&vtx_id);

                    if !self.vtx_blocked.push(Job::Vertex(vtx.clone()))? {
                        // its transactions and parents have been queued already
                        continue;
                    }
                    for tx_bytes in vtx.txs() {
                        let tx = self.cx.vm.parse_tx(tx_bytes)?;
                        if self.tx_blocked.push(Job::Tx(tx))? {
                            self.metrics.fetched_txs += 1;
                        }
                    }
                    self.metrics.fetched_vertices += 1;

                    let fetched = self.vtx_blocked.pending_jobs();
                    if fetched % self.config.status_update_frequency == 0 {
                        if self.restarted {
                            debug!("[{}] fetched {} vertices", "bootstrap".cyan(), fetched);
                        } else {
                            info!("[{}] fetched {} vertices", "bootstrap".cyan(), fetched);
                        }
                    }

                    for parent_id in vtx.parent_ids() {
                        if self.processed_cache.contains(parent_id) || height_set.contains(parent_id)
                        {
                            continue;
                        }
                        let _ = to_process.push(self.load_vertex(parent_id)?);
                    }

                    let height = vtx.height();
                    let _ = self.processed_cache.admit(vtx_id, height);
                    if height != prev_height {
                        prev_height = height;
                        height_set.clear();
                    }
                    let _ = height_set.insert(vtx_id);
                }
            }
        }

        self.tx_blocked.commit()?;
        self.vtx_blocked.commit()?;
        self.fetch(vec![])
    }
}
