use super::{Bootstrapper, Error, Result};

use crate::id::{NodeId, VertexId};

use colored::Colorize;
use tracing::debug;

impl Bootstrapper {
    /// Adds `vtx_ids` to the fetch backlog and requests vertices from the backlog until it is
    /// drained or the maximum number of requests is in flight.
    pub(super) fn fetch(&mut self, vtx_ids: Vec<VertexId>) -> Result<()> {
        self.need_to_fetch.extend(vtx_ids);
        while self.outstanding.len() < self.config.max_outstanding_get_ancestors_requests {
            let vtx_id = match self.need_to_fetch.iter().next() {
                Some(vtx_id) => *vtx_id,
                None => break,
            };
            let _ = self.need_to_fetch.remove(&vtx_id);

            if self.outstanding.contains(&vtx_id) {
                continue;
            }
            if self.cx.manager.get_vtx(&vtx_id)?.is_some() {
                continue;
            }

            let peer = match self.beacons.sample(1).first() {
                Some(peer) => *peer,
                None => return Err(Error::NoValidators(vtx_id)),
            };
            self.request_id = self.request_id.wrapping_add(1);
            self.outstanding.add(peer, self.request_id, vtx_id);
            debug!(
                "[{}] requesting ancestors of {} from {} (request {})",
                "bootstrap".cyan(),
                vtx_id,
                peer,
                self.request_id
            );
            self.sender.send_get_ancestors(peer, self.request_id, vtx_id);
        }
        self.check_finish()
    }

    /// Handles a failed (or timed out) `GetAncestors` request by requesting the vertex again.
    pub fn get_ancestors_failed(&mut self, peer: &NodeId, request_id: u32) -> Result<()> {
        match self.outstanding.remove(peer, request_id) {
            Some(vtx_id) => self.fetch(vec![vtx_id]),
            None => {
                debug!(
                    "[{}] skipping failed request {} from {}, not outstanding",
                    "bootstrap".cyan(),
                    request_id,
                    peer
                );
                Ok(())
            }
        }
    }
}
