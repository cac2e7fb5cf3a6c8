use super::{Bootstrapper, Result};

use crate::id::NodeId;

use std::collections::HashSet;

use colored::Colorize;
use tracing::debug;

impl Bootstrapper {
    /// Handles an `Ancestors` response. The first vertex is expected to be the requested one;
    /// every following vertex must be a parent of a vertex accepted from this batch before it.
    /// Only the valid prefix of the batch is processed.
    pub fn ancestors(
        &mut self,
        peer: &NodeId,
        request_id: u32,
        mut vtxs: Vec<Vec<u8>>,
    ) -> Result<()> {
        if vtxs.is_empty() {
            debug!("[{}] empty ancestors from {} ({})", "bootstrap".cyan(), peer, request_id);
            return self.get_ancestors_failed(peer, request_id);
        }
        let max_containers = self.config.ancestors_max_containers_received;
        if vtxs.len() > max_containers {
            debug!(
                "[{}] ignoring {} vertices from {} ({})",
                "bootstrap".cyan(),
                vtxs.len() - max_containers,
                peer,
                request_id
            );
            vtxs.truncate(max_containers);
        }

        let requested = self.outstanding.remove(peer, request_id);
        let vtx = match self.cx.parse_vtx(&vtxs[0]) {
            Ok(vtx) => vtx,
            Err(err) => {
                debug!("[{}] failed to parse vertex from {}: {}", "bootstrap".cyan(), peer, err);
                return match requested {
                    Some(requested_id) => self.fetch(vec![requested_id]),
                    None => Ok(()),
                };
            }
        };

        let vtx_id = vtx.id();
        match requested {
            Some(requested_id) if requested_id != vtx_id => {
                debug!(
                    "[{}] received {} from {} instead of {}",
                    "bootstrap".cyan(),
                    vtx_id,
                    peer,
                    requested_id
                );
                return self.fetch(vec![requested_id]);
            }
            None if !self.outstanding.contains(&vtx_id) && !self.need_to_fetch.contains(&vtx_id) => {
                debug!("[{}] received unneeded vertex {} from {}", "bootstrap".cyan(), vtx_id, peer);
                return Ok(());
            }
            _ => (),
        }

        // An unsolicited response leaves the request of that vertex outstanding, so that a
        // byzantine peer cannot displace a genuine response.
        let _ = self.need_to_fetch.remove(&vtx_id);

        let mut eligible: HashSet<_> = vtx.parent_ids().iter().cloned().collect();
        let mut to_process = vec![vtx];
        for bytes in vtxs.iter().skip(1) {
            let vtx = match self.cx.parse_vtx(bytes) {
                Ok(vtx) => vtx,
                Err(err) => {
                    debug!("[{}] failed to parse vertex from {}: {}", "bootstrap".cyan(), peer, err);
                    break;
                }
            };
            let vtx_id = vtx.id();
            if !eligible.remove(&vtx_id) {
                debug!(
                    "[{}] received vertex {} from {} which is not an ancestor",
                    "bootstrap".cyan(),
                    vtx_id,
                    peer
                );
                break;
            }
            eligible.extend(vtx.parent_ids().iter().cloned());
            let _ = self.need_to_fetch.remove(&vtx_id);
            to_process.push(vtx);
        }

        self.process(to_process)
    }
}
