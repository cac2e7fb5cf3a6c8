use crate::protocol::{GetAncestors, Request, Response};
use crate::storage::VertexStore;
use crate::vertex::Manager;

use actix::{Actor, Context, Handler};
use colored::Colorize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Answers the bootstrapping requests of other nodes from the local vertex store.
pub struct Router {
    store: Arc<VertexStore>,
    /// Bounds of a single `Ancestors` response.
    ancestors_max_containers_sent: usize,
    ancestors_max_bytes_sent: usize,
}

impl Router {
    pub fn new(
        store: Arc<VertexStore>,
        ancestors_max_containers_sent: usize,
        ancestors_max_bytes_sent: usize,
    ) -> Self {
        Router { store, ancestors_max_containers_sent, ancestors_max_bytes_sent }
    }

    fn accepted_frontier(&self) -> Response {
        match self.store.edge() {
            Ok(edge) => Response::AcceptedFrontier(edge),
            Err(err) => {
                warn!("[{}] failed to read the accepted frontier: {}", "router".magenta(), err);
                Response::Unknown
            }
        }
    }

    fn ancestors(&self, request: GetAncestors) -> Response {
        let result = self.store.get_ancestors(
            &request.vertex_id,
            self.ancestors_max_containers_sent,
            self.ancestors_max_bytes_sent,
        );
        match result {
            Ok(vertices) => Response::Ancestors(vertices),
            Err(err) => {
                warn!("[{}] failed to collect ancestors: {}", "router".magenta(), err);
                Response::Unknown
            }
        }
    }
}

impl Actor for Router {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("[{}] started", "router".magenta());
    }
}

impl Handler<Request> for Router {
    type Result = Response;

    fn handle(&mut self, msg: Request, _ctx: &mut Context<Self>) -> Self::Result {
        match msg {
            Request::Ping => Response::Pong,
            Request::GetAcceptedFrontier { chain_id } if chain_id == self.store.chain_id() => {
                debug!("routing GetAcceptedFrontier -> VertexStore");
                self.accepted_frontier()
            }
            Request::GetAncestors(request) if request.chain_id == self.store.chain_id() => {
                debug!("routing GetAncestors({}) -> VertexStore", request.vertex_id);
                self.ancestors(request)
            }
            _ => {
                debug!("received request for an unknown chain");
                Response::Unknown
            }
        }
    }
}
