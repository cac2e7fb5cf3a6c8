use super::{Bootstrapper, Health, Result};

use crate::id::{NodeId, VertexId};

use actix::{Actor, ActorContext, Context, Handler};
use colored::Colorize;
use tracing::{debug, error};

impl Actor for Bootstrapper {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("[{}] started", "bootstrap".cyan());
    }

    fn stopped(&mut self, _ctx: &mut Context<Self>) {
        self.shutdown();
    }
}

impl Bootstrapper {
    /// Errors which reach the actor are fatal: the bootstrapper is halted and stopped, leaving
    /// the persisted queues to be resumed by the next run.
    fn on_result(&mut self, result: Result<()>, ctx: &mut Context<Self>) {
        if let Err(err) = result {
            error!("[{}] bootstrapping failed: {}", "bootstrap".red(), err);
            self.halt();
            ctx.stop();
        }
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Start {
    pub request_id: u32,
}

impl Handler<Start> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, msg: Start, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.start_bootstrap(msg.request_id);
        self.on_result(result, ctx);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Ancestors {
    pub peer: NodeId,
    pub request_id: u32,
    pub vertices: Vec<Vec<u8>>,
}

impl Handler<Ancestors> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, msg: Ancestors, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.ancestors(&msg.peer, msg.request_id, msg.vertices);
        self.on_result(result, ctx);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct GetAncestorsFailed {
    pub peer: NodeId,
    pub request_id: u32,
}

impl Handler<GetAncestorsFailed> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, msg: GetAncestorsFailed, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.get_ancestors_failed(&msg.peer, msg.request_id);
        self.on_result(result, ctx);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Connected {
    pub peer: NodeId,
}

impl Handler<Connected> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, msg: Connected, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.connected(&msg.peer);
        self.on_result(result, ctx);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Disconnected {
    pub peer: NodeId,
}

impl Handler<Disconnected> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, msg: Disconnected, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.disconnected(&msg.peer);
        self.on_result(result, ctx);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct ForceAccepted {
    pub vertex_ids: Vec<VertexId>,
}

impl Handler<ForceAccepted> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, msg: ForceAccepted, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.force_accepted(msg.vertex_ids);
        self.on_result(result, ctx);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "Result<()>")]
pub struct Clear;

impl Handler<Clear> for Bootstrapper {
    type Result = Result<()>;

    fn handle(&mut self, _msg: Clear, _ctx: &mut Context<Self>) -> Self::Result {
        self.clear()
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Halt;

impl Handler<Halt> for Bootstrapper {
    type Result = ();

    fn handle(&mut self, _msg: Halt, ctx: &mut Context<Self>) -> Self::Result {
        self.halt();
        ctx.stop();
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "Health")]
pub struct GetHealth;

impl Handler<GetHealth> for Bootstrapper {
    type Result = Health;

    fn handle(&mut self, _msg: GetHealth, _ctx: &mut Context<Self>) -> Self::Result {
        self.health()
    }
}
