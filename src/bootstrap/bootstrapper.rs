use super::{Config, Error, Frontier, OutstandingRequests, ProcessedCache, Result, Sender};

use crate::beacons::{Sampler, StartupTracker};
use crate::choices::Status;
use crate::id::{NodeId, VertexId};
use crate::queue::{Acceptor, JobContext, Jobs};
use crate::vm::EngineState;

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Invoked once the DAG is bootstrapped, with the last request id used.
pub type OnFinished = Box<dyn FnMut(u32) -> Result<()>>;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for enough beacons to connect.
    AwaitingPeers,
    /// Fetching and traversing the DAG below the accepted frontier.
    Fetching,
    /// Executing the queued transaction and vertex jobs.
    Executing,
    /// Handing the linearized DAG over to the VM.
    Linearizing,
    Done,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub fetched_vertices: u64,
    pub fetched_txs: u64,
    pub accepted_vertices: u64,
    pub dropped_vertices: u64,
    pub accepted_txs: u64,
    pub dropped_txs: u64,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, MessageResponse)]
pub struct Health {
    pub phase: Phase,
    pub halted: bool,
    pub missing_ids: usize,
    pub outstanding_requests: usize,
    pub need_to_fetch: usize,
    pub pending_vertex_jobs: usize,
    pub pending_tx_jobs: usize,
    pub bootstrap_attempts: u32,
    pub metrics: Metrics,
}

/// Everything the bootstrapper talks to.
pub struct Collaborators {
    pub cx: JobContext,
    pub vtx_blocked: Jobs,
    pub tx_blocked: Jobs,
    pub sender: Box<dyn Sender>,
    pub frontier: Box<dyn Frontier>,
    pub beacons: Box<dyn Sampler>,
    pub startup_tracker: Box<dyn StartupTracker>,
    pub vtx_acceptors: Vec<Arc<dyn Acceptor>>,
    pub tx_acceptors: Vec<Arc<dyn Acceptor>>,
    pub on_finished: OnFinished,
}

/// The DAG bootstrapper of a single chain.
///
/// All events of a chain are handled one at a time (see the `Actor` implementation), so the
/// bootstrapper owns its fetch backlog, outstanding requests and processed cache without locking.
pub struct Bootstrapper {
    pub(super) config: Config,
    pub(super) cx: JobContext,
    pub(super) sender: Box<dyn Sender>,
    frontier: Box<dyn Frontier>,
    pub(super) beacons: Box<dyn Sampler>,
    startup_tracker: Box<dyn StartupTracker>,
    pub(super) vtx_blocked: Jobs,
    pub(super) tx_blocked: Jobs,
    vtx_acceptors: Vec<Arc<dyn Acceptor>>,
    tx_acceptors: Vec<Arc<dyn Acceptor>>,
    on_finished: OnFinished,
    halter: CancellationToken,

    pub(super) phase: Phase,
    started: bool,
    pub(super) restarted: bool,
    bootstrap_attempts: u32,
    pub(super) request_id: u32,
    /// Vertices to request once there is room for more outstanding requests.
    pub(super) need_to_fetch: HashSet<VertexId>,
    pub(super) outstanding: OutstandingRequests,
    pub(super) processed_cache: ProcessedCache,
    pub(super) metrics: Metrics,
}

impl Bootstrapper {
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let cache_size = NonZeroUsize::new(config.cache_size)
            .ok_or_else(|| Error::InvalidConfig("cache_size must be positive".to_owned()))?;
        let processed_cache =
            ProcessedCache::new(cache_size, config.stripe_distance, config.stripe_width);
        Ok(Bootstrapper {
            config,
            cx: collaborators.cx,
            sender: collaborators.sender,
            frontier: collaborators.frontier,
            beacons: collaborators.beacons,
            startup_tracker: collaborators.startup_tracker,
            vtx_blocked: collaborators.vtx_blocked,
            tx_blocked: collaborators.tx_blocked,
            vtx_acceptors: collaborators.vtx_acceptors,
            tx_acceptors: collaborators.tx_acceptors,
            on_finished: collaborators.on_finished,
            halter: CancellationToken::new(),
            phase: Phase::AwaitingPeers,
            started: false,
            restarted: false,
            bootstrap_attempts: 0,
            request_id: 0,
            need_to_fetch: HashSet::new(),
            outstanding: OutstandingRequests::new(),
            processed_cache,
            metrics: Metrics::default(),
        })
    }

    /// Starts bootstrapping, issuing request ids after `start_request_id`.
    pub fn start_bootstrap(&mut self, start_request_id: u32) -> Result<()> {
        info!("[{}] starting bootstrap", "bootstrap".cyan());
        self.cx.vm.set_state(EngineState::Bootstrapping)?;
        self.request_id = start_request_id;

        // A linearized DAG only has to execute what is left in the queues.
        if self.cx.manager.stop_vertex_accepted()? {
            self.started = true;
            let edge = self.cx.manager.edge()?;
            return self.force_accepted(edge);
        }

        if self.config.linearize_on_startup {
            let edge = self.cx.manager.edge()?;
            let stop_vertex = self.cx.manager.build_stop_vtx(edge)?;
            self.cx.manager.accept_vtx(&stop_vertex.id())?;
            info!("[{}] accepted stop vertex {}", "bootstrap".cyan(), stop_vertex.id());
            self.started = true;
            return self.force_accepted(vec![stop_vertex.id()]);
        }

        if !self.startup_tracker.should_start() {
            debug!("[{}] waiting for beacons to connect", "bootstrap".cyan());
            return Ok(());
        }
        self.started = true;
        self.startup()
    }

    pub fn connected(&mut self, node_id: &NodeId) -> Result<()> {
        self.cx.vm.connected(node_id)?;
        self.startup_tracker.connected(node_id);
        if self.started || !self.startup_tracker.should_start() {
            return Ok(());
        }
        self.started = true;
        self.startup()
    }

    pub fn disconnected(&mut self, node_id: &NodeId) -> Result<()> {
        self.cx.vm.disconnected(node_id)?;
        self.startup_tracker.disconnected(node_id);
        Ok(())
    }

    /// Asks the beacons for the accepted frontier to bootstrap towards.
    pub fn startup(&mut self) -> Result<()> {
        self.bootstrap_attempts += 1;
        if self.beacons.is_empty() {
            return Err(Error::NoBeacons);
        }
        self.phase = Phase::Fetching;
        debug!(
            "[{}] requesting accepted frontier (attempt {})",
            "bootstrap".cyan(),
            self.bootstrap_attempts
        );
        self.frontier.request_frontier();
        Ok(())
    }

    /// Starts another bootstrap attempt. A reset marks the bootstrapper as restarted, which
    /// lowers the level of its progress reports.
    pub fn restart(&mut self, reset: bool) -> Result<()> {
        if reset {
            debug!("[{}] checking for new frontiers", "bootstrap".cyan());
            self.restarted = true;
            self.bootstrap_attempts = 0;
        }
        if self.bootstrap_attempts > 0
            && self.bootstrap_attempts % self.config.retry_bootstrap_warn_frequency == 0
        {
            warn!(
                "[{}] continuing to attempt to bootstrap after {} attempts",
                "bootstrap".yellow(),
                self.bootstrap_attempts
            );
        }
        self.startup()
    }

    /// Bootstraps towards `accepted_ids`, resuming from the missing vertices of earlier attempts.
    pub fn force_accepted(&mut self, accepted_ids: Vec<VertexId>) -> Result<()> {
        if self.phase == Phase::Done {
            debug!("[{}] ignoring accepted frontier, already bootstrapped", "bootstrap".cyan());
            return Ok(());
        }
        let mut pending = self.vtx_blocked.missing_ids();
        debug!(
            "[{}] bootstrapping {} missing and {} accepted vertices",
            "bootstrap".cyan(),
            pending.len(),
            accepted_ids.len()
        );
        pending.extend(accepted_ids);
        self.phase = Phase::Fetching;

        let mut to_process = vec![];
        for vtx_id in pending {
            match self.cx.manager.get_vtx(&vtx_id)? {
                Some(vtx) if vtx.status() == Status::Accepted => {
                    self.vtx_blocked.remove_missing_id(&vtx_id)
                }
                Some(vtx) => to_process.push(vtx),
                None => {
                    self.vtx_blocked.add_missing_id(vtx_id);
                    let _ = self.need_to_fetch.insert(vtx_id);
                }
            }
        }
        self.process(to_process)
    }

    /// Executes the queued jobs and hands over to the VM once nothing is missing any more.
    pub fn check_finish(&mut self) -> Result<()> {
        if self.phase == Phase::Done || self.vtx_blocked.num_missing_ids() > 0 {
            return Ok(());
        }
        self.phase = Phase::Executing;

        self.report("executing transactions");
        let tx_stats =
            self.tx_blocked.execute_all(&self.halter, self.restarted, &self.tx_acceptors)?;
        self.metrics.accepted_txs += tx_stats.accepted as u64;
        self.metrics.dropped_txs += tx_stats.dropped as u64;
        if self.halted() {
            return Ok(());
        }

        self.report("executing vertices");
        let vtx_stats =
            self.vtx_blocked.execute_all(&self.halter, self.restarted, &self.vtx_acceptors)?;
        self.metrics.accepted_vertices += vtx_stats.accepted as u64;
        self.metrics.dropped_vertices += vtx_stats.dropped as u64;
        if self.halted() {
            return Ok(());
        }

        if !self.cx.manager.stop_vertex_accepted()? {
            debug!("[{}] checking for stop vertex before finishing", "bootstrap".cyan());
            return self.restart(true);
        }

        // Once the stop vertex is accepted it is the only vertex of the frontier.
        self.phase = Phase::Linearizing;
        let edge = self.cx.manager.edge()?;
        let stop_vertex_id = *edge.first().ok_or(Error::EmptyEdge)?;
        self.cx.vm.linearize(stop_vertex_id)?;

        self.processed_cache.flush();
        self.phase = Phase::Done;
        info!(
            "[{}] bootstrapped {} vertices and {} transactions",
            "bootstrap".cyan(),
            self.metrics.accepted_vertices,
            self.metrics.accepted_txs
        );
        (self.on_finished)(self.request_id)
    }

    /// Drops every queued job, e.g. when the chain is reset.
    pub fn clear(&mut self) -> Result<()> {
        self.vtx_blocked.clear()?;
        self.tx_blocked.clear()?;
        Ok(())
    }

    pub fn halt(&mut self) {
        self.halter.cancel();
    }

    pub fn halted(&self) -> bool {
        self.halter.is_cancelled()
    }

    /// A token which halts the bootstrapper when cancelled.
    pub fn halter(&self) -> CancellationToken {
        self.halter.clone()
    }

    pub fn shutdown(&mut self) {
        info!("[{}] shutting down bootstrapper", "bootstrap".cyan());
        self.halt();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn health(&self) -> Health {
        Health {
            phase: self.phase,
            halted: self.halted(),
            missing_ids: self.vtx_blocked.num_missing_ids(),
            outstanding_requests: self.outstanding.len(),
            need_to_fetch: self.need_to_fetch.len(),
            pending_vertex_jobs: self.vtx_blocked.pending_jobs(),
            pending_tx_jobs: self.tx_blocked.pending_jobs(),
            bootstrap_attempts: self.bootstrap_attempts,
            metrics: self.metrics,
        }
    }

    /// Logs a progress report, at `debug` level once the bootstrapper has restarted.
    pub(super) fn report(&self, msg: &str) {
        if self.restarted {
            debug!("[{}] {}", "bootstrap".cyan(), msg);
        } else {
            info!("[{}] {}", "bootstrap".cyan(), msg);
        }
    }
}
