use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::beacons::{Beacons, WeightedStartupTracker};
use crate::bootstrap::{Bootstrapper, Collaborators, Halt, OnFinished, Start};
use crate::client::{Client, ClientFrontier, ClientSender, InitBootstrapper};
use crate::id::{Id, NodeId};
use crate::queue::{JobContext, JobKind, Jobs};
use crate::server::{Router, Server, Settings};
use crate::storage::VertexStore;
use crate::util;
use crate::vm::{EngineState, Ledger, Vm};
use crate::{Error, Result};
use actix::{Actor, Arbiter};
use colored::Colorize;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Starts a node bootstrapping the chain named in `settings`, storing its state below
/// `home_dir`. Must be called from within a running actix system.
///
/// Cancelling the returned token halts the bootstrapper and stops the server. The token is also
/// cancelled when bootstrapping fails.
pub fn run(settings: Settings, home_dir: &Path) -> Result<CancellationToken> {
    let listener_ip: SocketAddr = settings
        .listener_ip
        .parse()
        .map_err(|_| Error::Config(format!("invalid listener ip: {}", settings.listener_ip)))?;
    let peers = settings
        .bootstrap_peers
        .iter()
        .map(|p| util::parse_id_and_ip(p))
        .collect::<Result<Vec<(NodeId, SocketAddr)>>>()?;
    let beacons = Beacons::from_peers(&peers);

    let node_id = Id::from_ip(&listener_ip);
    let chain_id = Id::new(settings.chain.as_bytes());
    info!("Node {} is starting, chain {} ({})", node_id, settings.chain, chain_id);

    let db_path = home_dir.join(Path::new(&hex::encode(node_id.as_bytes()))).join("dag.sled");
    let db = sled::open(db_path)?;
    let store = Arc::new(VertexStore::new(&db, chain_id)?);
    let ledger = Arc::new(Ledger::new(&db)?);
    let cx = JobContext::new(store.clone(), ledger.clone());

    // Create the 'client' actor
    let network = settings.network.clone();
    let client = Client::new(
        chain_id,
        beacons.clone(),
        Duration::from_millis(network.request_timeout_ms),
        Duration::from_millis(network.probe_interval_ms),
    );
    let client_addr = client.start();

    let on_finished: OnFinished = {
        let ledger = ledger.clone();
        Box::new(move |request_id: u32| {
            ledger.set_state(EngineState::NormalOp)?;
            info!("[{}] bootstrapped after request {}", "node".cyan(), request_id);
            Ok(())
        })
    };
    let startup_tracker =
        WeightedStartupTracker::new(beacons.clone(), settings.bootstrap.startup_percentage);
    let collaborators = Collaborators {
        cx: cx.clone(),
        vtx_blocked: Jobs::new(&db, JobKind::Vertex, cx.clone())?,
        tx_blocked: Jobs::new(&db, JobKind::Tx, cx)?,
        sender: Box::new(ClientSender::new(client_addr.clone())),
        frontier: Box::new(ClientFrontier::new(client_addr.clone())),
        beacons: Box::new(beacons),
        startup_tracker: Box::new(startup_tracker),
        vtx_acceptors: vec![],
        tx_acceptors: vec![],
        on_finished,
    };

    // Create the `bootstrapper` actor
    let bootstrapper = Bootstrapper::new(settings.bootstrap.clone(), collaborators)?;
    let shutdown = bootstrapper.halter();
    let bootstrapper_addr = Actor::start(bootstrapper);
    bootstrapper_addr.do_send(Start { request_id: 0 });
    client_addr.do_send(InitBootstrapper { addr: bootstrapper_addr.clone() });

    let halt_execution = {
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            bootstrapper_addr.do_send(Halt);
        }
    };
    actix::spawn(halt_execution);

    let listener_execution = {
        let shutdown = shutdown.clone();
        async move {
            // Setup the router
            let router = Router::new(
                store,
                network.ancestors_max_containers_sent,
                network.ancestors_max_bytes_sent,
            );
            let router_addr = router.start();
            // Setup the server
            let result = match Server::bind(listener_ip, router_addr).await {
                Ok(server) => server.listen(shutdown.clone()).await,
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                error!("[{}] server failed: {}", "node".red(), err);
                shutdown.cancel();
            }
        }
    };
    let arbiter = Arbiter::new();
    let _ = arbiter.spawn(listener_execution);

    Ok(shutdown)
}
