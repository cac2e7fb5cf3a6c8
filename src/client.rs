//! The network side of the bootstrapper.
//!
//! The [Client] actor sends the bootstrapper's requests to its beacons and delivers the
//! responses back as bootstrapper events. It also probes the beacons periodically, reporting
//! beacons which start or stop answering as `Connected` and `Disconnected` events.

use crate::beacons::Beacons;
use crate::bootstrap::{
    self, Ancestors, Bootstrapper, Connected, Disconnected, ForceAccepted, GetAncestorsFailed,
};
use crate::channel::Channel;
use crate::id::{Id, NodeId, VertexId};
use crate::protocol::{GetAncestors, Request, Response};
use crate::{Error, Result};

use actix::{Actor, Addr, AsyncContext, Context, Handler, ResponseFuture};
use colored::Colorize;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

pub struct Client {
    chain_id: Id,
    beacons: Beacons,
    /// How long to wait for a peer to answer a request.
    request_timeout: Duration,
    /// How often the beacons are probed for liveness.
    probe_interval: Duration,
    bootstrapper: Option<Addr<Bootstrapper>>,
    connected: HashSet<NodeId>,
}

impl Client {
    pub fn new(
        chain_id: Id,
        beacons: Beacons,
        request_timeout: Duration,
        probe_interval: Duration,
    ) -> Client {
        Client {
            chain_id,
            beacons,
            request_timeout,
            probe_interval,
            bootstrapper: None,
            connected: HashSet::new(),
        }
    }

    fn peers(&self) -> Vec<(NodeId, SocketAddr)> {
        self.beacons
            .ids()
            .into_iter()
            .filter_map(|id| self.beacons.get(&id).map(|beacon| (id, beacon.ip)))
            .collect()
    }
}

impl Actor for Client {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        debug!("[{}] started client", "client".blue());
        ctx.notify(Probe);
        let _ = ctx.run_interval(self.probe_interval, |_, ctx| ctx.notify(Probe));
    }
}

/// Registers the bootstrapper which receives the responses of the client.
#[derive(Message)]
#[rtype(result = "()")]
pub struct InitBootstrapper {
    pub addr: Addr<Bootstrapper>,
}

impl Handler<InitBootstrapper> for Client {
    type Result = ();

    fn handle(&mut self, msg: InitBootstrapper, _ctx: &mut Context<Self>) -> Self::Result {
        self.bootstrapper = Some(msg.addr);
    }
}

/// Requests a vertex and its ancestors from a peer.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct SendGetAncestors {
    pub peer: NodeId,
    pub request_id: u32,
    pub vertex_id: VertexId,
}

impl Handler<SendGetAncestors> for Client {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, msg: SendGetAncestors, _ctx: &mut Context<Self>) -> Self::Result {
        let bootstrapper = self.bootstrapper.clone();
        let ip = self.beacons.get(&msg.peer).map(|beacon| beacon.ip);
        let request =
            Request::GetAncestors(GetAncestors { chain_id: self.chain_id, vertex_id: msg.vertex_id });
        let delta = self.request_timeout;
        Box::pin(async move {
            let bootstrapper = match bootstrapper {
                Some(bootstrapper) => bootstrapper,
                None => {
                    warn!("[{}] no bootstrapper to deliver ancestors to", "client".blue());
                    return;
                }
            };
            let result = match ip {
                Some(ip) => oneshot(ip, request, delta).await,
                None => Err(Error::UnknownPeer(msg.peer)),
            };
            match result {
                Ok(Some(Response::Ancestors(vertices))) => bootstrapper.do_send(Ancestors {
                    peer: msg.peer,
                    request_id: msg.request_id,
                    vertices,
                }),
                Ok(response) => {
                    let peer = msg.peer;
                    debug!("[{}] unexpected response from {}: {:?}", "client".blue(), peer, response);
                    bootstrapper
                        .do_send(GetAncestorsFailed { peer: msg.peer, request_id: msg.request_id })
                }
                Err(err) => {
                    debug!("[{}] get ancestors from {} failed: {}", "client".blue(), msg.peer, err);
                    bootstrapper
                        .do_send(GetAncestorsFailed { peer: msg.peer, request_id: msg.request_id })
                }
            }
        })
    }
}

/// Asks every beacon for its accepted frontier and forces the vertices accepted by a majority
/// of the beacon weight onto the bootstrapper.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct QueryAcceptedFrontier;

impl Handler<QueryAcceptedFrontier> for Client {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, _msg: QueryAcceptedFrontier, _ctx: &mut Context<Self>) -> Self::Result {
        let bootstrapper = self.bootstrapper.clone();
        let beacons = self.beacons.clone();
        let peers = self.peers();
        let request = Request::GetAcceptedFrontier { chain_id: self.chain_id };
        let delta = self.request_timeout;
        Box::pin(async move {
            let responses = fanout(peers, request, delta).await;
            if responses.is_empty() {
                warn!("[{}] no beacon reported its accepted frontier", "client".yellow());
                // back off before the bootstrapper asks again
                tokio::time::sleep(delta).await;
            }
            let vertex_ids = accepted_by_majority(&beacons, responses);
            info!("[{}] accepted frontier has {} vertices", "client".blue(), vertex_ids.len());
            if let Some(bootstrapper) = bootstrapper {
                bootstrapper.do_send(ForceAccepted { vertex_ids });
            }
        })
    }
}

/// Pings every beacon.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Probe;

impl Handler<Probe> for Client {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, _msg: Probe, ctx: &mut Context<Self>) -> Self::Result {
        let client = ctx.address();
        let peers = self.peers();
        let delta = self.request_timeout;
        Box::pin(async move {
            let ids: Vec<NodeId> = peers.iter().map(|(id, _)| *id).collect();
            let alive: HashSet<NodeId> = fanout(peers, Request::Ping, delta)
                .await
                .into_iter()
                .filter(|(_, response)| *response == Response::Pong)
                .map(|(id, _)| id)
                .collect();
            for peer in ids {
                client.do_send(ProbeResult { peer, alive: alive.contains(&peer) });
            }
        })
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct ProbeResult {
    pub peer: NodeId,
    pub alive: bool,
}

impl Handler<ProbeResult> for Client {
    type Result = ();

    fn handle(&mut self, msg: ProbeResult, _ctx: &mut Context<Self>) -> Self::Result {
        let bootstrapper = match &self.bootstrapper {
            Some(bootstrapper) => bootstrapper,
            None => return,
        };
        if msg.alive {
            if self.connected.insert(msg.peer) {
                debug!("[{}] {} connected", "client".blue(), msg.peer);
                bootstrapper.do_send(Connected { peer: msg.peer });
            }
        } else if self.connected.remove(&msg.peer) {
            debug!("[{}] {} disconnected", "client".blue(), msg.peer);
            bootstrapper.do_send(Disconnected { peer: msg.peer });
        }
    }
}

/// Routes the bootstrapper's `GetAncestors` requests through the client.
pub struct ClientSender {
    client: Addr<Client>,
}

impl ClientSender {
    pub fn new(client: Addr<Client>) -> Self {
        ClientSender { client }
    }
}

impl bootstrap::Sender for ClientSender {
    fn send_get_ancestors(&mut self, peer: NodeId, request_id: u32, vertex_id: VertexId) {
        self.client.do_send(SendGetAncestors { peer, request_id, vertex_id });
    }
}

/// Routes the bootstrapper's frontier queries through the client.
pub struct ClientFrontier {
    client: Addr<Client>,
}

impl ClientFrontier {
    pub fn new(client: Addr<Client>) -> Self {
        ClientFrontier { client }
    }
}

impl bootstrap::Frontier for ClientFrontier {
    fn request_frontier(&mut self) {
        self.client.do_send(QueryAcceptedFrontier);
    }
}

/// The vertices reported by beacons holding more than half of the total beacon weight.
pub fn accepted_by_majority(beacons: &Beacons, responses: Vec<(NodeId, Response)>) -> Vec<VertexId> {
    let total_weight = beacons.total_weight();
    let mut weights: HashMap<VertexId, u64> = HashMap::new();
    for (peer, response) in responses {
        if let Response::AcceptedFrontier(vertex_ids) = response {
            let weight = beacons.weight(&peer);
            let vertex_ids: HashSet<VertexId> = vertex_ids.into_iter().collect();
            for vertex_id in vertex_ids {
                *weights.entry(vertex_id).or_insert(0) += weight;
            }
        }
    }
    let mut accepted: Vec<VertexId> = weights
        .into_iter()
        .filter(|(_, weight)| 2 * weight > total_weight)
        .map(|(vertex_id, _)| vertex_id)
        .collect();
    accepted.sort();
    accepted
}

async fn exchange(ip: SocketAddr, request: Request) -> Result<Option<Response>> {
    let channel: Channel<Request, Response> = Channel::connect(&ip).await?;
    let (mut sender, mut receiver) = channel.split();
    let () = sender.send(request).await?;
    // the connection is closed once the sender and receiver are dropped
    let response = receiver.recv().await?;
    Ok(response)
}

/// Sends a single request and waits at most `delta` for the response.
pub async fn oneshot(ip: SocketAddr, request: Request, delta: Duration) -> Result<Option<Response>> {
    match timeout(delta, exchange(ip, request)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout),
    }
}

/// Sends a request to every peer and collects the responses of those which answered in time.
pub async fn fanout(
    peers: Vec<(NodeId, SocketAddr)>,
    request: Request,
    delta: Duration,
) -> Vec<(NodeId, Response)> {
    let mut client_futs = vec![];
    for (id, ip) in peers.into_iter() {
        let request = request.clone();
        let client_fut = tokio::spawn(async move {
            match oneshot(ip, request, delta).await {
                Ok(Some(response)) => Some((id, response)),
                Ok(None) => None,
                Err(err) => {
                    debug!("[{}] {} did not answer: {}", "client".blue(), id, err);
                    None
                }
            }
        });
        client_futs.push(client_fut)
    }
    let mut responses = vec![];
    for result in futures::future::join_all(client_futs).await {
        match result {
            Ok(Some(response)) => responses.push(response),
            Ok(None) => (),
            Err(_) => error!("error: joining client futures"),
        }
    }
    responses
}
