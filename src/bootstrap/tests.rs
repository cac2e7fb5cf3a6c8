use super::*;

use crate::beacons::{Beacons, WeightedStartupTracker};
use crate::choices::Status;
use crate::id::{Id, NodeId, TxId};
use crate::queue::{JobContext, JobKind, Jobs};
use crate::storage::{self, VertexStore};
use crate::vertex::{Manager, StatelessVertex, Vertex};
use crate::vm::{Ledger, UnsignedTx, Vm};

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use actix::Actor;

type Request = (NodeId, u32, VertexId);

struct RecordingSender {
    requests: Rc<RefCell<VecDeque<Request>>>,
}

impl Sender for RecordingSender {
    fn send_get_ancestors(&mut self, peer: NodeId, request_id: u32, vtx_id: VertexId) {
        self.requests.borrow_mut().push_back((peer, request_id, vtx_id));
    }
}

struct RecordingFrontier {
    requests: Rc<RefCell<usize>>,
}

impl Frontier for RecordingFrontier {
    fn request_frontier(&mut self) {
        *self.requests.borrow_mut() += 1;
    }
}

struct Harness {
    store: Arc<VertexStore>,
    ledger: Arc<Ledger>,
    requests: Rc<RefCell<VecDeque<Request>>>,
    frontier_requests: Rc<RefCell<usize>>,
    finished: Rc<RefCell<Option<u32>>>,
}

impl Harness {
    fn next_request(&self) -> Option<Request> {
        self.requests.borrow_mut().pop_front()
    }

    fn last_request(&self) -> Option<Request> {
        self.requests.borrow().back().cloned()
    }

    fn num_requests(&self) -> usize {
        self.requests.borrow().len()
    }

    fn frontier_requests(&self) -> usize {
        *self.frontier_requests.borrow()
    }

    fn finished(&self) -> Option<u32> {
        *self.finished.borrow()
    }
}

fn peer() -> NodeId {
    Id::one()
}

fn test_config() -> Config {
    Config { startup_percentage: 0, ..Config::default() }
}

/// Counts the loads of every vertex.
struct CountingManager {
    store: Arc<VertexStore>,
    loads: Mutex<HashMap<VertexId, usize>>,
}

impl CountingManager {
    fn loads(&self, vtx_id: &VertexId) -> usize {
        self.loads.lock().unwrap().get(vtx_id).cloned().unwrap_or(0)
    }
}

impl Manager for CountingManager {
    fn parse_vtx(&self, bytes: &[u8]) -> storage::Result<Vertex> {
        self.store.parse_vtx(bytes)
    }

    fn get_vtx(&self, vtx_id: &VertexId) -> storage::Result<Option<Vertex>> {
        *self.loads.lock().unwrap().entry(*vtx_id).or_insert(0) += 1;
        self.store.get_vtx(vtx_id)
    }

    fn edge(&self) -> storage::Result<Vec<VertexId>> {
        self.store.edge()
    }

    fn build_stop_vtx(&self, parent_ids: Vec<VertexId>) -> storage::Result<Vertex> {
        self.store.build_stop_vtx(parent_ids)
    }

    fn stop_vertex_accepted(&self) -> storage::Result<bool> {
        self.store.stop_vertex_accepted()
    }

    fn accept_vtx(&self, vtx_id: &VertexId) -> storage::Result<()> {
        self.store.accept_vtx(vtx_id)
    }
}

fn make_bootstrapper(
    db: &sled::Db,
    config: Config,
    peers: Vec<NodeId>,
) -> (Bootstrapper, Harness) {
    let store = Arc::new(VertexStore::new(db, Id::zero()).unwrap());
    make_bootstrapper_with(db, config, peers, store.clone(), store)
}

fn make_counting_bootstrapper(
    db: &sled::Db,
    config: Config,
) -> (Bootstrapper, Harness, Arc<CountingManager>) {
    let store = Arc::new(VertexStore::new(db, Id::zero()).unwrap());
    let manager =
        Arc::new(CountingManager { store: store.clone(), loads: Mutex::new(HashMap::new()) });
    let (bs, harness) = make_bootstrapper_with(db, config, vec![peer()], store, manager.clone());
    (bs, harness, manager)
}

fn make_bootstrapper_with(
    db: &sled::Db,
    config: Config,
    peers: Vec<NodeId>,
    store: Arc<VertexStore>,
    manager: Arc<dyn Manager>,
) -> (Bootstrapper, Harness) {
    let ledger = Arc::new(Ledger::new(db).unwrap());
    let cx = JobContext::new(manager, ledger.clone());

    let ip: SocketAddr = "127.0.0.1:1234".parse().unwrap();
    let mut beacons = Beacons::new();
    for id in peers {
        beacons.insert(id, ip, 1);
    }
    let startup_tracker = WeightedStartupTracker::new(beacons.clone(), config.startup_percentage);

    let requests = Rc::new(RefCell::new(VecDeque::new()));
    let frontier_requests = Rc::new(RefCell::new(0));
    let finished = Rc::new(RefCell::new(None));
    let on_finished: OnFinished = {
        let finished = finished.clone();
        Box::new(move |request_id: u32| {
            *finished.borrow_mut() = Some(request_id);
            Ok(())
        })
    };

    let collaborators = Collaborators {
        cx: cx.clone(),
        vtx_blocked: Jobs::new(db, JobKind::Vertex, cx.clone()).unwrap(),
        tx_blocked: Jobs::new(db, JobKind::Tx, cx).unwrap(),
        sender: Box::new(RecordingSender { requests: requests.clone() }),
        frontier: Box::new(RecordingFrontier { requests: frontier_requests.clone() }),
        beacons: Box::new(beacons),
        startup_tracker: Box::new(startup_tracker),
        vtx_acceptors: vec![],
        tx_acceptors: vec![],
        on_finished,
    };
    let bootstrapper = Bootstrapper::new(config, collaborators).unwrap();
    (bootstrapper, Harness { store, ledger, requests, frontier_requests, finished })
}

fn temporary_db() -> sled::Db {
    sled::Config::new().temporary(true).open().unwrap()
}

fn encode_tx(inputs: Vec<TxId>, memo: &[u8]) -> Vec<u8> {
    UnsignedTx::new(inputs, memo.to_vec()).encode().unwrap()
}

fn encode_vtx(height: u64, parents: Vec<VertexId>, txs: Vec<Vec<u8>>) -> Vec<u8> {
    StatelessVertex::new(Id::zero(), height, parents, txs).encode().unwrap()
}

/// Builds `levels` levels of `width` accepted vertices in `remote`. Every vertex references all
/// vertices of the level below and carries one transaction spending the transaction of the
/// vertex below it.
fn build_dag(remote: &VertexStore, levels: u64, width: u8) -> Vec<Vertex> {
    let mut vertices = vec![];
    let mut parents: Vec<VertexId> = vec![];
    let mut inputs: Vec<Vec<TxId>> = vec![vec![]; width as usize];
    for height in 0..levels {
        let mut level = vec![];
        for i in 0..width {
            let tx = encode_tx(inputs[i as usize].clone(), &[height as u8, i]);
            inputs[i as usize] = vec![Id::new(&tx)];
            let bytes = encode_vtx(height, parents.clone(), vec![tx]);
            level.push(remote.insert_vtx(&bytes, Status::Accepted).unwrap());
        }
        parents = level.iter().map(|vtx| vtx.id()).collect();
        vertices.extend(level);
    }
    vertices
}

/// Accepts a stop vertex on top of the frontier of `remote`.
fn linearize(remote: &VertexStore) -> Vertex {
    let stop = remote.build_stop_vtx(remote.edge().unwrap()).unwrap();
    remote.accept_vtx(&stop.id()).unwrap();
    remote.get_vtx(&stop.id()).unwrap().unwrap()
}

/// Answers every pending request from `remote`, with at most `max_containers` per response.
fn serve(bs: &mut Bootstrapper, harness: &Harness, remote: &VertexStore, max_containers: usize) {
    while let Some((peer, request_id, vtx_id)) = harness.next_request() {
        let vtxs = remote.get_ancestors(&vtx_id, max_containers, usize::MAX).unwrap();
        bs.ancestors(&peer, request_id, vtxs).unwrap();
    }
}

#[actix_rt::test]
async fn test_empty_ancestors_refetches() {
    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.start_bootstrap(6).unwrap();
    assert_eq!(harness.frontier_requests(), 1);

    let x = Id::new(b"x");
    bs.force_accepted(vec![x]).unwrap();
    assert_eq!(harness.next_request(), Some((peer(), 7, x)));

    bs.ancestors(&peer(), 7, vec![]).unwrap();
    assert_eq!(harness.next_request(), Some((peer(), 8, x)));
    assert_eq!(harness.next_request(), None);
    assert_eq!(bs.outstanding.len(), 1);
}

#[actix_rt::test]
async fn test_truncates_ancestors() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let chain = build_dag(&remote, 5, 1);
    let tip = chain[4].id();

    let db = temporary_db();
    let config = Config { ancestors_max_containers_received: 2, ..test_config() };
    let (mut bs, harness) = make_bootstrapper(&db, config, vec![peer()]);
    bs.force_accepted(vec![tip]).unwrap();
    let (peer, request_id, vtx_id) = harness.next_request().unwrap();
    assert_eq!(vtx_id, tip);

    let vtxs = remote.get_ancestors(&tip, 100, usize::MAX).unwrap();
    assert_eq!(vtxs.len(), 5);
    bs.ancestors(&peer, request_id, vtxs).unwrap();

    assert_eq!(bs.vtx_blocked.pending_jobs(), 2);
    assert!(harness.store.get_vtx(&chain[3].id()).unwrap().is_some());
    assert_eq!(harness.store.get_vtx(&chain[2].id()).unwrap(), None);
    assert_eq!(harness.last_request().map(|(_, _, id)| id), Some(chain[2].id()));
}

#[actix_rt::test]
async fn test_enforces_parent_chain() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let chain = build_dag(&remote, 3, 1);
    let unrelated = remote.insert_vtx(&encode_vtx(0, vec![], vec![vec![42]]), Status::Accepted);
    let unrelated = unrelated.unwrap();

    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.force_accepted(vec![chain[2].id()]).unwrap();
    let (peer, request_id, _) = harness.next_request().unwrap();

    let batch = vec![
        chain[2].bytes().to_vec(),
        unrelated.bytes().to_vec(),
        chain[1].bytes().to_vec(),
    ];
    bs.ancestors(&peer, request_id, batch).unwrap();

    assert_eq!(bs.vtx_blocked.pending_jobs(), 1);
    assert_eq!(harness.store.get_vtx(&chain[1].id()).unwrap(), None);
    assert_eq!(harness.next_request().map(|(_, _, id)| id), Some(chain[1].id()));
}

#[actix_rt::test]
async fn test_fetch_budget() {
    let db = temporary_db();
    let config = Config { max_outstanding_get_ancestors_requests: 3, ..test_config() };
    let (mut bs, harness) = make_bootstrapper(&db, config, vec![peer()]);

    let ids: Vec<VertexId> = (0..5u8).map(|i| Id::new(&[i])).collect();
    bs.force_accepted(ids).unwrap();
    assert_eq!(harness.num_requests(), 3);
    assert_eq!(bs.outstanding.len(), 3);
    assert_eq!(bs.need_to_fetch.len(), 2);
    assert_eq!(bs.health().missing_ids, 5);

    // a failed request is retried without exceeding the budget
    let (peer, request_id, _) = harness.next_request().unwrap();
    bs.get_ancestors_failed(&peer, request_id).unwrap();
    assert_eq!(bs.outstanding.len(), 3);
    assert_eq!(harness.num_requests(), 3);
}

#[actix_rt::test]
async fn test_failed_unknown_request_is_ignored() {
    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.get_ancestors_failed(&peer(), 3).unwrap();
    assert_eq!(harness.num_requests(), 0);
}

#[actix_rt::test]
async fn test_mismatched_response_refetches() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let chain = build_dag(&remote, 3, 1);

    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.force_accepted(vec![chain[2].id()]).unwrap();
    let (peer, request_id, _) = harness.next_request().unwrap();

    bs.ancestors(&peer, request_id, vec![chain[1].bytes().to_vec()]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 0);
    assert_eq!(harness.last_request().map(|(_, _, id)| id), Some(chain[2].id()));

    // garbage answering a request is refetched as well
    let (peer, request_id, _) = harness.next_request().unwrap();
    bs.ancestors(&peer, request_id, vec![vec![0xff]]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 0);
    assert_eq!(harness.next_request().map(|(_, _, id)| id), Some(chain[2].id()));
}

#[actix_rt::test]
async fn test_unsolicited_ancestors() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let a = remote.insert_vtx(&encode_vtx(0, vec![], vec![encode_tx(vec![], b"a")]), Status::Accepted);
    let b = remote.insert_vtx(&encode_vtx(0, vec![], vec![encode_tx(vec![], b"b")]), Status::Accepted);
    let c = remote.insert_vtx(&encode_vtx(0, vec![], vec![encode_tx(vec![], b"c")]), Status::Accepted);
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    let db = temporary_db();
    let config = Config { max_outstanding_get_ancestors_requests: 1, ..test_config() };
    let (mut bs, harness) = make_bootstrapper(&db, config, vec![peer()]);
    bs.force_accepted(vec![a.id(), b.id()]).unwrap();
    let (_, _, requested) = harness.next_request().unwrap();
    let backlog = if requested == a.id() { b.clone() } else { a.clone() };
    assert!(bs.need_to_fetch.contains(&backlog.id()));

    // not needed at all
    bs.ancestors(&Id::two(), 99, vec![c.bytes().to_vec()]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 0);

    // needed, but leaves the genuine request outstanding
    bs.ancestors(&Id::two(), 100, vec![backlog.bytes().to_vec()]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 1);
    assert!(bs.outstanding.contains(&requested));
    assert!(!bs.need_to_fetch.contains(&backlog.id()));
}

#[actix_rt::test]
async fn test_undecodable_txs_refetch() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let bad = remote.insert_vtx(&encode_vtx(0, vec![], vec![vec![2]]), Status::Accepted).unwrap();
    let child = encode_vtx(1, vec![bad.id()], vec![encode_tx(vec![], b"child")]);
    let child = remote.insert_vtx(&child, Status::Accepted).unwrap();

    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);

    // as the requested vertex
    bs.force_accepted(vec![bad.id()]).unwrap();
    let (peer, request_id, _) = harness.next_request().unwrap();
    bs.ancestors(&peer, request_id, vec![bad.bytes().to_vec()]).unwrap();
    assert_eq!(harness.store.get_vtx(&bad.id()).unwrap(), None);
    assert_eq!(bs.vtx_blocked.pending_jobs(), 0);
    assert_eq!(harness.next_request(), Some((peer, request_id + 1, bad.id())));

    // as an ancestor, only the valid prefix is kept
    bs.force_accepted(vec![child.id()]).unwrap();
    let (peer, request_id, vtx_id) = harness.last_request().unwrap();
    assert_eq!(vtx_id, child.id());
    let batch = vec![child.bytes().to_vec(), bad.bytes().to_vec()];
    bs.ancestors(&peer, request_id, batch).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 1);
    assert_eq!(harness.store.get_vtx(&bad.id()).unwrap(), None);
    assert!(bs.need_to_fetch.contains(&bad.id()) || bs.outstanding.contains(&bad.id()));
    assert_eq!(bs.health().missing_ids, 1);
}

#[actix_rt::test]
async fn test_traversal_skips_processed_stripe() {
    let db = temporary_db();
    // heights 0 and 2 are on the stripe
    let config = Config { stripe_distance: 2, stripe_width: 1, ..test_config() };
    let (mut bs, harness, manager) = make_counting_bootstrapper(&db, config);

    let mut chain: Vec<Vertex> = vec![];
    for height in 0..4u64 {
        let parents = chain.last().map(|vtx| vec![vtx.id()]).unwrap_or_default();
        let bytes = encode_vtx(height, parents, vec![encode_tx(vec![], &[height as u8])]);
        chain.push(harness.store.parse_vtx(&bytes).unwrap());
    }
    // keeps the queues from being executed
    bs.vtx_blocked.add_missing_id(Id::new(b"x"));

    bs.process(vec![chain[3].clone()]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 4);
    assert!(bs.processed_cache.contains(&chain[2].id()));
    assert!(bs.processed_cache.contains(&chain[0].id()));
    assert!(!bs.processed_cache.contains(&chain[1].id()));
    assert!(!bs.processed_cache.contains(&chain[3].id()));

    let tx = |memo: &[u8]| vec![encode_tx(vec![], memo)];
    let above_stripe = harness.store.parse_vtx(&encode_vtx(3, vec![chain[2].id()], tx(b"a")));
    let above_gap = harness.store.parse_vtx(&encode_vtx(2, vec![chain[1].id()], tx(b"b")));
    let (above_stripe, above_gap) = (above_stripe.unwrap(), above_gap.unwrap());
    bs.vtx_blocked.add_missing_id(chain[2].id());
    let (loads_1, loads_2) = (manager.loads(&chain[1].id()), manager.loads(&chain[2].id()));

    bs.process(vec![above_stripe, above_gap, chain[2].clone()]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 6);
    // each parent is loaded once to resolve the dependencies of its new child, only the
    // vertex off the stripe is loaded again to be traversed
    assert_eq!(manager.loads(&chain[2].id()), loads_2 + 1);
    assert_eq!(manager.loads(&chain[1].id()), loads_1 + 2);
    assert!(!bs.vtx_blocked.has_missing_id(&chain[2].id()));
    assert_eq!(bs.health().missing_ids, 1);
}

#[actix_rt::test]
async fn test_traversal_skips_vertices_of_current_height() {
    let db = temporary_db();
    // nothing is cached
    let config = Config { stripe_distance: 10, stripe_width: 0, ..test_config() };
    let (mut bs, harness, manager) = make_counting_bootstrapper(&db, config);

    let genesis = harness.store.parse_vtx(&encode_vtx(0, vec![], vec![encode_tx(vec![], b"g")]));
    let genesis = genesis.unwrap();
    // a sibling referencing a vertex of its own height, traversed after it
    let (first, second) = (0u8..)
        .map(|i| {
            let first = encode_vtx(1, vec![genesis.id()], vec![encode_tx(vec![], &[b'p', i])]);
            let second = encode_vtx(1, vec![Id::new(&first)], vec![encode_tx(vec![], b"q")]);
            (first, second)
        })
        .find(|(first, second)| Id::new(first) < Id::new(second))
        .unwrap();
    let first = harness.store.parse_vtx(&first).unwrap();
    let second = harness.store.parse_vtx(&second).unwrap();
    let top = encode_vtx(2, vec![first.id(), second.id()], vec![encode_tx(vec![], b"t")]);
    let top = harness.store.parse_vtx(&top).unwrap();
    bs.vtx_blocked.add_missing_id(Id::new(b"x"));

    bs.process(vec![top]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 4);
    // resolving the dependencies of the top and the second vertex, and a single traversal
    assert_eq!(manager.loads(&first.id()), 3);
    assert_eq!(manager.loads(&genesis.id()), 2);
}

#[actix_rt::test]
async fn test_full_bootstrap() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let dag = build_dag(&remote, 4, 2);
    let stop = linearize(&remote);

    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.start_bootstrap(0).unwrap();
    assert_eq!(bs.phase(), Phase::Fetching);
    assert_eq!(harness.frontier_requests(), 1);

    bs.force_accepted(remote.edge().unwrap()).unwrap();
    serve(&mut bs, &harness, &remote, 2);

    assert_eq!(bs.phase(), Phase::Done);
    assert_eq!(harness.finished(), Some(bs.request_id));
    for vtx in dag.iter() {
        assert_eq!(harness.store.get_vtx(&vtx.id()).unwrap().unwrap().status(), Status::Accepted);
        for tx in vtx.txs() {
            assert_eq!(harness.ledger.tx_status(&Id::new(tx)).unwrap(), Status::Accepted);
        }
    }
    assert_eq!(harness.store.edge().unwrap(), vec![stop.id()]);
    assert_eq!(harness.ledger.linearized().unwrap(), Some(stop.id()));

    let health = bs.health();
    assert_eq!(health.missing_ids, 0);
    assert_eq!(health.pending_vertex_jobs, 0);
    assert_eq!(health.pending_tx_jobs, 0);
    assert_eq!(health.metrics.fetched_vertices, 9);
    assert_eq!(health.metrics.accepted_vertices, 9);
    assert_eq!(health.metrics.accepted_txs, 8);
    drop(bs);

    // a linearized DAG finishes right away on the next start
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.start_bootstrap(5).unwrap();
    assert_eq!(bs.phase(), Phase::Done);
    assert_eq!(harness.frontier_requests(), 0);
    assert_eq!(harness.finished(), Some(5));
}

#[actix_rt::test]
async fn test_restarts_until_linearized() {
    let remote_db = temporary_db();
    let remote = VertexStore::new(&remote_db, Id::zero()).unwrap();
    let chain = build_dag(&remote, 3, 1);

    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.start_bootstrap(0).unwrap();
    bs.force_accepted(vec![chain[2].id()]).unwrap();
    serve(&mut bs, &harness, &remote, 2);

    // everything is executed, but without a stop vertex the bootstrapper asks again
    assert_eq!(harness.store.get_vtx(&chain[2].id()).unwrap().unwrap().status(), Status::Accepted);
    assert_eq!(harness.frontier_requests(), 2);
    assert!(bs.restarted);
    assert_eq!(bs.phase(), Phase::Fetching);
    assert_eq!(harness.finished(), None);

    let stop = linearize(&remote);
    bs.force_accepted(vec![stop.id()]).unwrap();
    serve(&mut bs, &harness, &remote, 2);
    assert_eq!(bs.phase(), Phase::Done);
    assert_eq!(harness.ledger.linearized().unwrap(), Some(stop.id()));
}

#[actix_rt::test]
async fn test_rejected_vertex_is_fatal() {
    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    let vtx = harness.store.parse_vtx(&encode_vtx(0, vec![], vec![vec![1]])).unwrap();
    harness.store.reject_vtx(&vtx.id()).unwrap();

    assert_eq!(bs.force_accepted(vec![vtx.id()]), Err(Error::RejectedVertex(vtx.id())));
}

#[actix_rt::test]
async fn test_no_validators_is_fatal() {
    let db = temporary_db();
    let (mut bs, _harness) = make_bootstrapper(&db, test_config(), vec![]);
    assert_eq!(bs.start_bootstrap(0), Err(Error::NoBeacons));

    let x = Id::new(b"x");
    assert_eq!(bs.force_accepted(vec![x]), Err(Error::NoValidators(x)));
}

#[actix_rt::test]
async fn test_starts_once_beacons_connect() {
    let db = temporary_db();
    let config = Config { startup_percentage: 100, ..test_config() };
    let (mut bs, harness) = make_bootstrapper(&db, config, vec![Id::one(), Id::two()]);
    bs.start_bootstrap(0).unwrap();
    assert_eq!(bs.phase(), Phase::AwaitingPeers);

    bs.connected(&Id::one()).unwrap();
    assert_eq!(harness.frontier_requests(), 0);
    bs.connected(&Id::two()).unwrap();
    assert_eq!(harness.frontier_requests(), 1);
    bs.disconnected(&Id::two()).unwrap();
    bs.connected(&Id::two()).unwrap();
    assert_eq!(harness.frontier_requests(), 1);
    assert_eq!(harness.ledger.num_connected().unwrap(), 2);
}

#[actix_rt::test]
async fn test_linearize_on_startup() {
    let db = temporary_db();
    let config = Config { linearize_on_startup: true, ..test_config() };
    let (mut bs, harness) = make_bootstrapper(&db, config, vec![]);
    let genesis = harness.store.insert_vtx(&encode_vtx(0, vec![], vec![vec![0]]), Status::Accepted);
    let genesis = genesis.unwrap();

    bs.start_bootstrap(3).unwrap();
    assert_eq!(bs.phase(), Phase::Done);
    assert_eq!(harness.finished(), Some(3));
    assert!(harness.store.stop_vertex_accepted().unwrap());
    let edge = harness.store.edge().unwrap();
    assert_eq!(edge.len(), 1);
    let stop = harness.store.get_vtx(&edge[0]).unwrap().unwrap();
    assert_eq!(stop.parent_ids(), &[genesis.id()]);
    assert_eq!(harness.ledger.linearized().unwrap(), Some(stop.id()));
}

#[actix_rt::test]
async fn test_halted_traversal() {
    let db = temporary_db();
    let (mut bs, harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    let vtx = harness.store.parse_vtx(&encode_vtx(0, vec![], vec![vec![1]])).unwrap();

    bs.halt();
    bs.force_accepted(vec![vtx.id()]).unwrap();
    assert_eq!(bs.vtx_blocked.pending_jobs(), 0);
    assert!(bs.health().halted);
}

#[actix_rt::test]
async fn test_clear() {
    let db = temporary_db();
    let (mut bs, _harness) = make_bootstrapper(&db, test_config(), vec![peer()]);
    bs.force_accepted(vec![Id::new(b"x")]).unwrap();
    assert_eq!(bs.health().missing_ids, 1);
    bs.clear().unwrap();
    assert_eq!(bs.health().missing_ids, 0);
}

#[actix_rt::test]
async fn test_bootstrapper_actor() {
    let db = temporary_db();
    let config = Config { linearize_on_startup: true, ..test_config() };
    let (bs, harness) = make_bootstrapper(&db, config, vec![]);
    let _ = harness.store.insert_vtx(&encode_vtx(0, vec![], vec![vec![0]]), Status::Accepted);

    let addr = Actor::start(bs);
    addr.send(Start { request_id: 0 }).await.unwrap();
    let health = addr.send(GetHealth).await.unwrap();
    assert_eq!(health.phase, Phase::Done);
    assert_eq!(harness.finished(), Some(0));
}
