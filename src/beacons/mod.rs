//! The set of beacons (trusted validators) a bootstrapping node queries.

mod sampleable_map;
mod startup_tracker;

pub use sampleable_map::SampleableMap;
pub use startup_tracker::{StartupTracker, WeightedStartupTracker};

use crate::id::NodeId;

use std::net::SocketAddr;

/// Picks peers to send requests to.
pub trait Sampler {
    /// Samples up to `k` distinct peers, none if no peer is known.
    fn sample(&mut self, k: usize) -> Vec<NodeId>;

    /// The number of peers which can be sampled.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Beacon {
    pub ip: SocketAddr,
    pub weight: u64,
}

/// Weighted beacons, sampled by weight.
#[derive(Debug, Clone, Default)]
pub struct Beacons {
    map: SampleableMap<NodeId, Beacon>,
}

impl Beacons {
    pub fn new() -> Self {
        Beacons { map: SampleableMap::new() }
    }

    /// Builds a set of beacons where every peer has the same weight.
    pub fn from_peers(peers: &[(NodeId, SocketAddr)]) -> Self {
        let mut beacons = Beacons::new();
        for (id, ip) in peers.iter() {
            beacons.insert(*id, *ip, 1);
        }
        beacons
    }

    pub fn insert(&mut self, id: NodeId, ip: SocketAddr, weight: u64) {
        let _ = self.map.insert(id, Beacon { ip, weight });
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<Beacon> {
        self.map.remove(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Beacon> {
        self.map.get(id)
    }

    pub fn weight(&self, id: &NodeId) -> u64 {
        self.map.get(id).map(|beacon| beacon.weight).unwrap_or(0)
    }

    pub fn total_weight(&self) -> u64 {
        self.map.values().map(|beacon| beacon.weight).sum()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.map.keys().cloned().collect()
    }
}

impl Sampler for Beacons {
    fn sample(&mut self, k: usize) -> Vec<NodeId> {
        self.map.sample(k, |beacon| beacon.weight)
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
