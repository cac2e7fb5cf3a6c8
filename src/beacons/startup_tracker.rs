use super::Beacons;

use crate::id::NodeId;

use std::collections::HashSet;

/// Decides when enough peers are connected to start bootstrapping.
pub trait StartupTracker {
    fn connected(&mut self, node_id: &NodeId);

    fn disconnected(&mut self, node_id: &NodeId);

    /// Whether bootstrapping should start. Once `true` it stays `true`.
    fn should_start(&self) -> bool;
}

/// Starts once the connected beacons hold at least a percentage of the total beacon weight.
pub struct WeightedStartupTracker {
    beacons: Beacons,
    connected: HashSet<NodeId>,
    connected_weight: u64,
    start_weight: u64,
    started: bool,
}

impl WeightedStartupTracker {
    pub fn new(beacons: Beacons, startup_percentage: u64) -> Self {
        let total = beacons.total_weight();
        let start_weight = (total * startup_percentage + 99) / 100;
        WeightedStartupTracker {
            beacons,
            connected: HashSet::new(),
            connected_weight: 0,
            start_weight,
            started: start_weight == 0,
        }
    }

    pub fn connected_weight(&self) -> u64 {
        self.connected_weight
    }
}

impl StartupTracker for WeightedStartupTracker {
    fn connected(&mut self, node_id: &NodeId) {
        let weight = self.beacons.weight(node_id);
        if weight == 0 || !self.connected.insert(*node_id) {
            return;
        }
        self.connected_weight += weight;
        if self.connected_weight >= self.start_weight {
            self.started = true;
        }
    }

    fn disconnected(&mut self, node_id: &NodeId) {
        if self.connected.remove(node_id) {
            self.connected_weight -= self.beacons.weight(node_id);
        }
    }

    fn should_start(&self) -> bool {
        self.started
    }
}
