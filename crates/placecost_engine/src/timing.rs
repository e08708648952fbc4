//! Timing-driven cost: per-connection delay weighted by criticality.
//!
//! A connection is one (net, sink) pair. Delays come from a [`DelayModel`] and
//! weights from a [`CriticalityProvider`]; both are supplied by the caller on
//! each call through [`TimingInputs`].

use crate::ids::NetId;
use crate::netlist::PlacedNetlist;

/// Estimates the delay of one connection at the current placement.
pub trait DelayModel {
    /// Delay from the driver of `net` to its sink number `sink_index`.
    fn connection_delay(&self, netlist: &dyn PlacedNetlist, net: NetId, sink_index: usize) -> f32;
}

/// Supplies the timing criticality of each connection.
pub trait CriticalityProvider {
    /// Criticality in `[0, 1]` of sink number `sink_index` of `net`.
    fn criticality(&self, net: NetId, sink_index: usize) -> f32;
}

/// The timing collaborators for one call.
#[derive(Clone, Copy)]
pub struct TimingInputs<'a> {
    /// Connection delay estimator.
    pub delay: &'a dyn DelayModel,
    /// Connection criticality source.
    pub criticality: &'a dyn CriticalityProvider,
}

/// Delay proportional to Manhattan distance, with a fixed cost per layer crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManhattanDelay {
    /// Delay of a zero-length connection.
    pub base: f32,
    /// Delay per grid unit of Manhattan distance.
    pub per_tile: f32,
    /// Delay per layer crossed.
    pub per_layer: f32,
}

impl Default for ManhattanDelay {
    fn default() -> Self {
        Self {
            base: 0.1,
            per_tile: 0.05,
            per_layer: 0.2,
        }
    }
}

impl DelayModel for ManhattanDelay {
    fn connection_delay(&self, netlist: &dyn PlacedNetlist, net: NetId, sink_index: usize) -> f32 {
        let from = netlist.pin_loc(netlist.net_driver(net));
        let to = netlist.pin_loc(netlist.net_sinks(net)[sink_index]);
        let distance = (from.x - to.x).abs() + (from.y - to.y).abs();
        let layers = (from.layer - to.layer).abs();
        self.base + self.per_tile * distance as f32 + self.per_layer * layers as f32
    }
}

/// Criticalities stored per connection.
#[derive(Debug, Clone)]
pub struct CriticalityTable {
    offsets: Vec<usize>,
    values: Vec<f32>,
}

impl CriticalityTable {
    /// Creates a table giving every connection of `netlist` criticality `value`.
    pub fn uniform(netlist: &dyn PlacedNetlist, value: f32) -> Self {
        let offsets = connection_offsets(netlist);
        let total = offsets.last().copied().unwrap_or(0);
        Self {
            offsets,
            values: vec![value; total],
        }
    }

    /// Sets the criticality of one connection.
    pub fn set(&mut self, net: NetId, sink_index: usize, value: f32) {
        let slot = self.offsets[net.index()] + sink_index;
        debug_assert!(slot < self.offsets[net.index() + 1]);
        self.values[slot] = value;
    }
}

impl CriticalityProvider for CriticalityTable {
    fn criticality(&self, net: NetId, sink_index: usize) -> f32 {
        self.values[self.offsets[net.index()] + sink_index]
    }
}

/// Prefix offsets of each net's connections in a flat per-connection table.
///
/// Has `net_count + 1` entries; net `n` owns `offsets[n]..offsets[n + 1]`.
pub(crate) fn connection_offsets(netlist: &dyn PlacedNetlist) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(netlist.net_count() + 1);
    let mut next = 0;
    offsets.push(next);
    for i in 0..netlist.net_count() {
        next += netlist.net_sinks(NetId::from_raw(i as u32)).len();
        offsets.push(next);
    }
    offsets
}

/// Committed and proposed delay and cost of every connection.
#[derive(Debug, Clone)]
pub(crate) struct ConnectionTimings {
    offsets: Vec<usize>,
    committed_delay: Vec<f32>,
    committed_cost: Vec<f64>,
    proposed_delay: Vec<f32>,
    proposed_cost: Vec<f64>,
    /// Connections changed by the pending move, as flat slots.
    touched: Vec<usize>,
}

impl ConnectionTimings {
    pub(crate) fn new(netlist: &dyn PlacedNetlist) -> Self {
        let offsets = connection_offsets(netlist);
        let total = offsets.last().copied().unwrap_or(0);
        Self {
            offsets,
            committed_delay: vec![0.0; total],
            committed_cost: vec![0.0; total],
            proposed_delay: vec![0.0; total],
            proposed_cost: vec![0.0; total],
            touched: Vec::new(),
        }
    }

    fn slot(&self, net: NetId, sink_index: usize) -> usize {
        self.offsets[net.index()] + sink_index
    }

    /// Recomputes every connection of every non-ignored net and returns the
    /// total timing cost.
    pub(crate) fn recompute(&mut self, netlist: &dyn PlacedNetlist, inputs: TimingInputs<'_>) -> f64 {
        let mut total = 0.0;
        for i in 0..netlist.net_count() {
            let net = NetId::from_raw(i as u32);
            if netlist.net_is_ignored(net) {
                continue;
            }
            for sink_index in 0..netlist.net_sinks(net).len() {
                let slot = self.slot(net, sink_index);
                let delay = inputs.delay.connection_delay(netlist, net, sink_index);
                let cost = f64::from(inputs.criticality.criticality(net, sink_index)) * f64::from(delay);
                self.committed_delay[slot] = delay;
                self.committed_cost[slot] = cost;
                total += cost;
            }
        }
        total
    }

    /// Re-evaluates one connection against the current placement and returns
    /// its cost change. Connections whose delay is unchanged contribute nothing.
    pub(crate) fn propose(
        &mut self,
        netlist: &dyn PlacedNetlist,
        inputs: TimingInputs<'_>,
        net: NetId,
        sink_index: usize,
    ) -> f64 {
        let slot = self.slot(net, sink_index);
        let delay = inputs.delay.connection_delay(netlist, net, sink_index);
        if delay == self.committed_delay[slot] {
            return 0.0;
        }
        let cost = f64::from(inputs.criticality.criticality(net, sink_index)) * f64::from(delay);
        self.proposed_delay[slot] = delay;
        self.proposed_cost[slot] = cost;
        self.touched.push(slot);
        cost - self.committed_cost[slot]
    }

    pub(crate) fn commit(&mut self) {
        for &slot in &self.touched {
            self.committed_delay[slot] = self.proposed_delay[slot];
            self.committed_cost[slot] = self.proposed_cost[slot];
        }
        self.touched.clear();
    }

    pub(crate) fn rollback(&mut self) {
        self.touched.clear();
    }

    pub(crate) fn touched_count(&self) -> usize {
        self.touched.len()
    }

    pub(crate) fn committed_delay(&self, net: NetId, sink_index: usize) -> f32 {
        self.committed_delay[self.slot(net, sink_index)]
    }
}
