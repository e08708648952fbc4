//! Cube form: one box per net spanning every layer.

use super::scratch::cube_from_scratch;
use super::update::shift_pin;
use super::{BoundingBoxKind, BoundingBoxStrategy, BoxStore, NetBox, PinMove};
use crate::chan_factor::ChanFactorTable;
use crate::cost::{box_cost, box_wirelength};
use crate::device::GridBounds;
use crate::ids::NetId;
use crate::netlist::PlacedNetlist;

/// Cube-form box storage.
#[derive(Debug, Clone)]
pub struct CubeBoxes {
    store: BoxStore,
}

impl CubeBoxes {
    /// Allocates boxes for `num_nets` nets on a device with `num_layers` layers.
    pub fn new(num_nets: usize, num_layers: usize) -> Self {
        Self {
            store: BoxStore::new(num_nets, 1, num_layers),
        }
    }
}

fn sink_total(layer_sinks: &[i32]) -> usize {
    layer_sinks.iter().map(|&n| n as usize).sum()
}

fn cube_cost(bb: &NetBox, layer_sinks: &[i32], factors: &ChanFactorTable) -> f64 {
    match sink_total(layer_sinks) {
        0 => 0.0,
        sinks => box_cost(bb, sinks + 1, factors),
    }
}

impl BoundingBoxStrategy for CubeBoxes {
    fn kind(&self) -> BoundingBoxKind {
        BoundingBoxKind::Cube
    }

    fn load_from_scratch(&mut self, netlist: &dyn PlacedNetlist, net: NetId, bounds: &GridBounds) {
        let (boxes, sinks) = self.store.committed_mut(net);
        boxes[0] = cube_from_scratch(netlist, net, bounds, sinks);
    }

    fn propose_from_scratch(&mut self, netlist: &dyn PlacedNetlist, net: NetId, bounds: &GridBounds) {
        let (boxes, sinks) = self.store.proposed_mut(net);
        boxes[0] = cube_from_scratch(netlist, net, bounds, sinks);
    }

    fn propose_pin_move(&mut self, net: NetId, from_committed: bool, mv: &PinMove) -> bool {
        if from_committed {
            self.store.begin_proposal(net);
        }
        let (boxes, sinks) = self.store.proposed_mut(net);
        if mv.is_driver && sink_total(sinks) == 0 {
            boxes[0] = NetBox::point(mv.new.x, mv.new.y);
            return true;
        }
        match shift_pin(&boxes[0], (mv.old.x, mv.old.y), (mv.new.x, mv.new.y)) {
            Some(bb) => boxes[0] = bb,
            None => return false,
        }
        if !mv.is_driver && mv.old.layer != mv.new.layer {
            sinks[mv.old.layer as usize] -= 1;
            sinks[mv.new.layer as usize] += 1;
        }
        true
    }

    fn proposed_cost(&self, net: NetId, factors: &ChanFactorTable) -> f64 {
        let (boxes, sinks) = self.store.proposed(net);
        cube_cost(&boxes[0], sinks, factors)
    }

    fn committed_cost(&self, net: NetId, factors: &ChanFactorTable) -> f64 {
        let (boxes, sinks) = self.store.committed(net);
        cube_cost(&boxes[0], sinks, factors)
    }

    fn committed_wirelength(&self, net: NetId) -> f64 {
        let (boxes, sinks) = self.store.committed(net);
        match sink_total(sinks) {
            0 => 0.0,
            n => box_wirelength(&boxes[0], n + 1),
        }
    }

    fn commit(&mut self, net: NetId) {
        self.store.commit(net);
    }

    fn proposal_matches_committed(&self, net: NetId) -> bool {
        self.store.proposal_matches(net)
    }

    fn committed_boxes(&self, net: NetId) -> &[NetBox] {
        self.store.committed(net).0
    }

    fn committed_layer_sinks(&self, net: NetId) -> &[i32] {
        self.store.committed(net).1
    }

    fn proposed_boxes(&self, net: NetId) -> &[NetBox] {
        self.store.proposed(net).0
    }

    fn proposed_layer_sinks(&self, net: NetId) -> &[i32] {
        self.store.proposed(net).1
    }
}
