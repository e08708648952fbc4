//! Per-layer form: one box per layer, each seeded with the driver.

use super::scratch::per_layer_from_scratch;
use super::update::{add_pin, remove_pin, shift_pin};
use super::{BoundingBoxKind, BoundingBoxStrategy, BoxStore, NetBox, PinMove};
use crate::chan_factor::ChanFactorTable;
use crate::cost::{box_cost, box_wirelength};
use crate::device::GridBounds;
use crate::ids::NetId;
use crate::netlist::PlacedNetlist;

/// Per-layer box storage.
#[derive(Debug, Clone)]
pub struct PerLayerBoxes {
    store: BoxStore,
}

impl PerLayerBoxes {
    /// Allocates `num_layers` boxes for each of `num_nets` nets.
    pub fn new(num_nets: usize, num_layers: usize) -> Self {
        Self {
            store: BoxStore::new(num_nets, num_layers, num_layers),
        }
    }
}

/// Sum of per-layer box costs over layers that hold at least one sink.
fn layered_cost(boxes: &[NetBox], layer_sinks: &[i32], factors: &ChanFactorTable) -> f64 {
    boxes
        .iter()
        .zip(layer_sinks)
        .filter(|(_, &n)| n > 0)
        .map(|(bb, &n)| box_cost(bb, n as usize + 1, factors))
        .sum()
}

/// Applies a move of a pin that belongs to every layer box (the driver).
fn shift_driver(boxes: &mut [NetBox], layer_sinks: &[i32], mv: &PinMove) -> bool {
    for (bb, &sinks) in boxes.iter_mut().zip(layer_sinks) {
        if sinks == 0 {
            *bb = NetBox::point(mv.new.x, mv.new.y);
            continue;
        }
        match shift_pin(bb, (mv.old.x, mv.old.y), (mv.new.x, mv.new.y)) {
            Some(next) => *bb = next,
            None => return false,
        }
    }
    true
}

impl BoundingBoxStrategy for PerLayerBoxes {
    fn kind(&self) -> BoundingBoxKind {
        BoundingBoxKind::PerLayer
    }

    fn load_from_scratch(&mut self, netlist: &dyn PlacedNetlist, net: NetId, bounds: &GridBounds) {
        let (boxes, sinks) = self.store.committed_mut(net);
        per_layer_from_scratch(netlist, net, bounds, boxes, sinks);
    }

    fn propose_from_scratch(&mut self, netlist: &dyn PlacedNetlist, net: NetId, bounds: &GridBounds) {
        let (boxes, sinks) = self.store.proposed_mut(net);
        per_layer_from_scratch(netlist, net, bounds, boxes, sinks);
    }

    fn propose_pin_move(&mut self, net: NetId, from_committed: bool, mv: &PinMove) -> bool {
        if from_committed {
            self.store.begin_proposal(net);
        }
        let (boxes, sinks) = self.store.proposed_mut(net);
        if mv.is_driver {
            return shift_driver(boxes, sinks, mv);
        }

        let (old_layer, new_layer) = (mv.old.layer as usize, mv.new.layer as usize);
        if old_layer == new_layer {
            return match shift_pin(&boxes[old_layer], (mv.old.x, mv.old.y), (mv.new.x, mv.new.y)) {
                Some(bb) => {
                    boxes[old_layer] = bb;
                    true
                }
                None => false,
            };
        }

        match remove_pin(&boxes[old_layer], mv.old.x, mv.old.y) {
            Some(bb) => boxes[old_layer] = bb,
            None => return false,
        }
        add_pin(&mut boxes[new_layer], mv.new.x, mv.new.y);
        sinks[old_layer] -= 1;
        sinks[new_layer] += 1;
        true
    }

    fn proposed_cost(&self, net: NetId, factors: &ChanFactorTable) -> f64 {
        let (boxes, sinks) = self.store.proposed(net);
        layered_cost(boxes, sinks, factors)
    }

    fn committed_cost(&self, net: NetId, factors: &ChanFactorTable) -> f64 {
        let (boxes, sinks) = self.store.committed(net);
        layered_cost(boxes, sinks, factors)
    }

    fn committed_wirelength(&self, net: NetId) -> f64 {
        let (boxes, sinks) = self.store.committed(net);
        boxes
            .iter()
            .zip(sinks)
            .filter(|(_, &n)| n > 0)
            .map(|(bb, &n)| box_wirelength(bb, n as usize + 1))
            .sum()
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
