//! The move transaction coordinator.
//!
//! [`PlacementCostState`] owns every per-net table the engine keeps: committed
//! and proposed boxes (through the selected [`BoundingBoxStrategy`]), committed
//! and proposed net costs, per-net update status, and per-connection timing.
//! One annealing iteration drives it through a fixed cycle:
//!
//! 1. the search loop relocates blocks in its netlist and records the move;
//! 2. [`evaluate`](PlacementCostState::evaluate) updates the affected nets
//!    speculatively and returns the cost deltas;
//! 3. [`commit`](PlacementCostState::commit) or
//!    [`rollback`](PlacementCostState::rollback) ends the move (on rollback the
//!    search loop also restores its block locations).

use crate::bbox::{new_strategy, BoundingBoxKind, BoundingBoxStrategy, NetBox, NetUpdateStatus, PinMove};
use crate::chan_factor::ChanFactorTable;
use crate::device::{DeviceGrid, GridBounds};
use crate::error::{CostError, CostKind};
use crate::ids::{NetId, PinId};
use crate::moves::{MoveRecord, MovedBlock};
use crate::netlist::{PinDirection, PinLoc, PlacedNetlist};
use crate::timing::{ConnectionTimings, TimingInputs};
use placecost_common::{InternalError, PlaceResult};
use placecost_config::{BoundingBoxType, CostConfig};
use placecost_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::Serialize;

/// Marks a net's proposed-cost slot as not yet touched by the current move.
const UNTOUCHED: f64 = -1.0;

/// How [`PlacementCostState::compute_bb_cost`] is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostMethod {
    /// Regular full computation.
    Normal,
    /// Verification pass; also produces the wirelength estimate.
    Check,
}

/// Result of a full bounding-box cost computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostReport {
    /// Total bounding-box cost.
    pub total: f64,
    /// Bounding-box wirelength estimate, for [`CostMethod::Check`].
    pub wirelength: Option<f64>,
}

/// Cost changes produced by evaluating one move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveOutcome {
    /// Change in bounding-box cost.
    pub bb_delta: f64,
    /// Change in timing cost; zero when timing is not supplied.
    pub timing_delta: f64,
    /// Number of distinct nets the move touched.
    pub affected_nets: usize,
    /// Number of connections whose delay changed.
    pub affected_connections: usize,
}

/// Running cost totals held by the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlacerCosts {
    /// Total bounding-box cost.
    pub bb_cost: f64,
    /// Total timing cost.
    pub timing_cost: f64,
}

impl PlacerCosts {
    /// Adds the deltas of an accepted move.
    pub fn apply(&mut self, outcome: &MoveOutcome) {
        self.bb_cost += outcome.bb_delta;
        self.timing_cost += outcome.timing_delta;
    }

    /// Weighted cost, `tradeoff` being the timing weight.
    pub fn combined(&self, tradeoff: f64) -> f64 {
        (1.0 - tradeoff) * self.bb_cost + tradeoff * self.timing_cost
    }
}

fn net_ids(count: usize) -> impl Iterator<Item = NetId> {
    (0..count).map(|i| NetId::from_raw(i as u32))
}

/// Incremental placement cost state for one placement run.
pub struct PlacementCostState {
    bounds: GridBounds,
    factors: ChanFactorTable,
    boxes: Box<dyn BoundingBoxStrategy>,
    small_net_threshold: usize,
    error_tolerance: f64,
    net_cost: Vec<f64>,
    proposed_net_cost: Vec<f64>,
    status: Vec<NetUpdateStatus>,
    ignored: Vec<bool>,
    nets_to_update: Vec<NetId>,
    timings: ConnectionTimings,
    pending: bool,
}

impl PlacementCostState {
    /// Allocates the engine for `netlist` on `device` and computes every net's
    /// box and cost from scratch.
    pub fn new(
        netlist: &dyn PlacedNetlist,
        device: &dyn DeviceGrid,
        config: &CostConfig,
        sink: &DiagnosticSink,
    ) -> Result<Self, CostError> {
        let bounds = GridBounds::from_device(device)?;
        let factors = ChanFactorTable::build(device, config.cost.place_cost_exp, sink);
        let kind = match config.cost.bounding_box {
            BoundingBoxType::Cube => BoundingBoxKind::Cube,
            BoundingBoxType::PerLayer => BoundingBoxKind::PerLayer,
            BoundingBoxType::Auto if bounds.num_layers == 1 => BoundingBoxKind::Cube,
            BoundingBoxType::Auto => BoundingBoxKind::PerLayer,
        };
        sink.emit(
            Diagnostic::note(
                DiagnosticCode::BOUNDING_BOX_FORM,
                format!("using {kind} bounding boxes"),
            )
            .with_note(format!(
                "{} nets on a {}-layer device",
                netlist.net_count(),
                bounds.num_layers
            )),
        );

        let num_nets = netlist.net_count();
        let mut state = Self {
            bounds,
            factors,
            boxes: new_strategy(kind, num_nets, bounds.num_layers),
            small_net_threshold: config.cost.small_net_threshold,
            error_tolerance: config.cost.error_tolerance,
            net_cost: vec![0.0; num_nets],
            proposed_net_cost: vec![UNTOUCHED; num_nets],
            status: vec![NetUpdateStatus::Unmodified; num_nets],
            ignored: vec![false; num_nets],
            nets_to_update: Vec::new(),
            timings: ConnectionTimings::new(netlist),
            pending: false,
        };
        state.compute_bb_cost(netlist, CostMethod::Normal, sink);
        Ok(state)
    }

    /// The box form in use.
    pub fn kind(&self) -> BoundingBoxKind {
        self.boxes.kind()
    }

    /// The routable interior pins are clipped to.
    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// The channel factor table.
    pub fn factors(&self) -> &ChanFactorTable {
        &self.factors
    }

    /// Sum of committed net costs.
    pub fn bb_cost(&self) -> f64 {
        self.net_cost.iter().sum()
    }

    /// Committed cost of `net`.
    pub fn net_cost(&self, net: NetId) -> f64 {
        self.net_cost[net.index()]
    }

    /// Update status of `net` within the pending move.
    pub fn net_status(&self, net: NetId) -> NetUpdateStatus {
        self.status[net.index()]
    }

    /// Committed boxes of `net`.
    pub fn committed_boxes(&self, net: NetId) -> &[NetBox] {
        self.boxes.committed_boxes(net)
    }

    /// Committed per-layer sink counts of `net`.
    pub fn committed_layer_sinks(&self, net: NetId) -> &[i32] {
        self.boxes.committed_layer_sinks(net)
    }

    /// Proposed boxes of `net`; meaningful only while `net` is affected by the
    /// pending move.
    pub fn proposed_boxes(&self, net: NetId) -> &[NetBox] {
        self.boxes.proposed_boxes(net)
    }

    /// Nets touched by the most recently evaluated move.
    pub fn affected_nets(&self) -> &[NetId] {
        &self.nets_to_update
    }

    /// Whether a move has been evaluated but not yet committed or rolled back.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Committed delay of one connection.
    pub fn connection_delay(&self, net: NetId, sink_index: usize) -> f32 {
        self.timings.committed_delay(net, sink_index)
    }

    /// Evaluates a proposed move.
    ///
    /// The blocks in `mv` must already sit at their new locations in
    /// `netlist`. Every pin of every moved block updates its net's proposed
    /// box; each affected net is then costed once. With `timing` supplied the
    /// affected connections are re-timed as well.
    ///
    /// # Panics
    ///
    /// Panics if the previous move is still pending.
    pub fn evaluate(
        &mut self,
        netlist: &dyn PlacedNetlist,
        mv: &MoveRecord,
        timing: Option<TimingInputs<'_>>,
    ) -> MoveOutcome {
        assert!(!self.pending, "evaluate called while a move is pending");
        self.pending = true;
        self.nets_to_update.clear();

        let mut timing_delta = 0.0;
        for moved in mv.blocks() {
            debug_assert_eq!(
                netlist.block_loc(moved.block),
                moved.to,
                "block {} must be relocated before evaluation",
                moved.block
            );
            for &pin in netlist.block_pins(moved.block) {
                let Some(net) = netlist.pin_net(pin) else {
                    continue;
                };
                if self.ignored[net.index()] {
                    continue;
                }
                if self.proposed_net_cost[net.index()] < 0.0 {
                    self.proposed_net_cost[net.index()] = 0.0;
                    self.nets_to_update.push(net);
                }
                let is_driver = netlist.pin_direction(pin) == PinDirection::Driver;
                self.update_net_bb(netlist, net, pin, moved, is_driver);
                if let Some(inputs) = timing {
                    timing_delta += self.update_td_delta(netlist, inputs, mv, net, pin, is_driver);
                }
            }
        }

        let mut bb_delta = 0.0;
        for &net in &self.nets_to_update {
            let cost = self.boxes.proposed_cost(net, &self.factors);
            self.proposed_net_cost[net.index()] = cost;
            bb_delta += cost - self.net_cost[net.index()];
            if cfg!(debug_assertions) {
                self.check_proposed(net);
            }
        }

        MoveOutcome {
            bb_delta,
            timing_delta,
            affected_nets: self.nets_to_update.len(),
            affected_connections: self.timings.touched_count(),
        }
    }

    fn update_net_bb(
        &mut self,
        netlist: &dyn PlacedNetlist,
        net: NetId,
        pin: PinId,
        moved: &MovedBlock,
        is_driver: bool,
    ) {
        let i = net.index();
        if self.status[i] == NetUpdateStatus::RescannedFromScratch {
            return;
        }
        if netlist.net_sinks(net).len() < self.small_net_threshold {
            self.boxes.propose_from_scratch(netlist, net, &self.bounds);
            self.status[i] = NetUpdateStatus::RescannedFromScratch;
            return;
        }

        let offset = netlist.pin_offset(pin);
        let pin_move = PinMove {
            old: self.bounds.clip(PinLoc::at_offset(moved.from, offset)),
            new: self.bounds.clip(PinLoc::at_offset(moved.to, offset)),
            is_driver,
        };
        let from_committed = self.status[i] == NetUpdateStatus::Unmodified;
        if self.boxes.propose_pin_move(net, from_committed, &pin_move) {
            self.status[i] = NetUpdateStatus::SpeculativelyUpdated;
        } else {
            self.boxes.propose_from_scratch(netlist, net, &self.bounds);
            self.status[i] = NetUpdateStatus::RescannedFromScratch;
        }
    }

    /// Re-times the connections a moved pin affects.
    ///
    /// A sink whose net driver is also moving is skipped: the driver's pass
    /// re-times every sink of the net.
    fn update_td_delta(
        &mut self,
        netlist: &dyn PlacedNetlist,
        inputs: TimingInputs<'_>,
        mv: &MoveRecord,
        net: NetId,
        pin: PinId,
        is_driver: bool,
    ) -> f64 {
        if is_driver {
            let mut delta = 0.0;
            for sink_index in 0..netlist.net_sinks(net).len() {
                delta += self.timings.propose(netlist, inputs, net, sink_index);
            }
            return delta;
        }
        let driver_block = netlist.pin_block(netlist.net_driver(net));
        if mv.contains(driver_block) {
            return 0.0;
        }
        match netlist.pin_sink_index(pin) {
            Some(sink_index) => self.timings.propose(netlist, inputs, net, sink_index),
            None => 0.0,
        }
    }

    fn check_proposed(&self, net: NetId) {
        for bb in self.boxes.proposed_boxes(net) {
            debug_assert!(
                self.bounds.contains_extents(bb.xmin, bb.xmax, bb.ymin, bb.ymax),
                "net {net} box {bb} outside grid interior"
            );
            debug_assert!(
                bb.xmin_edge >= 1 && bb.xmax_edge >= 1 && bb.ymin_edge >= 1 && bb.ymax_edge >= 1,
                "net {net} box {bb} has an empty edge"
            );
        }
        debug_assert!(
            self.boxes.proposed_layer_sinks(net).iter().all(|&n| n >= 0),
            "net {net} has a negative layer sink count"
        );
    }

    /// Accepts the pending move.
    ///
    /// # Panics
    ///
    /// Panics if no move is pending.
    pub fn commit(&mut self) {
        assert!(self.pending, "commit called without a pending move");
        for &net in &self.nets_to_update {
            let i = net.index();
            self.boxes.commit(net);
            self.net_cost[i] = self.proposed_net_cost[i];
            self.proposed_net_cost[i] = UNTOUCHED;
            self.status[i] = NetUpdateStatus::Unmodified;
        }
        self.timings.commit();
        self.pending = false;
    }

    /// Discards the pending move. Committed state is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if no move is pending.
    pub fn rollback(&mut self) {
        assert!(self.pending, "rollback called without a pending move");
        for &net in &self.nets_to_update {
            let i = net.index();
            self.proposed_net_cost[i] = UNTOUCHED;
            self.status[i] = NetUpdateStatus::Unmodified;
        }
        self.timings.rollback();
        self.pending = false;
    }

    /// Rebuilds every net's committed box and cost from its pins and returns
    /// the total.
    ///
    /// [`CostMethod::Check`] additionally computes the bounding-box
    /// wirelength estimate and reports it as a note.
    pub fn compute_bb_cost(
        &mut self,
        netlist: &dyn PlacedNetlist,
        method: CostMethod,
        sink: &DiagnosticSink,
    ) -> CostReport {
        assert!(!self.pending, "full cost computation during a pending move");
        assert_eq!(
            netlist.net_count(),
            self.net_cost.len(),
            "netlist changed size since the engine was built"
        );
        let mut total = 0.0;
        let mut wirelength = 0.0;
        for net in net_ids(self.net_cost.len()) {
            let i = net.index();
            self.ignored[i] = netlist.net_is_ignored(net);
            if self.ignored[i] {
                self.net_cost[i] = 0.0;
                continue;
            }
            self.boxes.load_from_scratch(netlist, net, &self.bounds);
            self.net_cost[i] = self.boxes.committed_cost(net, &self.factors);
            total += self.net_cost[i];
            if method == CostMethod::Check {
                wirelength += self.boxes.committed_wirelength(net);
            }
        }

        let wirelength = match method {
            CostMethod::Normal => None,
            CostMethod::Check => {
                sink.emit(Diagnostic::note(
                    DiagnosticCode::WIRELENGTH_ESTIMATE,
                    format!("bounding-box wirelength estimate: {wirelength:.3}"),
                ));
                Some(wirelength)
            }
        };
        CostReport { total, wirelength }
    }

    /// Re-derives the total from the committed boxes, without rescanning pins.
    pub fn recompute_bb_cost(&self) -> f64 {
        net_ids(self.net_cost.len())
            .filter(|net| !self.ignored[net.index()])
            .map(|net| self.boxes.committed_cost(net, &self.factors))
            .sum()
    }

    /// Recomputes every connection's delay and returns the total timing cost.
    pub fn compute_timing_cost(&mut self, netlist: &dyn PlacedNetlist, inputs: TimingInputs<'_>) -> f64 {
        assert!(!self.pending, "timing recomputation during a pending move");
        self.timings.recompute(netlist, inputs)
    }

    /// Checks the search loop's running totals against recomputed values and
    /// replaces them, removing accumulated round-off.
    ///
    /// A relative divergence beyond the configured tolerance is reported as
    /// an error diagnostic and returned as [`CostError::Drift`].
    pub fn recompute_costs_from_scratch(
        &mut self,
        netlist: &dyn PlacedNetlist,
        costs: &mut PlacerCosts,
        timing: Option<TimingInputs<'_>>,
        sink: &DiagnosticSink,
    ) -> Result<(), CostError> {
        let bb_cost = self.recompute_bb_cost();
        self.check_drift(CostKind::BoundingBox, costs.bb_cost, bb_cost, sink)?;
        costs.bb_cost = bb_cost;

        if let Some(inputs) = timing {
            let timing_cost = self.compute_timing_cost(netlist, inputs);
            self.check_drift(CostKind::Timing, costs.timing_cost, timing_cost, sink)?;
            costs.timing_cost = timing_cost;
        }
        Ok(())
    }

    fn check_drift(
        &self,
        kind: CostKind,
        tracked: f64,
        recomputed: f64,
        sink: &DiagnosticSink,
    ) -> Result<(), CostError> {
        if (recomputed - tracked).abs() <= tracked * self.error_tolerance {
            return Ok(());
        }
        let code = match kind {
            CostKind::BoundingBox => DiagnosticCode::BB_COST_DRIFT,
            CostKind::Timing => DiagnosticCode::TIMING_COST_DRIFT,
        };
        sink.emit(
            Diagnostic::error(code, format!("{kind} is out of step with the placement"))
                .with_note(format!("recomputed {recomputed}, tracked {tracked}"))
                .with_help(format!(
                    "relative tolerance is {}",
                    self.error_tolerance
                )),
        );
        Err(CostError::Drift {
            kind,
            tracked,
            recomputed,
        })
    }

    /// Rebuilds every net from its pins and checks that the committed boxes,
    /// sink counts, and costs agree with the rebuild.
    ///
    /// Uses the proposed buffers as scratch space, so no move may be pending.
    pub fn verify_against_scratch(&mut self, netlist: &dyn PlacedNetlist) -> PlaceResult<()> {
        if self.pending {
            return Err(InternalError::new("verification requested during a pending move"));
        }
        for net in net_ids(self.net_cost.len()) {
            if self.ignored[net.index()] {
                continue;
            }
            self.boxes.propose_from_scratch(netlist, net, &self.bounds);
            if !self.boxes.proposal_matches_committed(net) {
                return Err(InternalError::new(format!(
                    "net {net}: committed boxes {:?} (sinks {:?}) but pins give {:?} (sinks {:?})",
                    self.boxes.committed_boxes(net),
                    self.boxes.committed_layer_sinks(net),
                    self.boxes.proposed_boxes(net),
                    self.boxes.proposed_layer_sinks(net),
                )));
            }
            let cost = self.boxes.committed_cost(net, &self.factors);
            if cost != self.net_cost[net.index()] {
                return Err(InternalError::new(format!(
                    "net {net}: committed cost {} but boxes give {cost}",
                    self.net_cost[net.index()]
                )));
            }
        }
        Ok(())
    }
}
