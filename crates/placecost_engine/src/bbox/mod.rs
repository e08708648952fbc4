//! Per-net bounding boxes: geometry, storage, and the two box forms.
//!
//! A net's box is kept in one of two forms chosen once per run:
//!
//! - [`CubeBoxes`]: a single 2D box over all pins regardless of layer, plus a
//!   count of sinks on each layer.
//! - [`PerLayerBoxes`]: one 2D box per layer over that layer's sinks, every box
//!   seeded with the driver location.
//!
//! Both forms keep a committed copy and a proposed copy of every net's
//! geometry. A proposed move writes only the proposed copy; committing copies
//! it over the committed one.

mod cube;
mod per_layer;
mod scratch;
mod update;

pub use cube::CubeBoxes;
pub use per_layer::PerLayerBoxes;
pub use scratch::{cube_from_scratch, per_layer_from_scratch};
pub use update::{add_pin, remove_pin, shift_pin};

use crate::chan_factor::ChanFactorTable;
use crate::device::GridBounds;
use crate::ids::NetId;
use crate::netlist::{PinLoc, PlacedNetlist};
use std::fmt;
use std::ops::Range;

/// A 2D bounding box with the number of pins on each of its four edges.
///
/// A pin sitting on a corner counts toward both edges, and when `xmin == xmax`
/// every pin counts toward both x edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetBox {
    /// Leftmost column.
    pub xmin: i32,
    /// Rightmost column.
    pub xmax: i32,
    /// Bottom row.
    pub ymin: i32,
    /// Top row.
    pub ymax: i32,
    /// Pins on column `xmin`.
    pub xmin_edge: u32,
    /// Pins on column `xmax`.
    pub xmax_edge: u32,
    /// Pins on row `ymin`.
    pub ymin_edge: u32,
    /// Pins on row `ymax`.
    pub ymax_edge: u32,
}

impl NetBox {
    /// A box around a single pin at `(x, y)`.
    pub fn point(x: i32, y: i32) -> Self {
        Self {
            xmin: x,
            xmax: x,
            ymin: y,
            ymax: y,
            xmin_edge: 1,
            xmax_edge: 1,
            ymin_edge: 1,
            ymax_edge: 1,
        }
    }

    /// Returns the extents as `(xmin, xmax, ymin, ymax)`.
    pub fn extents(&self) -> (i32, i32, i32, i32) {
        (self.xmin, self.xmax, self.ymin, self.ymax)
    }

    #[cfg(test)]
    pub(crate) fn with_extents(mut self, xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> Self {
        self.xmin = xmin;
        self.xmax = xmax;
        self.ymin = ymin;
        self.ymax = ymax;
        self
    }
}

impl fmt::Display for NetBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x[{}({}), {}({})] y[{}({}), {}({})]",
            self.xmin,
            self.xmin_edge,
            self.xmax,
            self.xmax_edge,
            self.ymin,
            self.ymin_edge,
            self.ymax,
            self.ymax_edge
        )
    }
}

/// How far a net's proposed state has diverged from its committed state
/// during the current move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetUpdateStatus {
    /// Not touched by the current move.
    #[default]
    Unmodified,
    /// The proposed box was derived incrementally from the committed one.
    SpeculativelyUpdated,
    /// The proposed box was rebuilt from all pin locations; later pin moves in
    /// the same move are already reflected and are skipped.
    RescannedFromScratch,
}

/// Which box form is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingBoxKind {
    /// One box over all layers.
    Cube,
    /// One box per layer.
    PerLayer,
}

impl fmt::Display for BoundingBoxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundingBoxKind::Cube => write!(f, "cube"),
            BoundingBoxKind::PerLayer => write!(f, "per_layer"),
        }
    }
}

/// One pin's relocation, with both locations already clipped to the grid
/// interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMove {
    /// Location before the move.
    pub old: PinLoc,
    /// Location after the move.
    pub new: PinLoc,
    /// Whether the pin drives the net.
    pub is_driver: bool,
}

/// One box form: builds, updates, costs, and commits per-net geometry.
pub trait BoundingBoxStrategy {
    /// The form implemented.
    fn kind(&self) -> BoundingBoxKind;

    /// Rebuilds the committed geometry of `net` from current pin locations.
    fn load_from_scratch(&mut self, netlist: &dyn PlacedNetlist, net: NetId, bounds: &GridBounds);

    /// Rebuilds the proposed geometry of `net` from current pin locations.
    fn propose_from_scratch(&mut self, netlist: &dyn PlacedNetlist, net: NetId, bounds: &GridBounds);

    /// Applies one pin move to the proposed geometry of `net`.
    ///
    /// With `from_committed` set, the committed geometry is first copied into
    /// the proposed slot. Returns `false` if the result cannot be derived
    /// incrementally; the proposed geometry is then unspecified and must be
    /// rebuilt with [`propose_from_scratch`](Self::propose_from_scratch).
    fn propose_pin_move(&mut self, net: NetId, from_committed: bool, mv: &PinMove) -> bool;

    /// Cost of the proposed geometry of `net`.
    fn proposed_cost(&self, net: NetId, factors: &ChanFactorTable) -> f64;

    /// Cost of the committed geometry of `net`.
    fn committed_cost(&self, net: NetId, factors: &ChanFactorTable) -> f64;

    /// Wirelength estimate of the committed geometry of `net`.
    fn committed_wirelength(&self, net: NetId) -> f64;

    /// Makes the proposed geometry of `net` the committed one.
    fn commit(&mut self, net: NetId);

    /// Whether the proposed and committed geometry of `net` are identical.
    fn proposal_matches_committed(&self, net: NetId) -> bool;

    /// Committed boxes of `net`: one for the cube form, one per layer otherwise.
    fn committed_boxes(&self, net: NetId) -> &[NetBox];

    /// Committed per-layer sink counts of `net`.
    fn committed_layer_sinks(&self, net: NetId) -> &[i32];

    /// Proposed boxes of `net`.
    fn proposed_boxes(&self, net: NetId) -> &[NetBox];

    /// Proposed per-layer sink counts of `net`.
    fn proposed_layer_sinks(&self, net: NetId) -> &[i32];
}

/// Creates the strategy for `kind`, sized for `num_nets` nets.
pub fn new_strategy(
    kind: BoundingBoxKind,
    num_nets: usize,
    num_layers: usize,
) -> Box<dyn BoundingBoxStrategy> {
    match kind {
        BoundingBoxKind::Cube => Box::new(CubeBoxes::new(num_nets, num_layers)),
        BoundingBoxKind::PerLayer => Box::new(PerLayerBoxes::new(num_nets, num_layers)),
    }
}

/// Flat committed and proposed storage shared by both box forms.
///
/// Net `n` owns boxes `n * boxes_per_net..` and sink counts
/// `n * num_layers..` in each buffer.
#[derive(Debug, Clone)]
pub(crate) struct BoxStore {
    boxes_per_net: usize,
    num_layers: usize,
    committed: Vec<NetBox>,
    proposed: Vec<NetBox>,
    committed_sinks: Vec<i32>,
    proposed_sinks: Vec<i32>,
}

impl BoxStore {
    pub(crate) fn new(num_nets: usize, boxes_per_net: usize, num_layers: usize) -> Self {
        Self {
            boxes_per_net,
            num_layers,
            committed: vec![NetBox::default(); num_nets * boxes_per_net],
            proposed: vec![NetBox::default(); num_nets * boxes_per_net],
            committed_sinks: vec![0; num_nets * num_layers],
            proposed_sinks: vec![0; num_nets * num_layers],
        }
    }

    fn boxes(&self, net: NetId) -> Range<usize> {
        let start = net.index() * self.boxes_per_net;
        start..start + self.boxes_per_net
    }

    fn sinks(&self, net: NetId) -> Range<usize> {
        let start = net.index() * self.num_layers;
        start..start + self.num_layers
    }

    pub(crate) fn committed(&self, net: NetId) -> (&[NetBox], &[i32]) {
        (&self.committed[self.boxes(net)], &self.committed_sinks[self.sinks(net)])
    }

    pub(crate) fn proposed(&self, net: NetId) -> (&[NetBox], &[i32]) {
        (&self.proposed[self.boxes(net)], &self.proposed_sinks[self.sinks(net)])
    }

    pub(crate) fn committed_mut(&mut self, net: NetId) -> (&mut [NetBox], &mut [i32]) {
        let (b, s) = (self.boxes(net), self.sinks(net));
        (&mut self.committed[b], &mut self.committed_sinks[s])
    }

    pub(crate) fn proposed_mut(&mut self, net: NetId) -> (&mut [NetBox], &mut [i32]) {
        let (b, s) = (self.boxes(net), self.sinks(net));
        (&mut self.proposed[b], &mut self.proposed_sinks[s])
    }

    /// Seeds the proposed slot of `net` with its committed geometry.
    pub(crate) fn begin_proposal(&mut self, net: NetId) {
        let (b, s) = (self.boxes(net), self.sinks(net));
        self.proposed[b.clone()].copy_from_slice(&self.committed[b]);
        self.proposed_sinks[s.clone()].copy_from_slice(&self.committed_sinks[s]);
    }

    pub(crate) fn commit(&mut self, net: NetId) {
        let (b, s) = (self.boxes(net), self.sinks(net));
        self.committed[b.clone()].copy_from_slice(&self.proposed[b]);
        self.committed_sinks[s.clone()].copy_from_slice(&self.proposed_sinks[s]);
    }

    pub(crate) fn proposal_matches(&self, net: NetId) -> bool {
        self.committed(net) == self.proposed(net)
    }
}
