//! Incremental bounding-box cost engine for simulated-annealing placement.
//!
//! The engine keeps, for every net, a bounding box over its pins together with
//! the number of pins lying on each edge of the box. When the search loop
//! proposes a move, [`PlacementCostState::evaluate`] updates the boxes of the
//! affected nets speculatively (usually in constant time per pin, falling back
//! to a full rescan when an edge loses its last pin) and returns the change in
//! cost. The loop then calls [`PlacementCostState::commit`] or
//! [`PlacementCostState::rollback`].
//!
//! The netlist, device grid, and timing estimators are collaborators reached
//! through the [`PlacedNetlist`], [`DeviceGrid`], [`DelayModel`], and
//! [`CriticalityProvider`] traits. Small reference implementations of each are
//! provided for tests and the command-line harness.

#![warn(missing_docs)]

pub mod bbox;
pub mod chan_factor;
pub mod cost;
pub mod device;
pub mod error;
pub mod ids;
pub mod moves;
pub mod netlist;
pub mod state;
pub mod timing;

pub use bbox::{BoundingBoxKind, NetBox, NetUpdateStatus};
pub use chan_factor::ChanFactorTable;
pub use cost::crossing_count;
pub use device::{DeviceGrid, GridBounds, UniformDevice};
pub use error::{CostError, CostKind};
pub use ids::{BlockId, NetId, PinId};
pub use moves::{MoveRecord, MovedBlock};
pub use netlist::{BlockLoc, Netlist, PinDirection, PinLoc, PlacedNetlist};
pub use state::{CostMethod, CostReport, MoveOutcome, PlacementCostState, PlacerCosts};
pub use timing::{CriticalityProvider, CriticalityTable, DelayModel, ManhattanDelay, TimingInputs};
