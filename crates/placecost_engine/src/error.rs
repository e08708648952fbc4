//! Engine error type.

use placecost_common::InternalError;
use std::fmt;

/// Which running cost total a drift check failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostKind {
    /// The bounding-box (wiring) cost.
    BoundingBox,
    /// The timing cost.
    Timing,
}

impl fmt::Display for CostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostKind::BoundingBox => write!(f, "bb_cost"),
            CostKind::Timing => write!(f, "timing_cost"),
        }
    }
}

/// Errors reported by the cost engine.
#[derive(Debug, thiserror::Error)]
pub enum CostError {
    /// The incrementally tracked total diverged from a full recomputation.
    #[error("{kind} drifted: recomputed {recomputed}, tracked {tracked}")]
    Drift {
        /// Which total diverged.
        kind: CostKind,
        /// Value held by the search loop.
        tracked: f64,
        /// Value obtained by recomputation.
        recomputed: f64,
    },

    /// The device has no routable interior to clip pins into.
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),

    /// A placement file could not be read or decoded.
    #[error("failed to load placement: {0}")]
    Load(String),

    /// An internal consistency check failed.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
