//! Configuration types deserialized from `placecost.toml`.
//!
//! Every section and field is optional; omitted values take the defaults the
//! placer has always used (exponent 1, small-net threshold 4, 1% drift
//! tolerance).

use serde::Deserialize;

/// The top-level configuration parsed from `placecost.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostConfig {
    /// Bounding-box cost settings.
    pub cost: BbCostConfig,
    /// Timing-driven cost settings.
    pub timing: TimingConfig,
    /// Settings for the randomized self-check harness.
    pub stress: StressConfig,
}

/// Settings that shape the bounding-box cost function and its bookkeeping.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BbCostConfig {
    /// Exponent applied to the inverse average channel capacity.
    ///
    /// Larger values make narrow channels more expensive.
    pub place_cost_exp: f64,
    /// Nets with fewer sinks than this are rebuilt from scratch instead of
    /// being updated incrementally.
    pub small_net_threshold: usize,
    /// Which bounding-box representation to use for the whole run.
    pub bounding_box: BoundingBoxType,
    /// Relative tolerance for the periodic drift check.
    pub error_tolerance: f64,
}

impl Default for BbCostConfig {
    fn default() -> Self {
        Self {
            place_cost_exp: 1.0,
            small_net_threshold: 4,
            bounding_box: BoundingBoxType::Auto,
            error_tolerance: 0.01,
        }
    }
}

/// Bounding-box representation selection.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundingBoxType {
    /// Cube boxes on single-layer devices, per-layer boxes otherwise.
    #[default]
    Auto,
    /// One box spanning all layers, with per-layer sink counts.
    Cube,
    /// One 2D box per layer.
    PerLayer,
}

/// Timing-driven mode settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Whether connection delays are tracked alongside the bounding-box cost.
    pub enabled: bool,
    /// Weight of the timing cost in the combined cost, in `[0, 1]`.
    pub tradeoff: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tradeoff: 0.5,
        }
    }
}

/// Settings for the `stress` self-check harness.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StressConfig {
    /// Number of proposed moves.
    pub moves: usize,
    /// Moves between drift checks.
    pub recompute_interval: usize,
    /// Probability that a proposed move is accepted.
    pub accept_probability: f64,
    /// Maximum per-axis displacement of a proposed move.
    pub range_limit: u32,
    /// Seed for the move generator and the synthetic placement.
    pub seed: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            moves: 10_000,
            recompute_interval: 1_000,
            accept_probability: 0.5,
            range_limit: 8,
            seed: 1,
        }
    }
}
