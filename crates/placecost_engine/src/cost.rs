//! Net cost model: crossing count times span times channel factor.

use crate::bbox::NetBox;
use crate::chan_factor::ChanFactorTable;

/// Expected crossing counts for nets of 1 to 50 pins (ICCAD '94, pp. 690-695,
/// linearly interpolated). Entry `i` is the factor for `i + 1` pins.
const CROSS_COUNT: [f64; 50] = [
    1.0, 1.0, 1.0, 1.0828, 1.1536, 1.2206, 1.2823, 1.3385, 1.3991, 1.4493, 1.4974, 1.5455,
    1.5937, 1.6418, 1.6899, 1.7304, 1.7709, 1.8114, 1.8519, 1.8924, 1.9288, 1.9652, 2.0015,
    2.0379, 2.0743, 2.1061, 2.1379, 2.1698, 2.2016, 2.2334, 2.2646, 2.2958, 2.3271, 2.3583,
    2.3895, 2.4187, 2.4479, 2.4772, 2.5064, 2.5356, 2.5610, 2.5864, 2.6117, 2.6371, 2.6625,
    2.6887, 2.7148, 2.7410, 2.7671, 2.7933,
];

/// Crossing-count correction for a net with `pins` pins.
///
/// Table lookup up to 50 pins, linear extrapolation beyond.
pub fn crossing_count(pins: usize) -> f64 {
    if pins > 50 {
        2.7933 + 0.02616 * (pins - 50) as f64
    } else {
        CROSS_COUNT[pins.max(1) - 1]
    }
}

/// Cost of one box spanning `pins` pins.
pub(crate) fn box_cost(bb: &NetBox, pins: usize, factors: &ChanFactorTable) -> f64 {
    let crossing = crossing_count(pins);
    let xspan = f64::from(bb.xmax - bb.xmin + 1);
    let yspan = f64::from(bb.ymax - bb.ymin + 1);
    xspan * crossing * factors.x_factor(bb.ymax as usize, (bb.ymin - 1) as usize)
        + yspan * crossing * factors.y_factor(bb.xmax as usize, (bb.xmin - 1) as usize)
}

/// Wirelength estimate of one box spanning `pins` pins, without channel factors.
pub(crate) fn box_wirelength(bb: &NetBox, pins: usize) -> f64 {
    let crossing = crossing_count(pins);
    f64::from(bb.xmax - bb.xmin + 1) * crossing + f64::from(bb.ymax - bb.ymin + 1) * crossing
}
