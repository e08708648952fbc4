//! Incremental edits of a single [`NetBox`].
//!
//! Each function either produces the exact new box and edge counts or reports
//! that the box cannot be derived without rescanning the net, which happens
//! when a pin leaves an edge it was the only occupant of.

use super::NetBox;

/// Moves one coordinate of a pin along an axis.
///
/// Returns `false` if the pin was the last one on the edge it is leaving.
fn shift_axis(
    min: &mut i32,
    min_edge: &mut u32,
    max: &mut i32,
    max_edge: &mut u32,
    old: i32,
    new: i32,
) -> bool {
    if new < old {
        if old == *max {
            if *max_edge == 1 {
                return false;
            }
            *max_edge -= 1;
        }
        if new < *min {
            *min = new;
            *min_edge = 1;
        } else if new == *min {
            *min_edge += 1;
        }
    } else if new > old {
        if old == *min {
            if *min_edge == 1 {
                return false;
            }
            *min_edge -= 1;
        }
        if new > *max {
            *max = new;
            *max_edge = 1;
        } else if new == *max {
            *max_edge += 1;
        }
    }
    true
}

/// Moves a pin already counted in `cur` from `old` to `new`.
///
/// Returns `None` when a rescan is required.
pub fn shift_pin(cur: &NetBox, old: (i32, i32), new: (i32, i32)) -> Option<NetBox> {
    let mut bb = *cur;
    let x_ok = shift_axis(
        &mut bb.xmin,
        &mut bb.xmin_edge,
        &mut bb.xmax,
        &mut bb.xmax_edge,
        old.0,
        new.0,
    );
    if !x_ok {
        return None;
    }
    let y_ok = shift_axis(
        &mut bb.ymin,
        &mut bb.ymin_edge,
        &mut bb.ymax,
        &mut bb.ymax_edge,
        old.1,
        new.1,
    );
    y_ok.then_some(bb)
}

fn include(min: &mut i32, min_edge: &mut u32, max: &mut i32, max_edge: &mut u32, v: i32) {
    if v < *min {
        *min = v;
        *min_edge = 1;
    } else if v == *min {
        *min_edge += 1;
    }
    if v > *max {
        *max = v;
        *max_edge = 1;
    } else if v == *max {
        *max_edge += 1;
    }
}

/// Adds a pin at `(x, y)` to `bb`, growing it if needed.
pub fn add_pin(bb: &mut NetBox, x: i32, y: i32) {
    include(&mut bb.xmin, &mut bb.xmin_edge, &mut bb.xmax, &mut bb.xmax_edge, x);
    include(&mut bb.ymin, &mut bb.ymin_edge, &mut bb.ymax, &mut bb.ymax_edge, y);
}

fn exclude(min: i32, min_edge: &mut u32, max: i32, max_edge: &mut u32, v: i32) -> bool {
    if v == min {
        if *min_edge == 1 {
            return false;
        }
        *min_edge -= 1;
    }
    if v == max {
        if *max_edge == 1 {
            return false;
        }
        *max_edge -= 1;
    }
    true
}

/// Removes a pin at `(x, y)` from `cur`.
///
/// The min and max edge of each axis are checked independently, so a
/// degenerate axis loses one pin from both. Returns `None` when a rescan is
/// required.
pub fn remove_pin(cur: &NetBox, x: i32, y: i32) -> Option<NetBox> {
    let mut bb = *cur;
    let ok = exclude(bb.xmin, &mut bb.xmin_edge, bb.xmax, &mut bb.xmax_edge, x)
        && exclude(bb.ymin, &mut bb.ymin_edge, bb.ymax, &mut bb.ymax_edge, y);
    ok.then_some(bb)
}
