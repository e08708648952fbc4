//! From-scratch box construction by scanning every pin of a net.

use super::update::add_pin;
use super::NetBox;
use crate::device::GridBounds;
use crate::ids::NetId;
use crate::netlist::PlacedNetlist;

/// Builds the cube-form box of `net` and fills `layer_sinks` with the number
/// of sinks on each layer.
pub fn cube_from_scratch(
    netlist: &dyn PlacedNetlist,
    net: NetId,
    bounds: &GridBounds,
    layer_sinks: &mut [i32],
) -> NetBox {
    layer_sinks.fill(0);
    let driver = bounds.clip(netlist.pin_loc(netlist.net_driver(net)));
    let mut bb = NetBox::point(driver.x, driver.y);
    for &sink in netlist.net_sinks(net) {
        let loc = bounds.clip(netlist.pin_loc(sink));
        add_pin(&mut bb, loc.x, loc.y);
        layer_sinks[loc.layer as usize] += 1;
    }
    bb
}

/// Builds one box per layer for `net`.
///
/// Every layer's box starts at the driver's column and row, whatever layer the
/// driver is on, and then takes in that layer's sinks.
pub fn per_layer_from_scratch(
    netlist: &dyn PlacedNetlist,
    net: NetId,
    bounds: &GridBounds,
    boxes: &mut [NetBox],
    layer_sinks: &mut [i32],
) {
    layer_sinks.fill(0);
    let driver = bounds.clip(netlist.pin_loc(netlist.net_driver(net)));
    boxes.fill(NetBox::point(driver.x, driver.y));
    for &sink in netlist.net_sinks(net) {
        let loc = bounds.clip(netlist.pin_loc(sink));
        let layer = loc.layer as usize;
        add_pin(&mut boxes[layer], loc.x, loc.y);
        layer_sinks[layer] += 1;
    }
}
