//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use placecost_config::{BoundingBoxType, CostConfig};
use placecost_engine::{BlockId, BlockLoc, MoveRecord, NetId, Netlist, PlacedNetlist, UniformDevice};
use rand::rngs::StdRng;
use rand::Rng;

/// Config with the given box form and small-net threshold.
pub fn config(form: BoundingBoxType, small_net_threshold: usize) -> CostConfig {
    let mut config = CostConfig::default();
    config.cost.bounding_box = form;
    config.cost.small_net_threshold = small_net_threshold;
    config
}

fn random_loc(rng: &mut StdRng, dev: &UniformDevice) -> BlockLoc {
    BlockLoc {
        x: rng.gen_range(0..dev.width as i32),
        y: rng.gen_range(0..dev.height as i32),
        sub_tile: 0,
        layer: rng.gen_range(0..dev.layers as i32),
    }
}

/// Random placement: blocks anywhere on the grid (perimeter included), nets
/// with a random driver, up to `max_fanout` sinks, and pin offsets in -1..=1.
pub fn random_netlist(
    rng: &mut StdRng,
    dev: &UniformDevice,
    blocks: usize,
    nets: usize,
    max_fanout: usize,
) -> Netlist {
    let mut nl = Netlist::new();
    for i in 0..blocks {
        let loc = random_loc(rng, dev);
        nl.add_block(format!("b{i}"), loc);
    }
    for i in 0..nets {
        let net = nl.add_net(format!("n{i}"));
        let driver = BlockId::from_raw(rng.gen_range(0..blocks as u32));
        let offset = (rng.gen_range(-1..=1), rng.gen_range(-1..=1));
        nl.connect_driver(net, driver, offset);
        for _ in 0..rng.gen_range(0..=max_fanout) {
            let block = BlockId::from_raw(rng.gen_range(0..blocks as u32));
            let offset = (rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            nl.connect_sink(net, block, offset);
        }
    }
    nl
}

/// A single-block displacement within `rlim`, or (one time in four) a swap of
/// two blocks.
pub fn random_move(rng: &mut StdRng, nl: &Netlist, dev: &UniformDevice, rlim: i32) -> MoveRecord {
    let mut mv = MoveRecord::new();
    let count = nl.block_count() as u32;
    let a = BlockId::from_raw(rng.gen_range(0..count));
    let from = nl.block_loc(a);
    if count > 1 && rng.gen_bool(0.25) {
        let mut b = BlockId::from_raw(rng.gen_range(0..count));
        while b == a {
            b = BlockId::from_raw(rng.gen_range(0..count));
        }
        let other = nl.block_loc(b);
        mv.push(a, from, other);
        mv.push(b, other, from);
        return mv;
    }
    let to = BlockLoc {
        x: (from.x + rng.gen_range(-rlim..=rlim)).clamp(0, dev.width as i32 - 1),
        y: (from.y + rng.gen_range(-rlim..=rlim)).clamp(0, dev.height as i32 - 1),
        sub_tile: 0,
        layer: rng.gen_range(0..dev.layers as i32),
    };
    mv.push(a, from, to);
    mv
}

/// Every net ID of `nl`.
pub fn all_nets(nl: &Netlist) -> impl Iterator<Item = NetId> {
    (0..nl.net_count() as u32).map(NetId::from_raw)
}
