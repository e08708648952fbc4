//! Commit and rollback semantics of the move coordinator.

mod common;

use common::{all_nets, config, random_move, random_netlist};
use placecost_config::BoundingBoxType;
use placecost_diagnostics::DiagnosticSink;
use placecost_engine::{
    BlockId, BlockLoc, CriticalityTable, ManhattanDelay, MoveRecord, NetBox, NetId, NetUpdateStatus,
    Netlist, PlacedNetlist, PlacementCostState, PlacerCosts, TimingInputs, UniformDevice,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Snapshot = Vec<(Vec<NetBox>, Vec<i32>, u64)>;

fn snapshot(state: &PlacementCostState, nl: &Netlist) -> Snapshot {
    all_nets(nl)
        .map(|net| {
            (
                state.committed_boxes(net).to_vec(),
                state.committed_layer_sinks(net).to_vec(),
                state.net_cost(net).to_bits(),
            )
        })
        .collect()
}

#[test]
fn rollback_restores_committed_state_bit_for_bit() {
    for (form, layers) in [(BoundingBoxType::Cube, 2), (BoundingBoxType::PerLayer, 3)] {
        let mut rng = StdRng::seed_from_u64(31);
        let dev = UniformDevice::new(12, 12, layers, 2);
        let mut nl = random_netlist(&mut rng, &dev, 30, 20, 10);
        let sink = DiagnosticSink::new();
        let mut state = PlacementCostState::new(&nl, &dev, &config(form, 1), &sink).unwrap();
        let before = snapshot(&state, &nl);
        let total = state.bb_cost().to_bits();

        for _ in 0..300 {
            let mv = random_move(&mut rng, &nl, &dev, 6);
            nl.apply_move(&mv);
            state.evaluate(&nl, &mv, None);
            state.rollback();
            nl.revert_move(&mv);
            assert!(all_nets(&nl).all(|n| state.net_status(n) == NetUpdateStatus::Unmodified));
        }

        assert_eq!(snapshot(&state, &nl), before);
        assert_eq!(state.bb_cost().to_bits(), total);
        state.verify_against_scratch(&nl).unwrap();
    }
}

/// Ten blocks with ten pins each; pin `j` of every block is on net `j`.
fn shared_nets() -> (Netlist, Vec<BlockId>) {
    let mut nl = Netlist::new();
    let blocks: Vec<BlockId> = (0..10)
        .map(|i| nl.add_block(format!("b{i}"), BlockLoc::new(1 + i % 5, 1 + i / 5, 0)))
        .collect();
    for j in 0..10 {
        let net = nl.add_net(format!("n{j}"));
        nl.connect_driver(net, blocks[0], (0, 0));
        for &b in &blocks[1..] {
            nl.connect_sink(net, b, (0, 0));
        }
    }
    (nl, blocks)
}

#[test]
fn commit_applies_each_net_once() {
    let (mut nl, blocks) = shared_nets();
    let dev = UniformDevice::new(10, 10, 1, 3);
    let sink = DiagnosticSink::new();
    let cfg = config(BoundingBoxType::Cube, 4);
    let mut state = PlacementCostState::new(&nl, &dev, &cfg, &sink).unwrap();
    let mut costs = PlacerCosts {
        bb_cost: state.bb_cost(),
        timing_cost: 0.0,
    };

    let mut mv = MoveRecord::new();
    for (i, &b) in blocks.iter().enumerate() {
        let from = nl.block_loc(b);
        mv.push(b, from, BlockLoc::new(1 + (i as i32 * 3) % 8, 8 - i as i32 % 7, 0));
    }
    nl.apply_move(&mv);
    let outcome = state.evaluate(&nl, &mv, None);
    assert_eq!(outcome.affected_nets, 10);
    let mut affected = state.affected_nets().to_vec();
    affected.sort();
    affected.dedup();
    assert_eq!(affected.len(), 10);

    state.commit();
    costs.apply(&outcome);

    let fresh = PlacementCostState::new(&nl, &dev, &cfg, &sink).unwrap();
    for j in 0..10 {
        let net = NetId::from_raw(j);
        assert_eq!(state.committed_boxes(net), fresh.committed_boxes(net));
        assert_eq!(state.net_cost(net), fresh.net_cost(net));
    }
    assert!((costs.bb_cost - fresh.bb_cost()).abs() < 1e-9);
    state.verify_against_scratch(&nl).unwrap();
}

#[test]
#[should_panic(expected = "without a pending move")]
fn second_commit_panics() {
    let (mut nl, blocks) = shared_nets();
    let dev = UniformDevice::new(10, 10, 1, 3);
    let sink = DiagnosticSink::new();
    let mut state =
        PlacementCostState::new(&nl, &dev, &config(BoundingBoxType::Cube, 4), &sink).unwrap();
    let mut mv = MoveRecord::new();
    mv.push(blocks[3], nl.block(blocks[3]).loc, BlockLoc::new(7, 7, 0));
    nl.apply_move(&mv);
    state.evaluate(&nl, &mv, None);
    state.commit();
    state.commit();
}

#[test]
fn timing_totals_survive_random_moves() {
    let mut rng = StdRng::seed_from_u64(41);
    let dev = UniformDevice::new(12, 12, 2, 2);
    let mut nl = random_netlist(&mut rng, &dev, 25, 20, 6);
    let sink = DiagnosticSink::new();
    let mut cfg = config(BoundingBoxType::Auto, 4);
    cfg.timing.enabled = true;
    let mut state = PlacementCostState::new(&nl, &dev, &cfg, &sink).unwrap();

    let model = ManhattanDelay::default();
    let mut crit = CriticalityTable::uniform(&nl, 0.3);
    for net in all_nets(&nl) {
        if nl.net(net).sinks.len() > 1 {
            crit.set(net, 0, 0.9);
        }
    }
    let inputs = TimingInputs {
        delay: &model,
        criticality: &crit,
    };
    let mut costs = PlacerCosts {
        bb_cost: state.bb_cost(),
        timing_cost: state.compute_timing_cost(&nl, inputs),
    };

    for step in 1..=400 {
        let mv = random_move(&mut rng, &nl, &dev, 3);
        nl.apply_move(&mv);
        let outcome = state.evaluate(&nl, &mv, Some(inputs));
        if rng.gen_bool(0.5) {
            state.commit();
            costs.apply(&outcome);
        } else {
            state.rollback();
            nl.revert_move(&mv);
        }
        if step % 50 == 0 {
            state
                .recompute_costs_from_scratch(&nl, &mut costs, Some(inputs), &sink)
                .unwrap();
        }
    }
    assert!(!sink.has_errors());
}
