//! Incremental boxes must always equal boxes rebuilt from the final pin
//! locations, for both box forms and any sequence of accepted and rejected
//! moves.

mod common;

use common::{all_nets, config, random_move, random_netlist};
use placecost_config::BoundingBoxType;
use placecost_diagnostics::DiagnosticSink;
use placecost_engine::{
    BlockLoc, BoundingBoxKind, MoveRecord, NetUpdateStatus, Netlist, PlacedNetlist, PlacementCostState,
    PlacerCosts, UniformDevice,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// Helper: drive a random annealing-like sequence and check every step
// ---------------------------------------------------------------------------

fn run_random_moves(form: BoundingBoxType, layers: usize, threshold: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let dev = UniformDevice::new(16, 12, layers, 4);
    let mut nl = random_netlist(&mut rng, &dev, 40, 30, 12);
    let sink = DiagnosticSink::new();
    let cfg = config(form, threshold);
    let mut state = PlacementCostState::new(&nl, &dev, &cfg, &sink).unwrap();
    let mut costs = PlacerCosts {
        bb_cost: state.bb_cost(),
        timing_cost: 0.0,
    };

    for step in 0..1500 {
        let mv = random_move(&mut rng, &nl, &dev, 4);
        nl.apply_move(&mv);
        let outcome = state.evaluate(&nl, &mv, None);
        if rng.gen_bool(0.6) {
            state.commit();
            costs.apply(&outcome);
        } else {
            state.rollback();
            nl.revert_move(&mv);
        }
        if step % 100 == 0 {
            state.verify_against_scratch(&nl).unwrap();
        }
    }

    state.verify_against_scratch(&nl).unwrap();
    let fresh = PlacementCostState::new(&nl, &dev, &cfg, &sink).unwrap();
    for net in all_nets(&nl) {
        assert_eq!(state.committed_boxes(net), fresh.committed_boxes(net), "net {net}");
        assert_eq!(
            state.committed_layer_sinks(net),
            fresh.committed_layer_sinks(net),
            "net {net}"
        );
    }
    let expected = fresh.bb_cost();
    assert!(
        (costs.bb_cost - expected).abs() <= 1e-9 * expected.max(1.0),
        "tracked {} vs rebuilt {expected}",
        costs.bb_cost
    );
    state
        .recompute_costs_from_scratch(&nl, &mut costs, None, &sink)
        .unwrap();
    assert!(!sink.has_errors());
}

#[test]
fn cube_matches_rebuild_single_layer() {
    run_random_moves(BoundingBoxType::Cube, 1, 1, 11);
}

#[test]
fn cube_matches_rebuild_multi_layer() {
    run_random_moves(BoundingBoxType::Cube, 3, 1, 12);
}

#[test]
fn per_layer_matches_rebuild() {
    run_random_moves(BoundingBoxType::PerLayer, 3, 1, 13);
}

#[test]
fn per_layer_matches_rebuild_single_layer() {
    run_random_moves(BoundingBoxType::PerLayer, 1, 1, 14);
}

#[test]
fn default_small_net_threshold_matches_rebuild() {
    run_random_moves(BoundingBoxType::Auto, 1, 4, 15);
    run_random_moves(BoundingBoxType::Auto, 2, 4, 16);
}

// ---------------------------------------------------------------------------
// Interior moves
// ---------------------------------------------------------------------------

/// A wide net with sinks at the corners of every layer and one sink strictly
/// inside. Moving the inner sink within its layer's interior must leave every
/// box, edge count and sink count unchanged.
fn check_interior_move(form: BoundingBoxType, layers: usize) {
    let dev = UniformDevice::new(12, 12, layers, 2);
    let mut nl = Netlist::new();
    let net = nl.add_net("wide");
    let corners = [(2, 2), (9, 2), (2, 9), (9, 9)];
    let d = nl.add_block("d", BlockLoc::new(5, 5, 0));
    nl.connect_driver(net, d, (0, 0));
    for layer in 0..layers as i32 {
        for (i, &(x, y)) in corners.iter().enumerate() {
            let b = nl.add_block(format!("c{layer}_{i}"), BlockLoc::new(x, y, layer));
            nl.connect_sink(net, b, (0, 0));
        }
    }
    let inner = nl.add_block("inner", BlockLoc::new(4, 6, 0));
    nl.connect_sink(net, inner, (0, 0));

    let sink = DiagnosticSink::new();
    let mut state = PlacementCostState::new(&nl, &dev, &config(form, 4), &sink).unwrap();
    let committed = state.committed_boxes(net).to_vec();
    let layer_sinks = state.committed_layer_sinks(net).to_vec();

    let mut mv = MoveRecord::new();
    mv.push(inner, BlockLoc::new(4, 6, 0), BlockLoc::new(7, 3, 0));
    nl.apply_move(&mv);
    let outcome = state.evaluate(&nl, &mv, None);
    assert_eq!(outcome.bb_delta, 0.0);
    assert_eq!(state.net_status(net), NetUpdateStatus::SpeculativelyUpdated);
    assert_eq!(state.proposed_boxes(net), committed.as_slice());
    state.commit();
    assert_eq!(state.committed_boxes(net), committed.as_slice());
    assert_eq!(state.committed_layer_sinks(net), layer_sinks.as_slice());
}

#[test]
fn interior_move_changes_nothing() {
    check_interior_move(BoundingBoxType::Cube, 1);
}

#[test]
fn interior_move_changes_nothing_per_layer() {
    check_interior_move(BoundingBoxType::PerLayer, 2);
}

// ---------------------------------------------------------------------------
// Cube and per-layer agree on a single layer
// ---------------------------------------------------------------------------

#[test]
fn forms_agree_on_single_layer() {
    let mut rng = StdRng::seed_from_u64(21);
    let dev = UniformDevice::new(14, 14, 1, 3);
    let mut nl = random_netlist(&mut rng, &dev, 30, 25, 8);
    let sink = DiagnosticSink::new();
    let mut cube =
        PlacementCostState::new(&nl, &dev, &config(BoundingBoxType::Cube, 1), &sink).unwrap();
    let mut layered =
        PlacementCostState::new(&nl, &dev, &config(BoundingBoxType::PerLayer, 1), &sink).unwrap();
    assert_eq!(cube.kind(), BoundingBoxKind::Cube);
    assert_eq!(layered.kind(), BoundingBoxKind::PerLayer);

    for net in all_nets(&nl) {
        assert_eq!(cube.net_cost(net), layered.net_cost(net), "net {net}");
    }

    for _ in 0..500 {
        let mv = random_move(&mut rng, &nl, &dev, 5);
        nl.apply_move(&mv);
        let a = cube.evaluate(&nl, &mv, None);
        let b = layered.evaluate(&nl, &mv, None);
        assert!((a.bb_delta - b.bb_delta).abs() < 1e-9);
        assert_eq!(a.affected_nets, b.affected_nets);
        cube.commit();
        layered.commit();
    }
    assert!((cube.bb_cost() - layered.bb_cost()).abs() < 1e-6);
    assert_eq!(nl.net_count(), 25);
}
