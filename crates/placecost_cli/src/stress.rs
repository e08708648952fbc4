//! `placecost stress` — randomized self-check of the incremental engine.
//!
//! Generates a legal random placement, then repeatedly proposes a uniform
//! range-limited move, evaluates it, and accepts or rejects it at random. At
//! every checkpoint the running totals are compared with a recomputation, the
//! committed boxes with a rebuild from pin locations, and the committed cost
//! with an independently constructed engine.

use std::collections::HashMap;

use placecost_config::CostConfig;
use placecost_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use placecost_engine::{
    BlockId, BlockLoc, CostMethod, CriticalityTable, ManhattanDelay, MoveRecord, NetId, Netlist,
    PlacedNetlist, PlacementCostState, PlacerCosts, TimingInputs, UniformDevice,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::{GlobalArgs, ReportFormat, StressArgs};

/// Relative agreement required between the running total and a fresh engine.
const REBUILD_TOLERANCE: f64 = 1e-9;

/// Proposes single-block moves within a fixed range limit, swapping with
/// whatever block occupies the target location.
pub struct UniformMoveGenerator {
    range_limit: i32,
    occupancy: HashMap<BlockLoc, BlockId>,
}

impl UniformMoveGenerator {
    /// Creates a generator for the current placement of `netlist`.
    pub fn new(netlist: &Netlist, range_limit: u32) -> Self {
        let occupancy = netlist.blocks.iter().map(|b| (b.loc, b.id)).collect();
        Self {
            range_limit: range_limit as i32,
            occupancy,
        }
    }

    /// Fills `mv` with a proposed move. Leaves it empty if the chosen target
    /// is the block's own location.
    pub fn propose(
        &self,
        rng: &mut StdRng,
        netlist: &Netlist,
        device: &UniformDevice,
        mv: &mut MoveRecord,
    ) {
        mv.clear();
        let block = BlockId::from_raw(rng.gen_range(0..netlist.block_count() as u32));
        let from = netlist.block_loc(block);
        let r = self.range_limit;
        let to = BlockLoc {
            x: rng.gen_range((from.x - r).max(0)..=(from.x + r).min(device.width as i32 - 1)),
            y: rng.gen_range((from.y - r).max(0)..=(from.y + r).min(device.height as i32 - 1)),
            sub_tile: 0,
            layer: rng.gen_range(0..device.layers as i32),
        };
        if to == from {
            return;
        }
        mv.push(block, from, to);
        if let Some(&occupant) = self.occupancy.get(&to) {
            mv.push(occupant, to, from);
        }
    }

    /// Records an accepted move.
    pub fn accept(&mut self, mv: &MoveRecord) {
        for moved in mv.blocks() {
            if self.occupancy.get(&moved.from) == Some(&moved.block) {
                self.occupancy.remove(&moved.from);
            }
        }
        for moved in mv.blocks() {
            self.occupancy.insert(moved.to, moved.block);
        }
    }
}

/// Generates `blocks` blocks on distinct grid locations and `nets` nets with
/// random drivers and up to `max_fanout` sinks.
pub fn generate_netlist(
    rng: &mut StdRng,
    device: &UniformDevice,
    blocks: usize,
    nets: usize,
    max_fanout: usize,
) -> Result<Netlist, String> {
    let mut sites: Vec<BlockLoc> = Vec::with_capacity(device.width * device.height * device.layers);
    for layer in 0..device.layers as i32 {
        for y in 0..device.height as i32 {
            for x in 0..device.width as i32 {
                sites.push(BlockLoc::new(x, y, layer));
            }
        }
    }
    if blocks == 0 || blocks > sites.len() {
        return Err(format!(
            "cannot place {blocks} blocks on {} sites",
            sites.len()
        ));
    }
    sites.shuffle(rng);

    let mut netlist = Netlist::new();
    for (i, &loc) in sites.iter().take(blocks).enumerate() {
        netlist.add_block(format!("blk{i}"), loc);
    }
    for i in 0..nets {
        let net = netlist.add_net(format!("net{i}"));
        let driver = BlockId::from_raw(rng.gen_range(0..blocks as u32));
        netlist.connect_driver(net, driver, (0, 0));
        for _ in 0..rng.gen_range(1..=max_fanout.max(1)) {
            let block = BlockId::from_raw(rng.gen_range(0..blocks as u32));
            netlist.connect_sink(net, block, (0, 0));
        }
    }
    Ok(netlist)
}

/// Outcome of a stress run.
#[derive(Debug, Default, Serialize)]
struct StressSummary {
    bounding_box: String,
    moves: usize,
    accepted: usize,
    rejected: usize,
    aborted: usize,
    checkpoints: usize,
    final_costs: PlacerCosts,
    /// Final costs weighted by `timing.tradeoff`, with timing enabled.
    combined_cost: Option<f64>,
    failures: Vec<Diagnostic>,
}

/// Runs the `placecost stress` command.
///
/// Returns exit code 0 if every checkpoint passed, 1 otherwise.
pub fn run(args: &StressArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = global.load_config()?;
    if let Some(moves) = args.moves {
        config.stress.moves = moves;
    }
    if let Some(seed) = args.seed {
        config.stress.seed = seed;
    }

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Stressing {} blocks, {} nets on {}x{}x{} for {} moves (seed {})",
            args.blocks,
            args.nets,
            args.grid,
            args.grid,
            args.layers,
            config.stress.moves,
            config.stress.seed
        );
    }

    let progress = global.verbose && !global.quiet;
    let (summary, diagnostics) = simulate(args, &config, progress)?;

    match args.format {
        ReportFormat::Text => {
            global.render_diagnostics(&diagnostics);
            if !global.quiet {
                eprintln!(
                    "    Finished {} moves ({} accepted, {} rejected, {} aborted), {} checkpoints",
                    summary.moves,
                    summary.accepted,
                    summary.rejected,
                    summary.aborted,
                    summary.checkpoints
                );
            }
            println!("form: {}", summary.bounding_box);
            println!("bb cost: {:.6}", summary.final_costs.bb_cost);
            if let Some(total) = summary.combined_cost {
                println!("timing cost: {:.6}", summary.final_costs.timing_cost);
                println!("combined cost: {total:.6}");
            }
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(if summary.failures.is_empty() { 0 } else { 1 })
}

/// Drives the random move sequence and returns the summary together with
/// every diagnostic emitted along the way.
fn simulate(
    args: &StressArgs,
    config: &CostConfig,
    progress: bool,
) -> Result<(StressSummary, Vec<Diagnostic>), Box<dyn std::error::Error>> {
    let device = UniformDevice::new(args.grid, args.grid, args.layers, args.tracks);
    let mut rng = StdRng::seed_from_u64(config.stress.seed);
    let mut netlist = generate_netlist(&mut rng, &device, args.blocks, args.nets, args.max_fanout)?;

    let sink = DiagnosticSink::new();
    let mut state = PlacementCostState::new(&netlist, &device, config, &sink)?;

    let model = ManhattanDelay::default();
    let criticality = random_criticality(&mut rng, &netlist);
    let timing = config.timing.enabled.then_some(TimingInputs {
        delay: &model,
        criticality: &criticality,
    });

    let mut costs = PlacerCosts {
        bb_cost: state.bb_cost(),
        timing_cost: match timing {
            Some(inputs) => state.compute_timing_cost(&netlist, inputs),
            None => 0.0,
        },
    };

    let mut generator = UniformMoveGenerator::new(&netlist, config.stress.range_limit);
    let mut mv = MoveRecord::new();
    let mut summary = StressSummary {
        bounding_box: state.kind().to_string(),
        moves: config.stress.moves,
        ..StressSummary::default()
    };

    for step in 1..=config.stress.moves {
        generator.propose(&mut rng, &netlist, &device, &mut mv);
        if mv.is_empty() {
            summary.aborted += 1;
        } else {
            netlist.apply_move(&mv);
            let outcome = state.evaluate(&netlist, &mv, timing);
            if rng.gen_bool(config.stress.accept_probability) {
                state.commit();
                costs.apply(&outcome);
                generator.accept(&mv);
                summary.accepted += 1;
            } else {
                state.rollback();
                netlist.revert_move(&mv);
                summary.rejected += 1;
            }
        }

        if step % config.stress.recompute_interval == 0 || step == config.stress.moves {
            summary.checkpoints += 1;
            let passed = checkpoint(&mut state, &netlist, &device, config, &mut costs, timing, &sink);
            if progress {
                eprintln!(
                    "   step {step}: bb_cost {:.6}, timing_cost {:.6}{}",
                    costs.bb_cost,
                    costs.timing_cost,
                    if passed { "" } else { " (FAILED)" }
                );
            }
            if !passed {
                break;
            }
        }
    }

    summary.final_costs = costs;
    summary.combined_cost = timing.map(|_| costs.combined(config.timing.tradeoff));
    let diagnostics = sink.take_all();
    summary.failures = diagnostics
        .iter()
        .filter(|d| d.severity.is_error())
        .cloned()
        .collect();
    Ok((summary, diagnostics))
}

fn random_criticality(rng: &mut StdRng, netlist: &Netlist) -> CriticalityTable {
    let mut table = CriticalityTable::uniform(netlist, 0.0);
    for i in 0..netlist.net_count() {
        let net = NetId::from_raw(i as u32);
        for sink_index in 0..netlist.net_sinks(net).len() {
            table.set(net, sink_index, rng.gen_range(0.0..=1.0));
        }
    }
    table
}

/// Cross-checks the engine at one checkpoint. Failures are emitted into
/// `sink`; returns whether every check passed.
fn checkpoint(
    state: &mut PlacementCostState,
    netlist: &Netlist,
    device: &UniformDevice,
    config: &CostConfig,
    costs: &mut PlacerCosts,
    timing: Option<TimingInputs<'_>>,
    sink: &DiagnosticSink,
) -> bool {
    if state
        .recompute_costs_from_scratch(netlist, costs, timing, sink)
        .is_err()
    {
        return false;
    }

    if let Err(e) = state.verify_against_scratch(netlist) {
        sink.emit(
            Diagnostic::error(DiagnosticCode::VERIFICATION_MISMATCH, e.message)
                .with_help("the incremental box update disagrees with a rebuild"),
        );
        return false;
    }

    // Notes from the independent engine are not part of the run's output.
    let scratch = DiagnosticSink::new();
    let rebuilt = match PlacementCostState::new(netlist, device, config, &scratch) {
        Ok(mut fresh) => fresh.compute_bb_cost(netlist, CostMethod::Check, &scratch).total,
        Err(e) => {
            sink.emit(Diagnostic::error(
                DiagnosticCode::VERIFICATION_MISMATCH,
                format!("independent engine failed: {e}"),
            ));
            return false;
        }
    };
    if (rebuilt - costs.bb_cost).abs() > REBUILD_TOLERANCE * rebuilt.abs().max(1.0) {
        sink.emit(
            Diagnostic::error(
                DiagnosticCode::VERIFICATION_MISMATCH,
                "committed bb_cost differs from an independent rebuild",
            )
            .with_note(format!("tracked {}, rebuilt {rebuilt}", costs.bb_cost)),
        );
        return false;
    }
    true
}
