//! `placecost cost` — full cost report for a serialized placement.

use std::path::Path;

use placecost_config::CostConfig;
use placecost_diagnostics::{Diagnostic, DiagnosticSink};
use placecost_engine::{
    CostError, CostMethod, CriticalityTable, DeviceGrid, ManhattanDelay, Netlist, PlacedNetlist,
    PlacementCostState, PlacerCosts, TimingInputs, UniformDevice,
};
use serde::{Deserialize, Serialize};

use crate::{CostArgs, GlobalArgs, ReportFormat};

/// On-disk placement: a device and a netlist placed on it.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacementFile {
    /// Device the netlist is placed on.
    pub device: UniformDevice,
    /// The placed netlist.
    pub netlist: Netlist,
}

/// Machine-readable result of `placecost cost`.
#[derive(Debug, Serialize)]
struct CostSummary {
    bounding_box: String,
    nets: usize,
    bb_cost: f64,
    wirelength: Option<f64>,
    timing_cost: Option<f64>,
    /// `(1 - tradeoff) * bb_cost + tradeoff * timing_cost`, with timing enabled.
    combined_cost: Option<f64>,
    diagnostics: Vec<Diagnostic>,
}

/// Reads and checks a placement file.
///
/// Every block must sit on the grid and every net must be well formed.
pub fn load_placement(path: &Path) -> Result<PlacementFile, CostError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CostError::Load(format!("{}: {e}", path.display())))?;
    let mut file: PlacementFile = serde_json::from_str(&content)
        .map_err(|e| CostError::Load(format!("{}: {e}", path.display())))?;
    file.netlist.rebuild_indices();
    file.netlist.validate().map_err(CostError::Load)?;

    let device = &file.device;
    if device.chan_x.len() != device.height() || device.chan_y.len() != device.width() {
        return Err(CostError::Load(format!(
            "device lists {} x-channels and {} y-channels for a {}x{} grid",
            device.chan_x.len(),
            device.chan_y.len(),
            device.width(),
            device.height()
        )));
    }
    for block in &file.netlist.blocks {
        let loc = block.loc;
        let on_grid = (0..device.width() as i32).contains(&loc.x)
            && (0..device.height() as i32).contains(&loc.y)
            && (0..device.num_layers() as i32).contains(&loc.layer);
        if !on_grid {
            return Err(CostError::Load(format!(
                "block '{}' at ({}, {}, layer {}) is off the device",
                block.name, loc.x, loc.y, loc.layer
            )));
        }
    }
    Ok(file)
}

/// Runs the `placecost cost` command.
///
/// Returns exit code 0 on success, 1 if any error diagnostic was emitted.
pub fn run(args: &CostArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.load_config()?;
    let placement = load_placement(Path::new(&args.placement))?;
    let (device, netlist) = (&placement.device, &placement.netlist);

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Costing {} ({} blocks, {} nets on {}x{}x{})",
            args.placement,
            netlist.block_count(),
            netlist.net_count(),
            device.width(),
            device.height(),
            device.num_layers()
        );
    }

    let sink = DiagnosticSink::new();
    let summary = summarize(&placement, &config, &sink)?;

    match args.format {
        ReportFormat::Text => {
            global.render_diagnostics(&summary.diagnostics);
            println!("bounding box form: {}", summary.bounding_box);
            println!("bb cost:           {:.6}", summary.bb_cost);
            if let Some(wl) = summary.wirelength {
                println!("wirelength:        {wl:.3}");
            }
            if let Some(td) = summary.timing_cost {
                println!("timing cost:       {td:.6}");
            }
            if let Some(total) = summary.combined_cost {
                println!("combined cost:     {total:.6}");
            }
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Builds the engine for `placement` and computes its costs.
fn summarize(
    placement: &PlacementFile,
    config: &CostConfig,
    sink: &DiagnosticSink,
) -> Result<CostSummary, CostError> {
    let (device, netlist) = (&placement.device, &placement.netlist);
    let mut state = PlacementCostState::new(netlist, device, config, sink)?;
    let report = state.compute_bb_cost(netlist, CostMethod::Check, sink);

    let timing_cost = if config.timing.enabled {
        let model = ManhattanDelay::default();
        let criticality = CriticalityTable::uniform(netlist, 1.0);
        let inputs = TimingInputs {
            delay: &model,
            criticality: &criticality,
        };
        Some(state.compute_timing_cost(netlist, inputs))
    } else {
        None
    };
    let combined_cost = timing_cost.map(|timing_cost| {
        PlacerCosts {
            bb_cost: report.total,
            timing_cost,
        }
        .combined(config.timing.tradeoff)
    });

    Ok(CostSummary {
        bounding_box: state.kind().to_string(),
        nets: netlist.net_count(),
        bb_cost: report.total,
        wirelength: report.wirelength,
        timing_cost,
        combined_cost,
        diagnostics: sink.take_all(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use placecost_engine::BlockLoc;

    fn sample() -> PlacementFile {
        let mut netlist = Netlist::new();
        let net = netlist.add_net("n");
        let d = netlist.add_block("d", BlockLoc::new(2, 2, 0));
        let s = netlist.add_block("s", BlockLoc::new(5, 4, 0));
        netlist.connect_driver(net, d, (0, 0));
        netlist.connect_sink(net, s, (0, 0));
        PlacementFile {
            device: UniformDevice::new(8, 8, 1, 2),
            netlist,
        }
    }

    fn write(file: &PlacementFile) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placement.json");
        std::fs::write(&path, serde_json::to_string(file).unwrap()).unwrap();
        (dir, path)
    }

    #[test]
    fn load_rebuilds_name_indices() {
        let (_dir, path) = write(&sample());
        let loaded = load_placement(&path).unwrap();
        assert!(loaded.netlist.net_by_name.contains_key("n"));
        assert_eq!(loaded.netlist.block_count(), 2);
    }

    #[test]
    fn load_rejects_off_grid_block() {
        let mut file = sample();
        file.netlist.blocks[1].loc = BlockLoc::new(9, 1, 0);
        let (_dir, path) = write(&file);
        let err = load_placement(&path).unwrap_err();
        assert!(err.to_string().contains("off the device"));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"device\": ").unwrap();
        assert!(matches!(load_placement(&path), Err(CostError::Load(_))));
    }

    #[test]
    fn run_reports_success() {
        let (dir, path) = write(&sample());
        let args = CostArgs {
            placement: path.display().to_string(),
            format: ReportFormat::Json,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.path().join("missing.toml").display().to_string()),
        };
        // A named config file that does not exist is an error.
        assert!(run(&args, &global).is_err());

        std::fs::write(dir.path().join("ok.toml"), "[timing]\nenabled = true\n").unwrap();
        let global = GlobalArgs {
            config: Some(dir.path().join("ok.toml").display().to_string()),
            ..global
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
    }

    #[test]
    fn combined_cost_weighs_timing_by_tradeoff() {
        let file = sample();
        let sink = DiagnosticSink::new();
        let without = summarize(&file, &CostConfig::default(), &sink).unwrap();
        assert_eq!(without.timing_cost, None);
        assert_eq!(without.combined_cost, None);

        let mut config = CostConfig::default();
        config.timing.enabled = true;
        config.timing.tradeoff = 0.25;
        let with = summarize(&file, &config, &sink).unwrap();
        let timing = with.timing_cost.unwrap();
        assert!(timing > 0.0);
        let expected = 0.75 * with.bb_cost + 0.25 * timing;
        assert!((with.combined_cost.unwrap() - expected).abs() < 1e-12);
    }
}
