//! `placecost` — command-line driver for the incremental placement cost engine.
//!
//! Provides `placecost cost` to report the cost of a serialized placement and
//! `placecost stress` to run a randomized propose/accept/reject session that
//! cross-checks the incremental totals against full recomputation.

#![warn(missing_docs)]

mod cost;
mod stress;

use std::io::IsTerminal;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use placecost_config::{ConfigError, CostConfig};
use placecost_diagnostics::{Diagnostic, DiagnosticRenderer, Severity, TerminalRenderer};

/// Incremental placement cost engine.
#[derive(Parser, Debug)]
#[command(name = "placecost", version, about = "Incremental placement cost engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output, including note diagnostics.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `placecost.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report the bounding-box cost of a placement file.
    Cost(CostArgs),
    /// Drive random moves through the engine and cross-check its totals.
    Stress(StressArgs),
}

/// Arguments for `placecost cost`.
#[derive(Parser, Debug)]
pub struct CostArgs {
    /// JSON file holding a `device` and a `netlist`.
    pub placement: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `placecost stress`.
#[derive(Parser, Debug)]
pub struct StressArgs {
    /// Number of nets in the generated netlist.
    #[arg(long, default_value_t = 200)]
    pub nets: usize,

    /// Number of blocks in the generated netlist.
    #[arg(long, default_value_t = 150)]
    pub blocks: usize,

    /// Number of device layers.
    #[arg(long, default_value_t = 1)]
    pub layers: usize,

    /// Width and height of the square device grid.
    #[arg(long, default_value_t = 24)]
    pub grid: usize,

    /// Tracks per routing channel.
    #[arg(long, default_value_t = 8)]
    pub tracks: u32,

    /// Largest number of sinks on a generated net.
    #[arg(long, default_value_t = 16)]
    pub max_fanout: usize,

    /// Number of proposed moves (overrides `stress.moves`).
    #[arg(long)]
    pub moves: Option<usize>,

    /// Random seed (overrides `stress.seed`).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format for the run summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print notes and progress detail.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a configuration file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Loads the configuration named by `--config`, or `placecost.toml` in the
    /// current directory, or the defaults.
    pub fn load_config(&self) -> Result<CostConfig, ConfigError> {
        match &self.config {
            Some(path) => placecost_config::load_config_from_path(Path::new(path)),
            None => placecost_config::load_config(&std::env::current_dir()?),
        }
    }

    /// Prints diagnostics to stderr. Notes are shown only in verbose mode and
    /// everything but errors is hidden in quiet mode.
    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic]) {
        let renderer = TerminalRenderer::new(self.color);
        for diag in diagnostics {
            let shown = match diag.severity {
                Severity::Error => true,
                Severity::Warning => !self.quiet,
                Severity::Note => self.verbose && !self.quiet,
            };
            if shown {
                eprintln!("{}", renderer.render(diag));
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Cost(ref args) => cost::run(args, &global),
        Command::Stress(ref args) => stress::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
