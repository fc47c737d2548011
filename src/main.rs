use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::time::Duration;
use tokio::runtime::Builder;

use ripsim::config::TopologyConfig;
use ripsim::live::{self, LiveConfig};
use ripsim::report::render_table;
use ripsim::sim::Emulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Deterministic discrete-event simulation, reproducible per seed.
    Sim,
    /// Concurrent per-node send/receive loops over loopback UDP.
    Live,
}

#[derive(Parser)]
#[command(name = "ripsim", about = "Distance-vector routing protocol simulator")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Mode::Sim)]
    mode: Mode,

    /// Topology file (JSON). Defaults to the classic 4-node scenario.
    #[arg(long)]
    topology: Option<String>,

    /// Trace verbosity: 0 silent, 1 event delivery, 2 switching
    /// detail, 3 per-receive detail.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    trace: u8,

    /// Seed for the deterministic transport's timestamp perturbation.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Live mode: node N listens on base_port + N.
    #[arg(long, default_value_t = 21000)]
    base_port: u16,

    /// Live mode: stop after this many milliseconds without a table
    /// update anywhere in the network.
    #[arg(long, default_value_t = 500)]
    quiet_ms: u64,
}

fn trace_filter(trace: u8) -> LevelFilter {
    match trace {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(trace_filter(cli.trace))
        .init();

    let config = match &cli.topology {
        Some(path) => TopologyConfig::load_from_file(path)?,
        None => TopologyConfig::classic(),
    };
    let topology = config.build()?;

    let tables = match cli.mode {
        Mode::Sim => {
            let mut emulator = Emulator::new(&topology, cli.seed);
            emulator.run();
            println!("simulation quiescent at t={}", emulator.now());
            emulator.into_tables()
        }
        Mode::Live => {
            let live_config = LiveConfig {
                base_port: cli.base_port,
                quiet_period: Duration::from_millis(cli.quiet_ms),
            };
            let rt = Builder::new_multi_thread().enable_all().build()?;
            rt.block_on(live::run(&topology, &live_config))?
        }
    };

    for table in &tables {
        println!("{}", render_table(table));
    }

    Ok(())
}
