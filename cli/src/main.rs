mod config;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use cache_sim::{sim::Simulator, trace::Trace};
use clap::Parser;

use crate::config::GeometryConfig;

#[cfg(feature = "stat")]
use terminal_size::terminal_size;

/// replays a valgrind memory trace against a set-associative cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print the outcome of every access
    #[arg(short, long)]
    verbose: bool,
    /// Number of set index bits (number of sets is 2^s)
    #[arg(short = 's')]
    set_index_bits: Option<u32>,
    /// Associativity (number of lines per set)
    #[arg(short = 'E')]
    associativity: Option<usize>,
    /// Number of block bits (block size is 2^b)
    #[arg(short = 'b')]
    block_bits: Option<u32>,
    /// File path to the valgrind trace to replay
    #[arg(short = 't', long = "trace")]
    trace: PathBuf,
    /// File path to a JSON geometry; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }

    let file_config = match &args.config {
        Some(p) => GeometryConfig::deser(
            fs::File::open(p).with_context(|| format!("cannot open \"{}\"", p.display()))?,
        )?,
        None => GeometryConfig::default(),
    };
    let geometry = GeometryConfig {
        set_index_bits: args.set_index_bits,
        associativity: args.associativity,
        block_bits: args.block_bits,
    }
    .or(file_config)
    .into_geometry()?;
    log::info!("cache geometry: {geometry}");

    let trace = read_trace(&args.trace)?;
    log::info!("parsed {} accesses from {}", trace.len(), args.trace.display());

    let mut sim = Simulator::new(geometry);
    sim.run(&trace, |access, result| {
        if args.verbose {
            println!("{access} {result}");
        }
    });
    log::info!("finished simulation.");
    output_stat(&sim);

    let counters = sim.counters();
    if args.json {
        println!("{}", serde_json::to_string(&counters)?);
    } else {
        println!("{counters}");
    }
    Ok(())
}

fn read_trace(path: &Path) -> Result<Trace> {
    let trace_str = fs::read_to_string(path)
        .with_context(|| format!("cannot open \"{}\"", path.display()))?;
    Ok(Trace::parse(&trace_str)?)
}

#[cfg(not(feature = "stat"))]
fn output_stat(_: &Simulator) {}

#[cfg(feature = "stat")]
fn output_stat(sim: &Simulator) {
    let max_width = get_terminal_width().unwrap_or(120) as usize;
    log::info!("statistics:\n{}", sim.collect_stat().view(max_width));
}

#[cfg(feature = "stat")]
fn get_terminal_width() -> Option<u16> {
    terminal_size().map(|(w, _)| w.0.saturating_sub(20))
}
