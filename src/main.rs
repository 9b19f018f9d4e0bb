use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cache_lab::{
    Geometry, RecordOutcome, Simulator, Summary, TraceFile,
    experiments::{self, ScenarioConfig, ScenarioResult},
};
use clap::Parser;
use log::info;

const EXAMPLES: &str = "\
Examples:
  csim -s 4 -E 1 -b 4 -t traces/yi.trace
  csim -v -s 8 -E 2 -b 4 -t traces/yi.trace";

#[derive(Parser, Debug)]
#[command(version, about = "Replay a Valgrind memory trace through an LRU cache", after_help = EXAMPLES)]
struct Args {
    #[arg(short = 's', value_name = "num", allow_negative_numbers = true, help = "Number of set index bits (2^s sets)")]
    set_bits: Option<i64>,
    #[arg(short = 'E', value_name = "num", allow_negative_numbers = true, help = "Number of lines per set")]
    lines_per_set: Option<i64>,
    #[arg(short = 'b', value_name = "num", allow_negative_numbers = true, help = "Number of block offset bits (2^b bytes per block)")]
    block_bits: Option<i64>,
    #[arg(short = 't', value_name = "file", help = "Trace file; repeat to replay several traces")]
    traces: Vec<PathBuf>,
    #[arg(short = 'v', help = "Print each record with its hit/miss/eviction outcome")]
    verbose: bool,
    #[arg(
        long,
        value_name = "path",
        help = "Also write \"hits misses evictions\" to this file; off by default, pass .csim_results for the cachelab driver"
    )]
    results_file: Option<PathBuf>,
    #[arg(long, value_delimiter = ',', value_name = "E,..", help = "Compare several lines-per-set values")]
    sweep_ways: Vec<usize>,
    #[arg(long, value_delimiter = ',', value_name = "b,..", help = "Compare several block offset widths")]
    sweep_block_bits: Vec<u32>,
    #[arg(long, value_delimiter = ',', value_name = "s,..", help = "Compare several set index widths")]
    sweep_set_bits: Vec<u32>,
}

impl Args {
    fn is_sweep(&self) -> bool {
        !(self.sweep_ways.is_empty()
            && self.sweep_block_bits.is_empty()
            && self.sweep_set_bits.is_empty())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let geometry = Geometry::from_options(args.set_bits, args.block_bits, args.lines_per_set)
        .context("run with -h for usage")?;
    if args.traces.is_empty() {
        bail!("missing required argument -t <file>");
    }
    if args.results_file.is_some() && (args.traces.len() > 1 || args.is_sweep()) {
        bail!("--results-file needs exactly one trace and no sweep");
    }
    info!("cache geometry {geometry}");

    let traces = load_traces(&args.traces)?;
    if args.is_sweep() {
        run_sweeps(&args, &geometry, &traces)
    } else {
        replay(&args, geometry, &traces)
    }
}

fn load_traces(paths: &[PathBuf]) -> Result<Vec<TraceFile>> {
    let mut traces = Vec::new();
    for path in paths {
        traces.push(TraceFile::load(path)?);
    }
    Ok(traces)
}

fn replay(args: &Args, geometry: Geometry, traces: &[TraceFile]) -> Result<()> {
    for trace in traces {
        let mut sim = Simulator::new(geometry)?;
        let stats = sim.run_trace_with(&trace.entries, |access, outcome| {
            if args.verbose && outcome != RecordOutcome::Skipped {
                println!("{access} {outcome}");
            }
        });
        info!("{}: {} cache accesses", trace.name, stats.accesses());

        let summary = Summary(stats);
        if traces.len() > 1 {
            println!("{}: {summary}", trace.name);
        } else {
            println!("{summary}");
        }
        if let Some(path) = &args.results_file {
            summary
                .write_results(path)
                .with_context(|| format!("Unable to write results to {}", path.display()))?;
        }
    }
    Ok(())
}

fn run_sweeps(args: &Args, geometry: &Geometry, traces: &[TraceFile]) -> Result<()> {
    if !args.sweep_ways.is_empty() {
        let scenarios = experiments::set_associative(geometry, &args.sweep_ways)?;
        print_section("Set-Associative Sweep", &scenarios, traces)?;
    }
    if !args.sweep_block_bits.is_empty() {
        let scenarios = experiments::block_sizes(geometry, &args.sweep_block_bits)?;
        print_section("Block Size Sweep", &scenarios, traces)?;
    }
    if !args.sweep_set_bits.is_empty() {
        let scenarios = experiments::set_counts(geometry, &args.sweep_set_bits)?;
        print_section("Set Count Sweep", &scenarios, traces)?;
    }
    Ok(())
}

fn print_section(title: &str, scenarios: &[ScenarioConfig], traces: &[TraceFile]) -> Result<()> {
    let results: Vec<ScenarioResult> = experiments::run_scenarios(traces, scenarios)?;
    println!("\n== {title} ==");
    for result in &results {
        print!("{result}");
    }
    Ok(())
}
