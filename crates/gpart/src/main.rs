use clap::Parser;
use common::io::{read_csrrg, write_csrrg_binary, write_csrrg_text, OutputFormat};
use partitioner::{refine, region_growing, Graph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

pub(crate) mod stats;

/// Partitions a CSRRG graph into connected, roughly equal-sized parts.
#[derive(Debug, Parser)]
#[command(name = "gpart")]
struct Cli {
    /// Number of parts to produce.
    parts: usize,
    /// Balance tolerance as a percentage in (0, 100].
    accuracy: f64,
    /// Input graph in CSRRG text format.
    input: PathBuf,
    /// Base name for the output files; defaults to the input path.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Which output encodings to write.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    /// Keep going when the initial partition misses the balance tolerance.
    #[arg(long)]
    force: bool,
    /// Iteration budget for the refinement stage.
    #[arg(long, default_value_t = 100)]
    max_iterations: usize,
    /// Print statistics about the final partition.
    #[arg(long)]
    stats: bool,
    /// Seed for the region-growing RNG; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    log_level: Option<Level>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(level) = cli.log_level {
        FmtSubscriber::builder().with_max_level(level).finish().init();
    }

    if !(cli.accuracy > 0.0 && cli.accuracy <= 100.0) {
        return Err(format!("accuracy must lie in (0, 100], got {}", cli.accuracy).into());
    }
    let accuracy = cli.accuracy / 100.0;

    let start = Instant::now();
    let (input_graph, layout) = read_csrrg(&cli.input)?;
    let t_read = start.elapsed();

    let mut graph = Graph::from_petgraph(&input_graph);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let start = Instant::now();
    let (mut partition, balanced) = region_growing(&mut graph, cli.parts, accuracy, &mut rng)?;
    let t_grow = start.elapsed();

    if !balanced && !cli.force {
        return Err("initial partition missed the balance tolerance (pass --force to keep going)".into());
    }

    let start = Instant::now();
    let summary = refine(&mut graph, &mut partition, cli.max_iterations)?;
    let t_refine = start.elapsed();

    let members: Vec<Vec<u32>> = (0..partition.num_parts())
        .map(|p| partition.members(p.into()).iter().map(|&v| u32::from(v)).collect())
        .collect();
    let base = cli.output.unwrap_or_else(|| cli.input.clone());

    let start = Instant::now();
    if matches!(cli.format, OutputFormat::Text | OutputFormat::Both) {
        write_csrrg_text(base.with_extension("part.csrrg"), &layout, &input_graph, &members)?;
    }
    if matches!(cli.format, OutputFormat::Binary | OutputFormat::Both) {
        write_csrrg_binary(base.with_extension("part.bin"), &layout, &input_graph, &members)?;
    }
    let t_write = start.elapsed();

    if cli.stats {
        let timings = Timings { read: t_read, grow: t_grow, refine: t_refine, write: t_write };
        stats::print_statistics(&graph, &partition, cli.parts, accuracy, &summary, &timings);
    }
    Ok(())
}

pub(crate) struct Timings {
    pub(crate) read: Duration,
    pub(crate) grow: Duration,
    pub(crate) refine: Duration,
    pub(crate) write: Duration,
}
