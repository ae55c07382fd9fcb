//! Command-line driver exercising [`rrcf::Forest`] in the same two modes
//! as the reference trial runner: a streaming 1-D series and a batch
//! outlier sweep.

use std::f64::consts::PI;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rrcf::io;
use rrcf::rng::RrcfRng;
use rrcf::shingle::Shingler;
use rrcf::Forest;

#[derive(Parser)]
#[command(name = "rrcf-demo", about = "Robust Random Cut Forest demo driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream a 1-D series through a forest, scoring each shingled window.
    Streaming {
        /// Single-column CSV of the series; a synthetic sine wave with an
        /// injected anomaly is generated when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 40)]
        num_trees: usize,
        #[arg(long, default_value_t = 256)]
        tree_size: usize,
        #[arg(long, default_value_t = 4)]
        shingle_size: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "streaming.csv")]
        output: PathBuf,
    },
    /// Sample a fixed-size forest from a batch dataset and score every row.
    Batch {
        /// CSV of data rows; a synthetic two-cluster dataset is generated
        /// when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 100)]
        num_trees: usize,
        #[arg(long, default_value_t = 256)]
        tree_size: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "batch.csv")]
        output: PathBuf,
        #[arg(long, default_value_t = 99.5)]
        percentile: f64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Streaming { input, num_trees, tree_size, shingle_size, seed, output } => {
            run_streaming(input, num_trees, tree_size, shingle_size, seed, output)
        }
        Command::Batch { input, num_trees, tree_size, seed, output, percentile } => {
            run_batch(input, num_trees, tree_size, seed, output, percentile)
        }
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run_streaming(
    input: Option<PathBuf>,
    num_trees: usize,
    tree_size: usize,
    shingle_size: usize,
    seed: Option<u64>,
    output: PathBuf,
) -> Result<(), rrcf::Error> {
    let series = match input {
        Some(path) => io::read_vector(path)?,
        None => synthetic_sine_wave(),
    };

    let mut forest = Forest::new(num_trees, tree_size, shingle_size);
    if let Some(seed) = seed {
        forest = forest.with_seed(seed);
    }

    let mut shingler = Shingler::new(series.clone(), shingle_size.max(1));
    let mut rows = Vec::new();
    let mut scores = Vec::new();
    let mut index = 0usize;
    while let Some(window) = shingler.next_window() {
        let score = forest.update(index, &window)?;
        rows.push(vec![series[index]]);
        scores.push(score);
        index += 1;
    }

    log::info!("scored {} streaming points across {num_trees} trees", rows.len());
    io::write_scored_rows(&output, &rows, &scores)
}

fn run_batch(
    input: Option<PathBuf>,
    num_trees: usize,
    tree_size: usize,
    seed: Option<u64>,
    output: PathBuf,
    percentile: f64,
) -> Result<(), rrcf::Error> {
    let data = match input {
        Some(path) => io::read_matrix(path)?,
        None => synthetic_two_cluster_dataset(),
    };

    let mut forest = Forest::new(num_trees, tree_size, 0);
    if let Some(seed) = seed {
        forest = forest.with_seed(seed);
    }
    forest.train(&data);

    let scores = forest.score_all();
    let mut keys: Vec<usize> = scores.keys().copied().collect();
    keys.sort_unstable();

    let rows: Vec<Vec<f64>> = keys.iter().map(|&k| data[k].clone()).collect();
    let score_values: Vec<f64> = keys.iter().map(|&k| scores[&k]).collect();

    let cutoff = io::threshold(&score_values, percentile);
    log::info!(
        "scored {} of {} rows across {num_trees} trees; {percentile}th percentile threshold = {cutoff}",
        rows.len(),
        data.len()
    );

    io::write_scored_rows(&output, &rows, &score_values)
}

/// A 730-point sine wave with a plateau anomaly spliced into the middle,
/// matching the shape of the reference driver's streaming trial.
fn synthetic_sine_wave() -> Vec<f64> {
    let n = 730;
    let amplitude = 50.0;
    let center = 100.0;
    let phi = 30.0;
    let period = 2.0 * PI / 100.0;

    let mut series: Vec<f64> = (0..n)
        .map(|i| center + amplitude * ((i as f64) * period - phi * period).sin())
        .collect();
    for value in series.iter_mut().take(255).skip(235) {
        *value = 80.0;
    }
    series
}

/// A 2010x3 dataset with two offset clusters plus a thin sliver of
/// outliers, matching the shape of the reference driver's batch trial.
fn synthetic_two_cluster_dataset() -> Vec<Vec<f64>> {
    let n = 2010;
    let mut rng = RrcfRng::new(0);
    (0..n)
        .map(|i| {
            let base = if i < 1000 {
                5.0
            } else if i < 2000 {
                -5.0
            } else {
                0.0
            };
            (0..3).map(|_| base + rng.uniform(-0.01, 0.01)).collect()
        })
        .collect()
}
