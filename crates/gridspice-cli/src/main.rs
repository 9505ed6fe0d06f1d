//! Gridspice generation driver.
//!
//! Runs a fixed pool of independent workers, each with its own seeded
//! random stream, and appends one JSON record per successful circuit to a
//! shared output file. The record write and its progress-log line happen
//! under one lock so concurrent workers never interleave partial lines.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;

use gridspice_core::{BuildOptions, Circuit, CircuitStats};
use gridspice_gen::{enforce, sample_grid, GenConfig};
use gridspice_netlist::{generate, SpiceOptions};

#[derive(Parser)]
#[command(name = "gridspice")]
#[command(about = "Random grid-circuit generator emitting SPICE netlists", long_about = None)]
#[command(version)]
struct Cli {
    /// Total number of circuits to generate, split across workers
    #[arg(long, default_value_t = 1000)]
    gen_num: usize,

    /// Output JSON-lines file; a .txt progress log is written next to it
    #[arg(long, default_value = "circuits.jsonl")]
    save_path: PathBuf,

    /// Number of parallel workers
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Base seed; worker w draws from seed + w
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Construction attempts per circuit before it is skipped
    #[arg(long, default_value_t = 20)]
    max_retries: usize,

    /// Emit symbolic component names instead of numeric values
    #[arg(long)]
    symbolic: bool,

    /// Generate smaller circuits for faster downstream analysis
    #[arg(long)]
    simple_circuits: bool,

    /// Guarantee exactly one integrator op-amp in each circuit
    #[arg(long)]
    integrator: bool,

    /// Guarantee a reactive component and force AC analysis
    #[arg(long)]
    rlc: bool,

    /// Hide probe drawings except those controlling dependent sources
    #[arg(long = "no-meas")]
    no_meas: bool,
}

/// One dataset line. The `latex` field is filled by the diagram backend;
/// the driver leaves its placeholder empty.
#[derive(Serialize)]
struct Record {
    id: String,
    latex: String,
    spice: String,
    stat: CircuitStats,
}

/// The shared output stream: dataset records plus the progress log.
/// All access goes through one mutex so each record is atomic.
struct OutputStream {
    records: BufWriter<File>,
    log: BufWriter<File>,
}

impl OutputStream {
    fn create(save_path: &Path) -> Result<Self> {
        let records = File::create(save_path)
            .with_context(|| format!("failed to create {}", save_path.display()))?;
        let log_path = save_path.with_extension("txt");
        let log = File::create(&log_path)
            .with_context(|| format!("failed to create {}", log_path.display()))?;
        Ok(OutputStream {
            records: BufWriter::new(records),
            log: BufWriter::new(log),
        })
    }

    fn append(&mut self, record: &Record) -> Result<()> {
        writeln!(self.log, "{} valid, Saving {}...", record.id, record.id)?;
        serde_json::to_writer(&mut self.records, record)?;
        self.records.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.log.flush()?;
        self.records.flush()?;
        Ok(())
    }
}

fn build_config(cli: &Cli) -> GenConfig {
    let mut config = if cli.simple_circuits {
        GenConfig::simple()
    } else {
        GenConfig::default()
    };
    config.symbolic = cli.symbolic;
    config.integrator = cli.integrator;
    config.rlc = cli.rlc;
    config.no_meas = cli.no_meas;
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    config.validate().context("invalid generation configuration")?;

    let workers = cli.workers.max(1);
    let quota = cli.gen_num / workers;

    let stream = Mutex::new(OutputStream::create(&cli.save_path)?);
    let progress = MultiProgress::new();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to build worker pool")?;

    let skipped: usize = pool.install(|| {
        (1..=workers as u64)
            .into_par_iter()
            .map(|worker| run_worker(worker, quota, &cli, &config, &stream, &progress))
            .sum()
    });

    stream
        .lock()
        .expect("output stream lock")
        .flush()
        .context("failed to flush output")?;

    if skipped > 0 {
        eprintln!(
            "skipped {} circuits after exhausting {} attempts each",
            skipped, cli.max_retries
        );
    }

    let args = json!({
        "gen_num": cli.gen_num,
        "workers": workers,
        "seed": cli.seed,
        "symbolic": cli.symbolic,
        "simple_circuits": cli.simple_circuits,
        "integrator": cli.integrator,
        "rlc": cli.rlc,
        "no_meas": cli.no_meas,
    });
    aggregate_stats(&cli.save_path, args)?;

    Ok(())
}

/// Generate this worker's quota. Returns the number of circuits skipped
/// after retry exhaustion; nothing a worker hits may abort the pool, so
/// write failures are reported and counted rather than propagated.
fn run_worker(
    worker: u64,
    quota: usize,
    cli: &Cli,
    config: &GenConfig,
    stream: &Mutex<OutputStream>,
    progress: &MultiProgress,
) -> usize {
    let bar = progress.add(ProgressBar::new(quota as u64));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("worker {prefix} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_prefix(worker.to_string());

    let mut rng = StdRng::seed_from_u64(cli.seed + worker);
    let options = BuildOptions {
        force_ac: config.rlc,
    };
    let spice_options = SpiceOptions {
        symbolic: config.symbolic,
    };

    let mut produced = 0usize;
    let mut skipped = 0usize;

    for _ in 0..quota {
        let id = format!("{}_{}", worker, produced + 1);

        let mut circuit = None;
        for _ in 0..cli.max_retries {
            let Ok(mut grid) = sample_grid(config, &mut rng) else {
                continue;
            };
            enforce(&mut grid, config, &mut rng);
            if let Ok(built) = Circuit::build(grid, &options) {
                circuit = Some(built);
                break;
            }
        }
        let Some(circuit) = circuit else {
            skipped += 1;
            continue;
        };

        let spice = generate(&circuit, &spice_options);
        for note in &spice.notes {
            eprintln!("{}: {}", id, note);
        }
        let record = Record {
            id,
            latex: String::new(),
            spice: spice.text,
            stat: circuit.stats(),
        };

        let mut stream = stream.lock().expect("output stream lock");
        if let Err(err) = stream.append(&record) {
            eprintln!("worker {}: dropped record: {}", worker, err);
            skipped += 1;
            continue;
        }
        drop(stream);

        produced += 1;
        bar.inc(1);
    }

    bar.finish();
    skipped
}

/// Aggregate per-field statistics over the generated records into
/// `<save_path stem>_stat.json`.
fn aggregate_stats(save_path: &Path, args: serde_json::Value) -> Result<()> {
    let file = File::open(save_path)
        .with_context(|| format!("failed to reopen {}", save_path.display()))?;
    let reader = BufReader::new(file);

    let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(&line).context("malformed record line")?;
        let Some(stat) = value.get("stat").and_then(|s| s.as_object()) else {
            continue;
        };
        for (key, field) in stat {
            if let Some(x) = field.as_f64() {
                series.entry(key.clone()).or_default().push(x);
            }
        }
    }

    let mut results = serde_json::Map::new();
    results.insert("args".to_string(), args);
    for (key, values) in &series {
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count;
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        results.insert(
            key.clone(),
            json!({
                "mean": mean,
                "std": variance.sqrt(),
                "max": max,
                "min": min,
            }),
        );
    }

    let stem = save_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("circuits");
    let stat_path = save_path.with_file_name(format!("{}_stat.json", stem));
    let output = serde_json::to_string_pretty(&serde_json::Value::Object(results))?;
    std::fs::write(&stat_path, output)
        .with_context(|| format!("failed to write {}", stat_path.display()))?;
    Ok(())
}
