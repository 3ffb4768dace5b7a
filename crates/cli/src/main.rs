//! climb CLI - total climb and descent along line layers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use climb_algorithms::climb_provider;
use climb_algorithms::vector::climb::{
    INPUT, MAX_ELEVATION, MIN_ELEVATION, OUTPUT, TOTAL_CLIMB, TOTAL_DESCENT,
};
use climb_core::io::read_geojson;
use climb_core::processing::{Feedback, Outputs, ParamValue, Parameters};
use climb_core::vector::{FeatureSource, MemoryLayer, SinkDescriptor};

const ALGORITHM: &str = "climb:climbalongline";

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "climb")]
#[command(author, version, about = "Total climb and descent along lines", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available algorithms
    Algorithms,
    /// Show information about a GeoJSON line layer
    Info {
        /// Input GeoJSON file
        input: PathBuf,
    },
    /// Compute climb and descent along the lines of a layer with Z values
    AlongLine {
        /// Input GeoJSON file (lines with Z)
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Print the layer totals as JSON
        #[arg(long)]
        json: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set the default subscriber")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn read_lines(path: &Path) -> Result<MemoryLayer> {
    let pb = spinner("Reading layer...")?;
    let layer = read_geojson(path)
        .with_context(|| format!("Failed to read line layer {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} feature(s), {}", layer.len(), layer.geometry_type());
    Ok(layer)
}

fn format_elevation(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "undefined".to_string(),
    }
}

fn print_totals(outputs: &Outputs) {
    println!(
        "  Total climb:   {:.3}",
        outputs.number(TOTAL_CLIMB).unwrap_or(0.0)
    );
    println!(
        "  Total descent: {:.3}",
        outputs.number(TOTAL_DESCENT).unwrap_or(0.0)
    );
    println!("  Min elevation: {}", format_elevation(outputs.number(MIN_ELEVATION)));
    println!("  Max elevation: {}", format_elevation(outputs.number(MAX_ELEVATION)));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let provider = climb_provider().context("Failed to register algorithms")?;

    match cli.command {
        // ── Algorithms ───────────────────────────────────────────────
        Commands::Algorithms => {
            println!("{} ({})", provider.long_name(), provider.id());
            for alg in provider.list() {
                println!("  {:<24} {} [{}]", alg.id, alg.name, alg.group);
            }
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let layer = read_lines(&input)?;
            let geometry_type = layer.geometry_type();

            println!("File: {}", input.display());
            println!("Features: {}", layer.len());
            println!("Geometry: {}", geometry_type);
            println!("Has Z: {}", if geometry_type.has_z() { "yes" } else { "no" });
            if let Some(crs) = layer.crs() {
                println!("CRS: {}", crs);
            }
            println!("\nFields:");
            for field in layer.fields() {
                println!("  {:<20} {}", field.name, field.field_type);
            }
        }

        // ── Climb along line ─────────────────────────────────────────
        Commands::AlongLine {
            input,
            output,
            json,
        } => {
            let layer = read_lines(&input)?;
            let params = Parameters::new()
                .with(INPUT, ParamValue::Source(Rc::new(layer)))
                .with(OUTPUT, ParamValue::Sink(SinkDescriptor::GeoJson(output.clone())));

            let pb = progress_bar()?;
            let bar = pb.clone();
            let mut feedback = Feedback::new().with_progress(move |p| bar.set_position(u64::from(p)));

            let start = Instant::now();
            let result = provider.run(ALGORITHM, &params, &mut feedback);
            pb.finish_and_clear();
            let outputs = result.context("Failed to compute climb along line")?;
            let elapsed = start.elapsed();

            if json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                println!("Climb layer saved to: {}", output.display());
                print_totals(&outputs);
                println!("  Processing time: {:.2?}", elapsed);
            }
        }
    }

    Ok(())
}
