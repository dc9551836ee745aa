//! Stops-per-commune spatial join pipeline.
//!
//! Downloads the commune contours when absent, loads the stop export,
//! assigns every stop to a commune (containment first, nearest-boundary
//! fallback second) and writes the per-commune counts.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use platane::aggregate;
use platane::boundaries::{self, DEFAULT_CONTOURS_URL};
use platane::spatial::{self, CommuneIndex};
use platane::stops;

#[derive(Parser, Debug)]
#[command(name = "join")]
#[command(about = "Count transit stops per commune via a spatial join")]
struct Args {
    /// Stop export to join (CSV with latitude/longitude columns)
    #[arg(short, long)]
    stops: PathBuf,

    /// Commune contours file, downloaded when absent
    #[arg(long, default_value = "communes-france.geojson")]
    contours: PathBuf,

    /// Contours download source
    #[arg(long, default_value = DEFAULT_CONTOURS_URL)]
    contours_url: String,

    /// Output CSV path
    #[arg(short, long, default_value = "stops_by_commune.csv")]
    output: PathBuf,

    /// Preview rows logged at the end of the run
    #[arg(long, default_value = "20")]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let run_start = Utc::now();

    info!("Stops-per-commune join");
    info!("Stops: {}", args.stops.display());

    // Download failures are not retried; tell the user how to recover by hand.
    if let Err(e) = boundaries::ensure_boundary_file(&args.contours, &args.contours_url).await {
        error!("Contours download failed: {:#}", e);
        error!("Download the file manually from {}", args.contours_url);
        error!(
            "then save it as {} (remove any partial file first) and rerun",
            args.contours.display()
        );
        return Err(e);
    }

    let communes = boundaries::load_communes(&args.contours)?;
    let commune_total = communes.len();

    let table = stops::load_stops(&args.stops)?;
    let source_stops = table.rows.len();

    let points = stops::build_points(&table);
    let index = CommuneIndex::build(communes);

    let (assignments, stats) = spatial::assign(&points, &index)?;

    let rows = aggregate::count_by_commune(&assignments);
    aggregate::write_csv(&rows, &args.output)?;

    // Summary
    let counted: u64 = rows.iter().map(|r| r.stop_count).sum();
    let resolved = stats.matched_direct + stats.fallback_assigned;
    info!("Stops resolved to a commune: {}/{}", resolved, stats.total);
    info!("Total stops in result: {}", counted);
    info!("Stops in source file: {}", source_stops);
    if source_stops > 0 {
        info!(
            "Matching rate: {:.1}%",
            counted as f64 / source_stops as f64 * 100.0
        );
    }
    info!("Communes with stops: {}", rows.len());
    info!(
        "Communes without stops: {}",
        commune_total.saturating_sub(rows.len())
    );
    if !rows.is_empty() {
        info!("Mean stops per commune: {:.1}", counted as f64 / rows.len() as f64);
        info!("Max: {} ({})", rows[0].stop_count, rows[0].commune_name);
    }

    info!("Top {} communes:", args.top.min(rows.len()));
    for row in rows.iter().take(args.top) {
        info!(
            "  {:<10} {:<40} {}",
            row.composite_key, row.commune_name, row.stop_count
        );
    }

    info!("Done in {} s", (Utc::now() - run_start).num_seconds());
    Ok(())
}
