//! SIRENE établissement dump.
//!
//! Walks the /siret listing with the cursor pagination scheme and appends
//! each page to a flat CSV. The next cursor is logged at every page so a
//! crashed run can be resumed with --resume-cursor.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use platane::sirene::{DumpWriter, EstablishmentRow, HarvestConfig, SireneClient};

/// The public API rate limit: pause after this many requests.
const REQUESTS_PER_WINDOW: u64 = 30;
/// Fixed pause once the window is exhausted.
const WINDOW_PAUSE: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "harvest")]
#[command(about = "Dump SIRENE établissement records to CSV")]
struct Args {
    /// Harvest configuration file
    #[arg(short, long, default_value = "sirene.toml")]
    config: PathBuf,

    /// Cursor to resume from after a crash (see the logged cursors)
    #[arg(long, default_value = "")]
    resume_cursor: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = HarvestConfig::load_from_file(&args.config)?;

    info!("SIRENE harvest");
    info!("Query date: {}", config.query.date);

    let client = SireneClient::new(&config.api)?;
    let mut writer = DumpWriter::append(&config.output.path)?;

    let mut cursor = args.resume_cursor.clone();
    let mut requests = 0u64;
    let mut rows_written = 0u64;

    loop {
        if requests > 0 && requests % REQUESTS_PER_WINDOW == 0 {
            info!("{} requests made, waiting for rate limit reset...", requests);
            tokio::time::sleep(WINDOW_PAUSE).await;
            info!("Resuming");
        }

        let page = client.fetch_page(&config.query, &cursor).await?;
        requests += 1;

        let rows: Vec<EstablishmentRow> = page
            .etablissements
            .iter()
            .map(EstablishmentRow::from_wire)
            .collect();
        writer.write_rows(&rows)?;
        rows_written += rows.len() as u64;

        // The logged cursor is the resume point if the next request dies.
        match page.next_cursor() {
            Some(next) => info!("Page {}: {} rows, next cursor {}", requests, rows.len(), next),
            None => info!("Page {}: {} rows, no next cursor", requests, rows.len()),
        }

        if page.is_last_page(&cursor) {
            break;
        }
        // is_last_page returned false, so a fresh cursor exists.
        cursor = page.next_cursor().unwrap_or_default().to_string();
    }

    info!(
        "Harvest finished: {} pages, {} rows -> {}",
        requests,
        rows_written,
        config.output.path.display()
    );
    Ok(())
}
