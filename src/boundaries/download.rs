//! Commune contours download (fetch-if-absent).

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Default source for the commune contours (data.gouv.fr mirror of the
/// OpenStreetMap communal boundaries).
pub const DEFAULT_CONTOURS_URL: &str =
    "https://raw.githubusercontent.com/gregoiredavid/france-geojson/master/communes.geojson";

/// Make sure the boundary file exists locally, downloading it when absent.
///
/// An existing file is trusted as-is, which doubles as the coarse resume
/// point after a failed run. Download failures bubble up to the caller and
/// may leave a partial file behind.
pub async fn ensure_boundary_file(path: &Path, url: &str) -> Result<()> {
    if path.exists() {
        info!("Boundary file {} already present", path.display());
        return Ok(());
    }

    info!("Downloading commune contours (~50 MB) from {}", url);

    let client = reqwest::Client::builder()
        .user_agent("platane/0.1 (French open-data batch tools)")
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to reach the contours server")?
        .error_for_status()
        .context("Contours server returned an error status")?;

    let pb = match response.content_length() {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
                    )?
                    .progress_chars("#>-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!("Contours downloaded and saved to {}", path.display());
    Ok(())
}
