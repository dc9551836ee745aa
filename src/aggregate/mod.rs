//! Per-commune aggregation of matched stops.

use std::path::Path;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::Serialize;
use tracing::info;

use crate::spatial::Assignment;

/// Codes starting with these prefixes are overseas territories and keep a
/// three-character department prefix.
const OVERSEAS_PREFIXES: &[&str] = &["97", "98"];

/// One output row: how many stops resolved to a single commune.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommuneCount {
    pub composite_key: String,
    pub region_prefix: String,
    pub commune_code: String,
    pub commune_name: String,
    pub stop_count: u64,
}

/// Department prefix of an INSEE code: two characters, or three for the
/// overseas ranges.
pub fn department_prefix(code: &str) -> &str {
    let len = if OVERSEAS_PREFIXES.iter().any(|p| code.starts_with(p)) {
        3
    } else {
        2
    };
    code.get(..len).unwrap_or(code)
}

/// Group assignments by commune and count them.
///
/// Unassigned slots (stops outside the country or excluded as invalid) are
/// dropped here. Rows are sorted by count descending; ties are broken by
/// ascending code so reruns are byte-identical.
pub fn count_by_commune(assignments: &[Option<Assignment>]) -> Vec<CommuneCount> {
    let mut groups: HashMap<(String, String), u64> = HashMap::new();
    for assignment in assignments.iter().flatten() {
        let key = (
            assignment.commune.code.clone(),
            assignment.commune.name.clone(),
        );
        *groups.entry(key).or_insert(0) += 1;
    }

    let mut rows: Vec<CommuneCount> = groups
        .into_iter()
        .map(|((code, name), count)| {
            let prefix = department_prefix(&code);
            let composite_key = format!("{}-{}", prefix, code);
            CommuneCount {
                composite_key,
                region_prefix: prefix.to_string(),
                commune_code: code,
                commune_name: name,
                stop_count: count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.stop_count
            .cmp(&a.stop_count)
            .then_with(|| a.commune_code.cmp(&b.commune_code))
    });

    info!("{} communes with at least one stop", rows.len());
    rows
}

/// Write the aggregate rows to a UTF-8 CSV file.
pub fn write_csv(rows: &[CommuneCount], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Result saved to {}", path.display());
    Ok(())
}
