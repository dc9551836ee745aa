//! Header alias tables for the loosely standardised open-data inputs.
//!
//! Boundary and stop exports name the same columns differently depending on
//! the publisher. Resolution walks an ordered alias list and takes the first
//! alias with a case-insensitive header match, so the table order is the
//! priority order.

use thiserror::Error;

/// Recognised aliases for the INSEE commune code, in priority order.
pub const CODE_ALIASES: &[&str] = &["code", "code_insee", "codgeo", "insee"];

/// Recognised aliases for the commune display name, in priority order.
pub const NAME_ALIASES: &[&str] = &["nom", "name", "libelle", "nom_commune"];

/// Recognised aliases for the stop latitude column, in priority order.
pub const LAT_ALIASES: &[&str] = &["stop_lat", "lat", "latitude"];

/// Recognised aliases for the stop longitude column, in priority order.
pub const LON_ALIASES: &[&str] = &["stop_lon", "lon", "longitude"];

/// Raised when none of the aliases for a required column are present.
#[derive(Debug, Error)]
#[error("no {role} column found; available columns: {available:?}")]
pub struct ColumnError {
    pub role: &'static str,
    pub available: Vec<String>,
}

/// Resolve an alias list against the available headers, returning the index
/// of the matched header.
pub fn resolve(aliases: &[&str], available: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        available
            .iter()
            .position(|header| header.eq_ignore_ascii_case(alias))
    })
}

/// Like [`resolve`], but a miss is an error naming the missing role and
/// listing the headers that were actually present.
pub fn resolve_required(
    role: &'static str,
    aliases: &[&str],
    available: &[&str],
) -> Result<usize, ColumnError> {
    resolve(aliases, available).ok_or_else(|| ColumnError {
        role,
        available: available.iter().map(|s| s.to_string()).collect(),
    })
}
