//! Harvest configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct HarvestConfig {
    pub api: ApiConfig,
    pub query: QueryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// SIRENE API base, e.g. "https://api.insee.fr/api-sirene/3.11".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Portal API key, sent as X-INSEE-Api-Key-Integration.
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    /// Validity date for the requested établissement periods, quoted
    /// "YYYY-MM-DD" in the TOML file.
    pub date: NaiveDate,
    /// Fields requested through the `champs` parameter.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    /// Records per page; the API caps this at 1000.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub path: PathBuf,
}

fn default_base_url() -> String {
    "https://api.insee.fr/api-sirene/3.11".to_string()
}

fn default_fields() -> Vec<String> {
    vec![
        "activitePrincipaleEtablissement".to_string(),
        "codeCommuneEtablissement".to_string(),
        "libelleCommuneEtablissement".to_string(),
    ]
}

fn default_page_size() -> u32 {
    1000
}

impl HarvestConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: HarvestConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: HarvestConfig = toml::from_str(
            r#"
            [api]
            api_key = "secret"

            [query]
            date = "2023-01-01"

            [output]
            path = "etablissements.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.insee.fr/api-sirene/3.11");
        assert_eq!(config.query.page_size, 1000);
        assert_eq!(config.query.fields.len(), 3);
        assert_eq!(
            config.query.date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
        assert_eq!(config.output.path, PathBuf::from("etablissements.csv"));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let result: std::result::Result<HarvestConfig, _> = toml::from_str(
            r#"
            [api]

            [query]
            date = "2023-01-01"

            [output]
            path = "etablissements.csv"
            "#,
        );
        assert!(result.is_err());
    }
}
