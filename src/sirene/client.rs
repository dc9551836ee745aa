//! Cursor-paginated SIRENE API client.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::config::{ApiConfig, QueryConfig};
use super::records::SiretResponse;

/// Header carrying the portal API key.
const API_KEY_HEADER: &str = "X-INSEE-Api-Key-Integration";

pub struct SireneClient {
    client: Client,
    siret_url: Url,
    api_key: String,
}

impl SireneClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("platane/0.1 (French open-data batch tools)")
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        let siret_url = Url::parse(&format!("{}/siret", api.base_url.trim_end_matches('/')))
            .context("Invalid SIRENE base URL")?;

        Ok(Self {
            client,
            siret_url,
            api_key: api.api_key.clone(),
        })
    }

    /// Fetch one page of the /siret listing at the given cursor.
    ///
    /// A failed request is not retried; the caller's last logged cursor is
    /// the resume point.
    pub async fn fetch_page(&self, query: &QueryConfig, cursor: &str) -> Result<SiretResponse> {
        debug!("GET {} curseur={}", self.siret_url, cursor);

        let response = self
            .client
            .get(self.siret_url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[
                ("date", query.date.format("%Y-%m-%d").to_string()),
                ("champs", query.fields.join(",")),
                ("nombre", query.page_size.to_string()),
                ("curseur", cursor.to_string()),
            ])
            .send()
            .await
            .context("SIRENE request failed")?
            .error_for_status()
            .context("SIRENE returned an error status")?;

        let page: SiretResponse = response
            .json()
            .await
            .context("Failed to decode SIRENE response")?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siret_url_tolerates_trailing_slash() {
        let api = ApiConfig {
            base_url: "https://api.insee.fr/api-sirene/3.11/".to_string(),
            api_key: "k".to_string(),
        };
        let client = SireneClient::new(&api).unwrap();
        assert_eq!(
            client.siret_url.as_str(),
            "https://api.insee.fr/api-sirene/3.11/siret"
        );
    }
}
