//! SecurityTrails domain source

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::REQUEST_TIMEOUT;
use crate::source::SubdomainSource;
use crate::Result;

pub struct SecurityTrails {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubdomainsResponse {
    #[serde(default)]
    subdomains: Vec<String>,
}

impl SecurityTrails {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl SubdomainSource for SecurityTrails {
    fn name(&self) -> &str {
        "securitytrails"
    }

    async fn discover(&self, domain: &str) -> Result<Vec<String>> {
        let Some(api_key) = &self.api_key else {
            debug!("securitytrails: no API key configured, skipping");
            return Ok(Vec::new());
        };

        let response: SubdomainsResponse = self
            .client
            .get(format!(
                "https://api.securitytrails.com/v1/domain/{}/subdomains",
                domain
            ))
            .header("APIKEY", api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // The API returns bare labels; qualify them against the apex
        let names = response
            .subdomains
            .iter()
            .map(|label| format!("{}.{}", label, domain))
            .collect();

        Ok(names)
    }
}
