//! Censys certificate search source

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{is_subdomain_of, REQUEST_TIMEOUT};
use crate::source::SubdomainSource;
use crate::Result;

pub struct Censys {
    client: reqwest::Client,
    api_id: Option<String>,
    api_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CertificateResult>,
}

#[derive(Debug, Deserialize)]
struct CertificateResult {
    #[serde(default)]
    parsed: Option<ParsedCertificate>,
}

#[derive(Debug, Deserialize)]
struct ParsedCertificate {
    #[serde(default)]
    names: Vec<String>,
}

impl Censys {
    pub fn new(client: reqwest::Client, api_id: Option<String>, api_secret: Option<String>) -> Self {
        Self {
            client,
            api_id,
            api_secret,
        }
    }
}

#[async_trait]
impl SubdomainSource for Censys {
    fn name(&self) -> &str {
        "censys"
    }

    async fn discover(&self, domain: &str) -> Result<Vec<String>> {
        let (Some(api_id), Some(api_secret)) = (&self.api_id, &self.api_secret) else {
            debug!("censys: API credentials not configured, skipping");
            return Ok(Vec::new());
        };

        let response: SearchResponse = self
            .client
            .get("https://search.censys.io/api/v1/search/certificates")
            .query(&[
                ("q", format!("parsed.names: {}", domain).as_str()),
                ("fields", "parsed.names"),
                ("per_page", "100"),
            ])
            .basic_auth(api_id, Some(api_secret))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let names = response
            .results
            .iter()
            .filter_map(|result| result.parsed.as_ref())
            .flat_map(|parsed| parsed.names.iter())
            .filter(|name| is_subdomain_of(name, domain))
            .cloned()
            .collect();

        Ok(names)
    }
}
