//! Cert Spotter issuance source

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{is_subdomain_of, REQUEST_TIMEOUT};
use crate::source::SubdomainSource;
use crate::Result;

pub struct CertSpotter {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Issuance {
    #[serde(default)]
    dns_names: Vec<String>,
}

impl CertSpotter {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl SubdomainSource for CertSpotter {
    fn name(&self) -> &str {
        "certspotter"
    }

    async fn discover(&self, domain: &str) -> Result<Vec<String>> {
        let Some(api_key) = &self.api_key else {
            debug!("certspotter: no API key configured, skipping");
            return Ok(Vec::new());
        };

        let issuances: Vec<Issuance> = self
            .client
            .get("https://api.certspotter.com/v1/issuances")
            .query(&[
                ("domain", domain),
                ("include_subdomains", "true"),
                ("expand", "dns_names"),
            ])
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let names = issuances
            .iter()
            .flat_map(|issuance| issuance.dns_names.iter())
            .filter(|name| is_subdomain_of(name, domain))
            .cloned()
            .collect();

        Ok(names)
    }
}
