//! crt.sh certificate transparency source
//!
//! Public CT log search, no credential required.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{is_subdomain_of, REQUEST_TIMEOUT};
use crate::source::SubdomainSource;
use crate::Result;

pub struct CrtSh {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    #[serde(default)]
    name_value: String,
}

impl CrtSh {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubdomainSource for CrtSh {
    fn name(&self) -> &str {
        "crtsh"
    }

    async fn discover(&self, domain: &str) -> Result<Vec<String>> {
        debug!(domain, "querying crt.sh");

        let entries: Vec<CrtShEntry> = self
            .client
            .get("https://crt.sh/")
            .query(&[("q", domain), ("output", "json")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // name_value packs multiple SANs separated by newlines
        let names = entries
            .iter()
            .flat_map(|entry| entry.name_value.split('\n'))
            .filter(|name| is_subdomain_of(name, domain))
            .map(str::to_string)
            .collect();

        Ok(names)
    }
}
