use std::time::Duration;
use anyhow::{anyhow, Result};
use log::{debug, error};
use reqwest::Client;

use crate::app_config::PlexConfig;

/// Minimal Plex client: fires a library refresh so newly written
/// subtitle files show up without waiting for a scheduled scan
#[derive(Debug)]
pub struct PlexClient {
    client: Client,
    host: String,
    port: u16,
    token: String,
}

impl PlexClient {
    /// Create a Plex client from its config section
    pub fn new(config: &PlexConfig) -> Self {
        PlexClient {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            host: config.host.clone(),
            port: config.port,
            token: config.token.clone(),
        }
    }

    /// Ask Plex to rescan all library sections
    pub async fn refresh_library(&self) -> Result<()> {
        let url = format!(
            "http://{}:{}/library/sections/all/refresh?X-Plex-Token={}",
            self.host, self.port, self.token
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach Plex: {}", e))?;

        if !response.status().is_success() {
            error!("Plex library refresh failed: HTTP {}", response.status());
            return Err(anyhow!(
                "Plex library refresh failed: HTTP {}",
                response.status()
            ));
        }

        debug!("Plex library refresh triggered");
        Ok(())
    }
}
