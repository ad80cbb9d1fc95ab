//! Outbound side of a launch: the seam to the bot launch service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::{ErrorDetail, LaunchError},
    protocol::{StartBotRequest, StartBotResponse, START_BOT_PATH},
};
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait BotLaunchTransport: Send + Sync {
    async fn start_bot(&self, request: &StartBotRequest)
        -> Result<StartBotResponse, LaunchError>;
}

pub struct HttpBotLaunchTransport {
    http: Client,
    endpoint: Url,
}

impl HttpBotLaunchTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let endpoint = start_bot_endpoint(base_url)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolves `/start_bot` against the service base, keeping any path prefix.
pub fn start_bot_endpoint(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let base = Url::parse(&format!("{trimmed}/"))
        .with_context(|| format!("invalid bot launch service url '{base_url}'"))?;
    base.join(START_BOT_PATH.trim_start_matches('/'))
        .with_context(|| format!("failed to build start_bot url from '{base_url}'"))
}

#[async_trait]
impl BotLaunchTransport for HttpBotLaunchTransport {
    async fn start_bot(
        &self,
        request: &StartBotRequest,
    ) -> Result<StartBotResponse, LaunchError> {
        debug!(endpoint = %self.endpoint, "posting start_bot request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| LaunchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| LaunchError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorDetail>(&body)
                .ok()
                .map(|body| body.detail);
            warn!(status = status.as_u16(), ?detail, "start_bot rejected");
            return Err(LaunchError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed = serde_json::from_slice::<StartBotResponse>(&body)
            .map_err(|e| LaunchError::MalformedResponse(e.to_string()))?;
        if parsed.room_url.trim().is_empty() {
            return Err(LaunchError::MalformedResponse(
                "response carried an empty room_url".to_string(),
            ));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
