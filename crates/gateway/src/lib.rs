use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::domain::ActuatorState;
use thiserror::Error;
use tracing::info;
use url::Url;

pub const DEFAULT_ACTUATOR_URL: &str = "https://agent.electricimp.com/FlA7isVKL8K-";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("actuator endpoint '{0}' cannot carry query parameters")]
    InvalidEndpoint(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Relays actuator state changes to the remote agent.
///
/// Implementations report the agent's textual reply; callers only log it.
#[async_trait]
pub trait ActuatorGateway: Send + Sync {
    async fn set_state(&self, state: ActuatorState) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: Url,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct HttpActuatorGateway {
    http: Client,
    endpoint: Url,
}

impl HttpActuatorGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.endpoint.cannot_be_a_base() {
            return Err(GatewayError::InvalidEndpoint(config.endpoint.to_string()));
        }
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self {
            http,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, state: ActuatorState) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("led", state.query_value());
        url
    }
}

#[async_trait]
impl ActuatorGateway for HttpActuatorGateway {
    async fn set_state(&self, state: ActuatorState) -> Result<String, GatewayError> {
        let url = self.request_url(state);
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        info!(%url, %status, bytes = body.len(), "actuator: response received");
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
