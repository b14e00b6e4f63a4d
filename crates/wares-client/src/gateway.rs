//! Remote data gateway
//!
//! One page fetch per call, cancellable through an explicit token.
//! Cancellation is a distinct outcome, not an error to surface: the
//! controller treats it as silence while genuine failures degrade the view.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wares_core::ItemPage;

/// Gateway failure modes.
///
/// `Cancelled` means the caller aborted the request; everything else is a
/// genuine failure. Retry policy, if any, belongs here or below, never in
/// the controller.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Network boundary used by the pagination controller.
#[async_trait]
pub trait ItemsGateway: Send + Sync + 'static {
    /// Fetch one page of the filtered listing.
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        limit: u32,
        cancel: CancellationToken,
    ) -> Result<ItemPage, GatewayError>;
}

/// reqwest-backed gateway against the wares API.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// `base_url` without a trailing slash, e.g. `http://localhost:4001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ItemsGateway for HttpGateway {
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        limit: u32,
        cancel: CancellationToken,
    ) -> Result<ItemPage, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let url = format!("{}/api/items", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .query(&[("page", page), ("limit", limit)])
            .send();

        let response = tokio::select! {
            result = request => result.map_err(|e| GatewayError::Transport(e.to_string()))?,
            _ = cancel.cancelled() => {
                debug!(url = %url, page, "Page fetch cancelled");
                return Err(GatewayError::Cancelled);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body = tokio::select! {
            result = response.json::<ItemPage>() => {
                result.map_err(|e| GatewayError::Decode(e.to_string()))?
            }
            _ = cancel.cancelled() => {
                debug!(url = %url, page, "Response read cancelled");
                return Err(GatewayError::Cancelled);
            }
        };

        Ok(body)
    }
}
