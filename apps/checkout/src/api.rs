//! # Order API Client
//!
//! The remote collaborator of the API channel: posts an [`OrderPayload`] and
//! returns the backend's [`OrderReceipt`].
//!
//! ```text
//! Dispatcher ──► OrderApi::submit_order(attempt_id, &payload)
//!                    │
//!                    ▼
//!   POST <base_url>/api/orders
//!   Authorization: Bearer <token>        (when configured)
//!   Idempotency-Key: <attempt_id>
//!   { "customerName": ..., "items": [...] }
//!                    │
//!                    ▼
//!   2xx { "orderId": "ord_123" }  ──► Ok(OrderReceipt)
//!   401                           ──► Err(Unauthorized)
//!   other                         ──► Err(Rejected { status, body })
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use bistro_core::OrderPayload;

use crate::error::{ClientError, ClientResult};
use crate::state::CheckoutConfig;

const IDEMPOTENCY_KEY: HeaderName = HeaderName::from_static("idempotency-key");

/// What the backend returns for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Backend order id. Numeric ids are kept as their decimal text.
    #[serde(alias = "id", deserialize_with = "string_or_number")]
    pub order_id: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Submits orders to the restaurant backend.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Sends one order. `attempt_id` is unique per submission attempt and
    /// may be used by the backend to drop duplicates.
    async fn submit_order(&self, attempt_id: Uuid, payload: &OrderPayload)
        -> ClientResult<OrderReceipt>;
}

/// reqwest-backed [`OrderApi`].
#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    client: Client,
    orders_url: Url,
    token: Option<String>,
}

impl HttpOrderApi {
    /// Builds a client from the `[api]` section of the config.
    pub fn new(config: &CheckoutConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(HttpOrderApi {
            client,
            orders_url: config.orders_url()?,
            token: config.api.token.clone(),
        })
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client, orders_url: Url) -> Self {
        HttpOrderApi {
            client,
            orders_url,
            token: None,
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn orders_url(&self) -> &Url {
        &self.orders_url
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    async fn handle_response(response: reqwest::Response) -> ClientResult<OrderReceipt> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Rejected {
                    status: status.as_u16(),
                    body: text,
                }),
            };
        }

        let receipt: OrderReceipt = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", e, text)))?;

        if receipt.order_id.trim().is_empty() {
            return Err(ClientError::InvalidResponse("Missing order id".to_string()));
        }

        Ok(receipt)
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn submit_order(
        &self,
        attempt_id: Uuid,
        payload: &OrderPayload,
    ) -> ClientResult<OrderReceipt> {
        debug!(
            url = %self.orders_url,
            %attempt_id,
            items = payload.items.len(),
            total_cents = payload.total_cents,
            "Posting order"
        );

        let mut request = self
            .client
            .post(self.orders_url.clone())
            .header(IDEMPOTENCY_KEY, attempt_id.to_string())
            .json(payload);

        if let Some(auth) = self.auth_header() {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }
}
