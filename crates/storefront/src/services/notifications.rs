//! Outbound notification dispatch.
//!
//! Fire-and-forget: delivery failures are logged, never propagated. The
//! actual delivery channel (mail, push) lives behind a webhook consumed as
//! an external collaborator.

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use marigold_core::UserId;

/// Per-request timeout for notification dispatch.
const DISPATCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Client for the notification webhook.
#[derive(Clone)]
pub struct NotificationClient {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl NotificationClient {
    /// Create a new notification client.
    ///
    /// When `webhook_url` is `None`, every dispatch is a silent no-op.
    #[must_use]
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// Announce a confirmed order.
    #[instrument(skip(self), fields(user_id = %user_id, order_number = %order_number))]
    pub async fn order_confirmed(&self, user_id: UserId, order_number: &str, total: Decimal) {
        let Some(url) = &self.webhook_url else {
            return;
        };

        let body = serde_json::json!({
            "event": "order.confirmed",
            "userId": user_id,
            "orderNumber": order_number,
            "total": total,
        });

        match self
            .client
            .post(url)
            .json(&body)
            .timeout(DISPATCH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!("Confirmation notification dispatched");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Notification endpoint returned error");
            }
            Err(e) => {
                warn!(error = %e, "Notification dispatch failed");
            }
        }
    }
}
