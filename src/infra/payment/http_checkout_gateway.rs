use crate::domain::ports::CheckoutGateway;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Hands completed checkouts to the event/ticket records service, which
/// owns payment processing downstream of this subsystem.
pub struct HttpCheckoutGateway {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpCheckoutGateway {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct CheckoutPayload<'a> {
    session_id: &'a str,
    seat_map_id: &'a str,
    seat_ids: &'a [String],
    total_price_cents: i64,
}

#[async_trait]
impl CheckoutGateway for HttpCheckoutGateway {
    async fn checkout_completed(
        &self,
        session_id: &str,
        seat_map_id: &str,
        seat_ids: &[String],
        total_price_cents: i64,
    ) -> Result<(), AppError> {
        let payload = CheckoutPayload {
            session_id,
            seat_map_id,
            seat_ids,
            total_price_cents,
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Checkout service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Checkout service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
