use crate::domain::ports::ImageStore;
use crate::error::{AppError, UploadRejectReason};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Client for the external image-storage collaborator. Upload rejections
/// (wrong type, over the size limit) come back as dedicated status codes
/// and surface as recoverable `UploadRejected` errors; everything else is
/// an infrastructure fault.
pub struct HttpImageStore {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpImageStore {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct UploadPayload {
    file_name: String,
    content_type: String,
    content_base64: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn store(&self, file_name: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
        let payload = UploadPayload {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            content_base64: general_purpose::STANDARD.encode(bytes),
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Image service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        match res.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                return Err(AppError::UploadRejected(UploadRejectReason::InvalidType));
            }
            StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(AppError::UploadRejected(UploadRejectReason::TooLarge));
            }
            status if !status.is_success() => {
                let text = res.text().await.unwrap_or_default();
                let msg = format!("Image service failed. Status: {}, Body: {}", status, text);
                error!("{}", msg);
                return Err(AppError::InternalWithMsg(msg));
            }
            _ => {}
        }

        let body: UploadResponse = res
            .json()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("Image service returned invalid body: {}", e)))?;
        Ok(body.url)
    }
}
