use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CloudinaryConfig;
use crate::error::ApiError;
use crate::models::ImageRef;

/// External image hosting collaborator. Payloads are data URLs or remote URLs
/// as produced by the web client.
#[async_trait]
pub trait UploadProvider: Send + Sync {
    async fn upload_image(&self, payload: &str, folder: &str) -> Result<ImageRef, ApiError>;

    async fn delete_image(&self, public_id: &str) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    public_id: String,
    secure_url: String,
}

impl CloudinaryUploader {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            upload_preset: config.upload_preset.clone(),
        }
    }
}

#[async_trait]
impl UploadProvider for CloudinaryUploader {
    async fn upload_image(&self, payload: &str, folder: &str) -> Result<ImageRef, ApiError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );

        // Unsigned preset upload; the preset caps size and formats server-side.
        let form = reqwest::multipart::Form::new()
            .text("file", payload.to_string())
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Image upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Image upload rejected");
            return Err(ApiError::Upstream(format!(
                "Image upload rejected with status {}",
                status
            )));
        }

        let parsed: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("Invalid upload response: {}", e)))?;

        Ok(ImageRef {
            public_id: parsed.public_id,
            url: parsed.secure_url,
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), ApiError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            self.cloud_name
        );

        let response = self
            .client
            .post(&url)
            .form(&[("public_id", public_id)])
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Image deletion failed: {}", e)))?;

        if !response.status().is_success() {
            tracing::warn!(public_id = %public_id, status = %response.status(), "Image deletion rejected");
        }

        Ok(())
    }
}

/// Returns deterministic refs without network I/O.
#[derive(Clone, Default)]
pub struct MockUploader;

#[async_trait]
impl UploadProvider for MockUploader {
    async fn upload_image(&self, _payload: &str, folder: &str) -> Result<ImageRef, ApiError> {
        Ok(ImageRef {
            public_id: format!("{}/mock", folder),
            url: format!("https://mock.local/{}/mock.png", folder),
        })
    }

    async fn delete_image(&self, _public_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
}
