use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::MediaConfig;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> anyhow::Result<UploadedImage>;
}

pub fn from_config(config: &MediaConfig) -> Box<dyn MediaHost> {
    match (
        &config.cloudinary_cloud_name,
        &config.cloudinary_api_key,
        &config.cloudinary_api_secret,
    ) {
        (Some(cloud), Some(key), Some(secret)) => {
            Box::new(CloudinaryHost::new(cloud.clone(), key.clone(), secret.clone()))
        }
        _ => {
            tracing::warn!("No media host configured; image uploads are disabled");
            Box::new(DisabledMediaHost)
        }
    }
}

/// Signed uploads to Cloudinary's image endpoint.
pub struct CloudinaryHost {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
    public_id: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl CloudinaryHost {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name,
            api_key,
            api_secret,
        }
    }

    /// SHA-256 over the alphabetically sorted `key=value` pairs joined by `&`,
    /// followed by the API secret.
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{:x}", Sha256::digest(format!("{to_sign}{}", self.api_secret)))
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, image: ImageUpload) -> anyhow::Result<UploadedImage> {
        let timestamp = jsonwebtoken::get_current_timestamp().to_string();
        let signature = self.sign(&[
            ("folder", image.folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let file = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", image.folder)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );
        let response = self.client.post(url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Cloudinary upload failed: {}",
                response.status()
            ));
        }

        let body: CloudinaryResponse = response.json().await?;
        tracing::info!("Uploaded image {}", body.public_id);
        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
            width: body.width,
            height: body.height,
        })
    }
}

/// Used when no media host credentials are configured.
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _image: ImageUpload) -> anyhow::Result<UploadedImage> {
        Err(anyhow::anyhow!("media host is not configured"))
    }
}
