use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use time::OffsetDateTime;
use url::Url;

use crate::config::CloudinaryConfig;
use crate::errors::{BackendError, ImageHostError};
use crate::review::HostedImage;

#[cfg(test)]
pub(crate) mod mock;

/// Every upload lands in this folder on the image host.
pub const FOLDER: &str = "travel-reviews";

pub trait Store: Send + Sync {
    /// Uploads the given image and returns where it now lives.
    fn save(&self, raw: Vec<u8>) -> BoxFuture<Result<HostedImage, BackendError>>;

    /// Deletes the image with the given handle.
    fn delete(&self, public_id: &str) -> BoxFuture<Result<(), BackendError>>;
}

/// A store that saves images to Cloudinary.
pub struct CloudinaryStore {
    client: Client,
    api_base: Url,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStore {
    /// Creates a new instance. `timeout` bounds each request as a whole.
    pub fn new(config: &CloudinaryConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| BackendError::HttpClient { source })?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> Result<Url, ImageHostError> {
        self.api_base
            .join(&format!("v1_1/{}/image/{}", self.cloud_name, action))
            .map_err(|source| ImageHostError::InvalidEndpoint { source })
    }
}

impl Store for CloudinaryStore {
    fn save(&self, raw: Vec<u8>) -> BoxFuture<Result<HostedImage, BackendError>> {
        upload(self, raw)
            .map(|r| r.map_err(|source| BackendError::UploadFailed { source }))
            .boxed()
    }

    fn delete(&self, public_id: &str) -> BoxFuture<Result<(), BackendError>> {
        destroy(self, public_id.to_owned())
            .map(|r| r.map_err(|source| BackendError::DeleteFailed { source }))
            .boxed()
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

async fn upload(store: &CloudinaryStore, raw: Vec<u8>) -> Result<HostedImage, ImageHostError> {
    let url = store.endpoint("upload")?;
    let timestamp = unix_timestamp();
    let signature = sign(&[("folder", FOLDER), ("timestamp", timestamp.as_str())], &store.api_secret);

    let form = Form::new()
        .part("file", Part::bytes(raw).file_name("image"))
        .text("api_key", store.api_key.clone())
        .text("timestamp", timestamp)
        .text("folder", FOLDER)
        .text("signature", signature);

    let response = store
        .client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|source| ImageHostError::Transport { source })?;

    let UploadResponse {
        secure_url,
        public_id,
    } = read_response(response).await?;

    Ok(HostedImage::new(secure_url, public_id))
}

async fn destroy(store: &CloudinaryStore, public_id: String) -> Result<(), ImageHostError> {
    let url = store.endpoint("destroy")?;
    let timestamp = unix_timestamp();
    let signature = sign(
        &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
        &store.api_secret,
    );

    let params = [
        ("public_id", public_id.as_str()),
        ("api_key", store.api_key.as_str()),
        ("timestamp", timestamp.as_str()),
        ("signature", signature.as_str()),
    ];

    let response = store
        .client
        .post(url)
        .form(&params)
        .send()
        .await
        .map_err(|source| ImageHostError::Transport { source })?;

    let status = response.status().as_u16();
    let DestroyResponse { result } = read_response(response).await?;

    if result == "ok" {
        Ok(())
    } else {
        Err(ImageHostError::Remote {
            status,
            message: result,
        })
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ImageHostError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| ImageHostError::Transport { source })?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());

        return Err(ImageHostError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|source| ImageHostError::MalformedResponse { source })
}

/// Signs request parameters the way the image host expects: sorted
/// `key=value` pairs joined with `&`, the secret appended, SHA-1 as
/// lowercase hex.
pub fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());

    format!("{:x}", hasher.finalize())
}

fn unix_timestamp() -> String {
    OffsetDateTime::now_utc().unix_timestamp().to_string()
}
