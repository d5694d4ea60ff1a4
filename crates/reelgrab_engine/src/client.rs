use bytes::{Bytes, BytesMut};
use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use reelgrab_core::{
    Artifact, ContentMetadata, ContentRequest, JobProgress, JOB_FALLBACK_MESSAGE,
    METADATA_FALLBACK_MESSAGE,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::wire::{ErrorBody, JobRequest, MetadataRequest, MetadataResponse, ProgressResponse};
use crate::{ClientError, ClientSettings, FailureKind};

const METADATA_PATH: &str = "check-content";
const JOB_PATH: &str = "download";
const PROGRESS_PATH: &str = "progress";
const PROGRESS_FALLBACK_MESSAGE: &str = "Error consultando el progreso";

/// Metadata lookup and job start against the conversion service.
#[async_trait::async_trait]
pub trait MediaService: Send + Sync {
    async fn fetch_metadata(&self, url: &str) -> Result<ContentMetadata, ClientError>;

    /// Resolves once the service has streamed the whole converted payload.
    async fn start_job(&self, request: &ContentRequest) -> Result<Artifact, ClientError>;
}

/// Progress of the job currently running on the service.
#[async_trait::async_trait]
pub trait ProgressSource: Send + Sync {
    async fn query_progress(&self) -> Result<JobProgress, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestMediaService {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ReqwestMediaService {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.settings
            .base_url
            .join(path)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        timeout: std::time::Duration,
    ) -> Result<reqwest::Response, ClientError> {
        let endpoint = self.endpoint(path)?;
        let payload = serde_json::to_vec(body)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
        self.client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)
    }

    async fn read_artifact(
        &self,
        response: reqwest::Response,
        request: &ContentRequest,
    ) -> Result<Artifact, ClientError> {
        let max_bytes = self.settings.max_artifact_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut payload = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = payload.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            payload.extend_from_slice(&chunk);
        }

        engine_info!(
            "Job finished url={} format={} bytes={}",
            request.url,
            request.format,
            payload.len()
        );
        Ok(Artifact::new(payload.freeze(), request.format))
    }
}

#[async_trait::async_trait]
impl MediaService for ReqwestMediaService {
    async fn fetch_metadata(&self, url: &str) -> Result<ContentMetadata, ClientError> {
        engine_info!("Fetching metadata url={}", url);
        let response = self
            .post_json(
                METADATA_PATH,
                &MetadataRequest { url },
                self.settings.request_timeout,
            )
            .await?;
        let response = ensure_success(response, METADATA_FALLBACK_MESSAGE).await?;
        let raw: MetadataResponse = read_json(response).await?;
        Ok(raw.into())
    }

    async fn start_job(&self, request: &ContentRequest) -> Result<Artifact, ClientError> {
        engine_info!("Starting job url={} format={}", request.url, request.format);
        let body = JobRequest {
            url: &request.url,
            format: request.format,
        };
        let response = self
            .post_json(JOB_PATH, &body, self.settings.download_timeout)
            .await?;
        let response = ensure_success(response, JOB_FALLBACK_MESSAGE).await?;
        self.read_artifact(response, request).await
    }
}

#[async_trait::async_trait]
impl ProgressSource for ReqwestMediaService {
    async fn query_progress(&self) -> Result<JobProgress, ClientError> {
        let endpoint = self.endpoint(PROGRESS_PATH)?;
        let response = self
            .client
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response, PROGRESS_FALLBACK_MESSAGE).await?;
        let body: ProgressResponse = read_json(response).await?;
        engine_debug!("Progress reported {}", body.progress);
        Ok(JobProgress::clamped(body.progress))
    }
}

/// Turns a non-success response into a [`ClientError`] carrying the service's
/// `error` field, or `fallback` when the body has none.
async fn ensure_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_else(|_| Bytes::new());
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| fallback.to_string());
    Err(ClientError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> ClientError {
    ClientError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
