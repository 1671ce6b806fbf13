//! Generation provider adapter.
//!
//! Adapter over the Google generative-media REST API: document understanding
//! and image generation via `generateContent`, slide-to-slide video
//! interpolation via a long-running `predictLongRunning` operation that is
//! polled to completion. This is the only module that performs network I/O.
//!
//! Provider payloads are resolved into tagged [`ModelPart`] values at this
//! boundary; raw response JSON never crosses into the pipeline.

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Image bytes plus their mime type, as sent to and received from the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageData {
    /// Load an artifact from disk, inferring the mime type from the
    /// extension.
    pub fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let bytes = std::fs::read(path)?;
        let mime_type = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        };
        Ok(Self {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }
}

/// One part of a model response, resolved at the adapter boundary.
#[derive(Debug, Clone)]
pub enum ModelPart {
    Text(String),
    Inline(ImageData),
}

/// Polling cadence for long-running video operations.
///
/// The operation handle stays stable across polls; only its status is
/// re-fetched. Total wait is bounded by `interval * max_attempts`.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

// Request/response payloads for generateContent.

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlinePayload>,
}

impl RequestPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(InlinePayload {
                mime_type: mime_type.to_string(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct InlinePayload {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlinePayload>,
}

// Request/response payloads for video interpolation.

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
    image: FramePayload,
    #[serde(rename = "lastFrame")]
    last_frame: FramePayload,
}

#[derive(Serialize)]
struct FramePayload {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

impl FramePayload {
    fn from_image(image: &ImageData) -> Self {
        Self {
            bytes_base64_encoded: BASE64.encode(&image.bytes),
            mime_type: image.mime_type.clone(),
        }
    }
}

#[derive(Serialize)]
struct PredictParameters {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct OperationHandle {
    name: String,
}

#[derive(Deserialize)]
struct Operation {
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[derive(Deserialize)]
struct OperationResponse {
    #[serde(rename = "generateVideoResponse")]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize)]
struct GenerateVideoResponse {
    #[serde(rename = "generatedSamples", default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// REST client for the generative-media provider.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    video_model: String,
    poll: PollConfig,
}

impl GeminiClient {
    /// Build a client from provider configuration, resolving the API key
    /// from the configured environment variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ProviderError::AuthFailed(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::RequestFailed(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            video_model: config.video_model.clone(),
            poll: PollConfig {
                interval: Duration::from_secs(config.poll_interval_secs),
                max_attempts: config.poll_max_attempts,
            },
        })
    }

    /// Run a prompt over an attached document and return the text response.
    pub async fn describe_document(
        &self,
        prompt: &str,
        document: &[u8],
        mime_type: &str,
    ) -> Result<String, ProviderError> {
        let parts = vec![
            RequestPart::inline(mime_type, document),
            RequestPart::text(prompt),
        ];
        let response = self.generate_content(&self.text_model, parts).await?;
        let text: String = response
            .iter()
            .filter_map(|part| match part {
                ModelPart::Text(text) => Some(text.as_str()),
                ModelPart::Inline(_) => None,
            })
            .collect();
        if text.is_empty() {
            return Err(ProviderError::GenerationFailed(
                "model returned no text for document".to_string(),
            ));
        }
        Ok(text)
    }

    /// Generate one image, optionally anchored to a reference image for
    /// style continuity.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageData>,
    ) -> Result<ImageData, ProviderError> {
        let mut parts = vec![RequestPart::text(prompt)];
        if let Some(reference) = reference {
            parts.push(RequestPart::inline(&reference.mime_type, &reference.bytes));
        }
        let response = self.generate_content(&self.image_model, parts).await?;
        response
            .into_iter()
            .find_map(|part| match part {
                ModelPart::Inline(image) => Some(image),
                ModelPart::Text(_) => None,
            })
            .ok_or_else(|| {
                ProviderError::GenerationFailed("model returned no image".to_string())
            })
    }

    /// Generate a video interpolating between two frames. Blocks the caller
    /// through the provider's long-running operation, polling on the
    /// configured cadence, and returns the final video bytes.
    pub async fn generate_transition(
        &self,
        prompt: &str,
        first: &ImageData,
        last: &ImageData,
    ) -> Result<Vec<u8>, ProviderError> {
        let operation = self.submit_interpolation(prompt, first, last).await?;
        info!(operation = %operation, "video interpolation submitted");
        let result = self.await_operation(&operation).await?;

        if let Some(error) = result.error {
            return Err(ProviderError::GenerationFailed(
                error
                    .message
                    .unwrap_or_else(|| "provider reported an unnamed error".to_string()),
            ));
        }
        let uri = result
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri)
            .ok_or_else(|| {
                ProviderError::GenerationFailed("operation finished without a video".to_string())
            })?;
        self.download(&uri).await
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<RequestPart>,
    ) -> Result<Vec<ModelPart>, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest {
            contents: vec![RequestContent { parts }],
        };
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to parse response: {}", e)))?;
        resolve_parts(payload)
    }

    async fn submit_interpolation(
        &self,
        prompt: &str,
        first: &ImageData,
        last: &ImageData,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url, self.video_model
        );
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
                image: FramePayload::from_image(first),
                last_frame: FramePayload::from_image(last),
            }],
            parameters: PredictParameters {
                aspect_ratio: "16:9".to_string(),
            },
        };
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        let handle: OperationHandle = response.json().await.map_err(|e| {
            ProviderError::RequestFailed(format!("failed to parse operation handle: {}", e))
        })?;
        Ok(handle.name)
    }

    /// Poll one operation until it reports done or the attempt budget is
    /// exhausted. The same operation name is re-fetched on every poll; jobs
    /// are never re-submitted.
    async fn await_operation(&self, operation: &str) -> Result<Operation, ProviderError> {
        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;
            let status = self.fetch_operation(operation).await?;
            if status.done {
                return Ok(status);
            }
            debug!(operation, attempt, "video operation still running");
        }
        Err(ProviderError::Timeout {
            operation: operation.to_string(),
            attempts: self.poll.max_attempts,
            elapsed_secs: self.poll.interval.as_secs() * u64::from(self.poll.max_attempts),
        })
    }

    async fn fetch_operation(&self, operation: &str) -> Result<Operation, ProviderError> {
        let url = format!("{}/{}", self.base_url, operation);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| {
            ProviderError::RequestFailed(format!("failed to parse operation status: {}", e))
        })
    }

    async fn download(&self, uri: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .http
            .get(uri)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// Map transport-level HTTP errors to provider errors.
fn map_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::RequestFailed(format!("request timeout: {}", error))
    } else if error.is_connect() {
        ProviderError::RequestFailed(format!("connection error: {}", error))
    } else {
        ProviderError::RequestFailed(format!("HTTP error: {}", error))
    }
}

/// Map non-success statuses to provider errors, carrying the response body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(status_error(status.as_u16(), &body))
}

fn status_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthFailed(format!("status {}: {}", status, body)),
        404 => ProviderError::ModelNotFound(format!("status {}: {}", status, body)),
        429 => ProviderError::RateLimit(format!("status {}: {}", status, body)),
        _ => ProviderError::RequestFailed(format!("status {}: {}", status, body)),
    }
}

/// Resolve raw response parts into tagged [`ModelPart`] values.
fn resolve_parts(payload: GenerateContentResponse) -> Result<Vec<ModelPart>, ProviderError> {
    let mut parts = Vec::new();
    for candidate in payload.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(text) = part.text {
                parts.push(ModelPart::Text(text));
            } else if let Some(inline) = part.inline_data {
                let bytes = BASE64.decode(inline.data.as_bytes()).map_err(|e| {
                    ProviderError::RequestFailed(format!("invalid inline data: {}", e))
                })?;
                parts.push(ModelPart::Inline(ImageData {
                    bytes,
                    mime_type: inline.mime_type,
                }));
            } else {
                warn!("ignoring response part with no text or inline data");
            }
        }
    }
    if parts.is_empty() {
        return Err(ProviderError::GenerationFailed(
            "response contained no candidates".to_string(),
        ));
    }
    Ok(parts)
}
