//! Error types for the slideforge generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Plan-level errors. Fatal: no generation starts on a bad plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Malformed plan: {0}")]
    Malformed(String),

    #[error("Duplicate unit in plan: '{key}' resolves to the same unit as an earlier key")]
    DuplicateUnit { key: String },
}

/// Artifact-store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document path has no file stem: {0:?}")]
    MissingDocumentStem(PathBuf),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the external generation capability
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Operation {operation} not done after {attempts} polls ({elapsed_secs}s)")]
    Timeout {
        operation: String,
        attempts: u32,
        elapsed_secs: u64,
    },

    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fusion errors. Fatal for the fusion call only; unit artifacts are kept.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Deck rendering failed: {0}")]
    Deck(String),

    #[error("External encoder '{0}' not found on PATH")]
    EncoderMissing(String),

    #[error("External encoder exited with {status}: {stderr}")]
    EncoderFailed { status: i32, stderr: String },

    #[error("Video fusion failed; re-encode: {primary}; stream copy: {fallback}")]
    StrategiesExhausted { primary: String, fallback: String },

    #[error("Fusion I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level pipeline errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input document not found: {0:?}")]
    DocumentNotFound(PathBuf),

    #[error("Missing prerequisite '{stage}': {path:?}. Run the earlier stage first.")]
    MissingPrerequisite { stage: &'static str, path: PathBuf },

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Fusion error: {0}")]
    Fusion(#[from] FusionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
