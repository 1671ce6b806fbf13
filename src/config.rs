//! Configuration system.
//!
//! Layered loading: built-in defaults, then the global user file
//! (`~/.config/slideforge/config.toml`), then the workspace file
//! (`./slideforge.toml`), then `SLIDEFORGE_*` environment overrides. An
//! explicit `--config` path replaces the file layers.

use crate::error::PipelineError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideforgeConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Generation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Fusion settings
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default visual style for generated slides
    #[serde(default = "default_style")]
    pub style: String,
}

impl Default for SlideforgeConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            provider: ProviderConfig::default(),
            fusion: FusionConfig::default(),
            logging: LoggingConfig::default(),
            style: default_style(),
        }
    }
}

fn default_style() -> String {
    "warm hand-drawn storybook style with a high information density and \
     recognizable recurring characters"
        .to_string()
}

/// Output directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for per-document outputs
    #[serde(default = "default_output_root")]
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
        }
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("outputs")
}

/// Generation provider settings.
///
/// The video poll budget bounds blocking on provider-side stalls: a
/// long-running operation is abandoned after
/// `poll_interval_secs * poll_max_attempts` seconds (default 10 minutes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for document understanding (plan generation)
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for slide image generation
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Model used for transition video interpolation
    #[serde(default = "default_video_model")]
    pub video_model: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            video_model: default_video_model(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_max_attempts: default_poll_max_attempts(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_text_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_image_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-generate-preview".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_poll_max_attempts() -> u32 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Video fusion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// External encoder binary
    #[serde(default = "default_encoder")]
    pub encoder: String,

    /// Video codec for the re-encode strategy
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec for the re-encode strategy
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Carry segment audio into the fused stream
    #[serde(default = "default_true")]
    pub preserve_audio: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            encoder: default_encoder(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preserve_audio: default_true(),
        }
    }
}

fn default_encoder() -> String {
    "ffmpeg".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default layers, or from `explicit` only
    /// when given.
    pub fn load(explicit: Option<&Path>) -> Result<SlideforgeConfig, PipelineError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let mut builder = Config::builder();
        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                debug!(path = %global.display(), "loading global config");
                builder = builder.add_source(File::from(global).required(false));
            }
        }
        builder = builder
            .add_source(File::with_name("slideforge").required(false))
            .add_source(Environment::with_prefix("SLIDEFORGE").separator("__"));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a single explicit file.
    pub fn load_from_file(path: &Path) -> Result<SlideforgeConfig, PipelineError> {
        let config = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .add_source(Environment::with_prefix("SLIDEFORGE").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Path to the global config file, `$XDG_CONFIG_HOME` aware.
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "slideforge").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
