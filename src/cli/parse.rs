//! CLI parse: clap types for slideforge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Slideforge CLI - staged document-to-slides-and-video generation
#[derive(Parser)]
#[command(name = "slideforge")]
#[command(about = "Turn a document into an AI-generated slide deck and video")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output root directory (default: "outputs", or config)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the narrative plan for a document
    Plan {
        /// Path to the source document
        document: PathBuf,
        /// Visual style for the whole presentation
        #[arg(long, short = 'p')]
        style: Option<String>,
        /// Skip if the plan already exists
        #[arg(long, short = 'e')]
        exist: bool,
    },
    /// Generate slide images from the plan
    Slides {
        /// Path to the source document
        document: PathBuf,
        /// Path to an existing plan.json (auto-detected if not provided)
        #[arg(long)]
        plan: Option<PathBuf>,
        /// Skip slides that already exist
        #[arg(long, short = 'e')]
        exist: bool,
    },
    /// Generate transition videos between consecutive slides
    Videos {
        /// Path to the source document
        document: PathBuf,
        /// Path to an existing plan.json (auto-detected if not provided)
        #[arg(long)]
        plan: Option<PathBuf>,
        /// Skip video segments that already exist
        #[arg(long, short = 'e')]
        exist: bool,
    },
    /// Fuse artifacts into the final deck and video (both when no flag given)
    Fuse {
        /// Path to the source document
        document: PathBuf,
        /// Fuse slide images into the deck
        #[arg(long, short = 's')]
        slides: bool,
        /// Fuse video segments into one video
        #[arg(long, short = 'v')]
        video: bool,
    },
    /// Run the whole pipeline: plan, slides, videos, fusion
    Pipe {
        /// Path to the source document
        document: PathBuf,
        /// Visual style for the whole presentation
        #[arg(long, short = 'p')]
        style: Option<String>,
        /// Skip the video stages
        #[arg(long)]
        no_video: bool,
        /// Skip steps whose output already exists
        #[arg(long, short = 'e')]
        exist: bool,
    },
    /// Show per-stage artifact coverage for a document
    Status {
        /// Path to the source document
        document: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
