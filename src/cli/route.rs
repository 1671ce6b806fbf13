//! CLI route: single route table and run context. Dispatches to the
//! pipeline and presentation.

use crate::cli::parse::Commands;
use crate::cli::status;
use crate::config::{ConfigLoader, SlideforgeConfig};
use crate::error::PipelineError;
use crate::pipeline::{PipeOptions, PipeSummary, Pipeline};
use crate::stage::StageReport;
use std::path::{Path, PathBuf};

/// Runtime context for CLI execution: loaded configuration and the resolved
/// output root.
pub struct RunContext {
    config: SlideforgeConfig,
    output_root: PathBuf,
}

impl RunContext {
    /// Build from an optional `--output` override and optional config path.
    pub fn new(
        output_override: Option<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        let output_root = output_override.unwrap_or_else(|| config.output.root.clone());
        Ok(Self {
            config,
            output_root,
        })
    }

    pub fn config(&self) -> &SlideforgeConfig {
        &self.config
    }

    /// Execute one command and return its human-readable output.
    pub fn execute(&self, command: &Commands) -> Result<String, PipelineError> {
        match command {
            Commands::Plan {
                document,
                style,
                exist,
            } => {
                let pipeline = self.pipeline(document)?;
                let path = runtime()?
                    .block_on(pipeline.run_plan(style.as_deref(), *exist))?;
                Ok(format!("Plan saved to {}", path.display()))
            }
            Commands::Slides {
                document,
                plan,
                exist,
            } => {
                let pipeline = self.pipeline(document)?;
                let report =
                    runtime()?.block_on(pipeline.run_slides(plan.as_deref(), *exist))?;
                Ok(format!(
                    "Slide stage completed: {}\nArtifacts in {}",
                    report.summary(),
                    pipeline.store().stage_dir(crate::store::Stage::Slides).display()
                ))
            }
            Commands::Videos {
                document,
                plan,
                exist,
            } => {
                let pipeline = self.pipeline(document)?;
                let report =
                    runtime()?.block_on(pipeline.run_videos(plan.as_deref(), *exist))?;
                Ok(format!(
                    "Video stage completed: {}\nArtifacts in {}",
                    report.summary(),
                    pipeline.store().stage_dir(crate::store::Stage::Videos).display()
                ))
            }
            Commands::Fuse {
                document,
                slides,
                video,
            } => {
                let pipeline = self.pipeline(document)?;
                let both = !slides && !video;
                let mut lines = Vec::new();
                if *slides || both {
                    lines.push(match pipeline.fuse_slides()? {
                        Some(path) => format!("Deck saved to {}", path.display()),
                        None => "No slide artifacts to fuse".to_string(),
                    });
                }
                if *video || both {
                    lines.push(match pipeline.fuse_video()? {
                        Some(path) => format!("Fused video saved to {}", path.display()),
                        None => "No video segments to fuse".to_string(),
                    });
                }
                Ok(lines.join("\n"))
            }
            Commands::Pipe {
                document,
                style,
                no_video,
                exist,
            } => {
                let pipeline = self.pipeline(document)?;
                let options = PipeOptions {
                    style: style.clone(),
                    include_video: !no_video,
                    skip_existing: *exist,
                };
                let summary = runtime()?.block_on(pipeline.run_all(&options))?;
                Ok(format_pipe_summary(&summary, pipeline.store().root()))
            }
            Commands::Status { document, format } => {
                let pipeline = self.pipeline(document)?;
                let report = status::collect_status(pipeline.store())?;
                match format.as_str() {
                    "json" => status::format_status_json(&report),
                    _ => Ok(status::format_status_text(&report)),
                }
            }
        }
    }

    fn pipeline(&self, document: &Path) -> Result<Pipeline, PipelineError> {
        Pipeline::new(self.config.clone(), document, &self.output_root)
    }
}

/// Build the runtime driving provider calls. Commands are synchronous at the
/// CLI surface; async work is confined behind this boundary.
fn runtime() -> Result<tokio::runtime::Runtime, PipelineError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(PipelineError::Config(
            "cannot run generation from within an async runtime context".to_string(),
        ));
    }
    tokio::runtime::Runtime::new()
        .map_err(|e| PipelineError::Config(format!("failed to create runtime: {}", e)))
}

fn format_report_line(label: &str, report: &StageReport) -> String {
    format!("  {}: {}", label, report.summary())
}

fn format_pipe_summary(summary: &PipeSummary, output_root: &Path) -> String {
    let mut lines = vec!["Pipeline complete.".to_string()];
    lines.push(format!("  plan: {}", summary.plan_file.display()));
    lines.push(format_report_line("slides", &summary.slides));
    if let Some(ref videos) = summary.videos {
        lines.push(format_report_line("videos", videos));
    }
    if let Some(ref deck) = summary.deck {
        lines.push(format!("  deck: {}", deck.display()));
    }
    if let Some(ref fused) = summary.fused_video {
        lines.push(format!("  video: {}", fused.display()));
    }
    lines.push(format!("Output directory: {}", output_root.display()));
    lines.join("\n")
}
