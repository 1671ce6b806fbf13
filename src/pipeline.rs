//! Pipeline orchestrator: plan → slides → transitions → fusion.
//!
//! Stage completion is defined purely by artifacts existing in the store, so
//! the orchestrator holds no persistent state and every stage is re-entrant.
//! Invoking a later stage without an earlier one's output fails with a
//! `MissingPrerequisite` naming the missing artifact.

use crate::config::SlideforgeConfig;
use crate::error::{PipelineError, PlanError};
use crate::fusion::FusionEngine;
use crate::plan::{self, Plan};
use crate::prompt;
use crate::provider::GeminiClient;
use crate::stage::{ModelUnitGenerator, StageReport, StageRunner};
use crate::store::{ArtifactStore, Stage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for a full `pipe` run.
#[derive(Debug, Clone)]
pub struct PipeOptions {
    pub style: Option<String>,
    pub include_video: bool,
    pub skip_existing: bool,
}

/// Artifacts produced by a full run.
#[derive(Debug)]
pub struct PipeSummary {
    pub plan_file: PathBuf,
    pub slides: StageReport,
    pub videos: Option<StageReport>,
    pub deck: Option<PathBuf>,
    pub fused_video: Option<PathBuf>,
}

/// One document's pipeline over an artifact store.
pub struct Pipeline {
    config: SlideforgeConfig,
    document: PathBuf,
    store: ArtifactStore,
}

impl Pipeline {
    pub fn new(
        config: SlideforgeConfig,
        document: &Path,
        output_root: &Path,
    ) -> Result<Self, PipelineError> {
        if !document.exists() {
            return Err(PipelineError::DocumentNotFound(document.to_path_buf()));
        }
        let store = ArtifactStore::for_document(output_root, document)?;
        Ok(Self {
            config,
            document: document.to_path_buf(),
            store,
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Generate the plan from the source document and write `plan.json`.
    pub async fn run_plan(
        &self,
        style: Option<&str>,
        skip_existing: bool,
    ) -> Result<PathBuf, PipelineError> {
        let plan_file = self.store.plan_path();
        if skip_existing && plan_file.exists() {
            info!(path = %plan_file.display(), "skipping plan, already present");
            return Ok(plan_file);
        }

        let style = style.unwrap_or(&self.config.style);
        info!(document = %self.document.display(), style, "generating plan");

        let bytes = fs::read(&self.document)
            .map_err(|e| PipelineError::Store(crate::error::StoreError::Io(e)))?;
        let client = GeminiClient::from_config(&self.config.provider)?;
        let response = client
            .describe_document(&prompt::plan_prompt(style), &bytes, document_mime(&self.document))
            .await?;

        let raw = plan::extract_json_block(&response);
        // validate shape and unit keys before anything is persisted
        Plan::parse(raw)?;
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| PlanError::Malformed(e.to_string()))?;
        let pretty = serde_json::to_string_pretty(&value)
            .map_err(|e| PlanError::Malformed(e.to_string()))?;

        let written = self.store.write_plan(&pretty)?;
        info!(path = %written.display(), "plan saved");
        Ok(written)
    }

    /// Generate slide images for every slide unit in the plan.
    pub async fn run_slides(
        &self,
        plan_file: Option<&Path>,
        skip_existing: bool,
    ) -> Result<StageReport, PipelineError> {
        let plan = self.load_plan(plan_file)?;
        let client = GeminiClient::from_config(&self.config.provider)?;
        let generator = ModelUnitGenerator::new(client);
        let runner = StageRunner::new(&self.store, &generator, skip_existing);
        let report = runner.run_slides(&plan).await?;
        info!("{}", report.summary());
        Ok(report)
    }

    /// Generate transition videos for every transition unit in the plan.
    /// Requires the slide stage's output directory to exist.
    pub async fn run_videos(
        &self,
        plan_file: Option<&Path>,
        skip_existing: bool,
    ) -> Result<StageReport, PipelineError> {
        let plan = self.load_plan(plan_file)?;
        let slides_dir = self.store.stage_dir(Stage::Slides);
        if !slides_dir.exists() {
            return Err(PipelineError::MissingPrerequisite {
                stage: "slides",
                path: slides_dir,
            });
        }

        let client = GeminiClient::from_config(&self.config.provider)?;
        let generator = ModelUnitGenerator::new(client);
        let runner = StageRunner::new(&self.store, &generator, skip_existing);
        let report = runner.run_transitions(&plan).await?;
        info!("{}", report.summary());
        Ok(report)
    }

    /// Fuse slide artifacts into the deck.
    pub fn fuse_slides(&self) -> Result<Option<PathBuf>, PipelineError> {
        let slides_dir = self.store.stage_dir(Stage::Slides);
        if !slides_dir.exists() {
            return Err(PipelineError::MissingPrerequisite {
                stage: "slides",
                path: slides_dir,
            });
        }
        FusionEngine::new(&self.store, &self.config.fusion).fuse_slides()
    }

    /// Fuse video segments into one stream.
    pub fn fuse_video(&self) -> Result<Option<PathBuf>, PipelineError> {
        let video_dir = self.store.stage_dir(Stage::Videos);
        if !video_dir.exists() {
            return Err(PipelineError::MissingPrerequisite {
                stage: "videos",
                path: video_dir,
            });
        }
        FusionEngine::new(&self.store, &self.config.fusion).fuse_video()
    }

    /// Run all stages in dependency order.
    pub async fn run_all(&self, options: &PipeOptions) -> Result<PipeSummary, PipelineError> {
        info!(document = %self.document.display(), "starting pipeline");

        let plan_file = self
            .run_plan(options.style.as_deref(), options.skip_existing)
            .await?;
        let slides = self.run_slides(None, options.skip_existing).await?;
        let videos = if options.include_video {
            Some(self.run_videos(None, options.skip_existing).await?)
        } else {
            None
        };

        let deck = self.fuse_slides()?;
        let fused_video = if options.include_video {
            self.fuse_video()?
        } else {
            None
        };

        info!(output = %self.store.root().display(), "pipeline complete");
        Ok(PipeSummary {
            plan_file,
            slides,
            videos,
            deck,
            fused_video,
        })
    }

    /// Load and parse the plan, from an explicit file or the store location.
    pub fn load_plan(&self, plan_file: Option<&Path>) -> Result<Plan, PipelineError> {
        let path = plan_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.store.plan_path());
        if !path.exists() {
            return Err(PipelineError::MissingPrerequisite {
                stage: "plan",
                path,
            });
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| PipelineError::Store(crate::error::StoreError::Io(e)))?;
        Ok(Plan::parse(&raw)?)
    }
}

fn document_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("txt") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}
