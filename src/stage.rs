//! Stage runner: drives one family of units to completion in plan order.
//!
//! Generation is a causal chain: each slide call may carry the previous
//! slide's artifact as a style reference, so units run strictly
//! sequentially. The previous artifact is threaded as a local accumulator
//! through the loop, never as shared state. Per-unit provider failures are
//! downgraded to warnings so the rest of the stage still completes.

use crate::error::{PipelineError, ProviderError};
use crate::plan::{Plan, UnitFamily, UnitKey};
use crate::prompt;
use crate::provider::{GeminiClient, ImageData};
use crate::store::{ArtifactStore, Stage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Terminal state of one unit within a stage run.
///
/// `pending → generated | skipped | missing-dependency | failed`; a unit
/// never revisits a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// A new artifact was generated and written.
    Generated,
    /// The artifact already existed and skip-if-exists was enabled.
    Skipped,
    /// A transition unit whose bracketing slide artifacts were incomplete.
    MissingDependency,
    /// The provider returned no usable result; the unit is left absent.
    Failed,
}

/// Per-unit outcomes of one stage run.
#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub outcomes: Vec<(UnitKey, UnitOutcome)>,
}

impl StageReport {
    pub fn count(&self, outcome: UnitOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{}: generated={}, skipped={}, missing-dependency={}, failed={}",
            self.stage,
            self.count(UnitOutcome::Generated),
            self.count(UnitOutcome::Skipped),
            self.count(UnitOutcome::MissingDependency),
            self.count(UnitOutcome::Failed),
        )
    }
}

/// One generation call per unit. The seam between the stage runner and the
/// external capability; the production implementation composes prompts and
/// calls the provider.
#[async_trait]
pub trait UnitGenerator: Send + Sync {
    /// Generate one slide image, optionally anchored to the previous slide.
    async fn slide(
        &self,
        content: &str,
        reference: Option<&Path>,
    ) -> Result<Vec<u8>, ProviderError>;

    /// Generate one transition video between two slide artifacts.
    async fn transition(
        &self,
        content: &str,
        first: &Path,
        last: &Path,
    ) -> Result<Vec<u8>, ProviderError>;
}

/// Production generator: prompt composer plus provider client.
pub struct ModelUnitGenerator {
    client: GeminiClient,
    transition_duration_secs: u32,
}

impl ModelUnitGenerator {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            transition_duration_secs: 10,
        }
    }
}

#[async_trait]
impl UnitGenerator for ModelUnitGenerator {
    async fn slide(
        &self,
        content: &str,
        reference: Option<&Path>,
    ) -> Result<Vec<u8>, ProviderError> {
        let reference = match reference {
            Some(path) => Some(ImageData::from_file(path)?),
            None => None,
        };
        let prompt = prompt::slide_prompt(content, reference.is_some());
        let image = self.client.generate_image(&prompt, reference.as_ref()).await?;
        Ok(image.bytes)
    }

    async fn transition(
        &self,
        content: &str,
        first: &Path,
        last: &Path,
    ) -> Result<Vec<u8>, ProviderError> {
        let first = ImageData::from_file(first)?;
        let last = ImageData::from_file(last)?;
        let prompt = prompt::transition_prompt(content, self.transition_duration_secs);
        self.client.generate_transition(&prompt, &first, &last).await
    }
}

/// Drives the units of one family through the store and a generator.
pub struct StageRunner<'a> {
    store: &'a ArtifactStore,
    generator: &'a dyn UnitGenerator,
    skip_existing: bool,
}

impl<'a> StageRunner<'a> {
    pub fn new(
        store: &'a ArtifactStore,
        generator: &'a dyn UnitGenerator,
        skip_existing: bool,
    ) -> Self {
        Self {
            store,
            generator,
            skip_existing,
        }
    }

    /// Run the slide family in order, chaining each unit off the previous
    /// artifact.
    ///
    /// `previous` always tracks the prior unit's target location; the
    /// reference is passed only when that artifact exists at call time, so a
    /// failed unit breaks the chain for exactly one successor. With
    /// skip-if-exists enabled, an interrupted run re-invoked later reproduces
    /// the completed prefix untouched and only generates the remainder.
    pub async fn run_slides(&self, plan: &Plan) -> Result<StageReport, PipelineError> {
        let mut outcomes = Vec::new();
        let mut previous: Option<PathBuf> = None;

        for key in plan.ordered_keys(UnitFamily::Slide) {
            let target = self.store.path_for(Stage::Slides, key.index);

            if self.skip_existing && target.exists() {
                info!(unit = %key, "skipping slide, artifact already present");
                previous = Some(target);
                outcomes.push((key, UnitOutcome::Skipped));
                continue;
            }

            let content = plan.content(&key).unwrap_or_default();
            let reference = previous.as_deref().filter(|p| p.exists());
            if let Some(reference) = reference {
                info!(unit = %key, reference = %reference.display(), "using previous slide as style reference");
            }

            match self.generator.slide(content, reference).await {
                Ok(bytes) => {
                    let written = self.store.write(Stage::Slides, key.index, &bytes)?;
                    info!(unit = %key, path = %written.display(), "slide generated");
                    outcomes.push((key, UnitOutcome::Generated));
                }
                Err(e) => {
                    warn!(unit = %key, error = %e, "slide generation failed, continuing");
                    outcomes.push((key, UnitOutcome::Failed));
                }
            }
            previous = Some(target);
        }

        Ok(StageReport {
            stage: Stage::Slides,
            outcomes,
        })
    }

    /// Run the transition family in order.
    ///
    /// Transition `v<i>` interpolates between slides `i` and `i+1`; a unit
    /// whose bracketing slide artifacts are incomplete is skipped with a
    /// warning, never a fatal error. Partial completion is an accepted
    /// terminal state.
    pub async fn run_transitions(&self, plan: &Plan) -> Result<StageReport, PipelineError> {
        let mut outcomes = Vec::new();

        for key in plan.ordered_keys(UnitFamily::Transition) {
            let target = self.store.path_for(Stage::Videos, key.index);

            if self.skip_existing && target.exists() {
                info!(unit = %key, "skipping transition, artifact already present");
                outcomes.push((key, UnitOutcome::Skipped));
                continue;
            }

            let first = self.store.path_for(Stage::Slides, key.index);
            let last = self.store.path_for(Stage::Slides, key.index + 1);
            if !first.exists() || !last.exists() {
                warn!(
                    unit = %key,
                    first = %first.display(),
                    last = %last.display(),
                    "bracketing slide artifacts incomplete, skipping transition"
                );
                outcomes.push((key, UnitOutcome::MissingDependency));
                continue;
            }

            let content = plan.content(&key).unwrap_or_default();
            info!(unit = %key, "generating transition s{} -> s{}", key.index, key.index + 1);

            match self.generator.transition(content, &first, &last).await {
                Ok(bytes) => {
                    let written = self.store.write(Stage::Videos, key.index, &bytes)?;
                    info!(unit = %key, path = %written.display(), "transition generated");
                    outcomes.push((key, UnitOutcome::Generated));
                }
                Err(e) => {
                    warn!(unit = %key, error = %e, "transition generation failed, continuing");
                    outcomes.push((key, UnitOutcome::Failed));
                }
            }
        }

        Ok(StageReport {
            stage: Stage::Videos,
            outcomes,
        })
    }
}
