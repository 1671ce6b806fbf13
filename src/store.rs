//! Artifact storage for the generation pipeline.
//!
//! Maps (document, stage, unit index) to a deterministic location under the
//! output root and answers the existence queries that make re-runs
//! idempotent. All filesystem mutation for the pipeline flows through this
//! type; stage runners and the fusion engine never touch storage directly.
//!
//! Layout, rooted at `<output_root>/<document_stem>/`:
//!
//! ```text
//! plan.json
//! slide_pieces/slide_p<i>.png
//! presentation.pdf
//! video/segment_<i>.mp4
//! video/fused.mp4
//! ```

use crate::error::StoreError;
use crate::plan::index_after_prefix;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A family of unit artifacts with its own directory and naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Slides,
    Videos,
}

impl Stage {
    fn dir_name(&self) -> &'static str {
        match self {
            Stage::Slides => "slide_pieces",
            Stage::Videos => "video",
        }
    }

    fn file_prefix(&self) -> &'static str {
        match self {
            Stage::Slides => "slide_p",
            Stage::Videos => "segment_",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Stage::Slides => "png",
            Stage::Videos => "mp4",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Slides => write!(f, "slides"),
            Stage::Videos => write!(f, "videos"),
        }
    }
}

/// Per-document artifact store.
///
/// Construction is pure; directories are created on first write.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `<output_root>/<document_stem>/`.
    pub fn for_document(output_root: &Path, document: &Path) -> Result<Self, StoreError> {
        let stem = document
            .file_stem()
            .ok_or_else(|| StoreError::MissingDocumentStem(document.to_path_buf()))?;
        Ok(Self {
            root: output_root.join(stem),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plan_path(&self) -> PathBuf {
        self.root.join("plan.json")
    }

    pub fn deck_path(&self) -> PathBuf {
        self.root.join("presentation.pdf")
    }

    pub fn fused_video_path(&self) -> PathBuf {
        self.root.join("video").join("fused.mp4")
    }

    /// Directory holding one stage's unit artifacts.
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// Deterministic location of one unit artifact.
    pub fn path_for(&self, stage: Stage, index: u32) -> PathBuf {
        self.stage_dir(stage).join(format!(
            "{}{}.{}",
            stage.file_prefix(),
            index,
            stage.extension()
        ))
    }

    pub fn exists(&self, stage: Stage, index: u32) -> bool {
        self.path_for(stage, index).exists()
    }

    /// Write one unit artifact, creating parent directories as needed.
    ///
    /// Uses a temp-file-then-rename write so a partially written artifact is
    /// never observable at the final location.
    pub fn write(&self, stage: Stage, index: u32, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let target = self.path_for(stage, index);
        write_atomic(&target, bytes)?;
        Ok(target)
    }

    /// Write the plan JSON.
    pub fn write_plan(&self, json: &str) -> Result<PathBuf, StoreError> {
        let target = self.plan_path();
        write_atomic(&target, json.as_bytes())?;
        Ok(target)
    }

    /// Write the rendered deck.
    pub fn write_deck(&self, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let target = self.deck_path();
        write_atomic(&target, bytes)?;
        Ok(target)
    }

    /// All unit artifacts of one stage, sorted by the shared numeric-suffix
    /// rule (never lexicographically). Files that do not match the stage's
    /// naming scheme are skipped with a warning.
    ///
    /// A missing stage directory lists as empty; prerequisite checks are the
    /// orchestrator's concern.
    pub fn list(&self, stage: Stage) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.stage_dir(stage);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut indexed: Vec<(u32, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if ext != stage.extension() {
                continue;
            }
            match index_after_prefix(stem, stage.file_prefix()) {
                Some(index) => indexed.push((index, path)),
                None => {
                    warn!(path = %path.display(), "skipping artifact with unrecognized name");
                }
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, path)| path).collect())
    }
}

fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = target.with_extension("tmp");
    fs::write(&temp, bytes)?;
    fs::rename(&temp, target).map_err(|e| {
        let _ = fs::remove_file(&temp);
        StoreError::Io(e)
    })?;
    Ok(())
}
