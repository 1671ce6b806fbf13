//! Shared test utilities for integration tests
//!
//! Provides a scripted unit generator and artifact helpers so stage and
//! fusion behavior can be exercised without a provider or an encoder.

use async_trait::async_trait;
use slideforge::error::ProviderError;
use slideforge::stage::UnitGenerator;
use slideforge::store::ArtifactStore;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// One recorded generator invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Slide {
        content: String,
        reference: Option<PathBuf>,
    },
    Transition {
        content: String,
        first: PathBuf,
        last: PathBuf,
    },
}

/// Generator that records every call and returns real PNG bytes for slides,
/// so downstream deck fusion can decode them. Units whose content contains
/// "!fail" fail with a provider error.
pub struct ScriptedGenerator {
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UnitGenerator for ScriptedGenerator {
    async fn slide(
        &self,
        content: &str,
        reference: Option<&Path>,
    ) -> Result<Vec<u8>, ProviderError> {
        self.calls.lock().unwrap().push(Call::Slide {
            content: content.to_string(),
            reference: reference.map(Path::to_path_buf),
        });
        if content.contains("!fail") {
            return Err(ProviderError::GenerationFailed("scripted failure".to_string()));
        }
        Ok(png_bytes())
    }

    async fn transition(
        &self,
        content: &str,
        first: &Path,
        last: &Path,
    ) -> Result<Vec<u8>, ProviderError> {
        self.calls.lock().unwrap().push(Call::Transition {
            content: content.to_string(),
            first: first.to_path_buf(),
            last: last.to_path_buf(),
        });
        if content.contains("!fail") {
            return Err(ProviderError::GenerationFailed("scripted failure".to_string()));
        }
        Ok(format!("mp4:{}", content).into_bytes())
    }
}

/// A small but valid 16:9 PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(32, 18)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

/// Fresh store for a stub document inside `temp`.
pub fn test_store(temp: &TempDir) -> ArtifactStore {
    ArtifactStore::for_document(&temp.path().join("outputs"), Path::new("paper.pdf")).unwrap()
}

/// Create a stub source document and return its path.
pub fn stub_document(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("paper.pdf");
    std::fs::write(&path, b"%PDF-1.4 stub").unwrap();
    path
}
