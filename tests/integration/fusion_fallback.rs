//! Fusion strategy ladder and manifest cleanup.

use super::support::{png_bytes, test_store};
use slideforge::config::FusionConfig;
use slideforge::error::{FusionError, PipelineError};
use slideforge::fusion::FusionEngine;
use slideforge::store::Stage;
use std::fs;
use tempfile::TempDir;

fn config_with_encoder(encoder: &str) -> FusionConfig {
    FusionConfig {
        encoder: encoder.to_string(),
        ..FusionConfig::default()
    }
}

#[test]
fn video_fusion_reports_both_failed_strategies() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    store.write(Stage::Videos, 0, b"seg0").unwrap();
    store.write(Stage::Videos, 1, b"seg1").unwrap();

    // "false" exits non-zero for both the re-encode and the stream copy
    let config = config_with_encoder("false");
    let engine = FusionEngine::new(&store, &config);

    match engine.fuse_video() {
        Err(PipelineError::Fusion(FusionError::StrategiesExhausted { primary, fallback })) => {
            assert!(!primary.is_empty());
            assert!(!fallback.is_empty());
        }
        other => panic!("expected StrategiesExhausted, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn manifest_is_removed_on_failure_and_success() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    store.write(Stage::Videos, 0, b"seg0").unwrap();

    let no_manifests = |store: &slideforge::store::ArtifactStore| {
        fs::read_dir(store.stage_dir(Stage::Videos))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".txt"))
            .count()
            == 0
    };

    // failure path
    let config = config_with_encoder("false");
    let _ = FusionEngine::new(&store, &config).fuse_video();
    assert!(no_manifests(&store), "manifest left behind after failure");

    // success path ("true" exits 0)
    let config = config_with_encoder("true");
    let result = FusionEngine::new(&store, &config).fuse_video();
    assert!(result.is_ok());
    assert!(no_manifests(&store), "manifest left behind after success");
}

#[test]
fn slide_fusion_produces_one_page_per_artifact_source() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    store.write(Stage::Slides, 1, &png_bytes()).unwrap();
    store.write(Stage::Slides, 2, &png_bytes()).unwrap();

    let config = FusionConfig::default();
    let deck = FusionEngine::new(&store, &config)
        .fuse_slides()
        .unwrap()
        .expect("deck should be produced");
    assert_eq!(deck, store.deck_path());
    assert!(fs::metadata(&deck).unwrap().len() > 0);
}

#[test]
fn fusions_are_noops_on_empty_stages() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    // directories exist but hold no artifacts
    fs::create_dir_all(store.stage_dir(Stage::Slides)).unwrap();
    fs::create_dir_all(store.stage_dir(Stage::Videos)).unwrap();

    let config = FusionConfig::default();
    let engine = FusionEngine::new(&store, &config);
    assert!(engine.fuse_slides().unwrap().is_none());
    assert!(engine.fuse_video().unwrap().is_none());
}
