//! End-to-end flow over a small plan: slides, transitions, fusion.

use super::support::{test_store, Call, ScriptedGenerator};
use slideforge::config::FusionConfig;
use slideforge::fusion::FusionEngine;
use slideforge::plan::Plan;
use slideforge::stage::{StageRunner, UnitOutcome};
use slideforge::store::Stage;
use tempfile::TempDir;

#[tokio::test]
async fn two_slides_one_transition() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let plan = Plan::parse(r#"{"s1": "A", "s2": "B", "v1": "transition A to B"}"#).unwrap();

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);

    // slide stage: s1 then s2, s2 referencing s1
    let slides = runner.run_slides(&plan).await.unwrap();
    assert_eq!(slides.count(UnitOutcome::Generated), 2);
    assert_eq!(
        generator.calls()[1],
        Call::Slide {
            content: "B".to_string(),
            reference: Some(store.path_for(Stage::Slides, 1)),
        }
    );

    // video stage: one transition over the two bracketing slides
    let videos = runner.run_transitions(&plan).await.unwrap();
    assert_eq!(videos.count(UnitOutcome::Generated), 1);
    assert!(store.exists(Stage::Videos, 1));

    // slide fusion over both artifacts
    let fusion_config = FusionConfig::default();
    let engine = FusionEngine::new(&store, &fusion_config);
    let deck = engine.fuse_slides().unwrap().expect("deck expected");
    assert!(deck.exists());

    // video fusion with a single segment; "true" stands in for the encoder
    let fusion_config = FusionConfig {
        encoder: "true".to_string(),
        ..FusionConfig::default()
    };
    let engine = FusionEngine::new(&store, &fusion_config);
    assert_eq!(
        engine.fuse_video().unwrap(),
        Some(store.fused_video_path())
    );
}
