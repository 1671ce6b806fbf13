//! Orchestrator re-entrancy: later stages fail cleanly without earlier
//! stage output.

use super::support::stub_document;
use slideforge::config::SlideforgeConfig;
use slideforge::error::PipelineError;
use slideforge::pipeline::Pipeline;
use slideforge::store::Stage;
use tempfile::TempDir;

fn pipeline(temp: &TempDir) -> Pipeline {
    let document = stub_document(temp);
    Pipeline::new(
        SlideforgeConfig::default(),
        &document,
        &temp.path().join("outputs"),
    )
    .unwrap()
}

#[test]
fn missing_input_document_is_fatal() {
    let temp = TempDir::new().unwrap();
    let result = Pipeline::new(
        SlideforgeConfig::default(),
        &temp.path().join("nope.pdf"),
        temp.path(),
    );
    assert!(matches!(result, Err(PipelineError::DocumentNotFound(_))));
}

#[tokio::test]
async fn slides_without_plan_name_the_missing_artifact() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline(&temp);
    match pipeline.run_slides(None, false).await {
        Err(PipelineError::MissingPrerequisite { stage, path }) => {
            assert_eq!(stage, "plan");
            assert!(path.ends_with("plan.json"));
        }
        other => panic!("expected MissingPrerequisite, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn videos_without_slides_name_the_missing_stage() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline(&temp);
    pipeline.store().write_plan(r#"{"s1": "a", "v1": "t"}"#).unwrap();
    match pipeline.run_videos(None, false).await {
        Err(PipelineError::MissingPrerequisite { stage, .. }) => assert_eq!(stage, "slides"),
        other => panic!("expected MissingPrerequisite, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn fuse_without_stage_dirs_is_fatal() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline(&temp);
    assert!(matches!(
        pipeline.fuse_slides(),
        Err(PipelineError::MissingPrerequisite { stage: "slides", .. })
    ));
    assert!(matches!(
        pipeline.fuse_video(),
        Err(PipelineError::MissingPrerequisite { stage: "videos", .. })
    ));
}

#[test]
fn malformed_plan_aborts_before_generation() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline(&temp);
    pipeline.store().write_plan("not json at all").unwrap();
    assert!(matches!(
        pipeline.load_plan(None),
        Err(PipelineError::Plan(_))
    ));
}

#[test]
fn fuse_succeeds_once_stage_output_exists() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline(&temp);
    pipeline
        .store()
        .write(Stage::Slides, 1, &super::support::png_bytes())
        .unwrap();
    let deck = pipeline.fuse_slides().unwrap();
    assert_eq!(deck, Some(pipeline.store().deck_path()));
}
