//! Idempotent re-runs and resumption of interrupted stages.

use super::support::{test_store, Call, ScriptedGenerator};
use slideforge::plan::Plan;
use slideforge::stage::{StageRunner, UnitOutcome};
use slideforge::store::Stage;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn second_run_with_skip_regenerates_nothing() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let plan = Plan::parse(r#"{"s1": "a", "s2": "b", "s3": "c"}"#).unwrap();

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, true);
    runner.run_slides(&plan).await.unwrap();
    assert_eq!(generator.call_count(), 3);

    let first_pass: Vec<Vec<u8>> = store
        .list(Stage::Slides)
        .unwrap()
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect();

    let report = runner.run_slides(&plan).await.unwrap();
    assert_eq!(generator.call_count(), 3, "no unit may be re-generated");
    assert_eq!(report.count(UnitOutcome::Skipped), 3);

    let second_pass: Vec<Vec<u8>> = store
        .list(Stage::Slides)
        .unwrap()
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect();
    assert_eq!(first_pass, second_pass, "artifacts must be unchanged");
}

#[tokio::test]
async fn interrupted_run_resumes_from_first_missing_unit() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let plan = Plan::parse(r#"{"s1": "a", "s2": "b", "s3": "c"}"#).unwrap();

    // simulate an interrupted run: s1 and s2 already written
    store.write(Stage::Slides, 1, b"first run s1").unwrap();
    store.write(Stage::Slides, 2, b"first run s2").unwrap();

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, true);
    let report = runner.run_slides(&plan).await.unwrap();

    assert_eq!(report.count(UnitOutcome::Skipped), 2);
    assert_eq!(report.count(UnitOutcome::Generated), 1);

    // only s3 was generated, chained off the pre-existing s2
    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        Call::Slide {
            content: "c".to_string(),
            reference: Some(store.path_for(Stage::Slides, 2)),
        }
    );

    // the completed prefix is untouched
    assert_eq!(
        fs::read(store.path_for(Stage::Slides, 1)).unwrap(),
        b"first run s1"
    );
    assert_eq!(
        fs::read(store.path_for(Stage::Slides, 2)).unwrap(),
        b"first run s2"
    );
}

#[tokio::test]
async fn without_skip_existing_artifacts_are_regenerated() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let plan = Plan::parse(r#"{"s1": "a"}"#).unwrap();
    store.write(Stage::Slides, 1, b"stale").unwrap();

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    let report = runner.run_slides(&plan).await.unwrap();

    assert_eq!(report.count(UnitOutcome::Generated), 1);
    assert_ne!(fs::read(store.path_for(Stage::Slides, 1)).unwrap(), b"stale");
}
