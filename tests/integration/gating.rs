//! Dependency gating: transitions require both bracketing slide artifacts.

use super::support::{png_bytes, test_store, Call, ScriptedGenerator};
use slideforge::plan::Plan;
use slideforge::stage::{StageRunner, UnitOutcome};
use slideforge::store::Stage;
use tempfile::TempDir;

#[tokio::test]
async fn transition_with_complete_bracket_is_generated() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    store.write(Stage::Slides, 1, &png_bytes()).unwrap();
    store.write(Stage::Slides, 2, &png_bytes()).unwrap();

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    let plan = Plan::parse(r#"{"v1": "cross-fade"}"#).unwrap();

    let report = runner.run_transitions(&plan).await.unwrap();
    assert_eq!(report.count(UnitOutcome::Generated), 1);
    assert!(store.exists(Stage::Videos, 1));

    assert_eq!(
        generator.calls()[0],
        Call::Transition {
            content: "cross-fade".to_string(),
            first: store.path_for(Stage::Slides, 1),
            last: store.path_for(Stage::Slides, 2),
        }
    );
}

#[tokio::test]
async fn missing_bracket_skips_unit_without_failing_stage() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    // only s1 and s2 exist; v2 needs s2 and s3
    store.write(Stage::Slides, 1, &png_bytes()).unwrap();
    store.write(Stage::Slides, 2, &png_bytes()).unwrap();

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    let plan = Plan::parse(r#"{"v1": "t1", "v2": "t2", "v3": "t3"}"#).unwrap();

    let report = runner.run_transitions(&plan).await.unwrap();
    assert_eq!(report.count(UnitOutcome::Generated), 1);
    assert_eq!(report.count(UnitOutcome::MissingDependency), 2);

    // partial completion is a terminal state, not an error
    assert!(store.exists(Stage::Videos, 1));
    assert!(!store.exists(Stage::Videos, 2));
    assert!(!store.exists(Stage::Videos, 3));
}

#[tokio::test]
async fn failed_transition_does_not_stop_later_units() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    for index in 1..=3 {
        store.write(Stage::Slides, index, &png_bytes()).unwrap();
    }

    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    let plan = Plan::parse(r#"{"v1": "!fail", "v2": "t2"}"#).unwrap();

    let report = runner.run_transitions(&plan).await.unwrap();
    assert_eq!(report.count(UnitOutcome::Failed), 1);
    assert_eq!(report.count(UnitOutcome::Generated), 1);
    assert!(!store.exists(Stage::Videos, 1));
    assert!(store.exists(Stage::Videos, 2));
}
