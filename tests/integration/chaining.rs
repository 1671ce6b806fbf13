//! Reference chaining across the slide stage.

use super::support::{test_store, Call, ScriptedGenerator};
use slideforge::plan::Plan;
use slideforge::stage::{StageRunner, UnitOutcome};
use slideforge::store::Stage;
use tempfile::TempDir;

#[tokio::test]
async fn first_unit_has_no_reference_later_units_chain() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    let plan = Plan::parse(r#"{"s1": "alpha", "s2": "beta", "s3": "gamma"}"#).unwrap();

    runner.run_slides(&plan).await.unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        Call::Slide {
            content: "alpha".to_string(),
            reference: None,
        }
    );
    assert_eq!(
        calls[1],
        Call::Slide {
            content: "beta".to_string(),
            reference: Some(store.path_for(Stage::Slides, 1)),
        }
    );
    assert_eq!(
        calls[2],
        Call::Slide {
            content: "gamma".to_string(),
            reference: Some(store.path_for(Stage::Slides, 2)),
        }
    );
}

#[tokio::test]
async fn reference_follows_numeric_order_not_input_order() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    // s10 must come after s9 even though "s10" < "s9" lexicographically
    let plan = Plan::parse(r#"{"s10": "ten", "s9": "nine"}"#).unwrap();

    runner.run_slides(&plan).await.unwrap();

    let calls = generator.calls();
    assert_eq!(
        calls[0],
        Call::Slide {
            content: "nine".to_string(),
            reference: None,
        }
    );
    assert_eq!(
        calls[1],
        Call::Slide {
            content: "ten".to_string(),
            reference: Some(store.path_for(Stage::Slides, 9)),
        }
    );
}

#[tokio::test]
async fn failed_unit_yields_no_reference_for_its_successor() {
    let temp = TempDir::new().unwrap();
    let store = test_store(&temp);
    let generator = ScriptedGenerator::new();
    let runner = StageRunner::new(&store, &generator, false);
    let plan = Plan::parse(r#"{"s1": "a", "s2": "!fail", "s3": "c"}"#).unwrap();

    let report = runner.run_slides(&plan).await.unwrap();
    assert_eq!(report.count(UnitOutcome::Failed), 1);
    assert_eq!(report.count(UnitOutcome::Generated), 2);

    let calls = generator.calls();
    // s3's predecessor has no artifact, so no reference is passed
    assert_eq!(
        calls[2],
        Call::Slide {
            content: "c".to_string(),
            reference: None,
        }
    );
}
