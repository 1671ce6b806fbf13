//! Status presentation: per-stage artifact coverage for one document.
//!
//! Reads the plan when present and reports which unit artifacts exist, plus
//! the composite outputs. Purely read-only; useful before resuming an
//! interrupted run with `--exist`.

use crate::error::PipelineError;
use crate::plan::{Plan, UnitFamily};
use crate::store::{ArtifactStore, Stage};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fs;

/// Presence of one unit's artifact.
#[derive(Debug, Serialize)]
pub struct UnitStatus {
    pub unit: String,
    pub artifact: String,
    pub present: bool,
}

/// Status of one document's pipeline outputs.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub output_root: String,
    pub plan_present: bool,
    pub slides: Vec<UnitStatus>,
    pub transitions: Vec<UnitStatus>,
    pub deck_present: bool,
    pub fused_video_present: bool,
}

/// Collect coverage for a document's store. Unit rows come from the plan;
/// without a plan only the composite outputs are reported.
pub fn collect_status(store: &ArtifactStore) -> Result<StatusReport, PipelineError> {
    let plan_path = store.plan_path();
    let plan = if plan_path.exists() {
        Some(Plan::parse(&fs::read_to_string(&plan_path).map_err(
            |e| PipelineError::Store(crate::error::StoreError::Io(e)),
        )?)?)
    } else {
        None
    };

    let mut slides = Vec::new();
    let mut transitions = Vec::new();
    if let Some(ref plan) = plan {
        for key in plan.ordered_keys(UnitFamily::Slide) {
            let path = store.path_for(Stage::Slides, key.index);
            slides.push(UnitStatus {
                unit: key.to_string(),
                artifact: path.display().to_string(),
                present: path.exists(),
            });
        }
        for key in plan.ordered_keys(UnitFamily::Transition) {
            let path = store.path_for(Stage::Videos, key.index);
            transitions.push(UnitStatus {
                unit: key.to_string(),
                artifact: path.display().to_string(),
                present: path.exists(),
            });
        }
    }

    Ok(StatusReport {
        output_root: store.root().display().to_string(),
        plan_present: plan.is_some(),
        slides,
        transitions,
        deck_present: store.deck_path().exists(),
        fused_video_present: store.fused_video_path().exists(),
    })
}

pub fn format_status_text(report: &StatusReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Output: {}\n", report.output_root));
    out.push_str(&format!("Plan: {}\n", presence(report.plan_present)));

    if !report.plan_present {
        out.push_str("Run `slideforge plan <document>` first.\n");
        return out;
    }

    for (heading, units) in [("Slides", &report.slides), ("Transitions", &report.transitions)] {
        out.push_str(&format!("\n{}\n", heading.bold()));
        if units.is_empty() {
            out.push_str("  (none in plan)\n");
            continue;
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Unit", "Artifact", "Present"]);
        for unit in units {
            table.add_row(vec![
                unit.unit.clone(),
                unit.artifact.clone(),
                if unit.present { "yes" } else { "no" }.to_string(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }

    out.push_str(&format!("\nDeck: {}\n", presence(report.deck_present)));
    out.push_str(&format!("Fused video: {}\n", presence(report.fused_video_present)));
    out
}

pub fn format_status_json(report: &StatusReport) -> Result<String, PipelineError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| PipelineError::Config(format!("failed to serialize status: {}", e)))
}

fn presence(present: bool) -> String {
    if present {
        format!("{}", "present".green())
    } else {
        format!("{}", "missing".yellow())
    }
}
