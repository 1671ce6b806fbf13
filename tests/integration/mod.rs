//! Integration tests for the slideforge generation pipeline

mod chaining;
mod end_to_end;
mod fusion_fallback;
mod gating;
mod pipeline_prerequisites;
mod resumability;
mod support;
