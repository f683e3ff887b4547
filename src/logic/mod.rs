//! Logic Module - Prediction Pipeline
//!
//! CSV ingestion, the attack-class registry, the model adapter and the
//! two prediction paths. Nothing in here depends on HTTP types, so the
//! whole pipeline is testable without a running server.

pub mod ingest;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod report;
