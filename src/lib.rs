//! Translate host shading-graph snapshots into Darts renderer material records.

pub mod dsl;
pub mod exporter;
pub mod graph;
pub mod report;
pub mod schema;
