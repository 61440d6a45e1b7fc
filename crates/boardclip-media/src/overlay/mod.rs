//! Overlay planning and filter-graph synthesis.

pub mod filtergraph;
pub mod planner;
