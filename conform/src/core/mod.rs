//! Pure, deterministic logic: classification, variants, skip rules, aggregation.

pub mod outcome;
pub mod report;
pub mod skip;
pub mod variant;
