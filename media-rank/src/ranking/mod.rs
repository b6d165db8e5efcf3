//! Ranking pipeline: deduplication, six-factor scoring, ordering.
//!
//! [`rank::Ranker`] ties the stages together; the submodules are usable
//! on their own for callers that only need one stage.

pub mod dedup;
pub mod rank;
pub mod scoring;
pub mod similarity;
pub mod weights;
