//! # Models Module
//!
//! Plain data types shared by the folding engine and the numeric pipelines: the normalized
//! [`sequence::Sequence`], the caller-owned [`details::ModelDetails`], and the per-position
//! [`perturbation::PerturbationVector`] / [`perturbation::TargetClassification`] pair used by
//! probing-guided calibration.

pub mod details;
pub mod perturbation;
pub mod sequence;
