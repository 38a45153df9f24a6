//! # Workflows Module
//!
//! Top-level entry points. Each workflow builds the reference folding engine for a
//! sequence, runs one pipeline from [`crate::engine::tasks`], and routes its results to
//! output writers, checkpoints and progress reporting.
//!
//! - **Heat Capacity** ([`heat`]) - Specific-heat curve over a temperature range
//! - **Perturbation Vector** ([`pvmin`]) - Probing-guided pseudo-energy calibration
//!
//! Both workflows also accept any other [`FoldingEngine`](crate::core::fold::FoldingEngine)
//! through their `run_with_engine` variants.

pub mod heat;
pub mod pvmin;
