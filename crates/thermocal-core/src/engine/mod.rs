//! # Engine Module
//!
//! Stateful numeric pipelines built on top of the folding collaborator.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated sweep and optimizer settings with builders
//! - **Sliding Window** ([`window`]) - Ring buffer of free-energy samples for the stencil
//! - **Objectives** ([`objective`]) - Quadratic and absolute fit/penalty strategies
//! - **Pairing Statistics** ([`statistics`]) - Exact or sampled unpaired probabilities
//! - **Tasks** ([`tasks`]) - The heat-capacity sweep and the perturbation-vector optimizer
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Pipeline error type wrapping every lower layer

pub mod config;
pub mod error;
pub mod objective;
pub mod progress;
pub mod statistics;
pub mod tasks;
pub mod window;
