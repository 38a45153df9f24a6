//! # thermocal Core Library
//!
//! Numerically iterative analyses on top of an RNA folding engine: heat-capacity curves from
//! a temperature sweep of ensemble free energies, and probing-guided calibration of
//! per-position pseudo-energy perturbation vectors.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models, the folding collaborator contract
//!   with a reference engine, the finite-difference stencil, and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** Stateful numeric pipelines. The heat-capacity sweep
//!   slides a ring-buffered window of free energies across a temperature range; the
//!   perturbation optimizer descends a regularized objective against classified probing
//!   targets.
//!
//! - **[`workflows`]: The Public API.** Entry points that wire a sequence, configuration, the
//!   reference engine, progress reporting and output together.

pub mod core;
pub mod engine;
pub mod workflows;
