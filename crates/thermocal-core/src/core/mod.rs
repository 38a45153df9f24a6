//! # Core Module
//!
//! Stateless building blocks for thermodynamic calibration of RNA sequences.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Sequences, model details, perturbation vectors and target
//!   classifications
//! - **Folding** ([`fold`]) - The [`fold::FoldingEngine`] collaborator contract and the
//!   reference nearest-neighbour engine [`fold::RnaFolder`]
//! - **Numerics** ([`numeric`]) - The least-squares finite-difference stencil
//! - **File I/O** ([`io`]) - Probing-data readers and output writers
//!
//! Nothing in this layer keeps state between calls; the pipelines in
//! [`crate::engine`] own all iteration state.

pub mod fold;
pub mod io;
pub mod models;
pub mod numeric;
