//! # Folding Module
//!
//! A compact nearest-neighbour folding engine for single RNA strands.
//!
//! The numeric pipelines only talk to folding code through the [`FoldingEngine`] trait. This
//! module provides [`RnaFolder`], a reference implementation with a simplified
//! temperature-dependent loop energy model, a generic inside recursion shared between the
//! minimum-free-energy and partition-function algebras, an outside recursion for pair
//! probabilities, and stochastic backtracking.

mod folder;
mod inside;
mod matrix;
mod model;
mod outside;
pub mod pairs;
pub mod params;
mod sampling;

pub use folder::RnaFolder;

use crate::core::models::details::ModelDetails;
use crate::core::models::perturbation::PerturbationVector;
use crate::core::models::sequence::Sequence;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FoldingError {
    #[error("Partition function is zero or not finite; adjust the rescaling reference energy")]
    NumericOverflow,

    #[error("Energy set {0} is not supported; only the standard set 0 is available")]
    UnsupportedEnergySet(u8),

    #[error("Perturbation vector has length {found}, but the sequence has length {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Position {position} is outside the sequence (length {length})")]
    InvalidPosition { position: usize, length: usize },

    #[error("Stochastic backtracking failed: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),
}

/// The folding collaborator consumed by the heat-capacity sweep and the perturbation
/// optimizer.
///
/// Every evaluation reflects the model details last passed to
/// [`apply_model_details`](Self::apply_model_details) and the scale last set through
/// [`rescale`](Self::rescale).
pub trait FoldingEngine {
    fn sequence(&self) -> &Sequence;

    /// Re-reads the model details, including the temperature.
    fn apply_model_details(&mut self, details: &ModelDetails) -> Result<(), FoldingError>;

    /// Renormalizes partition sums around a reference free energy in kcal/mol.
    fn rescale(&mut self, reference_energy: f64);

    /// Free energy of the minimum-free-energy structure in kcal/mol.
    fn minimum_free_energy(&self) -> Result<f64, FoldingError>;

    /// Free energy of the unperturbed ensemble in kcal/mol.
    fn ensemble_free_energy(&self) -> Result<f64, FoldingError>;

    /// Probability of each position being unpaired under a pseudo-energy bias.
    ///
    /// With `forced_unpaired` set to a 1-based position, the ensemble is restricted to
    /// structures that leave that position unpaired.
    fn unpaired_probabilities(
        &self,
        bias: &PerturbationVector,
        forced_unpaired: Option<usize>,
    ) -> Result<Vec<f64>, FoldingError>;

    /// Draws `count` structures in dot-bracket notation from the biased ensemble.
    fn sample_structures(
        &self,
        bias: &PerturbationVector,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, FoldingError>;
}
