use thiserror::Error;

use super::config::ConfigError;
use crate::core::fold::FoldingError;
use crate::core::io::probing::ProbingError;
use crate::core::models::sequence::SequenceError;
use crate::core::numeric::stencil::StencilError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid sequence: {source}")]
    Sequence {
        #[from]
        source: SequenceError,
    },

    #[error("Folding engine failed: {source}")]
    Folding {
        #[from]
        source: FoldingError,
    },

    #[error("Finite-difference stencil failed: {source}")]
    Stencil {
        #[from]
        source: StencilError,
    },

    #[error("Could not read probing data: {source}")]
    Probing {
        #[from]
        source: ProbingError,
    },

    #[error("Free energy at {temperature} °C is not finite ({value})")]
    NonFiniteEnergy { temperature: f64, value: f64 },

    #[error("Objective score became non-finite at iteration {iteration}")]
    NonFiniteScore { iteration: usize },

    #[error("{what} has length {found}, but the sequence has length {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
