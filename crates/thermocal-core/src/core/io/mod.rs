//! Thin input/output layers around the numeric pipelines: structure-probing reactivity
//! files in, heat-capacity tables, perturbation vectors and checkpoints out.

pub mod probing;
pub mod writers;
