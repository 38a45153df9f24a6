//! Pure numerical routines used by the engine pipelines.

pub mod stencil;
