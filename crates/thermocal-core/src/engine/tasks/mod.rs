//! Numeric pipelines driven against a [`FoldingEngine`](crate::core::fold::FoldingEngine).
//!
//! Both tasks are strictly sequential and own all of their iteration state. They never
//! interact with each other.

pub mod heat_capacity;
pub mod perturbation;
