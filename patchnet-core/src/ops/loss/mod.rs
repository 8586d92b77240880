// src/ops/loss/mod.rs

//! # Loss Functions
//!
//! Cost operators reduce a prediction and a target to a single-element
//! tensor that the gradient driver can seed.

pub mod quadratic;

pub use quadratic::Quadratic;
