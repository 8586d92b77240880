// patchnet-core/src/optim/mod.rs

//! Optimizers for training the model.
//!
//! This module provides the `Optimizer` trait and the `Adam` implementation
//! used by the training loop.

pub mod adam;
pub mod optimizer_trait;

pub use adam::{Adam, AdamConfig};
pub use optimizer_trait::Optimizer;
