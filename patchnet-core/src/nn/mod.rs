// src/nn/mod.rs
// Parameter storage shared by the model builder, the optimizer and checkpoints.

pub mod store;

pub use store::{ParameterStore, StoreKind};
