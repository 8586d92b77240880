// src/ops/view/mod.rs
// Operators that only rearrange values.

pub mod concat;

pub use concat::Concat;
