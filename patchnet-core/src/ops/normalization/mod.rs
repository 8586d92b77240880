// src/ops/normalization/mod.rs

pub mod awareness;

pub use awareness::Awareness;
