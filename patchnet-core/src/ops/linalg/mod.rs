// src/ops/linalg/mod.rs

pub mod matmul;

pub use matmul::MatMul;
