// src/ops/arithmetic/mod.rs

pub mod add;

pub use add::Add;
