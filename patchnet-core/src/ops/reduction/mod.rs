// src/ops/reduction/mod.rs
// Operators reducing across rows.

pub mod average_rows;

pub use average_rows::AverageRows;
