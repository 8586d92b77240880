//! # Tensor Operations Module (`ops`)
//!
//! Every operator implements [`Operator`](crate::autograd::Operator): a
//! `forward` producing a fresh output tensor and a `backward` returning one
//! gradient buffer per input. Operations are categorized into submodules
//! based on their functionality.
//!
//! ## Key Submodules:
//!
//! - [`linalg`]: [`MatMul`].
//! - [`arithmetic`]: [`Add`] with bias broadcasting.
//! - [`activation`]: [`Tanh`] and the width-doubling [`Everett`] split.
//! - [`view`]: [`Concat`].
//! - [`reduction`]: [`AverageRows`].
//! - [`normalization`]: [`Awareness`] (batch statistics appended to every row).
//! - [`dropout`]: [`Dropout`] for training and [`Identity`] for inference.
//! - [`loss`]: the [`Quadratic`] cost.
//!
//! All operators assume the `[width, rows]` layout described on
//! [`Tensor`](crate::tensor::Tensor).

pub mod activation;
pub mod arithmetic;
pub mod dropout;
pub mod linalg;
pub mod loss;
pub mod normalization;
pub mod reduction;
pub mod view;

pub use activation::{Activation, Everett, Tanh};
pub use arithmetic::Add;
pub use dropout::{Dropout, Identity};
pub use linalg::MatMul;
pub use loss::Quadratic;
pub use normalization::Awareness;
pub use reduction::AverageRows;
pub use view::Concat;
