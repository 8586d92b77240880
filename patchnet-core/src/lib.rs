//! Core of patchnet: dense `f32` tensors, a hand-written reverse-mode
//! autodiff engine, the operator library, parameter storage with binary
//! checkpoints, the Adam optimizer and the patch classifier builder.

pub mod autograd;
pub mod error;
pub mod io;
pub mod model;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub use error::PatchNetError;
pub use tensor::Tensor;
