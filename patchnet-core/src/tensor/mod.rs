// src/tensor/mod.rs

use crate::error::PatchNetError;
use crate::tensor_data::{MomentState, TensorData};
use std::fmt;
use std::sync::{Arc, RwLock};

mod autograd_methods;
pub mod create;
pub mod utils;

pub use create::{from_vec, randn_scaled, zeros};

/// A dense `f32` tensor with a gradient accumulator.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** the parameter store and every graph node that
///     reads a parameter hold the same buffer (cheap clones).
/// 2.  **Interior Mutability:** gradients are accumulated through shared
///     handles during the backward pass.
///
/// Shapes are `[width]` or `[width, rows]`; element `(col j, row i)` lives at
/// `i * width + j`.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given values and shape.
    pub fn new(values: Vec<f32>, shape: Vec<usize>) -> Result<Self, PatchNetError> {
        let tensor_data = TensorData::new(values, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Size of the first (fast-varying) dimension.
    pub fn width(&self) -> usize {
        self.read_data().width()
    }

    /// Number of rows (second dimension, 1 for a 1-D tensor).
    pub fn rows(&self) -> usize {
        self.read_data().rows()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Copies the values out of the tensor.
    pub fn values(&self) -> Vec<f32> {
        self.read_data().values.clone()
    }

    /// Returns the value at `index`, or `None` when out of range.
    pub fn value_at(&self, index: usize) -> Option<f32> {
        self.read_data().values.get(index).copied()
    }

    /// Overwrites all values. The length must match the tensor's element count.
    pub fn set_values(&self, values: &[f32]) -> Result<(), PatchNetError> {
        let mut guard = self.write_data();
        if values.len() != guard.numel() {
            return Err(PatchNetError::TensorCreationError {
                data_len: values.len(),
                shape: guard.shape.clone(),
            });
        }
        guard.values.copy_from_slice(values);
        Ok(())
    }

    /// Sets every value to `value`.
    pub fn fill(&self, value: f32) {
        self.write_data().values.fill(value);
    }

    /// Attaches zeroed Adam moment buffers, replacing any existing state.
    pub fn init_optimizer_state(&self) {
        let mut guard = self.write_data();
        let numel = guard.numel();
        guard.state = Some(MomentState::zeros(numel));
    }

    /// Whether this tensor carries optimizer state (i.e. is trainable).
    pub fn has_optimizer_state(&self) -> bool {
        self.read_data().state.is_some()
    }

    /// Copies the optimizer state out, if any.
    pub fn optimizer_state(&self) -> Option<MomentState> {
        self.read_data().state.clone()
    }

    /// True when both handles point at the same buffer.
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Acquires a read lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }
}

impl Clone for Tensor {
    /// Cloning shares the underlying buffer.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("values", &guard.values)
            .field("trainable", &guard.state.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
