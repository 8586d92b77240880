// src/tensor_data.rs
use crate::error::PatchNetError;
use crate::tensor::utils::{validate_shape, width_rows};

/// First and second moment estimates kept by the Adam optimizer.
///
/// Only trainable parameters carry this state; it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentState {
    /// Exponential moving average of gradients.
    pub m: Vec<f32>,
    /// Exponential moving average of squared gradients.
    pub v: Vec<f32>,
}

impl MomentState {
    pub fn zeros(numel: usize) -> Self {
        MomentState {
            m: vec![0.0; numel],
            v: vec![0.0; numel],
        }
    }
}

/// Internal storage and metadata for a Tensor.
///
/// Wrapped in `Arc<RwLock<TensorData>>` by `Tensor` so that the parameter
/// store and every graph node consuming a parameter share one buffer.
#[derive(Debug)]
pub struct TensorData {
    /// Flat values, first dimension fast-varying.
    pub(crate) values: Vec<f32>,
    /// Accumulated dLoss/dvalue. Written by addition only.
    pub(crate) grad: Vec<f32>,
    /// `[width]` or `[width, rows]`.
    pub(crate) shape: Vec<usize>,
    /// Adam moments, present for trainable parameters.
    pub(crate) state: Option<MomentState>,
}

impl TensorData {
    /// Creates a new `TensorData` with the given values and shape and a zeroed gradient.
    ///
    /// # Errors
    /// `InvalidShape` if the shape is not 1-D or 2-D with positive dimensions,
    /// `TensorCreationError` if the data length does not match the shape.
    pub fn new(values: Vec<f32>, shape: Vec<usize>) -> Result<Self, PatchNetError> {
        validate_shape(&shape)?;
        let numel: usize = shape.iter().product();
        if values.len() != numel {
            return Err(PatchNetError::TensorCreationError {
                data_len: values.len(),
                shape,
            });
        }
        Ok(TensorData {
            values,
            grad: vec![0.0; numel],
            shape,
            state: None,
        })
    }

    pub fn numel(&self) -> usize {
        self.values.len()
    }

    /// Size of the first (fast-varying) dimension.
    pub fn width(&self) -> usize {
        width_rows(&self.shape).0
    }

    /// Number of rows; a 1-D tensor has a single row.
    pub fn rows(&self) -> usize {
        width_rows(&self.shape).1
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn state(&self) -> Option<&MomentState> {
        self.state.as_ref()
    }
}
