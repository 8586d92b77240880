use crate::error::PatchNetError;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Creates a zero-valued tensor of the given shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, PatchNetError> {
    let numel = shape.iter().product();
    Tensor::new(vec![0.0; numel], shape.to_vec())
}

/// Creates a tensor from a value vector and shape.
pub fn from_vec(values: Vec<f32>, shape: &[usize]) -> Result<Tensor, PatchNetError> {
    Tensor::new(values, shape.to_vec())
}

/// Creates a tensor with values drawn from `Normal(0, std_dev)`.
///
/// The generator is passed in so that initialization is reproducible.
pub fn randn_scaled<R: Rng + ?Sized>(
    shape: &[usize],
    std_dev: f32,
    rng: &mut R,
) -> Result<Tensor, PatchNetError> {
    if !(std_dev >= 0.0 && std_dev.is_finite()) {
        return Err(PatchNetError::ConfigurationError(format!(
            "invalid standard deviation {}",
            std_dev
        )));
    }
    let normal = Normal::new(0.0f32, std_dev).map_err(|e| {
        PatchNetError::ConfigurationError(format!("invalid standard deviation {}: {}", std_dev, e))
    })?;
    let numel = shape.iter().product();
    let values: Vec<f32> = (0..numel).map(|_| normal.sample(rng)).collect();
    Tensor::new(values, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
