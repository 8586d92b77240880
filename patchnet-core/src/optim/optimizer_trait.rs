use crate::error::PatchNetError;
use crate::nn::store::ParameterStore;

/// Trait defining the common interface for optimizers.
///
/// Optimizers update the tensors of a trainable [`ParameterStore`] in place
/// from their accumulated gradients.
pub trait Optimizer {
    /// Performs a single optimization step.
    ///
    /// Every gradient is multiplied by `grad_scale` before use, which lets
    /// the caller turn a gradient summed over a minibatch into a mean.
    fn step(&mut self, params: &ParameterStore, grad_scale: f32) -> Result<(), PatchNetError>;

    /// Clears the gradients of every parameter in `params`.
    fn zero_grad(&self, params: &ParameterStore) {
        params.zero_gradients();
    }

    /// Number of completed steps.
    fn iterations(&self) -> u64;
}
