use crate::error::PatchNetError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// A differentiable tensor operation: one forward/backward pair.
///
/// Every operator of the library implements this trait. The graph records
/// each operator together with the nodes it consumes and replays them in
/// reverse order for the backward pass.
///
/// `Send` is required so that a built graph can be moved to another thread.
pub trait Operator: Debug + Send {
    /// Short name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Number of inputs this operator consumes.
    fn arity(&self) -> usize;

    /// Computes the output tensor from the inputs.
    ///
    /// Takes `&mut self` because some operators (dropout) draw state that
    /// must be reused by the paired `backward` call.
    ///
    /// # Errors
    /// Precondition violations (shape, rank, arity) are reported as errors;
    /// inputs are never reshaped or truncated.
    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError>;

    /// Computes dLoss/dInput for each input from the gradient stored in `output`.
    ///
    /// `output` must be the tensor returned by the last `forward` call and
    /// `inputs` the same tensors that were passed to it. The returned vector
    /// holds one gradient buffer per input, in input order, each with the
    /// input's element count. The caller accumulates them; implementations
    /// must not write into input gradients themselves.
    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError>;
}

/// Returns `ArityMismatch` unless `inputs` has exactly `expected` entries.
pub(crate) fn check_arity(
    operator: &'static str,
    expected: usize,
    inputs: &[&Tensor],
) -> Result<(), PatchNetError> {
    if inputs.len() != expected {
        return Err(PatchNetError::ArityMismatch {
            operator,
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}
