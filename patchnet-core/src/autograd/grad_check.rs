use crate::autograd::backward_op::Operator;
use crate::error::PatchNetError;
use crate::tensor::Tensor;
use approx::relative_eq;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64, // f64 for precision
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(PatchNetError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(PatchNetError),
    #[error("Backward returned {actual} gradients for {expected} inputs")]
    GradientCountMismatch { expected: usize, actual: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(PatchNetError),
}

impl From<PatchNetError> for GradCheckError {
    fn from(err: PatchNetError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Deterministic, non-uniform weights used to reduce the output to a scalar.
///
/// Using varied weights (rather than a plain sum) makes sure every output
/// element contributes a distinct amount, so a mis-routed gradient shows up.
pub fn probe_weights(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let magnitude = 0.25 + 0.25 * (i % 4) as f32;
            if i % 3 == 1 {
                -magnitude
            } else {
                magnitude
            }
        })
        .collect()
}

/// Scalar loss `Σ w·y` in f64.
fn weighted_sum(output: &Tensor, weights: &[f32]) -> f64 {
    output
        .values()
        .iter()
        .zip(weights)
        .map(|(&y, &w)| y as f64 * w as f64)
        .sum()
}

/// Checks analytical gradients against central finite differences.
///
/// `make_op` must build an operator that behaves identically on every call
/// (for dropout: seeded with the same value), because a fresh operator is
/// used for every perturbed evaluation. The output is reduced to a scalar
/// with [`probe_weights`], which are also used as the incoming gradient of
/// the analytical backward pass.
///
/// An element fails when the absolute difference exceeds `tolerance` and
/// the relative difference does too.
pub fn check_grad<F>(
    make_op: F,
    inputs: &[Tensor],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn() -> Box<dyn Operator>,
{
    let refs: Vec<&Tensor> = inputs.iter().collect();

    // --- Analytical gradients ---
    let mut op = make_op();
    let output = op.forward(&refs).map_err(GradCheckError::ForwardPassError)?;
    let weights = probe_weights(output.numel());
    output.set_grad(&weights)?;
    let analytical = op
        .backward(&output, &refs)
        .map_err(GradCheckError::BackwardPassError)?;
    if analytical.len() != inputs.len() {
        return Err(GradCheckError::GradientCountMismatch {
            expected: inputs.len(),
            actual: analytical.len(),
        });
    }

    // --- Numerical gradients ---
    for (input_index, input) in inputs.iter().enumerate() {
        let original = input.values();
        for element_index in 0..original.len() {
            // Returns the loss together with the f32 value actually used, so the
            // step is measured after rounding.
            let evaluate = |delta: f64| -> Result<(f64, f64), GradCheckError> {
                let mut perturbed_values = original.clone();
                let shifted = (original[element_index] as f64 + delta) as f32;
                perturbed_values[element_index] = shifted;
                let perturbed = Tensor::new(perturbed_values, input.shape())?;
                let mut args: Vec<&Tensor> = refs.clone();
                args[input_index] = &perturbed;
                let mut fresh = make_op();
                let out = fresh.forward(&args).map_err(GradCheckError::ForwardPassError)?;
                Ok((weighted_sum(&out, &weights), shifted as f64))
            };
            let (loss_plus, x_plus) = evaluate(epsilon)?;
            let (loss_minus, x_minus) = evaluate(-epsilon)?;
            let numerical_grad = (loss_plus - loss_minus) / (x_plus - x_minus);
            let analytical_grad = analytical[input_index][element_index] as f64;

            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    loss_plus,
                    loss_minus,
                });
            }
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    value: analytical_grad,
                });
            }
            if !relative_eq!(
                analytical_grad,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                    difference: (analytical_grad - numerical_grad).abs(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
