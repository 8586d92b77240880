use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Quadratic cost `Σ (y − t)²` between a prediction and a target of equal size.
///
/// The output is a single-element tensor `[1]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Quadratic;

impl Operator for Quadratic {
    fn name(&self) -> &'static str {
        "quadratic"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let y = inputs[0].read_data();
        let t = inputs[1].read_data();
        if y.numel() != t.numel() {
            return Err(PatchNetError::ShapeMismatch {
                expected: y.shape().to_vec(),
                actual: t.shape().to_vec(),
                operation: "quadratic".to_string(),
            });
        }
        let cost: f32 = y
            .values()
            .iter()
            .zip(t.values())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Tensor::new(vec![cost], vec![1])
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let g = match output.grad().as_slice() {
            [g] => *g,
            other => {
                return Err(PatchNetError::BackwardNonScalar(vec![other.len()]));
            }
        };
        let y = inputs[0].read_data();
        let t = inputs[1].read_data();
        let dy: Vec<f32> = y
            .values()
            .iter()
            .zip(t.values())
            .map(|(a, b)| 2.0 * (a - b) * g)
            .collect();
        let dt = dy.iter().map(|d| -d).collect();
        Ok(vec![dy, dt])
    }
}

#[cfg(test)]
#[path = "quadratic_test.rs"]
mod tests;
