use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Hyperbolic tangent, applied element-wise.
/// tanh(x) saturates at ±1; d/dx tanh(x) = 1 - tanh(x)²
#[derive(Debug, Default, Clone, Copy)]
pub struct Tanh;

impl Operator for Tanh {
    fn name(&self) -> &'static str {
        "tanh"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let out = a.values().iter().map(|x| x.tanh()).collect();
        Tensor::new(out, a.shape().to_vec())
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        // The derivative only needs the forward output.
        let c = output.read_data();
        let da = c
            .values()
            .iter()
            .zip(c.grad())
            .map(|(y, g)| g * (1.0 - y * y))
            .collect();
        Ok(vec![da])
    }
}

#[cfg(test)]
#[path = "tanh_test.rs"]
mod tests;
