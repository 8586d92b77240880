use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Split activation: every value `x` becomes the pair `(min(x, 0), max(x, 0))`.
///
/// The output keeps the row count and doubles the width; the pair for
/// input element `p` sits at output elements `2p` and `2p + 1`. Backward
/// routes the first half's gradient where `x < 0` and the second half's
/// where `x > 0`; at exactly zero neither side is active.
#[derive(Debug, Default, Clone, Copy)]
pub struct Everett;

impl Operator for Everett {
    fn name(&self) -> &'static str {
        "everett"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let mut out = Vec::with_capacity(2 * a.numel());
        for &x in a.values() {
            out.push(x.min(0.0));
            out.push(x.max(0.0));
        }
        let mut shape = a.shape().to_vec();
        shape[0] *= 2;
        Tensor::new(out, shape)
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let dc = output.grad();
        if dc.len() != 2 * a.numel() {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![2 * a.numel()],
                actual: vec![dc.len()],
                operation: "everett backward".to_string(),
            });
        }
        let da = a
            .values()
            .iter()
            .enumerate()
            .map(|(p, &x)| {
                if x < 0.0 {
                    dc[2 * p]
                } else if x > 0.0 {
                    dc[2 * p + 1]
                } else {
                    0.0
                }
            })
            .collect();
        Ok(vec![da])
    }
}

#[cfg(test)]
#[path = "everett_test.rs"]
mod tests;
