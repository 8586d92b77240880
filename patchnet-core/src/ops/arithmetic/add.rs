use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Elementwise addition with bias broadcasting.
///
/// `B` either has exactly `A`'s shape, or is a single row of `A`'s width
/// (`[w]` or `[w, 1]`) which is added to every row of `A`. The output has
/// `A`'s shape. Backward hands `dC` to `A` unchanged and to `B` summed over
/// rows when broadcast.
#[derive(Debug, Default, Clone, Copy)]
pub struct Add;

/// True when `b` is broadcast across the rows of `a`.
fn is_broadcast(a_shape: &[usize], b_shape: &[usize]) -> Result<bool, PatchNetError> {
    if a_shape == b_shape {
        return Ok(false);
    }
    let b_rows = b_shape.get(1).copied().unwrap_or(1);
    if b_shape[0] == a_shape[0] && b_rows == 1 {
        return Ok(true);
    }
    Err(PatchNetError::ShapeMismatch {
        expected: a_shape.to_vec(),
        actual: b_shape.to_vec(),
        operation: "add".to_string(),
    })
}

impl Operator for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let a = inputs[0].read_data();
        let b = inputs[1].read_data();
        let out = if is_broadcast(a.shape(), b.shape())? {
            let width = a.width();
            a.values()
                .iter()
                .enumerate()
                .map(|(p, &v)| v + b.values()[p % width])
                .collect()
        } else {
            a.values()
                .iter()
                .zip(b.values())
                .map(|(&p, &q)| p + q)
                .collect()
        };
        Tensor::new(out, a.shape().to_vec())
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let (a_shape, b_shape) = (inputs[0].shape(), inputs[1].shape());
        let broadcast = is_broadcast(&a_shape, &b_shape)?;
        let dc = output.grad();
        let db = if broadcast {
            let width = a_shape[0];
            let mut db = vec![0.0f32; width];
            for (p, g) in dc.iter().enumerate() {
                db[p % width] += g;
            }
            db
        } else {
            dc.clone()
        };
        Ok(vec![dc, db])
    }
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
