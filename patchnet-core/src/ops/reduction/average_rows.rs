use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Mean across rows: `[width, rows]` becomes `[width]`.
///
/// Backward adds `dC[j] / rows` to column `j` of every row.
#[derive(Debug, Default, Clone, Copy)]
pub struct AverageRows;

impl Operator for AverageRows {
    fn name(&self) -> &'static str {
        "average_rows"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let (width, rows) = (a.width(), a.rows());
        let mut out = vec![0.0f32; width];
        for row in a.values().chunks(width) {
            for (o, v) in out.iter_mut().zip(row) {
                *o += v;
            }
        }
        let scale = 1.0 / rows as f32;
        out.iter_mut().for_each(|o| *o *= scale);
        Tensor::new(out, vec![width])
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let (width, rows) = (inputs[0].width(), inputs[0].rows());
        let dc = output.grad();
        if dc.len() != width {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![width],
                actual: output.shape(),
                operation: "average_rows backward".to_string(),
            });
        }
        let scale = 1.0 / rows as f32;
        let row: Vec<f32> = dc.iter().map(|g| g * scale).collect();
        let da = row.iter().copied().cycle().take(width * rows).collect();
        Ok(vec![da])
    }
}

#[cfg(test)]
#[path = "average_rows_test.rs"]
mod tests;
