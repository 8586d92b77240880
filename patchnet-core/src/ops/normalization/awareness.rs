use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Per-column batch statistics over the rows of `values`: `(mean, E[x²] − mean²)`.
fn column_stats(values: &[f32], width: usize, rows: usize) -> (Vec<f32>, Vec<f32>) {
    let mut mean = vec![0.0f32; width];
    let mut square = vec![0.0f32; width];
    for row in values.chunks(width) {
        for (j, &x) in row.iter().enumerate() {
            mean[j] += x;
            square[j] += x * x;
        }
    }
    let n = rows as f32;
    let variance = mean
        .iter_mut()
        .zip(square)
        .map(|(m, s)| {
            *m /= n;
            s / n - *m * *m
        })
        .collect();
    (mean, variance)
}

/// Appends batch statistics to every row.
///
/// For an input `[width, rows]` each output row is the input row followed by
/// the per-column mean over all rows and the per-column variance
/// `E[x²] − mean²`, giving `[3·width, rows]`.
///
/// Backward is exact: the mean and variance gradients are first summed over
/// all rows, then redistributed to every input row.
#[derive(Debug, Default, Clone, Copy)]
pub struct Awareness;

impl Operator for Awareness {
    fn name(&self) -> &'static str {
        "awareness"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let (width, rows) = (a.width(), a.rows());
        let (mean, variance) = column_stats(a.values(), width, rows);
        let mut out = Vec::with_capacity(3 * width * rows);
        for row in a.values().chunks(width) {
            out.extend_from_slice(row);
            out.extend_from_slice(&mean);
            out.extend_from_slice(&variance);
        }
        Tensor::new(out, vec![3 * width, rows])
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let (width, rows) = (a.width(), a.rows());
        let dc = output.grad();
        if dc.len() != 3 * width * rows {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![3 * width, rows],
                actual: output.shape(),
                operation: "awareness backward".to_string(),
            });
        }
        let (mean, _) = column_stats(a.values(), width, rows);

        let mut d_mean = vec![0.0f32; width];
        let mut d_var = vec![0.0f32; width];
        for row in dc.chunks(3 * width) {
            for j in 0..width {
                d_mean[j] += row[width + j];
                d_var[j] += row[2 * width + j];
            }
        }

        let n = rows as f32;
        let mut da = Vec::with_capacity(width * rows);
        for (x_row, dc_row) in a.values().chunks(width).zip(dc.chunks(3 * width)) {
            for j in 0..width {
                let centered = x_row[j] - mean[j];
                da.push(dc_row[j] + d_mean[j] / n + d_var[j] * 2.0 * centered / n);
            }
        }
        Ok(vec![da])
    }
}

#[cfg(test)]
#[path = "awareness_test.rs"]
mod tests;
