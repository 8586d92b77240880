use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Matrix product of a weight matrix and a batch of rows.
///
/// `A` has shape `[n, m]`: `m` weight rows of width `n`.
/// `X` has shape `[n, r]`: `r` input rows of width `n`.
/// The output has shape `[m, r]` (or `[m]` when `X` is 1-D) with
/// `C[i][j] = Σ_k A[j][k] · X[i][k]`.
///
/// Backward, in the same layout: `dA[j][k] += Σ_i dC[i][j] · X[i][k]` and
/// `dX[i][k] += Σ_j dC[i][j] · A[j][k]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatMul;

impl Operator for MatMul {
    fn name(&self) -> &'static str {
        "matmul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let a = inputs[0].read_data();
        let x = inputs[1].read_data();
        let (n, m) = (a.width(), a.rows());
        if x.width() != n {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![n, x.rows()],
                actual: x.shape().to_vec(),
                operation: "matmul".to_string(),
            });
        }
        let r = x.rows();
        let (av, xv) = (a.values(), x.values());

        let mut out = vec![0.0f32; m * r];
        for i in 0..r {
            let x_row = &xv[i * n..(i + 1) * n];
            for j in 0..m {
                let a_row = &av[j * n..(j + 1) * n];
                out[i * m + j] = a_row.iter().zip(x_row).map(|(p, q)| p * q).sum();
            }
        }

        let shape = if x.shape().len() == 2 { vec![m, r] } else { vec![m] };
        Tensor::new(out, shape)
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let a = inputs[0].read_data();
        let x = inputs[1].read_data();
        let c = output.read_data();
        let (n, m, r) = (a.width(), a.rows(), x.rows());
        if c.numel() != m * r {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![m, r],
                actual: c.shape().to_vec(),
                operation: "matmul backward".to_string(),
            });
        }
        let (av, xv, dc) = (a.values(), x.values(), c.grad());

        let mut da = vec![0.0f32; n * m];
        let mut dx = vec![0.0f32; n * r];
        for i in 0..r {
            for j in 0..m {
                let g = dc[i * m + j];
                if g == 0.0 {
                    continue;
                }
                for k in 0..n {
                    da[j * n + k] += g * xv[i * n + k];
                    dx[i * n + k] += g * av[j * n + k];
                }
            }
        }
        Ok(vec![da, dx])
    }
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
