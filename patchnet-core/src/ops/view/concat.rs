use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;

/// Row-wise concatenation: each output row is the row of `A` followed by
/// the row of `B`.
///
/// Both inputs must be exactly 2-D with the same number of rows; the output
/// is `[A.width + B.width, rows]`. Backward splits every gradient row back
/// into the two widths.
#[derive(Debug, Default, Clone, Copy)]
pub struct Concat;

fn require_2d(tensor: &Tensor) -> Result<(usize, usize), PatchNetError> {
    let shape = tensor.shape();
    if shape.len() != 2 {
        return Err(PatchNetError::RankMismatch {
            expected: 2,
            actual: shape,
            operation: "concat".to_string(),
        });
    }
    Ok((shape[0], shape[1]))
}

impl Operator for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let (wa, ra) = require_2d(inputs[0])?;
        let (wb, rb) = require_2d(inputs[1])?;
        if ra != rb {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![wb, ra],
                actual: vec![wb, rb],
                operation: "concat".to_string(),
            });
        }
        let (av, bv) = (inputs[0].values(), inputs[1].values());
        let mut out = Vec::with_capacity((wa + wb) * ra);
        for i in 0..ra {
            out.extend_from_slice(&av[i * wa..(i + 1) * wa]);
            out.extend_from_slice(&bv[i * wb..(i + 1) * wb]);
        }
        Tensor::new(out, vec![wa + wb, ra])
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 2, inputs)?;
        let (wa, rows) = require_2d(inputs[0])?;
        let (wb, _) = require_2d(inputs[1])?;
        let dc = output.grad();
        let width = wa + wb;
        if dc.len() != width * rows {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![width, rows],
                actual: output.shape(),
                operation: "concat backward".to_string(),
            });
        }
        let mut da = Vec::with_capacity(wa * rows);
        let mut db = Vec::with_capacity(wb * rows);
        for row in dc.chunks(width) {
            da.extend_from_slice(&row[..wa]);
            db.extend_from_slice(&row[wa..]);
        }
        Ok(vec![da, db])
    }
}

#[cfg(test)]
#[path = "concat_test.rs"]
mod tests;
