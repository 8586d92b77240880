use crate::autograd::backward_op::{check_arity, Operator};
use crate::error::PatchNetError;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Training-time dropout over feature columns.
///
/// Every forward call draws one keep/drop decision per column (shared by all
/// rows) and scales survivors by `1 / (1 - rate)`. The mask is kept until the
/// next forward so the paired backward routes gradient through exactly the
/// same columns.
#[derive(Debug, Clone)]
pub struct Dropout {
    rate: f32,
    rng: StdRng,
    mask: Vec<bool>,
}

impl Dropout {
    /// Creates a dropout operator with its own seeded generator.
    ///
    /// # Errors
    /// `ConfigurationError` unless `0 <= rate < 1`.
    pub fn new(rate: f32, seed: u64) -> Result<Self, PatchNetError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(PatchNetError::ConfigurationError(format!(
                "dropout rate must be in [0, 1), got {}",
                rate
            )));
        }
        Ok(Dropout {
            rate,
            rng: StdRng::seed_from_u64(seed),
            mask: Vec::new(),
        })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Columns kept by the most recent forward pass. Empty before the first one.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    fn scale(&self) -> f32 {
        1.0 / (1.0 - self.rate)
    }
}

impl Operator for Dropout {
    fn name(&self) -> &'static str {
        "dropout"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        let width = a.width();
        let rate = self.rate;
        self.mask = (0..width).map(|_| self.rng.gen::<f32>() >= rate).collect();
        let scale = self.scale();
        let out = a
            .values()
            .iter()
            .enumerate()
            .map(|(p, &x)| if self.mask[p % width] { x * scale } else { 0.0 })
            .collect();
        Tensor::new(out, a.shape().to_vec())
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let width = inputs[0].width();
        if self.mask.len() != width {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![width],
                actual: vec![self.mask.len()],
                operation: "dropout backward (mask)".to_string(),
            });
        }
        let scale = self.scale();
        let da = output
            .grad()
            .iter()
            .enumerate()
            .map(|(p, &g)| if self.mask[p % width] { g * scale } else { 0.0 })
            .collect();
        Ok(vec![da])
    }
}

/// Pass-through operator, used in place of [`Dropout`] for inference.
///
/// The output is a fresh copy so that the graph never aliases an operator
/// output with its input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Operator for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let a = inputs[0].read_data();
        Tensor::new(a.values().to_vec(), a.shape().to_vec())
    }

    fn backward(&self, output: &Tensor, inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        Ok(vec![output.grad()])
    }
}

#[cfg(test)]
#[path = "dropout_test.rs"]
mod tests;
