use crate::error::PatchNetError;
use crate::tensor::Tensor;

impl Tensor {
    /// Copies the accumulated gradient out of the tensor.
    pub fn grad(&self) -> Vec<f32> {
        self.read_data().grad.clone()
    }

    /// Resets the gradient buffer to zero.
    pub fn zero_grad(&self) {
        self.write_data().grad.fill(0.0);
    }

    /// Adds `delta` into the gradient buffer element by element.
    ///
    /// Gradients are only ever accumulated, so a tensor consumed by several
    /// operators receives the sum of their contributions.
    pub fn acc_grad(&self, delta: &[f32]) -> Result<(), PatchNetError> {
        let mut guard = self.write_data();
        if delta.len() != guard.grad.len() {
            return Err(PatchNetError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: vec![delta.len()],
                operation: "acc_grad".to_string(),
            });
        }
        for (g, d) in guard.grad.iter_mut().zip(delta) {
            *g += d;
        }
        Ok(())
    }

    /// Overwrites the gradient buffer. Used to seed the loss node.
    pub fn set_grad(&self, grad: &[f32]) -> Result<(), PatchNetError> {
        let mut guard = self.write_data();
        if grad.len() != guard.grad.len() {
            return Err(PatchNetError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: vec![grad.len()],
                operation: "set_grad".to_string(),
            });
        }
        guard.grad.copy_from_slice(grad);
        Ok(())
    }
}
