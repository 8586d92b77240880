use super::*;
use crate::autograd::backward_op::check_arity;
use crate::ops::Tanh;
use crate::utils::testing::create_test_tensor;

/// Doubles its input but reports the gradient of the identity.
#[derive(Debug)]
struct WrongGradient;

impl Operator for WrongGradient {
    fn name(&self) -> &'static str {
        "wrong_gradient"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, PatchNetError> {
        check_arity(self.name(), 1, inputs)?;
        let values = inputs[0].values().iter().map(|v| 2.0 * v).collect();
        Tensor::new(values, inputs[0].shape())
    }

    fn backward(&self, output: &Tensor, _inputs: &[&Tensor]) -> Result<Vec<Vec<f32>>, PatchNetError> {
        Ok(vec![output.grad()])
    }
}

#[test]
fn test_probe_weights_are_varied() {
    let w = probe_weights(6);
    assert_eq!(w, vec![0.25, -0.5, 0.75, 1.0, -0.25, 0.5]);
}

#[test]
fn test_check_grad_accepts_correct_operator() {
    let x = create_test_tensor(vec![0.1, -0.2, 0.3], vec![3]);
    assert!(check_grad(|| Box::new(Tanh), &[x], 1e-2, 1e-3).is_ok());
}

#[test]
fn test_check_grad_detects_wrong_gradient() {
    let x = create_test_tensor(vec![0.1, -0.2, 0.3], vec![3]);
    let result = check_grad(|| Box::new(WrongGradient), &[x], 1e-2, 1e-3);
    assert!(matches!(
        result,
        Err(GradCheckError::GradientMismatch {
            input_index: 0,
            element_index: 0,
            ..
        })
    ));
}

#[test]
fn test_check_grad_reports_forward_failure() {
    let x = create_test_tensor(vec![0.1], vec![1]);
    let result = check_grad(|| Box::new(Tanh), &[x.clone(), x], 1e-2, 1e-3);
    assert!(matches!(result, Err(GradCheckError::ForwardPassError(_))));
}
