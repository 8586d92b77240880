use crate::error::PatchNetError;
use crate::nn::store::ParameterStore;
use crate::optim::Optimizer;
use crate::tensor_data::{MomentState, TensorData};
use log::debug;

/// Hyperparameters of [`Adam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            lr: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }
}

impl AdamConfig {
    pub fn validate(&self) -> Result<(), PatchNetError> {
        if self.lr <= 0.0 {
            return Err(PatchNetError::ConfigurationError(
                "Learning rate must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.beta1) {
            return Err(PatchNetError::ConfigurationError(
                "Beta1 must be in [0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.beta2) {
            return Err(PatchNetError::ConfigurationError(
                "Beta2 must be in [0, 1)".to_string(),
            ));
        }
        if self.eps <= 0.0 {
            return Err(PatchNetError::ConfigurationError(
                "Epsilon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Adam optimizer with bias correction by update count.
///
/// Moment buffers live on the tensors themselves (see
/// [`MomentState`]), so the optimizer only tracks the step count.
#[derive(Debug)]
pub struct Adam {
    config: AdamConfig,
    iterations: u64,
}

impl Adam {
    pub fn new(config: AdamConfig) -> Result<Self, PatchNetError> {
        config.validate()?;
        Ok(Adam {
            config,
            iterations: 0,
        })
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    fn update(&self, data: &mut TensorData, grad_scale: f32, bc1: f32, bc2: f32) {
        let AdamConfig {
            lr,
            beta1,
            beta2,
            eps,
        } = self.config;
        let numel = data.values.len();
        let TensorData {
            values,
            grad,
            state,
            ..
        } = data;
        let MomentState { m, v } = state.get_or_insert_with(|| MomentState::zeros(numel));
        for i in 0..numel {
            let g = grad[i] * grad_scale;
            m[i] = beta1 * m[i] + (1.0 - beta1) * g;
            v[i] = beta2 * v[i] + (1.0 - beta2) * g * g;
            let m_hat = m[i] / bc1;
            let v_hat = v[i] / bc2;
            values[i] -= lr * m_hat / (v_hat.sqrt() + eps);
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &ParameterStore, grad_scale: f32) -> Result<(), PatchNetError> {
        if !grad_scale.is_finite() {
            return Err(PatchNetError::ConfigurationError(format!(
                "gradient scale must be finite, got {}",
                grad_scale
            )));
        }
        self.iterations += 1;
        let t = self.iterations.min(i32::MAX as u64) as i32;
        let bias_correction1 = 1.0 - self.config.beta1.powi(t);
        let bias_correction2 = 1.0 - self.config.beta2.powi(t);

        for (_, tensor) in params.iter() {
            let mut guard = tensor.write_data();
            self.update(&mut guard, grad_scale, bias_correction1, bias_correction2);
        }
        debug!(
            "adam step {} over {} tensors (scale {})",
            self.iterations,
            params.len(),
            grad_scale
        );
        Ok(())
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }
}

#[cfg(test)]
#[path = "adam_test.rs"]
mod tests;
