use crate::error::PatchNetError;
use crate::ops::Activation;

/// Shape and regularization settings of the patch classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    /// Pixels per patch; also the width of the position embedding.
    pub patch_width: usize,
    /// Number of patches per image.
    pub patches: usize,
    pub width_multiplier: usize,
    /// Hidden layers before the output projection.
    pub layers: usize,
    pub classes: usize,
    pub dropout: f32,
    pub activation: Activation,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            patch_width: 16,
            patches: 49,
            width_multiplier: 2,
            layers: 1,
            classes: 10,
            dropout: 0.1,
            activation: Activation::Tanh,
        }
    }
}

impl ModelConfig {
    /// Rows produced by every hidden affine layer.
    pub fn hidden(&self) -> usize {
        self.width_multiplier * 2 * self.patch_width
    }

    /// Width of a hidden layer's output after activation and awareness.
    pub fn layer_output_width(&self) -> usize {
        3 * self.activation.width_factor() * self.hidden()
    }

    pub fn validate(&self) -> Result<(), PatchNetError> {
        let sizes = [
            ("patch_width", self.patch_width),
            ("patches", self.patches),
            ("width_multiplier", self.width_multiplier),
            ("layers", self.layers),
            ("classes", self.classes),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(PatchNetError::ConfigurationError(format!(
                "{} must be positive",
                name
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(PatchNetError::ConfigurationError(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }
}
