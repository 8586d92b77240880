use crate::inputs::load_example;
use log::{debug, info};
use patchnet_core::model::builder::{layer_bias, layer_weight, OUTPUT_BIAS, OUTPUT_WEIGHT};
use patchnet_core::model::{build_model, create_inputs, Mode, ModelConfig};
use patchnet_core::ops::Activation;
use patchnet_core::nn::ParameterStore;
use patchnet_core::tensor::utils::argmax;
use patchnet_core::PatchNetError;
use patchnet_data::{ImageDataset, PatchGrid, Sampler, SequentialSampler};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

/// Classification result over a labelled set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.correct, self.total)
    }
}

/// Reads the layer count, hidden width, class count and activation of a
/// checkpoint back from its parameter shapes.
///
/// `base` supplies the patch geometry and dropout rate, which the shapes do
/// not pin down. Shapes that fit no known layout are left as in `base`, and
/// the mismatch surfaces when the model is built.
pub fn infer_model_config(params: &ParameterStore, base: ModelConfig) -> ModelConfig {
    let mut config = base;
    let layers = (1..).take_while(|&k| params.contains(&layer_weight(k))).count();
    if layers > 0 {
        config.layers = layers;
    }
    if let Ok(bias) = params.get(&layer_bias(1)) {
        let hidden = bias.width();
        if config.patch_width > 0 && hidden > 0 && hidden % (2 * config.patch_width) == 0 {
            config.width_multiplier = hidden / (2 * config.patch_width);
        }
    }
    if let Ok(bias) = params.get(OUTPUT_BIAS) {
        config.classes = bias.width();
    }
    if let Ok(weight) = params.get(OUTPUT_WEIGHT) {
        let per_factor = 3 * config.hidden();
        config.activation = match weight.width() {
            w if w == per_factor => Activation::Tanh,
            w if w == 2 * per_factor => Activation::Everett,
            _ => config.activation,
        };
    }
    if config != base {
        debug!(
            "checkpoint layout: {} layers, hidden {}, {} classes, activation {}",
            config.layers,
            config.hidden(),
            config.classes,
            config.activation
        );
    }
    config
}

/// Counts how many images of `dataset` the model classifies correctly.
///
/// The graph is built in inference mode, so dropout is the identity and the
/// result does not depend on any seed. A prediction counts as correct when
/// its argmax equals the label; an all-NaN prediction is always wrong.
pub fn evaluate<D: ImageDataset + ?Sized>(
    params: &ParameterStore,
    config: &ModelConfig,
    dataset: &D,
) -> Result<Accuracy, PatchNetError> {
    let grid = PatchGrid::select(dataset.width(), dataset.height())?;
    let inputs = create_inputs(config)?;
    let mut rng = StdRng::seed_from_u64(0);
    let mut model = build_model(params, &inputs, config, Mode::Inference, &mut rng)?;

    let mut accuracy = Accuracy::default();
    let mut sampler = SequentialSampler::new();
    for index in sampler.iter(dataset.len()) {
        load_example(&grid, &inputs, dataset.image(index)?, None)?;
        let scores = model.predict()?;
        let label = usize::from(dataset.label(index)?);
        if argmax(&scores) == Some(label) {
            accuracy.correct += 1;
        }
        accuracy.total += 1;
        if accuracy.total % 1000 == 0 {
            debug!("evaluated {} images, {} correct", accuracy.total, accuracy.correct);
        }
    }
    info!(
        "accuracy {}/{} ({:.2}%)",
        accuracy.correct,
        accuracy.total,
        100.0 * accuracy.ratio()
    );
    Ok(accuracy)
}
