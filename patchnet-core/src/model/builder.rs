use crate::autograd::{self, Graph, NodeId};
use crate::error::PatchNetError;
use crate::model::config::ModelConfig;
use crate::nn::store::ParameterStore;
use crate::ops::{Add, AverageRows, Awareness, Concat, Dropout, Identity, MatMul, Quadratic};
use crate::tensor::randn_scaled;
use log::debug;
use rand::Rng;

pub const POSITION: &str = "position";
pub const INPUT: &str = "input";
pub const TARGET: &str = "target";

/// Name of the weight matrix of hidden layer `k` (1-based).
pub fn layer_weight(k: usize) -> String {
    format!("layer{}.weight", k)
}

pub fn layer_bias(k: usize) -> String {
    format!("layer{}.bias", k)
}

pub const OUTPUT_WEIGHT: &str = "output.weight";
pub const OUTPUT_BIAS: &str = "output.bias";

/// Which variant of the graph to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dropout active, cost node attached.
    Training,
    /// Dropout replaced by identity.
    Inference,
}

/// `(name, shape, is_bias)` for every trainable tensor, in creation order.
pub fn parameter_shapes(config: &ModelConfig) -> Vec<(String, Vec<usize>, bool)> {
    let pw = config.patch_width;
    let hidden = config.hidden();
    let wide = config.layer_output_width();
    let mut shapes = vec![(POSITION.to_string(), vec![pw, config.patches], false)];
    for k in 1..=config.layers {
        let fan_in = if k == 1 { 2 * pw } else { wide };
        shapes.push((layer_weight(k), vec![fan_in, hidden], false));
        shapes.push((layer_bias(k), vec![hidden, 1], true));
    }
    shapes.push((OUTPUT_WEIGHT.to_string(), vec![wide, config.classes], false));
    shapes.push((OUTPUT_BIAS.to_string(), vec![config.classes, 1], true));
    shapes
}

/// Creates every trainable tensor of the model.
///
/// Weights and the position embedding are drawn from
/// `Normal(0, sqrt(2 / shape[0]))`; biases start at zero.
pub fn initialize_parameters<R: Rng + ?Sized>(
    config: &ModelConfig,
    rng: &mut R,
) -> Result<ParameterStore, PatchNetError> {
    config.validate()?;
    let mut store = ParameterStore::trainable();
    for (name, shape, is_bias) in parameter_shapes(config) {
        if is_bias {
            store.create(&name, &shape)?;
        } else {
            let std_dev = (2.0 / shape[0] as f32).sqrt();
            store.insert(&name, randn_scaled(&shape, std_dev, rng)?)?;
        }
    }
    debug!(
        "initialized {} tensors ({} values)",
        store.len(),
        store.numel()
    );
    Ok(store)
}

/// Creates the per-step `input` (`[patch_width, patches]`) and `target`
/// (`[classes, 1]`) tensors.
pub fn create_inputs(config: &ModelConfig) -> Result<ParameterStore, PatchNetError> {
    let mut store = ParameterStore::ephemeral();
    store.create(INPUT, &[config.patch_width, config.patches])?;
    store.create(TARGET, &[config.classes, 1])?;
    Ok(store)
}

/// Checks that every expected parameter exists with the expected shape.
pub fn check_parameters(params: &ParameterStore, config: &ModelConfig) -> Result<(), PatchNetError> {
    for (name, shape, _) in parameter_shapes(config) {
        let actual = params.get(&name)?.shape();
        if actual != shape {
            return Err(PatchNetError::ShapeMismatch {
                expected: shape,
                actual,
                operation: format!("parameter {}", name),
            });
        }
    }
    Ok(())
}

/// A built model graph together with its output nodes.
#[derive(Debug)]
pub struct Model {
    graph: Graph,
    prediction: NodeId,
    loss: Option<NodeId>,
    mode: Mode,
}

impl Model {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn prediction_node(&self) -> NodeId {
        self.prediction
    }

    pub fn loss_node(&self) -> Option<NodeId> {
        self.loss
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Runs forward only and returns the class scores.
    pub fn predict(&mut self) -> Result<Vec<f32>, PatchNetError> {
        let tape = self.graph.forward(self.prediction)?;
        Ok(tape.get(self.prediction)?.values())
    }

    /// Runs one forward and one backward pass from the cost node and returns the cost.
    pub fn gradient(&mut self) -> Result<f32, PatchNetError> {
        let loss = self.loss.ok_or_else(|| {
            PatchNetError::ConfigurationError("model was built without a target".to_string())
        })?;
        autograd::gradient(&mut self.graph, loss)
    }
}

/// Builds the classifier graph over `params` and the ephemeral `inputs`.
///
/// Each hidden layer computes
/// `Dropout(Awareness(Activation(MatMul(weight, previous) + bias)))`,
/// the first layer reading `Concat(position, input)`. The output layer is
/// `AverageRows(MatMul(output.weight, last) + output.bias)`. In
/// [`Mode::Inference`] dropout becomes [`Identity`]; dropout masks are
/// seeded from `rng` so runs are reproducible.
///
/// A cost node `Quadratic(prediction, target)` is attached when `inputs`
/// holds a `target` tensor.
pub fn build_model<R: Rng + ?Sized>(
    params: &ParameterStore,
    inputs: &ParameterStore,
    config: &ModelConfig,
    mode: Mode,
    rng: &mut R,
) -> Result<Model, PatchNetError> {
    config.validate()?;
    check_parameters(params, config)?;

    let mut graph = Graph::new();
    let position = graph.leaf(params.get(POSITION)?);
    let input = graph.leaf(inputs.get(INPUT)?);
    let mut previous = graph.apply(Concat, &[position, input])?;

    for k in 1..=config.layers {
        let weight = graph.leaf(params.get(&layer_weight(k))?);
        let bias = graph.leaf(params.get(&layer_bias(k))?);
        let product = graph.apply(MatMul, &[weight, previous])?;
        let affine = graph.apply(Add, &[product, bias])?;
        let activated = graph.apply_boxed(config.activation.operator(), &[affine])?;
        let aware = graph.apply(Awareness, &[activated])?;
        previous = match mode {
            Mode::Training => graph.apply(Dropout::new(config.dropout, rng.gen())?, &[aware])?,
            Mode::Inference => graph.apply(Identity, &[aware])?,
        };
    }

    let weight = graph.leaf(params.get(OUTPUT_WEIGHT)?);
    let bias = graph.leaf(params.get(OUTPUT_BIAS)?);
    let product = graph.apply(MatMul, &[weight, previous])?;
    let affine = graph.apply(Add, &[product, bias])?;
    let prediction = graph.apply(AverageRows, &[affine])?;

    let loss = if inputs.contains(TARGET) {
        let target = graph.leaf(inputs.get(TARGET)?);
        Some(graph.apply(Quadratic, &[prediction, target])?)
    } else {
        None
    };

    debug!(
        "built {:?} graph: {} layers, {} nodes, activation {}",
        mode,
        config.layers,
        graph.len(),
        config.activation
    );
    Ok(Model {
        graph,
        prediction,
        loss,
        mode,
    })
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
