use super::*;
use crate::ops::Activation;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn small_config() -> ModelConfig {
    ModelConfig {
        patch_width: 4,
        patches: 3,
        width_multiplier: 1,
        layers: 2,
        classes: 3,
        dropout: 0.0,
        activation: Activation::Tanh,
    }
}

fn fill_inputs(inputs: &ParameterStore, label: usize) {
    let input = inputs.get(INPUT).unwrap();
    let values: Vec<f32> = (0..input.numel()).map(|i| ((i * 7) % 11) as f32 / 10.0).collect();
    input.set_values(&values).unwrap();
    let target = inputs.get(TARGET).unwrap();
    target.fill(0.0);
    target.write_data().values[label] = 1.0;
}

#[test]
fn test_parameter_shapes_default_config() {
    let shapes: Vec<(String, Vec<usize>)> = parameter_shapes(&ModelConfig::default())
        .into_iter()
        .map(|(n, s, _)| (n, s))
        .collect();
    assert_eq!(
        shapes,
        vec![
            ("position".to_string(), vec![16, 49]),
            ("layer1.weight".to_string(), vec![32, 64]),
            ("layer1.bias".to_string(), vec![64, 1]),
            ("output.weight".to_string(), vec![192, 10]),
            ("output.bias".to_string(), vec![10, 1]),
        ]
    );
}

#[test]
fn test_parameter_shapes_account_for_split_activation() {
    let config = ModelConfig {
        layers: 2,
        activation: Activation::Everett,
        ..ModelConfig::default()
    };
    let shapes = parameter_shapes(&config);
    assert_eq!(shapes[3].0, "layer2.weight");
    assert_eq!(shapes[3].1, vec![384, 64]);
    assert_eq!(shapes[5].1, vec![384, 10]);
}

#[test]
fn test_initialize_parameters_scaling() {
    let mut rng = StdRng::seed_from_u64(1);
    let store = initialize_parameters(&ModelConfig::default(), &mut rng).unwrap();
    assert!(store.get("layer1.bias").unwrap().values().iter().all(|&b| b == 0.0));
    assert!(store.get("output.bias").unwrap().values().iter().all(|&b| b == 0.0));

    let w = store.get("layer1.weight").unwrap().values();
    let mean = w.iter().sum::<f32>() / w.len() as f32;
    let var = w.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / w.len() as f32;
    // sqrt(2 / 32) = 0.25
    assert!((var.sqrt() - 0.25).abs() < 0.03, "std {}", var.sqrt());
    assert!(store.iter().all(|(_, t)| t.has_optimizer_state()));
}

#[test]
fn test_initialization_is_reproducible() {
    let config = small_config();
    let a = initialize_parameters(&config, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = initialize_parameters(&config, &mut StdRng::seed_from_u64(9)).unwrap();
    for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
        assert_eq!(x.values(), y.values());
    }
}

#[test]
fn test_inference_prediction_shape_and_determinism() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(5);
    let params = initialize_parameters(&config, &mut rng).unwrap();
    let inputs = create_inputs(&config).unwrap();
    fill_inputs(&inputs, 1);

    let mut model = build_model(&params, &inputs, &config, Mode::Inference, &mut rng).unwrap();
    let first = model.predict().unwrap();
    let second = model.predict().unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(first.iter().all(|v| v.is_finite()));
}

#[test]
fn test_zero_rate_training_matches_inference() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(5);
    let params = initialize_parameters(&config, &mut rng).unwrap();
    let inputs = create_inputs(&config).unwrap();
    fill_inputs(&inputs, 0);

    let mut training = build_model(&params, &inputs, &config, Mode::Training, &mut rng).unwrap();
    let mut inference = build_model(&params, &inputs, &config, Mode::Inference, &mut rng).unwrap();
    assert_eq!(training.predict().unwrap(), inference.predict().unwrap());
}

#[test]
fn test_output_bias_gradient_is_cost_derivative() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(2);
    let params = initialize_parameters(&config, &mut rng).unwrap();
    let inputs = create_inputs(&config).unwrap();
    fill_inputs(&inputs, 2);

    let mut model = build_model(&params, &inputs, &config, Mode::Training, &mut rng).unwrap();
    let prediction = model.predict().unwrap();
    let loss = model.gradient().unwrap();
    let target = inputs.get(TARGET).unwrap().values();

    let expected_loss: f32 = prediction.iter().zip(&target).map(|(y, t)| (y - t) * (y - t)).sum();
    assert!((loss - expected_loss).abs() < 1e-5);
    let bias_grad = params.get(OUTPUT_BIAS).unwrap().grad();
    for j in 0..3 {
        assert!((bias_grad[j] - 2.0 * (prediction[j] - target[j])).abs() < 1e-5);
    }
    for (name, tensor) in params.iter() {
        assert!(tensor.grad().iter().any(|&g| g != 0.0), "{} has no gradient", name);
    }
}

#[test]
fn test_model_gradient_matches_finite_difference() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(3);
    let params = initialize_parameters(&config, &mut rng).unwrap();
    let inputs = create_inputs(&config).unwrap();
    fill_inputs(&inputs, 1);
    let mut model = build_model(&params, &inputs, &config, Mode::Inference, &mut rng).unwrap();

    model.gradient().unwrap();
    // Later gradient() calls keep accumulating, so read every gradient now.
    let names = ["position", "layer1.weight", "layer2.weight", "output.weight"];
    let snapshots: Vec<Vec<f32>> = names
        .iter()
        .map(|name| params.get(name).unwrap().grad())
        .collect();
    for (name, analytical) in names.iter().zip(snapshots) {
        let tensor = params.get(name).unwrap();
        let original = tensor.values();
        for index in [0, original.len() / 2, original.len() - 1] {
            let eps = 1e-2f32;
            let mut shifted = original.clone();
            shifted[index] = original[index] + eps;
            tensor.set_values(&shifted).unwrap();
            let plus = model.gradient().unwrap();
            shifted[index] = original[index] - eps;
            tensor.set_values(&shifted).unwrap();
            let minus = model.gradient().unwrap();
            tensor.set_values(&original).unwrap();

            let numerical = (plus - minus) / (2.0 * eps);
            let diff = (numerical - analytical[index]).abs();
            assert!(
                diff < 2e-3 || diff < 2e-2 * analytical[index].abs(),
                "{}[{}]: analytical {} numerical {}",
                name,
                index,
                analytical[index],
                numerical
            );
        }
    }
}

#[test]
fn test_gradient_requires_target() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(4);
    let params = initialize_parameters(&config, &mut rng).unwrap();
    let mut inputs = ParameterStore::ephemeral();
    inputs.create(INPUT, &[config.patch_width, config.patches]).unwrap();
    let mut model = build_model(&params, &inputs, &config, Mode::Inference, &mut rng).unwrap();
    assert!(model.loss_node().is_none());
    assert!(matches!(
        model.gradient(),
        Err(PatchNetError::ConfigurationError(_))
    ));
}

#[test]
fn test_build_rejects_mismatched_parameters() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(4);
    let params = initialize_parameters(&config, &mut rng).unwrap();
    let inputs = create_inputs(&config).unwrap();
    let wider = ModelConfig {
        width_multiplier: 2,
        ..config
    };
    assert!(matches!(
        build_model(&params, &inputs, &wider, Mode::Inference, &mut rng),
        Err(PatchNetError::ShapeMismatch { .. })
    ));
    let deeper = ModelConfig { layers: 3, ..config };
    assert_eq!(
        build_model(&params, &inputs, &deeper, Mode::Inference, &mut rng).err(),
        Some(PatchNetError::UnknownParameter("layer3.weight".to_string()))
    );
}
