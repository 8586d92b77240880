use patchnet_core::model::{build_model, create_inputs, Mode, ModelConfig};
use patchnet_core::nn::ParameterStore;
use patchnet_core::ops::Activation;
use patchnet_core::optim::AdamConfig;
use patchnet_data::{ImageDataset, ImageSet, PatchGrid};
use patchnet_train::inputs::load_example;
use patchnet_train::{evaluate, CancellationToken, HaltReason, ScatterPlot, Trainer, TrainerConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("patchnet-e2e-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Eight 28x28 images (16-pixel patches): crossed diagonals labelled 3
/// alternating with horizontal bars labelled 7.
fn strokes() -> ImageSet {
    let cross: Vec<u8> = (0..28 * 28)
        .map(|p| {
            let (x, y) = (p % 28, p / 28);
            if x == y || x + y == 27 {
                255
            } else {
                0
            }
        })
        .collect();
    let bars: Vec<u8> = (0..28 * 28)
        .map(|p| if (p / 28) % 6 < 2 { 255 } else { 0 })
        .collect();
    let images = (0..8)
        .map(|i| if i % 2 == 0 { cross.clone() } else { bars.clone() })
        .collect();
    let labels = (0..8).map(|i| if i % 2 == 0 { 3 } else { 7 }).collect();
    ImageSet::new(28, 28, images, labels).unwrap()
}

/// Mean quadratic cost over the whole set, without dropout.
fn dataset_cost(params: &ParameterStore, model: &ModelConfig, data: &ImageSet) -> f32 {
    let grid = PatchGrid::select(data.width(), data.height()).unwrap();
    let inputs = create_inputs(model).unwrap();
    let mut net = build_model(params, &inputs, model, Mode::Inference, &mut StdRng::seed_from_u64(0)).unwrap();
    let mut total = 0.0;
    for i in 0..data.len() {
        let label = data.label(i).unwrap();
        load_example(&grid, &inputs, data.image(i).unwrap(), Some(label)).unwrap();
        let scores = net.predict().unwrap();
        total += scores
            .iter()
            .enumerate()
            .map(|(c, y)| {
                let t = if c == usize::from(label) { 1.0 } else { 0.0 };
                (y - t) * (y - t)
            })
            .sum::<f32>();
    }
    total / data.len() as f32
}

fn two_layer(activation: Activation, output_dir: PathBuf) -> TrainerConfig {
    TrainerConfig {
        batch_size: 8,
        epochs: 5,
        checkpoint_every: 2,
        output_dir,
        seed: 11,
        model: ModelConfig {
            width_multiplier: 1,
            layers: 2,
            activation,
            ..ModelConfig::default()
        },
        adam: AdamConfig {
            lr: 0.01,
            ..AdamConfig::default()
        },
        ..TrainerConfig::default()
    }
}

fn train_and_check(activation: Activation, tag: &str) {
    init_logging();
    let dir = scratch_dir(tag);
    let data = strokes();
    let config = two_layer(activation, dir.clone());
    let model = config.model;
    let mut trainer = Trainer::new(config, &data, CancellationToken::new()).unwrap();
    let initial_cost = dataset_cost(trainer.params(), &model, &data);
    let report = trainer.run().unwrap();

    assert_eq!(report.halt, HaltReason::BudgetExhausted);
    assert_eq!(report.updates, 5);
    assert_eq!(report.samples, 40);
    let losses: Vec<f32> = report.points.iter().map(|p| p.loss).collect();
    assert!(losses.iter().all(|l| l.is_finite()), "losses: {:?}", losses);
    let final_cost = dataset_cost(trainer.params(), &model, &data);
    assert!(final_cost.is_finite());
    assert!(
        final_cost <= initial_cost,
        "cost over the set went from {} to {}; minibatch costs {:?}",
        initial_cost,
        final_cost,
        losses
    );

    for name in ["16_set.w", "32_set.w", "set.w"] {
        assert!(dir.join(name).exists(), "missing checkpoint {}", name);
    }

    let (restored, meta) = ParameterStore::load(dir.join("set.w")).unwrap();
    assert_eq!(meta.step, 40);
    assert_eq!(meta.loss, losses[4]);
    let before = evaluate(trainer.params(), &model, &data).unwrap();
    let after = evaluate(&restored, &model, &data).unwrap();
    assert_eq!(before, after);
    assert_eq!(after.total, data.len());

    let curve = ScatterPlot::cost_curve(
        report
            .points
            .iter()
            .map(|p| (p.step as f64 / data.len() as f64, f64::from(p.loss)))
            .collect(),
    );
    curve.save(dir.join("cost.svg")).unwrap();
    assert!(std::fs::read_to_string(dir.join("cost.svg"))
        .unwrap()
        .contains("epochs vs cost"));
}

#[test]
fn tanh_model_separates_two_patterns() {
    train_and_check(Activation::Tanh, "tanh");
}

#[test]
fn everett_model_separates_two_patterns() {
    train_and_check(Activation::Everett, "everett");
}

#[test]
fn cancelled_run_still_saves_final_parameters() {
    init_logging();
    let dir = scratch_dir("cancel");
    let data = strokes();
    let token = CancellationToken::new();
    let mut trainer = Trainer::new(two_layer(Activation::Tanh, dir.clone()), &data, token.clone()).unwrap();
    token.cancel();
    let report = trainer.run().unwrap();
    assert_eq!(report.halt, HaltReason::Interrupted);
    assert_eq!(report.updates, 0);
    assert_eq!(report.checkpoints, vec![dir.join("set.w")]);
}
