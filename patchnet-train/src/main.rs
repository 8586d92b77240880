use env_logger::Env;
use log::{error, info, warn};
use patchnet_core::model::ModelConfig;
use patchnet_core::nn::ParameterStore;
use patchnet_data::{mnist, ImageDataset, PatchGrid};
use patchnet_train::{
    evaluate, infer_model_config, parse_args, usage, AppError, CancellationToken, Command, HaltReason, ScatterPlot,
    Trainer, TrainerConfig,
};
use std::path::Path;
use std::process;

/// Sets the patch geometry of `model` from the images it will read.
fn fit_geometry<D: ImageDataset + ?Sized>(model: &mut ModelConfig, dataset: &D) -> Result<(), AppError> {
    let grid = PatchGrid::select(dataset.width(), dataset.height())?;
    model.patch_width = grid.patch_width();
    model.patches = grid.len();
    Ok(())
}

fn run_evaluation(data_dir: &Path, checkpoint: &Path, mut model: ModelConfig) -> Result<(), AppError> {
    let data = mnist::load(data_dir)?;
    fit_geometry(&mut model, &data.test)?;
    let (params, meta) = ParameterStore::load(checkpoint)?;
    let model = infer_model_config(&params, model);
    info!(
        "evaluating {} (step {}, loss {}) on {} images",
        checkpoint.display(),
        meta.step,
        meta.loss,
        data.test.len()
    );
    let accuracy = evaluate(&params, &model, &data.test)?;
    println!("{}", accuracy);
    Ok(())
}

fn run_training(data_dir: &Path, mut config: TrainerConfig) -> Result<(), AppError> {
    let data = mnist::load(data_dir)?;
    fit_geometry(&mut config.model, &data.train)?;

    let cancel = CancellationToken::new();
    let listener = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, stopping at the next minibatch");
        listener.cancel();
    })
    .map_err(|e| AppError::Signal(e.to_string()))?;

    let plot_path = config.output_dir.join("cost.svg");
    let train_len = data.train.len();
    let mut trainer = Trainer::new(config, &data.train, cancel)?;
    let report = trainer.run()?;

    let points = report
        .points
        .iter()
        .map(|p| (p.step as f64 / train_len as f64, f64::from(p.loss)))
        .collect();
    ScatterPlot::cost_curve(points).save(&plot_path)?;
    info!(
        "{:?} after {} samples and {} updates; curve in {}",
        report.halt,
        report.samples,
        report.updates,
        plot_path.display()
    );
    if let HaltReason::Diverged { loss } = report.halt {
        warn!("training diverged (cost {}); last saved parameters are the final ones", loss);
    }
    Ok(())
}

fn run() -> Result<(), AppError> {
    match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{}", usage());
            Ok(())
        }
        Command::Evaluate {
            data_dir,
            checkpoint,
            model,
        } => run_evaluation(&data_dir, &checkpoint, model),
        Command::Train { data_dir, config } => run_training(&data_dir, config),
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
