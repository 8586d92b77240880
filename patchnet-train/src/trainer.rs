use crate::cancel::CancellationToken;
use crate::config::{CheckpointPolicy, TrainerConfig};
use crate::inputs::load_example;
use log::{debug, info, warn};
use patchnet_core::model::{build_model, create_inputs, initialize_parameters, Mode, Model};
use patchnet_core::nn::ParameterStore;
use patchnet_core::optim::{Adam, Optimizer};
use patchnet_core::PatchNetError;
use patchnet_data::{ImageDataset, PatchGrid, RandomSampler, Sampler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Instant;

/// Why a training run stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HaltReason {
    /// `epochs * dataset_len` samples were consumed.
    BudgetExhausted,
    /// The cancellation token was observed at a minibatch boundary.
    Interrupted,
    /// A minibatch produced a non-finite mean cost; its update was not applied.
    Diverged { loss: f32 },
}

/// Mean cost of one applied minibatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossPoint {
    /// Samples seen when the minibatch completed.
    pub step: u64,
    pub loss: f32,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub halt: HaltReason,
    pub samples: u64,
    pub updates: u64,
    pub points: Vec<LossPoint>,
    pub checkpoints: Vec<PathBuf>,
}

impl TrainingReport {
    pub fn last_loss(&self) -> Option<f32> {
        self.points.last().map(|p| p.loss)
    }
}

#[derive(Debug)]
enum Phase {
    Sampling,
    Update { count: usize, total: f32 },
    Halted(HaltReason),
}

/// Minibatch training of the patch classifier with Adam.
///
/// Each sample clears the ephemeral store, loads an image and its one-hot
/// label, and accumulates gradients through one forward/backward pass. After
/// `batch_size` samples the mean gradient is applied, gradients are zeroed
/// and, every `checkpoint_every` minibatches, the parameters are written to
/// `{samples}_set.w` in the output directory.
pub struct Trainer<'d, D: ImageDataset + ?Sized> {
    config: TrainerConfig,
    dataset: &'d D,
    grid: PatchGrid,
    params: ParameterStore,
    inputs: ParameterStore,
    model: Model,
    optimizer: Adam,
    sampler: RandomSampler,
    cancel: CancellationToken,
}

impl<'d, D: ImageDataset + ?Sized> Trainer<'d, D> {
    /// Initializes fresh parameters from `config.seed` and builds the training graph.
    pub fn new(
        config: TrainerConfig,
        dataset: &'d D,
        cancel: CancellationToken,
    ) -> Result<Self, PatchNetError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        config.validate()?;
        let params = initialize_parameters(&config.model, &mut rng)?;
        Self::with_parameters(config, dataset, params, &mut rng, cancel)
    }

    /// Builds a trainer around existing parameters (e.g. loaded from a checkpoint).
    pub fn with_parameters(
        config: TrainerConfig,
        dataset: &'d D,
        params: ParameterStore,
        rng: &mut StdRng,
        cancel: CancellationToken,
    ) -> Result<Self, PatchNetError> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(PatchNetError::ConfigurationError(
                "training set is empty".to_string(),
            ));
        }
        let grid = PatchGrid::select(dataset.width(), dataset.height())?;
        if grid.patch_width() != config.model.patch_width || grid.len() != config.model.patches {
            return Err(PatchNetError::ConfigurationError(format!(
                "model expects {} patches of {} pixels, images give {} of {}",
                config.model.patches,
                config.model.patch_width,
                grid.len(),
                grid.patch_width()
            )));
        }
        let inputs = create_inputs(&config.model)?;
        let model = build_model(&params, &inputs, &config.model, Mode::Training, rng)?;
        let optimizer = Adam::new(config.adam)?;
        let sampler = RandomSampler::new(
            true,
            Some(config.batch_size),
            StdRng::seed_from_u64(rng.gen()),
        );
        Ok(Trainer {
            config,
            dataset,
            grid,
            params,
            inputs,
            model,
            optimizer,
            sampler,
            cancel,
        })
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    fn checkpoint_path(&self, samples: u64) -> PathBuf {
        self.config.output_dir.join(format!("{}_set.w", samples))
    }

    /// Runs one minibatch of `count` samples and returns the summed cost.
    fn accumulate(&mut self, count: usize) -> Result<f32, PatchNetError> {
        let indices: Vec<usize> = self.sampler.iter(self.dataset.len()).take(count).collect();
        let mut total = 0.0f32;
        for index in indices {
            let image = self.dataset.image(index)?;
            let label = self.dataset.label(index)?;
            load_example(&self.grid, &self.inputs, image, Some(label))?;
            total += self.model.gradient()?;
        }
        Ok(total)
    }

    fn save_checkpoint(&self, path: PathBuf, loss: f32, samples: u64) -> Result<Option<PathBuf>, PatchNetError> {
        match self.params.save(&path, loss, samples) {
            Ok(()) => {
                info!("checkpoint {} (loss {})", path.display(), loss);
                Ok(Some(path))
            }
            Err(e) if self.config.checkpoint_policy == CheckpointPolicy::BestEffort => {
                warn!("checkpoint {} failed, continuing: {}", path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Trains until the sample budget is spent, the token is cancelled or the
    /// cost diverges.
    pub fn run(&mut self) -> Result<TrainingReport, PatchNetError> {
        let budget = self.config.sample_budget(self.dataset.len()) as u64;
        let mut samples = 0u64;
        let mut updates = 0u64;
        let mut points: Vec<LossPoint> = Vec::new();
        let mut checkpoints = Vec::new();
        let mut started = Instant::now();
        let mut phase = Phase::Sampling;

        info!(
            "training {} parameters on {} images: budget {} samples, batch {}",
            self.params.numel(),
            self.dataset.len(),
            budget,
            self.config.batch_size
        );

        let halt = loop {
            phase = match phase {
                Phase::Sampling => {
                    if samples >= budget {
                        Phase::Halted(HaltReason::BudgetExhausted)
                    } else if self.cancel.is_cancelled() {
                        warn!("interrupted after {} samples", samples);
                        Phase::Halted(HaltReason::Interrupted)
                    } else {
                        let count = (budget - samples).min(self.config.batch_size as u64) as usize;
                        let total = self.accumulate(count)?;
                        samples += count as u64;
                        Phase::Update { count, total }
                    }
                }
                Phase::Update { count, total } => {
                    let loss = total / count as f32;
                    if !loss.is_finite() {
                        warn!(
                            "cost diverged to {} after {} samples; last good cost {:?} at {} updates",
                            loss,
                            samples,
                            points.last().map(|p| p.loss),
                            updates
                        );
                        self.params.zero_gradients();
                        Phase::Halted(HaltReason::Diverged { loss })
                    } else {
                        self.optimizer.step(&self.params, 1.0 / count as f32)?;
                        self.optimizer.zero_grad(&self.params);
                        updates += 1;
                        points.push(LossPoint { step: samples, loss });
                        info!("{} {} {:?}", samples, loss, started.elapsed());
                        started = Instant::now();

                        if updates % self.config.checkpoint_every as u64 == 0 {
                            let path = self.checkpoint_path(samples);
                            if let Some(path) = self.save_checkpoint(path, loss, samples)? {
                                checkpoints.push(path);
                            }
                        }
                        Phase::Sampling
                    }
                }
                Phase::Halted(reason) => break reason,
            };
        };

        let final_loss = points.last().map_or(f32::NAN, |p| p.loss);
        let final_path = self.config.output_dir.join("set.w");
        if let Some(path) = self.save_checkpoint(final_path, final_loss, samples)? {
            checkpoints.push(path);
        }
        info!("stopped after {} updates ({:?})", updates, halt);
        debug!("adam iterations: {}", self.optimizer.iterations());

        Ok(TrainingReport {
            halt,
            samples,
            updates,
            points,
            checkpoints,
        })
    }
}

#[cfg(test)]
#[path = "trainer_test.rs"]
mod tests;
