use patchnet_core::model::ModelConfig;
use patchnet_core::ops::Activation;
use patchnet_core::optim::AdamConfig;
use patchnet_core::PatchNetError;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// What to do when writing a periodic checkpoint fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckpointPolicy {
    /// Abort training with the I/O error.
    #[default]
    Required,
    /// Log a warning and keep training.
    BestEffort,
}

/// Settings of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub batch_size: usize,
    /// Passes over the dataset; the sample budget is `epochs * dataset_len`.
    pub epochs: usize,
    /// Minibatches between periodic checkpoints.
    pub checkpoint_every: usize,
    pub output_dir: PathBuf,
    pub seed: u64,
    pub checkpoint_policy: CheckpointPolicy,
    pub model: ModelConfig,
    pub adam: AdamConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            batch_size: 128,
            epochs: 40,
            checkpoint_every: 10,
            output_dir: PathBuf::from("."),
            seed: 1,
            checkpoint_policy: CheckpointPolicy::Required,
            model: ModelConfig::default(),
            adam: AdamConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn sample_budget(&self, dataset_len: usize) -> usize {
        self.epochs.saturating_mul(dataset_len)
    }

    pub fn validate(&self) -> Result<(), PatchNetError> {
        if self.batch_size == 0 {
            return Err(PatchNetError::ConfigurationError(
                "batch size must be positive".to_string(),
            ));
        }
        if self.checkpoint_every == 0 {
            return Err(PatchNetError::ConfigurationError(
                "checkpoint interval must be positive".to_string(),
            ));
        }
        self.model.validate()?;
        self.adam.validate()
    }
}

/// Command-line parsing failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CliError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value '{value}' for {flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },

    #[error("Unknown argument '{0}' (try --help)")]
    UnknownArgument(String),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Train {
        data_dir: PathBuf,
        config: TrainerConfig,
    },
    /// Score a checkpoint on the test split and print `correct total`.
    Evaluate {
        data_dir: PathBuf,
        checkpoint: PathBuf,
        model: ModelConfig,
    },
    Help,
}

pub fn usage() -> &'static str {
    "Usage: patchnet [OPTIONS]

Trains the patch classifier on MNIST, or evaluates a checkpoint with --set.

Options:
  --set <FILE>           evaluate this checkpoint on the test split
  --data <DIR>           directory holding the MNIST IDX files [default: .]
  --out <DIR>            directory for checkpoints and cost.svg [default: .]
  --epochs <N>           passes over the training set [default: 40]
  --batch <N>            samples per Adam update [default: 128]
  --layers <N>           hidden layers [default: 1]
  --seed <N>             random seed [default: 1]
  --activation <NAME>    tanh | everett [default: tanh]
  --help                 print this message"
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, CliError>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| CliError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parses the arguments that follow the program name.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = TrainerConfig::default();
    let mut data_dir = PathBuf::from(".");
    let mut checkpoint: Option<PathBuf> = None;

    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        if flag == "--help" || flag == "-h" {
            return Ok(Command::Help);
        }
        if !matches!(
            flag.as_str(),
            "--set" | "--data" | "--out" | "--epochs" | "--batch" | "--layers" | "--seed" | "--activation"
        ) {
            return Err(CliError::UnknownArgument(flag));
        }
        let value = args
            .next()
            .ok_or_else(|| CliError::MissingValue(flag.clone()))?;
        match flag.as_str() {
            "--set" => checkpoint = Some(PathBuf::from(value)),
            "--data" => data_dir = PathBuf::from(value),
            "--out" => config.output_dir = PathBuf::from(value),
            "--epochs" => config.epochs = parse_value(&flag, &value)?,
            "--batch" => config.batch_size = parse_value(&flag, &value)?,
            "--layers" => config.model.layers = parse_value(&flag, &value)?,
            "--seed" => config.seed = parse_value(&flag, &value)?,
            "--activation" => config.model.activation = parse_value::<Activation>(&flag, &value)?,
            _ => return Err(CliError::UnknownArgument(flag.clone())),
        }
    }

    for (flag, value) in [("--batch", config.batch_size), ("--layers", config.model.layers)] {
        if value == 0 {
            return Err(CliError::InvalidValue {
                flag: flag.to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
    }

    Ok(match checkpoint {
        Some(checkpoint) => Command::Evaluate {
            data_dir,
            checkpoint,
            model: config.model,
        },
        None => Command::Train { data_dir, config },
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
