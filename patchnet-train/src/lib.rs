//! Training, evaluation and the `patchnet` command line.

pub mod cancel;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod inputs;
pub mod plot;
pub mod trainer;

pub use cancel::CancellationToken;
pub use config::{parse_args, usage, CheckpointPolicy, CliError, Command, TrainerConfig};
pub use error::AppError;
pub use evaluate::{evaluate, infer_model_config, Accuracy};
pub use plot::ScatterPlot;
pub use trainer::{HaltReason, LossPoint, Trainer, TrainingReport};
