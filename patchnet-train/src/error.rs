use crate::config::CliError;
use patchnet_core::PatchNetError;
use thiserror::Error;

/// Everything that can end a `patchnet` run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Core(#[from] PatchNetError),

    #[error("Failed to install the interrupt handler: {0}")]
    Signal(String),
}
