//! The patch classifier: parameter layout, initialization and graph construction.

pub mod builder;
pub mod config;

pub use builder::{build_model, create_inputs, initialize_parameters, Mode, Model};
pub use config::ModelConfig;
