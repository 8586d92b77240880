//! Persistence of trainable parameters.

pub mod checkpoint;

pub use checkpoint::CheckpointMeta;
