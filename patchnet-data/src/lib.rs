//! Image data for patchnet: the dataset interface, the MNIST IDX reader,
//! the 7×7 patch geometry and index samplers.

pub mod dataset;
pub mod mnist;
pub mod patches;
pub mod samplers;

pub use dataset::{ImageDataset, ImageSet};
pub use mnist::Mnist;
pub use patches::PatchGrid;
pub use samplers::{RandomSampler, Sampler, SequentialSampler};
