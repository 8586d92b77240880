// patchnet-data/src/samplers/traits.rs

use std::fmt::Debug;

/// A Sampler defines the order in which dataset indices are visited.
pub trait Sampler: Debug + Send {
    /// Returns an iterator over indices of a dataset of `dataset_len` items.
    ///
    /// Takes `&mut self` because random samplers advance their generator.
    fn iter(&mut self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + '_>;

    /// Returns the total number of indices the iterator will yield.
    fn len(&self, dataset_len: usize) -> usize;
}
