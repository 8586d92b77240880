// patchnet-data/src/samplers/random_sampler.rs

use super::traits::Sampler;
use log::warn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// A sampler that randomly samples indices from a dataset.
///
/// The generator is supplied by the caller, so a fixed seed gives a fixed
/// sample order.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    replacement: bool,
    num_samples: Option<usize>,
    rng: StdRng,
}

impl RandomSampler {
    /// Creates a new `RandomSampler`.
    ///
    /// # Arguments
    ///
    /// * `replacement`: If `true`, an index can be selected multiple times.
    /// * `num_samples`: The total number of samples to draw. If `None`, it defaults to the dataset size.
    /// * `rng`: The generator driving index selection.
    pub fn new(replacement: bool, num_samples: Option<usize>, rng: StdRng) -> Self {
        RandomSampler {
            replacement,
            num_samples,
            rng,
        }
    }
}

impl Sampler for RandomSampler {
    fn iter(&mut self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        if dataset_len == 0 {
            return Box::new(std::iter::empty());
        }
        let actual_num_samples = self.num_samples.unwrap_or(dataset_len);

        if self.replacement {
            let rng = &mut self.rng;
            Box::new((0..actual_num_samples).map(move |_| rng.gen_range(0..dataset_len)))
        } else {
            if actual_num_samples > dataset_len {
                warn!(
                    "RandomSampler: num_samples ({}) > dataset_len ({}) without replacement, yielding nothing",
                    actual_num_samples, dataset_len
                );
                return Box::new(std::iter::empty());
            }
            let mut indices: Vec<usize> = (0..dataset_len).collect();
            indices.shuffle(&mut self.rng);
            indices.truncate(actual_num_samples);
            Box::new(indices.into_iter())
        }
    }

    fn len(&self, dataset_len: usize) -> usize {
        if dataset_len == 0 {
            return 0;
        }
        self.num_samples.unwrap_or(dataset_len)
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
