// patchnet-data/src/samplers/sequential_sampler_test.rs

use super::*;

#[test]
fn test_sequential_sampler_order() {
    let mut sampler = SequentialSampler::new();
    assert_eq!(sampler.iter(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(sampler.len(4), 4);
}

#[test]
fn test_sequential_sampler_empty() {
    let mut sampler = SequentialSampler::new();
    assert_eq!(sampler.iter(0).count(), 0);
}
