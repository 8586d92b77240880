use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_zeros() {
    let t = zeros(&[2, 3]).unwrap();
    assert_eq!(t.shape(), vec![2, 3]);
    assert_eq!(t.numel(), 6);
    assert!(t.values().iter().all(|&x| x == 0.0));
    assert!(t.grad().iter().all(|&x| x == 0.0));
}

#[test]
fn test_from_vec_length_mismatch() {
    let result = from_vec(vec![1.0, 2.0, 3.0], &[2, 2]);
    assert_eq!(
        result.err(),
        Some(PatchNetError::TensorCreationError {
            data_len: 3,
            shape: vec![2, 2]
        })
    );
}

#[test]
fn test_randn_scaled_is_reproducible() {
    let mut rng_a = StdRng::seed_from_u64(7);
    let mut rng_b = StdRng::seed_from_u64(7);
    let a = randn_scaled(&[4, 4], 0.5, &mut rng_a).unwrap();
    let b = randn_scaled(&[4, 4], 0.5, &mut rng_b).unwrap();
    assert_eq!(a.values(), b.values());
    assert!(a.values().iter().any(|&x| x != 0.0));
}

#[test]
fn test_randn_scaled_rejects_negative_std() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        randn_scaled(&[2], -1.0, &mut rng),
        Err(PatchNetError::ConfigurationError(_))
    ));
    assert!(matches!(
        randn_scaled(&[2], f32::NAN, &mut rng),
        Err(PatchNetError::ConfigurationError(_))
    ));
    assert!(matches!(
        randn_scaled(&[2], f32::INFINITY, &mut rng),
        Err(PatchNetError::ConfigurationError(_))
    ));
}
