use super::*;
use crate::autograd::grad_check::check_grad;
use crate::utils::testing::{check_tensor_near, create_test_tensor};

#[test]
fn test_dropout_rejects_bad_rate() {
    assert!(Dropout::new(1.0, 0).is_err());
    assert!(Dropout::new(-0.1, 0).is_err());
    assert!(Dropout::new(0.0, 0).is_ok());
}

#[test]
fn test_dropout_mask_shared_by_rows_and_reused_in_backward() {
    let width = 64;
    let rows = 3;
    let a = create_test_tensor(vec![1.0; width * rows], vec![width, rows]);
    let mut op = Dropout::new(0.5, 42).unwrap();
    let c = op.forward(&[&a]).unwrap();
    let mask = op.mask().to_vec();
    assert_eq!(mask.len(), width);
    assert!(mask.iter().any(|&k| k) && mask.iter().any(|&k| !k));

    let values = c.values();
    for (p, v) in values.iter().enumerate() {
        let expected = if mask[p % width] { 2.0 } else { 0.0 };
        assert_eq!(*v, expected);
    }

    c.set_grad(&vec![1.0; width * rows]).unwrap();
    let grads = op.backward(&c, &[&a]).unwrap();
    assert_eq!(grads[0], values);
}

#[test]
fn test_dropout_draws_new_mask_each_forward() {
    let a = create_test_tensor(vec![1.0; 128], vec![128]);
    let mut op = Dropout::new(0.5, 3).unwrap();
    op.forward(&[&a]).unwrap();
    let first = op.mask().to_vec();
    op.forward(&[&a]).unwrap();
    assert_ne!(first, op.mask());
}

#[test]
fn test_dropout_backward_before_forward_fails() {
    let a = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let op = Dropout::new(0.1, 0).unwrap();
    assert!(op.backward(&a, &[&a]).is_err());
}

#[test]
fn test_identity_copies_values() {
    let a = create_test_tensor(vec![1.0, -2.0, 3.0, -4.0], vec![2, 2]);
    let mut op = Identity;
    let c = op.forward(&[&a]).unwrap();
    check_tensor_near(&c, &[2, 2], &[1.0, -2.0, 3.0, -4.0], 0.0);
    assert!(!c.ptr_eq(&a));
    c.set_grad(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(op.backward(&c, &[&a]).unwrap()[0], vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_dropout_grad_check() {
    let a = create_test_tensor(
        vec![0.3, -0.6, 0.9, 1.2, -0.1, 0.45, 0.8, -0.7],
        vec![4, 2],
    );
    let result = check_grad(|| Box::new(Dropout::new(0.25, 11).unwrap()), &[a], 1e-2, 1e-3);
    assert!(result.is_ok(), "Dropout grad check failed: {:?}", result.err());
}

#[test]
fn test_identity_grad_check() {
    let a = create_test_tensor(vec![0.3, -0.6, 0.9], vec![3]);
    let result = check_grad(|| Box::new(Identity), &[a], 1e-2, 1e-3);
    assert!(result.is_ok(), "Identity grad check failed: {:?}", result.err());
}
