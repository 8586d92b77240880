use super::*;

#[test]
fn test_new_shape_accessors() {
    let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]).unwrap();
    assert_eq!(t.shape(), vec![3, 2]);
    assert_eq!(t.width(), 3);
    assert_eq!(t.rows(), 2);
    assert_eq!(t.numel(), 6);
    assert_eq!(t.value_at(4), Some(5.0));
    assert_eq!(t.value_at(6), None);

    let v = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    assert_eq!(v.rows(), 1);
}

#[test]
fn test_clone_shares_buffer() {
    let t = create::zeros(&[2]).unwrap();
    let alias = t.clone();
    alias.set_values(&[3.0, 4.0]).unwrap();
    assert_eq!(t.values(), vec![3.0, 4.0]);
    assert!(t.ptr_eq(&alias));

    let other = create::zeros(&[2]).unwrap();
    assert!(!t.ptr_eq(&other));
}

#[test]
fn test_acc_grad_adds() {
    let t = create::zeros(&[3]).unwrap();
    t.acc_grad(&[1.0, 2.0, 3.0]).unwrap();
    t.acc_grad(&[0.5, 0.5, 0.5]).unwrap();
    assert_eq!(t.grad(), vec![1.5, 2.5, 3.5]);

    t.zero_grad();
    assert_eq!(t.grad(), vec![0.0; 3]);
}

#[test]
fn test_acc_grad_length_mismatch() {
    let t = create::zeros(&[3]).unwrap();
    assert!(matches!(
        t.acc_grad(&[1.0]),
        Err(PatchNetError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_set_values_length_mismatch() {
    let t = create::zeros(&[2, 2]).unwrap();
    assert!(t.set_values(&[1.0; 3]).is_err());
}

#[test]
fn test_optimizer_state_lifecycle() {
    let t = create::zeros(&[2]).unwrap();
    assert!(!t.has_optimizer_state());
    t.init_optimizer_state();
    assert!(t.has_optimizer_state());
    let state = t.optimizer_state().unwrap();
    assert_eq!(state.m, vec![0.0, 0.0]);
    assert_eq!(state.v, vec![0.0, 0.0]);
    assert_eq!(t.width(), 2);
    assert_eq!(t.rows(), 1);
}
