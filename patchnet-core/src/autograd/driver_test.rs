use super::*;
use crate::ops::{MatMul, Quadratic, Tanh};
use crate::utils::testing::create_test_tensor;

#[test]
fn test_gradient_returns_loss_and_seeds_one() {
    let w = create_test_tensor(vec![1.0, 2.0], vec![2, 1]);
    let mut graph = Graph::new();
    let w_id = graph.leaf(w.clone());
    let x = graph.leaf(create_test_tensor(vec![1.0, 1.0], vec![2, 1]));
    let t = graph.leaf(create_test_tensor(vec![1.0], vec![1, 1]));
    let y = graph.apply(MatMul, &[w_id, x]).unwrap();
    let loss = graph.apply(Quadratic, &[y, t]).unwrap();

    // y = 3, loss = (3 - 1)² = 4, dloss/dw = 2·2·x = [4, 4]
    let value = gradient(&mut graph, loss).unwrap();
    assert_eq!(value, 4.0);
    assert_eq!(w.grad(), vec![4.0, 4.0]);
}

#[test]
fn test_gradient_accumulates_across_calls() {
    let w = create_test_tensor(vec![1.0, 2.0], vec![2, 1]);
    let mut graph = Graph::new();
    let w_id = graph.leaf(w.clone());
    let x = graph.leaf(create_test_tensor(vec![1.0, 1.0], vec![2, 1]));
    let t = graph.leaf(create_test_tensor(vec![1.0], vec![1, 1]));
    let y = graph.apply(MatMul, &[w_id, x]).unwrap();
    let loss = graph.apply(Quadratic, &[y, t]).unwrap();

    gradient(&mut graph, loss).unwrap();
    gradient(&mut graph, loss).unwrap();
    assert_eq!(w.grad(), vec![8.0, 8.0]);
    w.zero_grad();
    assert_eq!(w.grad(), vec![0.0, 0.0]);
}

#[test]
fn test_gradient_rejects_non_scalar_loss() {
    let mut graph = Graph::new();
    let x = graph.leaf(create_test_tensor(vec![0.1, 0.2], vec![2]));
    let y = graph.apply(Tanh, &[x]).unwrap();
    assert_eq!(
        gradient(&mut graph, y).err(),
        Some(PatchNetError::BackwardNonScalar(vec![2]))
    );
}

#[test]
fn test_gradient_surfaces_shape_errors() {
    let mut graph = Graph::new();
    let w = graph.leaf(create_test_tensor(vec![0.0; 6], vec![3, 2]));
    let x = graph.leaf(create_test_tensor(vec![0.0; 2], vec![2]));
    let y = graph.apply(MatMul, &[w, x]).unwrap();
    assert!(matches!(
        gradient(&mut graph, y),
        Err(PatchNetError::ShapeMismatch { .. })
    ));
}
