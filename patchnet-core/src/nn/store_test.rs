use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn temp_path(tag: &str) -> std::path::PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("patchnet_store_{}_{}_{}.w", tag, std::process::id(), n))
}

#[test]
fn test_create_and_get_share_buffer() {
    let mut store = ParameterStore::trainable();
    let created = store.create("layer1.weight", &[4, 2]).unwrap();
    assert_eq!(created.values(), vec![0.0; 8]);
    assert!(created.has_optimizer_state());

    let fetched = store.get("layer1.weight").unwrap();
    assert!(fetched.ptr_eq(&created));
    fetched.acc_grad(&[1.0; 8]).unwrap();
    assert_eq!(created.grad(), vec![1.0; 8]);
}

#[test]
fn test_duplicate_and_unknown_names() {
    let mut store = ParameterStore::ephemeral();
    store.create("input", &[3, 2]).unwrap();
    assert_eq!(
        store.create("input", &[1]).err(),
        Some(PatchNetError::DuplicateParameter("input".to_string()))
    );
    assert_eq!(
        store.get("target").err(),
        Some(PatchNetError::UnknownParameter("target".to_string()))
    );
    assert!(!store.get("input").unwrap().has_optimizer_state());
}

#[test]
fn test_insertion_order_is_preserved() {
    let mut store = ParameterStore::trainable();
    for name in ["position", "layer1.weight", "layer1.bias", "output.weight", "output.bias"] {
        store.create(name, &[1]).unwrap();
    }
    assert_eq!(
        store.names(),
        vec!["position", "layer1.weight", "layer1.bias", "output.weight", "output.bias"]
    );
}

#[test]
fn test_zero_gradients_and_clear() {
    let mut store = ParameterStore::ephemeral();
    let t = store.create("input", &[2]).unwrap();
    t.set_values(&[3.0, 4.0]).unwrap();
    t.acc_grad(&[1.0, 1.0]).unwrap();

    store.zero_gradients();
    assert_eq!(t.grad(), vec![0.0, 0.0]);
    assert_eq!(t.values(), vec![3.0, 4.0]);

    t.acc_grad(&[1.0, 1.0]).unwrap();
    store.clear();
    assert_eq!(t.values(), vec![0.0, 0.0]);
    assert_eq!(t.grad(), vec![0.0, 0.0]);
}

#[test]
fn test_checkpoint_round_trip() {
    let mut store = ParameterStore::trainable();
    let w = store.create("layer1.weight", &[3, 2]).unwrap();
    w.set_values(&[0.1, -0.2, 0.3, -0.4, 0.5, -0.6]).unwrap();
    let b = store.create("layer1.bias", &[2, 1]).unwrap();
    b.set_values(&[1.0, 2.0]).unwrap();
    w.acc_grad(&[9.0; 6]).unwrap();
    if let Some(state) = w.write_data().state.as_mut() {
        state.m.fill(3.0);
    }

    let path = temp_path("round_trip");
    store.save(&path, 0.75, 1280).unwrap();
    let (loaded, meta) = ParameterStore::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(meta.loss, 0.75);
    assert_eq!(meta.step, 1280);
    assert_eq!(loaded.names(), store.names());
    for (name, original) in store.iter() {
        let restored = loaded.get(name).unwrap();
        assert_eq!(restored.shape(), original.shape());
        assert_eq!(restored.values(), original.values());
        assert!(restored.grad().iter().all(|&g| g == 0.0));
        let state = restored.optimizer_state().unwrap();
        assert!(state.m.iter().chain(&state.v).all(|&x| x == 0.0));
    }
}

#[test]
fn test_ephemeral_store_is_not_persisted() {
    let mut store = ParameterStore::ephemeral();
    assert_eq!(store.kind(), StoreKind::Ephemeral);
    store.create("input", &[4, 2]).unwrap();
    let path = temp_path("ephemeral");
    assert!(matches!(
        store.save(&path, 0.0, 0),
        Err(PatchNetError::CheckpointFormat { .. })
    ));
    assert!(!path.exists());
    assert_eq!(ParameterStore::trainable().kind(), StoreKind::Trainable);
}
