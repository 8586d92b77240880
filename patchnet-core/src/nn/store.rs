use crate::error::PatchNetError;
use crate::io::checkpoint::{self, CheckpointMeta};
use crate::tensor::{self, Tensor};
use std::collections::HashMap;
use std::path::Path;

/// Whether a store's tensors are optimized and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Weights, biases and the position embedding. Every tensor carries
    /// optimizer state and is written to checkpoints.
    Trainable,
    /// Per-step inputs (`input`, `target`). Never persisted, cleared each step.
    Ephemeral,
}

/// A named, insertion-ordered collection of tensors.
///
/// `get` hands out shared handles, so a graph built from the store reads
/// and writes the same buffers the optimizer later updates.
#[derive(Debug)]
pub struct ParameterStore {
    kind: StoreKind,
    entries: Vec<(String, Tensor)>,
    index: HashMap<String, usize>,
}

impl ParameterStore {
    pub fn new(kind: StoreKind) -> Self {
        ParameterStore {
            kind,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn trainable() -> Self {
        Self::new(StoreKind::Trainable)
    }

    pub fn ephemeral() -> Self {
        Self::new(StoreKind::Ephemeral)
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registers a zero-valued tensor of shape `dims` under `name`.
    ///
    /// # Errors
    /// `DuplicateParameter` if the name is taken, `InvalidShape` for bad dims.
    pub fn create(&mut self, name: &str, dims: &[usize]) -> Result<Tensor, PatchNetError> {
        let tensor = tensor::zeros(dims)?;
        self.insert(name, tensor.clone())?;
        Ok(tensor)
    }

    /// Adds an existing tensor under `name`. Trainable stores attach fresh
    /// optimizer state.
    pub fn insert(&mut self, name: &str, tensor: Tensor) -> Result<(), PatchNetError> {
        if self.index.contains_key(name) {
            return Err(PatchNetError::DuplicateParameter(name.to_string()));
        }
        if self.kind == StoreKind::Trainable {
            tensor.init_optimizer_state();
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), tensor));
        Ok(())
    }

    /// Returns a shared handle to the tensor registered as `name`.
    pub fn get(&self, name: &str) -> Result<Tensor, PatchNetError> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.clone())
            .ok_or_else(|| PatchNetError::UnknownParameter(name.to_string()))
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// `(name, tensor)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Total number of scalar values across all tensors.
    pub fn numel(&self) -> usize {
        self.entries.iter().map(|(_, t)| t.numel()).sum()
    }

    pub fn zero_gradients(&self) {
        for (_, tensor) in &self.entries {
            tensor.zero_grad();
        }
    }

    /// Resets every value and gradient to zero, keeping names and shapes.
    pub fn clear(&self) {
        for (_, tensor) in &self.entries {
            tensor.fill(0.0);
            tensor.zero_grad();
        }
    }

    /// Writes names, shapes and values together with `loss` and `step`.
    pub fn save(&self, path: impl AsRef<Path>, loss: f32, step: u64) -> Result<(), PatchNetError> {
        checkpoint::save(path, self, CheckpointMeta { loss, step })
    }

    /// Reads a checkpoint into a new trainable store with zeroed gradients
    /// and optimizer state.
    pub fn load(path: impl AsRef<Path>) -> Result<(ParameterStore, CheckpointMeta), PatchNetError> {
        let (records, meta) = checkpoint::load(path)?;
        let mut store = ParameterStore::trainable();
        for record in records {
            store.insert(&record.name, Tensor::new(record.values, record.shape)?)?;
        }
        Ok((store, meta))
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
