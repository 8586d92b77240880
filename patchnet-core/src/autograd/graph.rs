use crate::autograd::backward_op::Operator;
use crate::error::PatchNetError;
use crate::tensor::Tensor;
use log::trace;

/// Index of a node inside a [`Graph`].
pub type NodeId = usize;

#[derive(Debug)]
enum Node {
    /// A tensor owned elsewhere (parameter or ephemeral input).
    Leaf(Tensor),
    /// An operator applied to earlier nodes.
    Op {
        op: Box<dyn Operator>,
        inputs: Vec<NodeId>,
    },
}

/// A statically composed computation graph stored as a tape.
///
/// Nodes are appended in construction order and may only reference nodes
/// created before them, so insertion order is a topological order. The
/// forward pass walks the tape front to back; the backward pass replays the
/// same bindings in reverse, accumulating each operator's input gradients.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

/// Values produced by one forward evaluation.
///
/// Leaf entries alias the leaf tensors, so gradients flowing into them land
/// in the owning parameter store. Operator outputs are transient and are
/// dropped with the tape.
#[derive(Debug)]
pub struct Tape {
    values: Vec<Option<Tensor>>,
}

impl Tape {
    /// Returns the value computed for `id`.
    ///
    /// # Errors
    /// `UnknownNode` if `id` was not evaluated in this pass.
    pub fn get(&self, id: NodeId) -> Result<&Tensor, PatchNetError> {
        self.values
            .get(id)
            .and_then(|v| v.as_ref())
            .ok_or(PatchNetError::UnknownNode(id))
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registers a tensor as a leaf node. The graph keeps a shared handle.
    pub fn leaf(&mut self, tensor: Tensor) -> NodeId {
        self.nodes.push(Node::Leaf(tensor));
        self.nodes.len() - 1
    }

    /// Appends `op` applied to `inputs`.
    ///
    /// # Errors
    /// `ArityMismatch` if the input count is wrong, `UnknownNode` if an input
    /// does not exist yet.
    pub fn apply<O: Operator + 'static>(
        &mut self,
        op: O,
        inputs: &[NodeId],
    ) -> Result<NodeId, PatchNetError> {
        self.apply_boxed(Box::new(op), inputs)
    }

    /// Boxed variant of [`Graph::apply`].
    pub fn apply_boxed(
        &mut self,
        op: Box<dyn Operator>,
        inputs: &[NodeId],
    ) -> Result<NodeId, PatchNetError> {
        if inputs.len() != op.arity() {
            return Err(PatchNetError::ArityMismatch {
                operator: op.name(),
                expected: op.arity(),
                actual: inputs.len(),
            });
        }
        if let Some(&bad) = inputs.iter().find(|&&id| id >= self.nodes.len()) {
            return Err(PatchNetError::UnknownNode(bad));
        }
        self.nodes.push(Node::Op {
            op,
            inputs: inputs.to_vec(),
        });
        Ok(self.nodes.len() - 1)
    }

    /// Marks `target` and all of its ancestors.
    fn ancestors(&self, target: NodeId) -> Result<Vec<bool>, PatchNetError> {
        if target >= self.nodes.len() {
            return Err(PatchNetError::UnknownNode(target));
        }
        let mut live = vec![false; target + 1];
        live[target] = true;
        for id in (0..=target).rev() {
            if !live[id] {
                continue;
            }
            if let Node::Op { inputs, .. } = &self.nodes[id] {
                for &input in inputs {
                    live[input] = true;
                }
            }
        }
        Ok(live)
    }

    /// Evaluates `target` and every node it depends on, once each.
    pub fn forward(&mut self, target: NodeId) -> Result<Tape, PatchNetError> {
        let live = self.ancestors(target)?;
        let mut values: Vec<Option<Tensor>> = vec![None; target + 1];
        for id in 0..=target {
            if !live[id] {
                continue;
            }
            let value = match &mut self.nodes[id] {
                Node::Leaf(tensor) => tensor.clone(),
                Node::Op { op, inputs } => {
                    let args = inputs
                        .iter()
                        .map(|&i| values[i].clone().ok_or(PatchNetError::UnknownNode(i)))
                        .collect::<Result<Vec<Tensor>, _>>()?;
                    let refs: Vec<&Tensor> = args.iter().collect();
                    let out = op.forward(&refs)?;
                    trace!("forward {} -> {:?}", op.name(), out.shape());
                    out
                }
            };
            values[id] = Some(value);
        }
        Ok(Tape { values })
    }

    /// Propagates gradients from `target` back to every ancestor.
    ///
    /// The gradient of `target` itself must already be seeded in the tape.
    pub fn backward(&self, tape: &Tape, target: NodeId) -> Result<(), PatchNetError> {
        let live = self.ancestors(target)?;
        for id in (0..=target).rev() {
            if !live[id] {
                continue;
            }
            let (op, inputs) = match &self.nodes[id] {
                Node::Leaf(_) => continue,
                Node::Op { op, inputs } => (op, inputs),
            };
            let output = tape.get(id)?;
            let args = inputs
                .iter()
                .map(|&i| tape.get(i))
                .collect::<Result<Vec<&Tensor>, _>>()?;
            let grads = op.backward(output, &args)?;
            for (input, grad) in args.iter().zip(grads.iter()) {
                input.acc_grad(grad)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
