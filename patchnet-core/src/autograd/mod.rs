//! Reverse-mode automatic differentiation.
//!
//! * [`Operator`]: the forward/backward contract every tensor operation implements.
//! * [`Graph`]: a tape of operator bindings replayed in reverse for backward.
//! * [`gradient`]: the driver that runs one forward and one backward pass.
//! * [`grad_check`]: finite-difference verification of operator gradients.

pub mod backward_op;
pub mod grad_check;
pub mod graph;

pub use backward_op::Operator;
pub use graph::{Graph, NodeId, Tape};

use crate::error::PatchNetError;

/// Evaluates `loss` forward exactly once, then backpropagates from it.
///
/// The loss node must hold a single element. Its gradient is seeded with 1
/// and every ancestor tensor receives its contribution by accumulation, so
/// repeated calls sum gradients until the caller zeroes them.
///
/// Returns the scalar loss value. A non-finite loss is returned as is; the
/// caller decides how to react to divergence.
pub fn gradient(graph: &mut Graph, loss: NodeId) -> Result<f32, PatchNetError> {
    let tape = graph.forward(loss)?;
    let output = tape.get(loss)?;
    if output.numel() != 1 {
        return Err(PatchNetError::BackwardNonScalar(output.shape()));
    }
    output.set_grad(&[1.0])?;
    graph.backward(&tape, loss)?;
    output
        .value_at(0)
        .ok_or(PatchNetError::BackwardNonScalar(output.shape()))
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
