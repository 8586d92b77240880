use patchnet_core::model::builder::{INPUT, TARGET};
use patchnet_core::nn::ParameterStore;
use patchnet_core::PatchNetError;
use patchnet_data::PatchGrid;

/// Resets the ephemeral store and writes one example into it.
///
/// `input` receives the image's patches normalized to `[0, 1]`. When a
/// label is given, `target` becomes its one-hot vector.
pub fn load_example(
    grid: &PatchGrid,
    inputs: &ParameterStore,
    image: &[u8],
    label: Option<u8>,
) -> Result<(), PatchNetError> {
    inputs.clear();
    let input = inputs.get(INPUT)?;
    let expected = vec![grid.patch_width(), grid.len()];
    if input.shape() != expected {
        return Err(PatchNetError::ShapeMismatch {
            expected,
            actual: input.shape(),
            operation: "load_example".to_string(),
        });
    }
    let mut values = vec![0.0f32; input.numel()];
    grid.fill(image, &mut values)?;
    input.set_values(&values)?;
    if let Some(label) = label {
        let target = inputs.get(TARGET)?;
        let classes = target.numel();
        let index = usize::from(label);
        if index >= classes {
            return Err(PatchNetError::IndexOutOfBounds {
                index,
                len: classes,
            });
        }
        let mut one_hot = vec![0.0f32; classes];
        one_hot[index] = 1.0;
        target.set_values(&one_hot)?;
    }
    Ok(())
}
