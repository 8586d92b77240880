use crate::error::PatchNetError;

/// Checks that a shape is `[width]` or `[width, rows]` with positive sizes.
pub fn validate_shape(shape: &[usize]) -> Result<(), PatchNetError> {
    if shape.is_empty() || shape.len() > 2 || shape.iter().any(|&d| d == 0) {
        return Err(PatchNetError::InvalidShape {
            shape: shape.to_vec(),
        });
    }
    Ok(())
}

/// Returns `(width, rows)` for a validated shape.
pub fn width_rows(shape: &[usize]) -> (usize, usize) {
    (shape[0], shape.get(1).copied().unwrap_or(1))
}

/// Index of the largest value; the first one wins on ties.
/// Returns `None` for an empty slice or when every value is NaN.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
