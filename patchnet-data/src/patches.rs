use patchnet_core::PatchNetError;

/// Cells per side of the patch grid.
pub const GRID: usize = 7;

/// Fixed patch geometry over images of one size.
///
/// The image is cut into a `GRID × GRID` grid of cells of
/// `(width / GRID) × (height / GRID)` pixels, scanned row of cells by row of
/// cells. Each patch lists its pixel indices `x + y * width`, with
/// coordinates wrapped on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchGrid {
    width: usize,
    height: usize,
    cell_width: usize,
    cell_height: usize,
    patches: Vec<Vec<usize>>,
}

impl PatchGrid {
    pub fn select(width: usize, height: usize) -> Result<Self, PatchNetError> {
        let (cell_width, cell_height) = (width / GRID, height / GRID);
        if cell_width == 0 || cell_height == 0 {
            return Err(PatchNetError::ConfigurationError(format!(
                "images of {}x{} are smaller than the {}x{} patch grid",
                width, height, GRID, GRID
            )));
        }
        let mut patches = Vec::with_capacity(GRID * GRID);
        for gy in 0..GRID {
            for gx in 0..GRID {
                let (ox, oy) = (gx * cell_width, gy * cell_height);
                let mut cell = Vec::with_capacity(cell_width * cell_height);
                for dy in 0..cell_height {
                    for dx in 0..cell_width {
                        let x = (ox + dx) % width;
                        let y = (oy + dy) % height;
                        cell.push(x + y * width);
                    }
                }
                patches.push(cell);
            }
        }
        Ok(PatchGrid {
            width,
            height,
            cell_width,
            cell_height,
            patches,
        })
    }

    /// Pixels per patch.
    pub fn patch_width(&self) -> usize {
        self.cell_width * self.cell_height
    }

    /// Number of patches (always `GRID * GRID`).
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn patches(&self) -> &[Vec<usize>] {
        &self.patches
    }

    /// Writes the patches of `image` into `out` as values in `[0, 1]`.
    ///
    /// `out` is laid out `[patch_width, patches]`: pixel `i` of patch `j`
    /// goes to `out[j * patch_width + i]`.
    pub fn fill(&self, image: &[u8], out: &mut [f32]) -> Result<(), PatchNetError> {
        if image.len() != self.width * self.height {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![self.width, self.height],
                actual: vec![image.len()],
                operation: "patch fill (image)".to_string(),
            });
        }
        let pw = self.patch_width();
        if out.len() != pw * self.len() {
            return Err(PatchNetError::ShapeMismatch {
                expected: vec![pw, self.len()],
                actual: vec![out.len()],
                operation: "patch fill (output)".to_string(),
            });
        }
        for (j, patch) in self.patches.iter().enumerate() {
            for (i, &pixel) in patch.iter().enumerate() {
                out[j * pw + i] = f32::from(image[pixel]) / 255.0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "patches_test.rs"]
mod tests;
