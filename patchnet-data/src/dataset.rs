use patchnet_core::PatchNetError;

/// A labelled collection of grayscale images of one fixed size.
///
/// Pixels are bytes `0..=255`, stored row by row (`x + y * width`).
pub trait ImageDataset {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Number of images.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the pixels of image `index`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if `index >= len()`.
    fn image(&self, index: usize) -> Result<&[u8], PatchNetError>;

    /// Returns the class label of image `index`.
    fn label(&self, index: usize) -> Result<u8, PatchNetError>;
}

/// In-memory image set. Used for loaded MNIST splits and synthetic data.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSet {
    width: usize,
    height: usize,
    images: Vec<Vec<u8>>,
    labels: Vec<u8>,
}

impl ImageSet {
    /// Creates an image set, checking that every image has `width * height`
    /// pixels and that there is one label per image.
    pub fn new(
        width: usize,
        height: usize,
        images: Vec<Vec<u8>>,
        labels: Vec<u8>,
    ) -> Result<Self, PatchNetError> {
        if images.len() != labels.len() {
            return Err(PatchNetError::DatasetFormat {
                path: "<memory>".to_string(),
                reason: format!("{} images but {} labels", images.len(), labels.len()),
            });
        }
        if let Some((i, image)) = images
            .iter()
            .enumerate()
            .find(|(_, image)| image.len() != width * height)
        {
            return Err(PatchNetError::DatasetFormat {
                path: "<memory>".to_string(),
                reason: format!(
                    "image {} has {} pixels, expected {}x{}",
                    i,
                    image.len(),
                    width,
                    height
                ),
            });
        }
        Ok(ImageSet {
            width,
            height,
            images,
            labels,
        })
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }
}

impl ImageDataset for ImageSet {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn len(&self) -> usize {
        self.images.len()
    }

    fn image(&self, index: usize) -> Result<&[u8], PatchNetError> {
        self.images
            .get(index)
            .map(|image| image.as_slice())
            .ok_or(PatchNetError::IndexOutOfBounds {
                index,
                len: self.images.len(),
            })
    }

    fn label(&self, index: usize) -> Result<u8, PatchNetError> {
        self.labels
            .get(index)
            .copied()
            .ok_or(PatchNetError::IndexOutOfBounds {
                index,
                len: self.labels.len(),
            })
    }
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
