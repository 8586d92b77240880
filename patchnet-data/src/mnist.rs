//! Reader for the MNIST IDX files.
//!
//! Image files start with the big-endian header `2051, count, rows, cols`
//! followed by `count * rows * cols` pixel bytes; label files start with
//! `2049, count` followed by one byte per label.

use crate::dataset::ImageSet;
use log::info;
use patchnet_core::PatchNetError;
use std::fs;
use std::path::Path;

pub const IMAGE_MAGIC: u32 = 2051;
pub const LABEL_MAGIC: u32 = 2049;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// The MNIST training and test splits.
#[derive(Debug, Clone)]
pub struct Mnist {
    pub train: ImageSet,
    pub test: ImageSet,
}

/// Decoded contents of an IDX image file.
#[derive(Debug, Clone, PartialEq)]
pub struct IdxImages {
    pub width: usize,
    pub height: usize,
    pub images: Vec<Vec<u8>>,
}

fn format_error(path: &str, reason: impl Into<String>) -> PatchNetError {
    PatchNetError::DatasetFormat {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn read_be_u32(data: &[u8], offset: usize, path: &str) -> Result<u32, PatchNetError> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| format_error(path, "header truncated"))
}

/// Parses an IDX image file held in memory. `path` is used in errors only.
pub fn parse_images(data: &[u8], path: &str) -> Result<IdxImages, PatchNetError> {
    let magic = read_be_u32(data, 0, path)?;
    if magic != IMAGE_MAGIC {
        return Err(format_error(path, format!("bad magic {}, expected {}", magic, IMAGE_MAGIC)));
    }
    let count = read_be_u32(data, 4, path)? as usize;
    let height = read_be_u32(data, 8, path)? as usize;
    let width = read_be_u32(data, 12, path)? as usize;
    let body = &data[16..];
    let expected = width
        .checked_mul(height)
        .and_then(|size| size.checked_mul(count).map(|bytes| (size, bytes)));
    let size = match expected {
        Some((size, bytes)) if size > 0 && body.len() == bytes => size,
        Some((_, bytes)) => {
            return Err(format_error(
                path,
                format!(
                    "expected {} images of {}x{} ({} bytes), found {} bytes",
                    count,
                    width,
                    height,
                    bytes,
                    body.len()
                ),
            ))
        }
        None => {
            return Err(format_error(
                path,
                format!(
                    "header declares {} images of {}x{}, which overflows",
                    count, width, height
                ),
            ))
        }
    };
    let images = body.chunks_exact(size).map(|c| c.to_vec()).collect();
    Ok(IdxImages {
        width,
        height,
        images,
    })
}

/// Parses an IDX label file held in memory.
pub fn parse_labels(data: &[u8], path: &str) -> Result<Vec<u8>, PatchNetError> {
    let magic = read_be_u32(data, 0, path)?;
    if magic != LABEL_MAGIC {
        return Err(format_error(path, format!("bad magic {}, expected {}", magic, LABEL_MAGIC)));
    }
    let count = read_be_u32(data, 4, path)? as usize;
    let body = &data[8..];
    if body.len() != count {
        return Err(format_error(
            path,
            format!("expected {} labels, found {}", count, body.len()),
        ));
    }
    Ok(body.to_vec())
}

/// Loads one split from an image file and a label file.
pub fn load_split(images: &Path, labels: &Path) -> Result<ImageSet, PatchNetError> {
    let image_bytes = fs::read(images).map_err(|e| PatchNetError::io(images, e))?;
    let label_bytes = fs::read(labels).map_err(|e| PatchNetError::io(labels, e))?;
    let decoded = parse_images(&image_bytes, &images.display().to_string())?;
    let labels = parse_labels(&label_bytes, &labels.display().to_string())?;
    ImageSet::new(decoded.width, decoded.height, decoded.images, labels)
}

/// Loads both MNIST splits from the four standard files in `dir`.
pub fn load(dir: impl AsRef<Path>) -> Result<Mnist, PatchNetError> {
    let dir = dir.as_ref();
    let train = load_split(&dir.join(TRAIN_IMAGES), &dir.join(TRAIN_LABELS))?;
    let test = load_split(&dir.join(TEST_IMAGES), &dir.join(TEST_LABELS))?;
    info!(
        "loaded MNIST from {}: {} train, {} test images",
        dir.display(),
        train.labels().len(),
        test.labels().len()
    );
    Ok(Mnist { train, test })
}

#[cfg(test)]
#[path = "mnist_test.rs"]
mod tests;
