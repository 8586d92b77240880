//! Binary checkpoint format.
//!
//! All integers and floats are little-endian:
//!
//! ```text
//! "PNCK"            magic
//! u32               format version (1)
//! f32               loss at save time
//! u64               step (samples seen)
//! u32               tensor count
//! per tensor:
//!   u32 + bytes     UTF-8 name
//!   u32 + u64 * n   rank and dims
//!   f32 * numel     values
//! ```
//!
//! Gradients and optimizer moments are not stored.

use crate::error::PatchNetError;
use crate::nn::store::{ParameterStore, StoreKind};
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

pub const MAGIC: [u8; 4] = *b"PNCK";
pub const VERSION: u32 = 1;

/// Scalar metadata saved alongside the tensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointMeta {
    pub loss: f32,
    pub step: u64,
}

/// One tensor as read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorRecord {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

/// Serializes `store` into a byte buffer.
pub fn encode(store: &ParameterStore, meta: CheckpointMeta) -> Vec<u8> {
    let mut buf = Vec::with_capacity(24 + store.numel() * 4);
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&meta.loss.to_le_bytes());
    buf.extend_from_slice(&meta.step.to_le_bytes());
    buf.extend_from_slice(&(store.len() as u32).to_le_bytes());
    for (name, tensor) in store.iter() {
        buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
        buf.extend_from_slice(name.as_bytes());
        let data = tensor.read_data();
        buf.extend_from_slice(&(data.shape().len() as u32).to_le_bytes());
        for &dim in data.shape() {
            buf.extend_from_slice(&(dim as u64).to_le_bytes());
        }
        for &v in data.values() {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    buf
}

/// Cursor over a checkpoint buffer that reports truncation as a format error.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    path: &'a str,
}

impl<'a> Reader<'a> {
    fn error(&self, reason: impl Into<String>) -> PatchNetError {
        PatchNetError::CheckpointFormat {
            path: self.path.to_string(),
            reason: reason.into(),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PatchNetError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| self.error(format!("truncated at byte {}", self.pos)))?;
        let buf: &'a [u8] = self.buf;
        self.pos = end;
        let bytes = &buf[end - n..end];
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], PatchNetError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, PatchNetError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, PatchNetError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32, PatchNetError> {
        Ok(f32::from_le_bytes(self.array()?))
    }
}

/// Parses a checkpoint buffer. `path` is only used in error messages.
pub fn decode(buf: &[u8], path: &str) -> Result<(Vec<TensorRecord>, CheckpointMeta), PatchNetError> {
    let mut r = Reader { buf, pos: 0, path };
    if r.array::<4>()? != MAGIC {
        return Err(r.error("bad magic"));
    }
    let version = r.u32()?;
    if version != VERSION {
        return Err(r.error(format!("unsupported version {}", version)));
    }
    let meta = CheckpointMeta {
        loss: r.f32()?,
        step: r.u64()?,
    };
    let count = r.u32()? as usize;
    let mut records = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let name_len = r.u32()? as usize;
        let name = std::str::from_utf8(r.take(name_len)?)
            .map_err(|e| r.error(format!("tensor name is not UTF-8: {}", e)))?
            .to_string();
        let rank = r.u32()? as usize;
        if rank == 0 || rank > 2 {
            return Err(r.error(format!("tensor '{}' has rank {}", name, rank)));
        }
        let shape = (0..rank)
            .map(|_| r.u64().map(|d| d as usize))
            .collect::<Result<Vec<usize>, _>>()?;
        let numel = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| r.error(format!("tensor '{}' is too large", name)))?;
        let byte_len = numel
            .checked_mul(4)
            .ok_or_else(|| r.error("size overflow"))?;
        let bytes = r.take(byte_len)?;
        let values = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        records.push(TensorRecord { name, shape, values });
    }
    if r.pos != buf.len() {
        return Err(r.error(format!("{} trailing bytes", buf.len() - r.pos)));
    }
    Ok((records, meta))
}

/// Writes `store` to `path`, replacing any existing file.
///
/// Only trainable stores are persisted; per-step inputs never are.
pub fn save(path: impl AsRef<Path>, store: &ParameterStore, meta: CheckpointMeta) -> Result<(), PatchNetError> {
    let path = path.as_ref();
    if store.kind() != StoreKind::Trainable {
        return Err(PatchNetError::CheckpointFormat {
            path: path.display().to_string(),
            reason: "only trainable stores can be saved".to_string(),
        });
    }
    let bytes = encode(store, meta);
    let file = File::create(path).map_err(|e| PatchNetError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| PatchNetError::io(path, e))?;
    debug!(
        "saved {} tensors ({} bytes) to {}",
        store.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Reads the tensor records and metadata stored at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<(Vec<TensorRecord>, CheckpointMeta), PatchNetError> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|e| PatchNetError::io(path, e))?;
    decode(&bytes, &path.display().to_string())
}

#[cfg(test)]
#[path = "checkpoint_test.rs"]
mod tests;
