//! Readers for on-disk vector datasets and ground-truth neighbor files.
//!
//! Formats, chosen by file extension:
//! - `.fvecs`: repeated records of `i32` dimension then `dim` f32 values (SIFT distribution format)
//! - `.ivecs`: repeated records of `i32` count then `count` i32 ids
//! - anything else: `u32 count`, `u32 dim` header, then `count * dim` 4-byte values
//!
//! All integers and floats are little-endian.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: truncated at byte {offset}, needed {needed} more bytes", path.display())]
    Truncated {
        path: PathBuf,
        offset: usize,
        needed: usize,
    },
    #[error("{}: record {record}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        record: usize,
        reason: String,
    },
    #[error("{}: dataset is empty", path.display())]
    Empty { path: PathBuf },
}

/// A set of equal-length vectors stored row-major in one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSet {
    pub dim: usize,
    pub data: Vec<f32>,
}

impl VectorSet {
    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.data.len().checked_div(self.dim).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `i`, or `None` when it is past the end.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.dim)?;
        let end = start.checked_add(self.dim)?;
        self.data.get(start..end)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim)
    }
}

/// Read a vector file, `.fvecs` or flat binary depending on the extension.
pub fn read_vectors(path: &Path) -> Result<VectorSet, DatasetError> {
    let bytes = read_file(path)?;
    let mut reader = ByteReader::new(&bytes, path);
    let rows = if has_extension(path, "fvecs") {
        read_records(&mut reader, |r| r.f32())?
    } else {
        read_matrix(&mut reader, |r| r.f32())?
    };

    let dim = rows.first().map_or(0, Vec::len);
    if dim == 0 {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }
    let mut data = Vec::with_capacity(rows.len() * dim);
    for (record, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(invalid(
                path,
                record,
                format!("dimension {} differs from first record ({dim})", row.len()),
            ));
        }
        data.extend_from_slice(row);
    }
    Ok(VectorSet { dim, data })
}

/// Read ground-truth neighbor ids, `.ivecs` or flat binary depending on the extension.
/// Each row lists the true neighbors of one query, nearest first.
pub fn read_ground_truth(path: &Path) -> Result<Vec<Vec<u32>>, DatasetError> {
    let bytes = read_file(path)?;
    let mut reader = ByteReader::new(&bytes, path);
    let rows = if has_extension(path, "ivecs") {
        read_records(&mut reader, |r| r.i32())?
    } else {
        read_matrix(&mut reader, |r| r.i32())?
    };

    rows.into_iter()
        .enumerate()
        .map(|(record, row)| {
            row.into_iter()
                .map(|id| {
                    u32::try_from(id)
                        .map_err(|_| invalid(path, record, format!("negative neighbor id {id}")))
                })
                .collect::<Result<Vec<u32>, _>>()
        })
        .collect()
}

fn read_file(path: &Path) -> Result<Vec<u8>, DatasetError> {
    fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn invalid(path: &Path, record: usize, reason: String) -> DatasetError {
    DatasetError::InvalidRecord {
        path: path.to_path_buf(),
        record,
        reason,
    }
}

/// `.fvecs` / `.ivecs` layout: each record carries its own length prefix.
fn read_records<T>(
    reader: &mut ByteReader<'_>,
    mut value: impl FnMut(&mut ByteReader<'_>) -> Result<T, DatasetError>,
) -> Result<Vec<Vec<T>>, DatasetError> {
    let mut rows = Vec::new();
    while !reader.is_done() {
        let len = reader.i32()?;
        let len = usize::try_from(len)
            .map_err(|_| invalid(reader.path, rows.len(), format!("negative length {len}")))?;
        let row = (0..len).map(|_| value(reader)).collect::<Result<Vec<T>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Flat layout: `u32 rows`, `u32 cols` header followed by exactly `rows * cols` values.
fn read_matrix<T>(
    reader: &mut ByteReader<'_>,
    mut value: impl FnMut(&mut ByteReader<'_>) -> Result<T, DatasetError>,
) -> Result<Vec<Vec<T>>, DatasetError> {
    let count = reader.u32()? as usize;
    let cols = reader.u32()? as usize;
    reader.require(count.saturating_mul(cols).saturating_mul(4))?;
    let rows = (0..count)
        .map(|_| (0..cols).map(|_| value(reader)).collect::<Result<Vec<T>, _>>())
        .collect::<Result<Vec<Vec<T>>, _>>()?;
    let trailing = reader.remaining();
    if trailing > 0 {
        return Err(invalid(
            reader.path,
            count,
            format!("{trailing} trailing bytes after {count}x{cols} header"),
        ));
    }
    Ok(rows)
}

/// Little-endian cursor that reports truncation with the file path and offset.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    path: &'a Path,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8], path: &'a Path) -> Self {
        Self {
            bytes,
            offset: 0,
            path,
        }
    }

    fn is_done(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn require(&self, needed: usize) -> Result<(), DatasetError> {
        let available = self.remaining();
        if needed > available {
            return Err(DatasetError::Truncated {
                path: self.path.to_path_buf(),
                offset: self.offset,
                needed: needed - available,
            });
        }
        Ok(())
    }

    fn take4(&mut self) -> Result<[u8; 4], DatasetError> {
        self.require(4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[self.offset..self.offset + 4]);
        self.offset += 4;
        Ok(word)
    }

    fn u32(&mut self) -> Result<u32, DatasetError> {
        self.take4().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> Result<i32, DatasetError> {
        self.take4().map(i32::from_le_bytes)
    }

    fn f32(&mut self) -> Result<f32, DatasetError> {
        self.take4().map(f32::from_le_bytes)
    }
}
