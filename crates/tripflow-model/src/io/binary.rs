//! The Tripflow binary container format.
//!
//! Fixed little-endian layout:
//!
//! ```text
//! magic      4 bytes   b"TFMX"
//! version    u16       1
//! elem tag   u8        1 = f64
//! dim tag    u8        1 = vector, 2 = matrix
//! row count  u32
//! col count  u32       (1 for vectors)
//! row ids    u32 * row count   ascending zone numbers
//! col ids    u32 * col count   (absent for vectors)
//! payload    f64 * row count * col count   row-major, ascending dense index
//! ```

use crate::matrix::OdMatrix;
use crate::vector::ZoneVector;
use crate::zones::{ZoneIndex, ZoneIndexError};
use std::io::{Read, Write};
use thiserror::Error;

const MAGIC: [u8; 4] = *b"TFMX";
const VERSION: u16 = 1;
const ELEM_F64: u8 = 1;
const DIM_VECTOR: u8 = 1;
const DIM_MATRIX: u8 = 2;

#[derive(Debug, Error)]
pub enum BinaryIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("not a Tripflow binary container (bad magic)")]
    BadMagic,
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u16),
    #[error("unsupported element type tag {0}")]
    UnsupportedElementType(u8),
    #[error("expected dimension tag {expected}, found {actual}")]
    DimensionMismatch { expected: u8, actual: u8 },
    #[error("invalid zone id array: {0}")]
    ZoneIndex(#[from] ZoneIndexError),
}

pub fn write_vector<W: Write>(w: &mut W, vector: &ZoneVector) -> Result<(), BinaryIoError> {
    write_header(w, DIM_VECTOR, vector.len() as u32, 1)?;
    write_ids(w, vector.zones().zones())?;
    write_payload(w, vector.data())?;
    Ok(())
}

pub fn write_matrix<W: Write>(w: &mut W, matrix: &OdMatrix) -> Result<(), BinaryIoError> {
    write_header(
        w,
        DIM_MATRIX,
        matrix.row_count() as u32,
        matrix.col_count() as u32,
    )?;
    write_ids(w, matrix.rows().zones())?;
    write_ids(w, matrix.cols().zones())?;
    write_payload(w, matrix.data())?;
    Ok(())
}

pub fn read_vector<R: Read>(r: &mut R) -> Result<ZoneVector, BinaryIoError> {
    let (rows, _cols) = read_header(r, DIM_VECTOR)?;
    let zones = ZoneIndex::shared(read_ids(r, rows)?)?;
    let data = read_payload(r, rows as usize)?;
    Ok(ZoneVector::from_data(zones, data).expect("payload length follows from the header"))
}

pub fn read_matrix<R: Read>(r: &mut R) -> Result<OdMatrix, BinaryIoError> {
    let (rows, cols) = read_header(r, DIM_MATRIX)?;
    let row_ids = read_ids(r, rows)?;
    let col_ids = read_ids(r, cols)?;
    let row_index = ZoneIndex::shared(row_ids)?;
    // Square matrices with identical axes share one handle, so containers
    // read back from disk stay shape-compatible with each other.
    let col_index = if row_index.zones() == col_ids.as_slice() {
        row_index.clone()
    } else {
        ZoneIndex::shared(col_ids)?
    };
    let data = read_payload(r, rows as usize * cols as usize)?;
    Ok(OdMatrix::from_data(row_index, col_index, data)
        .expect("payload length follows from the header"))
}

fn write_header<W: Write>(w: &mut W, dim: u8, rows: u32, cols: u32) -> Result<(), BinaryIoError> {
    w.write_all(&MAGIC)?;
    w.write_all(&VERSION.to_le_bytes())?;
    w.write_all(&[ELEM_F64, dim])?;
    w.write_all(&rows.to_le_bytes())?;
    w.write_all(&cols.to_le_bytes())?;
    Ok(())
}

fn read_header<R: Read>(r: &mut R, expected_dim: u8) -> Result<(u32, u32), BinaryIoError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(BinaryIoError::BadMagic);
    }
    let version = u16::from_le_bytes(read_array(r)?);
    if version != VERSION {
        return Err(BinaryIoError::UnsupportedVersion(version));
    }
    let [elem, dim] = read_array(r)?;
    if elem != ELEM_F64 {
        return Err(BinaryIoError::UnsupportedElementType(elem));
    }
    if dim != expected_dim {
        return Err(BinaryIoError::DimensionMismatch {
            expected: expected_dim,
            actual: dim,
        });
    }
    let rows = u32::from_le_bytes(read_array(r)?);
    let cols = u32::from_le_bytes(read_array(r)?);
    Ok((rows, cols))
}

fn write_ids<W: Write>(w: &mut W, ids: &[u32]) -> Result<(), BinaryIoError> {
    for &id in ids {
        w.write_all(&id.to_le_bytes())?;
    }
    Ok(())
}

fn read_ids<R: Read>(r: &mut R, count: u32) -> Result<Vec<u32>, BinaryIoError> {
    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        ids.push(u32::from_le_bytes(read_array(r)?));
    }
    Ok(ids)
}

fn write_payload<W: Write>(w: &mut W, data: &[f64]) -> Result<(), BinaryIoError> {
    for &v in data {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_payload<R: Read>(r: &mut R, len: usize) -> Result<Vec<f64>, BinaryIoError> {
    let mut data = Vec::with_capacity(len);
    for _ in 0..len {
        data.push(f64::from_le_bytes(read_array(r)?));
    }
    Ok(data)
}

fn read_array<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N], BinaryIoError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}
