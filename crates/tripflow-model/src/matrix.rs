use crate::zones::ZoneIndex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixDataError {
    #[error("matrix shape is {rows}x{cols} but {actual} values were supplied")]
    LengthMismatch {
        rows: usize,
        cols: usize,
        actual: usize,
    },
}

/// An origin-destination matrix: row-major flat storage addressed by a pair
/// of zone indices. Square matrices share one index handle for both axes.
///
/// `Clone` deep-copies the buffer and shares only the index handles. Not
/// safe for concurrent mutation; single-writer ownership is assumed during
/// any one computation.
#[derive(Debug, Clone, PartialEq)]
pub struct OdMatrix {
    rows: Arc<ZoneIndex>,
    cols: Arc<ZoneIndex>,
    data: Vec<f64>,
}

impl OdMatrix {
    #[must_use]
    pub fn zeros(rows: Arc<ZoneIndex>, cols: Arc<ZoneIndex>) -> Self {
        let data = vec![0.0; rows.len() * cols.len()];
        Self { rows, cols, data }
    }

    /// A square matrix whose both axes are the same zone system.
    #[must_use]
    pub fn square(zones: Arc<ZoneIndex>) -> Self {
        Self::zeros(zones.clone(), zones)
    }

    /// Wrap pre-populated row-major data; the buffer length must be
    /// `rows.len() * cols.len()`.
    pub fn from_data(
        rows: Arc<ZoneIndex>,
        cols: Arc<ZoneIndex>,
        data: Vec<f64>,
    ) -> Result<Self, MatrixDataError> {
        if data.len() != rows.len() * cols.len() {
            return Err(MatrixDataError::LengthMismatch {
                rows: rows.len(),
                cols: cols.len(),
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    #[must_use]
    pub fn rows(&self) -> &Arc<ZoneIndex> {
        &self.rows
    }

    #[must_use]
    pub fn cols(&self) -> &Arc<ZoneIndex> {
        &self.cols
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn col_count(&self) -> usize {
        self.cols.len()
    }

    /// Value at dense `(row, col)`. Panics on out-of-range positions.
    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols.len() + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols.len() + col] = value;
    }

    /// One matrix row as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let cols = self.cols.len();
        &self.data[row * cols..(row + 1) * cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let cols = self.cols.len();
        &mut self.data[row * cols..(row + 1) * cols]
    }

    /// Flat row-major buffer, ascending dense index (the iteration order the
    /// binary matrix format expects).
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Whether `other` is addressed by the identical zone systems on both
    /// axes.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        ZoneIndex::same(&self.rows, &other.rows) && ZoneIndex::same(&self.cols, &other.cols)
    }
}
