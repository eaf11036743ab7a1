use crate::zones::ZoneIndex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VectorDataError {
    #[error("zone system has {expected} zones but {actual} values were supplied")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A demand vector over a zone system: one `f64` per dense position.
///
/// Mutable in place and owned by whichever computation produced it. `Clone`
/// deep-copies the buffer and shares only the zone index handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneVector {
    zones: Arc<ZoneIndex>,
    data: Vec<f64>,
}

impl ZoneVector {
    #[must_use]
    pub fn zeros(zones: Arc<ZoneIndex>) -> Self {
        let data = vec![0.0; zones.len()];
        Self { zones, data }
    }

    #[must_use]
    pub fn filled(zones: Arc<ZoneIndex>, value: f64) -> Self {
        let data = vec![value; zones.len()];
        Self { zones, data }
    }

    /// Wrap pre-populated data; the buffer length must match the zone count.
    pub fn from_data(zones: Arc<ZoneIndex>, data: Vec<f64>) -> Result<Self, VectorDataError> {
        if data.len() != zones.len() {
            return Err(VectorDataError::LengthMismatch {
                expected: zones.len(),
                actual: data.len(),
            });
        }
        Ok(Self { zones, data })
    }

    #[must_use]
    pub fn zones(&self) -> &Arc<ZoneIndex> {
        &self.zones
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at dense position `dense`. Panics on out-of-range positions,
    /// like slice indexing.
    #[must_use]
    pub fn value(&self, dense: usize) -> f64 {
        self.data[dense]
    }

    pub fn set(&mut self, dense: usize, value: f64) {
        self.data[dense] = value;
    }

    /// Flat buffer in ascending dense-position order.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Whether `other` is addressed by the identical zone system.
    #[must_use]
    pub fn same_zones(&self, other: &Self) -> bool {
        ZoneIndex::same(&self.zones, &other.zones)
    }
}
