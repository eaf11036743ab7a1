use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZoneIndexError {
    /// The id at `position` is not strictly greater than its predecessor.
    /// Covers both out-of-order and duplicate ids.
    #[error("zone ids must be strictly ascending (violation at position {position})")]
    NotAscending { position: usize },
}

/// Bidirectional mapping between sparse zone numbers and dense positions.
///
/// Zone numbers are externally meaningful integers (they come from the zone
/// system definition, not from us) and need not be contiguous. Each number
/// is assigned the dense position equal to its rank in ascending order, so a
/// vector/matrix over the index can use flat storage.
///
/// Immutable after construction. Containers share one index by reference
/// (`Arc<ZoneIndex>`); compatibility checks use [`ZoneIndex::same`], which
/// compares handles, not contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneIndex {
    ids: Vec<u32>,
}

impl ZoneIndex {
    /// Build an index from an ascending list of unique zone numbers.
    pub fn new(ids: Vec<u32>) -> Result<Self, ZoneIndexError> {
        for position in 1..ids.len() {
            if ids[position] <= ids[position - 1] {
                return Err(ZoneIndexError::NotAscending { position });
            }
        }
        Ok(Self { ids })
    }

    /// Convenience constructor returning a shared handle directly.
    pub fn shared(ids: Vec<u32>) -> Result<Arc<Self>, ZoneIndexError> {
        Ok(Arc::new(Self::new(ids)?))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Dense position of `zone`, or `None` if the zone number is not part of
    /// this zone system.
    ///
    /// Binary search over the sorted id array; this sits in evaluator and
    /// solver inner paths, so it must stay sub-linear.
    #[must_use]
    pub fn position(&self, zone: u32) -> Option<usize> {
        self.ids.binary_search(&zone).ok()
    }

    /// Zone number at `dense`.
    ///
    /// # Panics
    ///
    /// Panics if `dense >= self.len()`, like slice indexing.
    #[must_use]
    pub fn zone(&self, dense: usize) -> u32 {
        self.ids[dense]
    }

    /// The ascending zone number array, in dense-position order.
    ///
    /// Exposed so an I/O layer can serialize the axis of a vector or matrix.
    #[must_use]
    pub fn zones(&self) -> &[u32] {
        &self.ids
    }

    /// Whether two handles refer to the *same* zone system.
    ///
    /// Identity, not structural equality: two indices constructed from equal
    /// id lists are different zone systems and their containers must not mix.
    #[must_use]
    pub fn same(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}
