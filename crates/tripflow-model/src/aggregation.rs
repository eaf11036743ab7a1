use crate::vector::ZoneVector;
use crate::zones::ZoneIndex;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("source dense index {0} has no destination assignment")]
    MissingSource(usize),
    #[error("source dense index {0} is assigned more than once")]
    DuplicateSource(usize),
    #[error("source dense index {0} is out of range for the source zone system")]
    SourceOutOfRange(usize),
    #[error("destination dense index {0} is out of range for the destination zone system")]
    DestinationOutOfRange(usize),
    #[error("vector is indexed by a different zone system than the aggregation source")]
    SourceMismatch,
}

/// Many-to-one mapping between two zone systems.
///
/// Built from an explicit `(source dense, destination dense)` pair list that
/// must cover every source position exactly once. Two derived structures are
/// computed at construction and never change: the forward index (source →
/// destination) and the reverse grouping (destination → ordered contributing
/// sources). Freely shareable across threads, like the indices it connects.
#[derive(Debug, Clone)]
pub struct ZoneAggregation {
    source: Arc<ZoneIndex>,
    destination: Arc<ZoneIndex>,
    forward: Vec<usize>,
    groups: Vec<SmallVec<[usize; 4]>>,
}

impl ZoneAggregation {
    /// Build a mapping; `pairs` must define a total single-valued function
    /// from every source dense index to an in-range destination dense index.
    pub fn new(
        source: Arc<ZoneIndex>,
        destination: Arc<ZoneIndex>,
        pairs: &[(usize, usize)],
    ) -> Result<Self, AggregationError> {
        let mut forward = vec![usize::MAX; source.len()];
        for &(src, dst) in pairs {
            if src >= source.len() {
                return Err(AggregationError::SourceOutOfRange(src));
            }
            if dst >= destination.len() {
                return Err(AggregationError::DestinationOutOfRange(dst));
            }
            if forward[src] != usize::MAX {
                return Err(AggregationError::DuplicateSource(src));
            }
            forward[src] = dst;
        }
        if let Some(missing) = forward.iter().position(|&dst| dst == usize::MAX) {
            return Err(AggregationError::MissingSource(missing));
        }

        let mut groups = vec![SmallVec::new(); destination.len()];
        for (src, &dst) in forward.iter().enumerate() {
            groups[dst].push(src);
        }

        Ok(Self {
            source,
            destination,
            forward,
            groups,
        })
    }

    #[must_use]
    pub fn source(&self) -> &Arc<ZoneIndex> {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &Arc<ZoneIndex> {
        &self.destination
    }

    /// Destination dense index per source dense index, in source order.
    #[must_use]
    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    /// Ordered contributing source dense indices per destination dense index.
    #[must_use]
    pub fn groups(&self) -> &[SmallVec<[usize; 4]>] {
        &self.groups
    }

    /// Roll `vector` up into the destination zone system by summing each
    /// destination's contributing source values.
    ///
    /// The vector must be indexed by the *identical* source zone system
    /// (handle identity, not structural equality).
    pub fn aggregate(&self, vector: &ZoneVector) -> Result<ZoneVector, AggregationError> {
        if !ZoneIndex::same(vector.zones(), &self.source) {
            return Err(AggregationError::SourceMismatch);
        }
        let mut out = ZoneVector::zeros(self.destination.clone());
        let src = vector.data();
        for (dst, group) in self.groups.iter().enumerate() {
            let mut sum = 0.0;
            for &s in group {
                sum += src[s];
            }
            out.set(dst, sum);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fine() -> Arc<ZoneIndex> {
        ZoneIndex::shared(vec![1, 3, 5, 7]).unwrap()
    }

    fn coarse() -> Arc<ZoneIndex> {
        ZoneIndex::shared(vec![2, 4]).unwrap()
    }

    #[test]
    fn aggregates_by_reverse_grouping() {
        let src = fine();
        let map =
            ZoneAggregation::new(src.clone(), coarse(), &[(0, 0), (1, 0), (2, 1), (3, 1)]).unwrap();
        let vector = ZoneVector::from_data(src, vec![3.0, 7.0, 2.0, 4.0]).unwrap();
        let rolled = map.aggregate(&vector).unwrap();
        assert_eq!(rolled.data(), &[10.0, 6.0]);
        assert!(ZoneIndex::same(rolled.zones(), map.destination()));
    }

    #[test]
    fn forward_and_groups_are_consistent() {
        let map =
            ZoneAggregation::new(fine(), coarse(), &[(3, 1), (0, 0), (2, 1), (1, 0)]).unwrap();
        assert_eq!(map.forward(), &[0, 0, 1, 1]);
        assert_eq!(map.groups()[0].as_slice(), &[0, 1]);
        assert_eq!(map.groups()[1].as_slice(), &[2, 3]);
    }

    #[test]
    fn rejects_partial_mapping() {
        let err = ZoneAggregation::new(fine(), coarse(), &[(0, 0), (1, 0), (3, 1)]).unwrap_err();
        assert_eq!(err, AggregationError::MissingSource(2));
    }

    #[test]
    fn rejects_duplicate_source() {
        let err = ZoneAggregation::new(fine(), coarse(), &[(0, 0), (0, 1), (1, 0), (2, 1)])
            .unwrap_err();
        assert_eq!(err, AggregationError::DuplicateSource(0));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let err = ZoneAggregation::new(fine(), coarse(), &[(0, 2)]).unwrap_err();
        assert_eq!(err, AggregationError::DestinationOutOfRange(2));
        let err = ZoneAggregation::new(fine(), coarse(), &[(4, 0)]).unwrap_err();
        assert_eq!(err, AggregationError::SourceOutOfRange(4));
    }

    #[test]
    fn rejects_vector_over_a_different_source_index() {
        let map =
            ZoneAggregation::new(fine(), coarse(), &[(0, 0), (1, 0), (2, 1), (3, 1)]).unwrap();
        // Structurally equal ids, but a distinct zone system.
        let other = ZoneVector::zeros(fine());
        assert_eq!(map.aggregate(&other).unwrap_err(), AggregationError::SourceMismatch);
    }
}
