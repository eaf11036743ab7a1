#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Core in-memory data model for Tripflow zone systems.
//!
//! A *zone system* is an ordered set of externally meaningful, possibly
//! non-contiguous zone numbers. [`ZoneIndex`] maps those sparse numbers to
//! dense `0..len` positions so demand vectors and origin-destination
//! matrices can live in flat `f64` buffers. [`ZoneVector`] and [`OdMatrix`]
//! are those buffers; [`ZoneAggregation`] rolls a fine-grained vector up
//! into a coarser zone system.
//!
//! Zone indices are immutable after construction and shared by reference
//! (`Arc<ZoneIndex>`). Shape compatibility throughout Tripflow is checked by
//! **identity** ([`ZoneIndex::same`]), never by structural equality: two
//! indices built from the same id list are still distinct zone systems.
//!
//! The [`io`] module serializes vectors and matrices to CSV and to the
//! fixed-layout Tripflow binary matrix format.

pub mod aggregation;
pub mod io;
pub mod matrix;
pub mod vector;
pub mod zones;

pub use aggregation::{AggregationError, ZoneAggregation};
pub use matrix::{MatrixDataError, OdMatrix};
pub use vector::{VectorDataError, ZoneVector};
pub use zones::{ZoneIndex, ZoneIndexError};
