//! Serialization for zone vectors and origin-destination matrices.
//!
//! Two formats: CSV (`zone,value` records for vectors,
//! `origin,destination,value` triples for matrices) and the fixed-layout
//! little-endian Tripflow binary format (see [`binary`] for the exact
//! layout). Both iterate containers in the order the data model exposes:
//! row-major, ascending dense index.

pub mod binary;
pub mod csv;

pub use self::binary::{read_matrix, read_vector, write_matrix, write_vector, BinaryIoError};
pub use self::csv::{
    read_matrix_csv, read_vector_csv, write_matrix_csv, write_vector_csv, CsvIoError,
};
