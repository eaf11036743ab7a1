//! CSV import/export.
//!
//! Vectors are `zone,value` records; matrices are `origin,destination,value`
//! triples. Files carry no header row. Zone numbers must belong to the zone
//! system the caller supplies; readers start from a zeroed container, so
//! zones absent from the file keep the value 0.

use crate::matrix::OdMatrix;
use crate::vector::ZoneVector;
use crate::zones::ZoneIndex;
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvIoError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("record {record}: expected {expected} fields, found {actual}")]
    FieldCount {
        record: u64,
        expected: usize,
        actual: usize,
    },
    #[error("record {record}: cannot parse `{field}`")]
    BadField { record: u64, field: String },
    #[error("record {record}: zone {zone} is not part of the zone system")]
    UnknownZone { record: u64, zone: u32 },
}

pub fn read_vector_csv<R: Read>(
    r: R,
    zones: &Arc<ZoneIndex>,
) -> Result<ZoneVector, CsvIoError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(r);
    let mut out = ZoneVector::zeros(zones.clone());
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        expect_fields(&record, 2, line)?;
        let zone: u32 = parse_field(&record[0], line)?;
        let value: f64 = parse_field(&record[1], line)?;
        let dense = zones
            .position(zone)
            .ok_or(CsvIoError::UnknownZone { record: line, zone })?;
        out.set(dense, value);
    }
    Ok(out)
}

pub fn write_vector_csv<W: Write>(w: W, vector: &ZoneVector) -> Result<(), CsvIoError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    for (dense, &value) in vector.data().iter().enumerate() {
        writer.write_record([
            vector.zones().zone(dense).to_string(),
            value.to_string(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn read_matrix_csv<R: Read>(
    r: R,
    rows: &Arc<ZoneIndex>,
    cols: &Arc<ZoneIndex>,
) -> Result<OdMatrix, CsvIoError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(r);
    let mut out = OdMatrix::zeros(rows.clone(), cols.clone());
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        expect_fields(&record, 3, line)?;
        let origin: u32 = parse_field(&record[0], line)?;
        let destination: u32 = parse_field(&record[1], line)?;
        let value: f64 = parse_field(&record[2], line)?;
        let row = rows.position(origin).ok_or(CsvIoError::UnknownZone {
            record: line,
            zone: origin,
        })?;
        let col = cols.position(destination).ok_or(CsvIoError::UnknownZone {
            record: line,
            zone: destination,
        })?;
        out.set(row, col, value);
    }
    Ok(out)
}

/// Writes triples row-major, ascending dense index.
pub fn write_matrix_csv<W: Write>(w: W, matrix: &OdMatrix) -> Result<(), CsvIoError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    for row in 0..matrix.row_count() {
        let origin = matrix.rows().zone(row).to_string();
        for col in 0..matrix.col_count() {
            writer.write_record([
                origin.clone(),
                matrix.cols().zone(col).to_string(),
                matrix.at(row, col).to_string(),
            ])?;
        }
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn expect_fields(
    record: &csv::StringRecord,
    expected: usize,
    line: u64,
) -> Result<(), CsvIoError> {
    if record.len() != expected {
        return Err(CsvIoError::FieldCount {
            record: line,
            expected,
            actual: record.len(),
        });
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr>(raw: &str, line: u64) -> Result<T, CsvIoError> {
    raw.trim().parse().map_err(|_| CsvIoError::BadField {
        record: line,
        field: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vector_round_trip() {
        let zones = ZoneIndex::shared(vec![2, 4, 6]).unwrap();
        let v = ZoneVector::from_data(zones.clone(), vec![1.5, 0.0, -2.25]).unwrap();
        let mut buf = Vec::new();
        write_vector_csv(&mut buf, &v).unwrap();
        let back = read_vector_csv(buf.as_slice(), &zones).unwrap();
        assert_eq!(back.data(), v.data());
    }

    #[test]
    fn vector_read_defaults_missing_zones_to_zero() {
        let zones = ZoneIndex::shared(vec![2, 4, 6]).unwrap();
        let back = read_vector_csv("4,7.5\n".as_bytes(), &zones).unwrap();
        assert_eq!(back.data(), &[0.0, 7.5, 0.0]);
    }

    #[test]
    fn vector_read_rejects_unknown_zone() {
        let zones = ZoneIndex::shared(vec![2, 4]).unwrap();
        let err = read_vector_csv("3,1.0\n".as_bytes(), &zones).unwrap_err();
        assert!(matches!(err, CsvIoError::UnknownZone { zone: 3, .. }));
    }

    #[test]
    fn vector_read_rejects_malformed_value() {
        let zones = ZoneIndex::shared(vec![2]).unwrap();
        let err = read_vector_csv("2,abc\n".as_bytes(), &zones).unwrap_err();
        assert!(matches!(err, CsvIoError::BadField { .. }));
    }

    #[test]
    fn matrix_round_trip() {
        let rows = ZoneIndex::shared(vec![1, 2]).unwrap();
        let cols = ZoneIndex::shared(vec![10, 20]).unwrap();
        let m = OdMatrix::from_data(rows.clone(), cols.clone(), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut buf = Vec::new();
        write_matrix_csv(&mut buf, &m).unwrap();
        let back = read_matrix_csv(buf.as_slice(), &rows, &cols).unwrap();
        assert_eq!(back.data(), m.data());
    }
}
