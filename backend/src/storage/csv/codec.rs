//! # Line Codec
//!
//! Every store file holds one record per line with fields joined by a single
//! delimiter byte (`,` unless configured otherwise). There is no header row.
//!
//! ```text
//! alice,5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8,alice@example.com,guest
//! bob,8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92,bob@example.com,admin
//! ```
//!
//! Encoding and decoding go through the `csv` crate, so a value that happens
//! to contain the delimiter is quoted instead of corrupting the line.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::str::FromStr;

/// Default field delimiter for all store files
pub const DEFAULT_DELIMITER: u8 = b',';

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid value {value:?} for field '{field}'")]
    InvalidField { field: &'static str, value: String },
    #[error("inconsistent record: {0}")]
    Inconsistent(String),
    #[error("field '{0}' contains a line break")]
    EmbeddedNewline(&'static str),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoded line is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A record shape that can be stored as one delimited line
pub trait LineRecord: Sized + Clone {
    /// Human readable name used in diagnostics ("user", "restaurant", ...)
    const KIND: &'static str;
    /// Field names in on-disk order
    const FIELDS: &'static [&'static str];

    fn to_fields(&self) -> Vec<String>;

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError>;
}

/// Encode a record into a single line without the trailing newline
pub fn encode_line<T: LineRecord>(record: &T, delimiter: u8) -> Result<String, CodecError> {
    let fields = record.to_fields();
    for (name, value) in T::FIELDS.iter().zip(&fields) {
        if value.contains('\n') || value.contains('\r') {
            return Err(CodecError::EmbeddedNewline(*name));
        }
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(&fields)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| CodecError::Io(e.into_error()))?;

    let mut line = String::from_utf8(bytes)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Decode one line into a record
pub fn decode_line<T: LineRecord>(line: &str, delimiter: u8) -> Result<T, CodecError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(record) => T::from_fields(&record?),
        None => Err(CodecError::FieldCount {
            expected: T::FIELDS.len(),
            found: 0,
        }),
    }
}

/// Fail unless the record has exactly the expected shape
pub(crate) fn expect_field_count<T: LineRecord>(fields: &StringRecord) -> Result<(), CodecError> {
    if fields.len() != T::FIELDS.len() {
        return Err(CodecError::FieldCount {
            expected: T::FIELDS.len(),
            found: fields.len(),
        });
    }
    Ok(())
}

/// Raw string value at `index`
pub(crate) fn text_field(fields: &StringRecord, index: usize) -> &str {
    fields.get(index).unwrap_or("")
}

/// Non-empty string value at `index`
pub(crate) fn required_field<T: LineRecord>(
    fields: &StringRecord,
    index: usize,
) -> Result<String, CodecError> {
    let value = text_field(fields, index);
    if value.trim().is_empty() {
        return Err(CodecError::InvalidField {
            field: T::FIELDS[index],
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Parse the value at `index` with `FromStr`
pub(crate) fn parsed_field<T: LineRecord, F: FromStr>(
    fields: &StringRecord,
    index: usize,
) -> Result<F, CodecError> {
    let value = text_field(fields, index);
    value.trim().parse::<F>().map_err(|_| CodecError::InvalidField {
        field: T::FIELDS[index],
        value: value.to_string(),
    })
}

/// Parse a finite floating point value at `index`
pub(crate) fn finite_field<T: LineRecord>(
    fields: &StringRecord,
    index: usize,
) -> Result<f64, CodecError> {
    let value: f64 = parsed_field::<T, f64>(fields, index)?;
    if !value.is_finite() {
        return Err(CodecError::InvalidField {
            field: T::FIELDS[index],
            value: text_field(fields, index).to_string(),
        });
    }
    Ok(value)
}
