//! Flat-file storage: one delimited text file per record type.

pub mod codec;
pub mod connection;
pub mod record_store;
pub mod records;

#[cfg(test)]
pub mod test_utils;

pub use codec::{decode_line, encode_line, CodecError, LineRecord, DEFAULT_DELIMITER};
pub use connection::FileConnection;
pub use record_store::{AddOutcome, LoadReport, MalformedLine, RecordStore, StoreError, UpdateOutcome};
