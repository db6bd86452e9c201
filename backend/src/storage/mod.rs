//! # Storage Module
//!
//! Persistence for the three record types. Each store keeps its full record
//! list in memory and rewrites its backing file after every change.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── users.txt
//! ├── accommodations.txt
//! └── restaurants.txt
//! ```

pub mod csv;

pub use self::csv::{
    AddOutcome, FileConnection, LineRecord, LoadReport, MalformedLine, RecordStore, StoreError,
    UpdateOutcome,
};
