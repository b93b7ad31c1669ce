//! A crate for reading legacy MetaStock securities databases: the `MASTER`,
//! `EMASTER`, and `XMASTER` index files and the per-equity `F#.DAT` and `C#.MWD`
//! time series files.
//!
//! The usual entry point is [`Database::open()`], which decodes the catalog of
//! equities and, unless [lazy loading](OpenOptions::lazy_load) is requested, each
//! equity's price and volume history.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::missing_errors_doc)]

pub mod bar;
pub mod catalog;
pub mod database;
pub mod decode;
pub mod enums;
pub mod equity;
pub mod error;
pub mod fields;
pub mod series;
pub mod source;
#[cfg(test)]
mod test_utils;

pub use crate::{
    bar::Bar,
    catalog::Catalog,
    database::{Database, OpenOptions},
    enums::{BarField, DataFileKind, IndexFile, InterdayPeriodicity, IntradayPeriodicity},
    equity::{Equity, EquityRecord},
    error::{Error, ErrorKind, Result},
    fields::ActiveFieldSet,
    series::{SeriesCursor, TimeSeries},
    source::{DataSource, DirSource, MemSource},
};

/// The name of the primary index file.
pub const MASTER_FILE_NAME: &str = "MASTER";
/// The name of the extended index file.
pub const EMASTER_FILE_NAME: &str = "EMASTER";
/// The name of the secondary index file.
pub const XMASTER_FILE_NAME: &str = "XMASTER";

/// The width in bytes of every field in a time series record.
pub const FIELD_WIDTH: usize = 4;
/// Byte offset of the record count in the header of a time series file.
const SERIES_RECORD_COUNT_OFFSET: u64 = 2;
