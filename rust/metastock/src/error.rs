//! Types for errors that can occur while reading a MetaStock database.
use std::{fmt, io};

use thiserror::Error;

use crate::enums::IndexFile;

/// An error from one of the primitive field decoders in [`decode`](crate::decode).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The requested byte range couldn't be read, typically because it lies past
    /// the end of the file.
    #[error("IO error: {source:?} while reading {len} bytes at offset {offset}")]
    Io {
        /// The original error.
        #[source]
        source: io::Error,
        /// The absolute offset of the read.
        offset: u64,
        /// The number of bytes requested.
        len: usize,
    },
    /// A string field contained bytes that aren't valid UTF-8.
    #[error("UTF-8 error: {source:?} in string field at offset {offset}")]
    Utf8 {
        /// The original error.
        #[source]
        source: std::str::Utf8Error,
        /// The absolute offset of the field.
        offset: u64,
    },
    /// A numeric value couldn't be interpreted as a packed date.
    #[error("couldn't convert {raw} to a packed date: {desc}")]
    Date {
        /// The value after truncation to an integer.
        raw: u64,
        /// Why the value was rejected.
        desc: String,
    },
}

impl DecodeError {
    pub(crate) fn io(source: io::Error, offset: u64, len: usize) -> Self {
        Self::Io {
            source,
            offset,
            len,
        }
    }

    pub(crate) fn date(raw: u64, desc: impl ToString) -> Self {
        Self::Date {
            raw,
            desc: desc.to_string(),
        }
    }
}

/// An error that can occur while loading the catalog or time series of a
/// MetaStock database.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required file couldn't be opened.
    #[error("failed to open '{file_name}': {source}")]
    FileOpen {
        /// The name of the file within the database.
        file_name: String,
        /// The original error.
        #[source]
        source: io::Error,
    },
    /// A field in the header of an index file couldn't be decoded.
    #[error("failed to read {field} in header of {file}: {source}")]
    HeaderField {
        /// The index file being read.
        file: IndexFile,
        /// The logical field that failed.
        field: &'static str,
        /// The original error.
        #[source]
        source: DecodeError,
    },
    /// A field in a record of an index file couldn't be decoded.
    #[error("failed to read {field} in record {record} of {file}: {source}")]
    RecordField {
        /// The index file being read.
        file: IndexFile,
        /// The 1-based record number.
        record: u32,
        /// The logical field that failed.
        field: &'static str,
        /// The original error.
        #[source]
        source: DecodeError,
    },
    /// An unknown region of an index file couldn't be read. Record `0` is the
    /// header.
    #[error("failed to read {field} in record {record} of {file}: {source}")]
    FillerField {
        /// The index file being read.
        file: IndexFile,
        /// The 1-based record number, or `0` for the header.
        record: u32,
        /// The name of the filler region.
        field: &'static str,
        /// The original error.
        #[source]
        source: DecodeError,
    },
    /// A field decoded successfully but holds a value outside its domain, such as
    /// an unknown periodicity code or a symbol with no catalog entry.
    #[error("invalid {field} '{value}' in record {record} of {file}")]
    RecordValue {
        /// The index file being read.
        file: IndexFile,
        /// The 1-based record number.
        record: u32,
        /// The logical field with the invalid value.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// The `EMASTER` header disagrees with the `MASTER` header.
    #[error("EMASTER header doesn't match MASTER header: {field} is {primary} in MASTER and {extended} in EMASTER")]
    HeaderMismatch {
        /// The header field that differs.
        field: &'static str,
        /// The value in `MASTER`.
        primary: u16,
        /// The value in `EMASTER`.
        extended: u16,
    },
    /// An `EMASTER` record disagrees with the `MASTER` record for the same symbol.
    #[error("MASTER and EMASTER contradict for '{symbol}': {field} is {primary} in MASTER and {extended} in EMASTER")]
    RecordMismatch {
        /// The symbol of the equity.
        symbol: String,
        /// The field that differs.
        field: &'static str,
        /// The value in `MASTER`.
        primary: String,
        /// The value in `EMASTER`.
        extended: String,
    },
    /// An active field bitmask isn't one of the four canonical layouts.
    #[error("invalid active field bitmask {bitmask:#04x} in record {record} of {file}")]
    BitmaskInvalid {
        /// The index file being read.
        file: IndexFile,
        /// The 1-based record number.
        record: u32,
        /// The raw bitmask.
        bitmask: u8,
    },
    /// The time series file of an equity doesn't exist.
    #[error("time series file '{file_name}' for '{symbol}' doesn't exist")]
    SeriesFileMissing {
        /// The symbol of the equity.
        symbol: String,
        /// The expected file name.
        file_name: String,
    },
    /// A field of a time series file couldn't be decoded.
    #[error("failed to read {field} in record {record} of '{file_name}' for '{symbol}': {source}")]
    SeriesField {
        /// The symbol of the equity.
        symbol: String,
        /// The name of the time series file.
        file_name: String,
        /// The 1-based record number, or `0` for the header.
        record: u32,
        /// The logical field that failed.
        field: &'static str,
        /// The original error.
        #[source]
        source: DecodeError,
    },
    /// A time series file contains two bars for the same date.
    #[error("duplicate date {date} in '{file_name}' for '{symbol}'")]
    DuplicateDate {
        /// The symbol of the equity.
        symbol: String,
        /// The name of the time series file.
        file_name: String,
        /// The repeated date.
        date: time::Date,
    },
}

/// An alias for a `Result` with [`metastock::Error`](crate::Error) as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of an [`Error`], independent of its context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A file couldn't be opened.
    FileOpenFailed,
    /// An index header field couldn't be read.
    HeaderFieldRead,
    /// An index record field couldn't be read.
    RecordFieldRead,
    /// An index filler region couldn't be read.
    FillerFieldRead,
    /// An index record field holds an unrecognized value.
    RecordValueInvalid,
    /// The `MASTER` and `EMASTER` headers disagree.
    CrossFileHeaderMismatch,
    /// A `MASTER` and `EMASTER` record disagree.
    CrossFileRecordMismatch,
    /// An active field bitmask isn't canonical.
    BitmaskInvalid,
    /// A time series file doesn't exist.
    TimeSeriesFileMissing,
    /// A time series field couldn't be read.
    TimeSeriesFieldRead,
    /// A time series contains a repeated date.
    DuplicateDate,
}

impl Error {
    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileOpen { .. } => ErrorKind::FileOpenFailed,
            Error::HeaderField { .. } => ErrorKind::HeaderFieldRead,
            Error::RecordField { .. } => ErrorKind::RecordFieldRead,
            Error::FillerField { .. } => ErrorKind::FillerFieldRead,
            Error::RecordValue { .. } => ErrorKind::RecordValueInvalid,
            Error::HeaderMismatch { .. } => ErrorKind::CrossFileHeaderMismatch,
            Error::RecordMismatch { .. } => ErrorKind::CrossFileRecordMismatch,
            Error::BitmaskInvalid { .. } => ErrorKind::BitmaskInvalid,
            Error::SeriesFileMissing { .. } => ErrorKind::TimeSeriesFileMissing,
            Error::SeriesField { .. } => ErrorKind::TimeSeriesFieldRead,
            Error::DuplicateDate { .. } => ErrorKind::DuplicateDate,
        }
    }

    /// Creates a new [`Error::FileOpen`].
    pub fn file_open(source: io::Error, file_name: impl ToString) -> Self {
        Self::FileOpen {
            file_name: file_name.to_string(),
            source,
        }
    }

    pub(crate) fn record_mismatch(
        symbol: &str,
        field: &'static str,
        primary: impl fmt::Display,
        extended: impl fmt::Display,
    ) -> Self {
        Self::RecordMismatch {
            symbol: symbol.to_owned(),
            field,
            primary: primary.to_string(),
            extended: extended.to_string(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
