//! The catalog of equities and the readers of the three index files that
//! populate it.
//!
//! The index files are read in dependency order: `MASTER`, then `EMASTER`, which
//! must agree with `MASTER` wherever the two overlap, then `XMASTER`, which
//! defines additional equities on its own.

mod emaster;
mod master;
mod xmaster;

use std::{
    collections::{btree_map, BTreeMap},
    fmt::Display,
    io::{Read, Seek},
};

use log::warn;

use crate::{
    decode::{DateFormat, FieldReader, Filler, FloatFormat},
    enums::{IndexFile, InterdayPeriodicity, IntradayPeriodicity},
    error::{DecodeError, Error, Result},
    EquityRecord,
};

pub use master::MasterHeader;
pub use xmaster::XmasterHeader;

/// Every equity of a database, keyed by symbol.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    equities: BTreeMap<String, EquityRecord>,
    master_header: Option<MasterHeader>,
    xmaster_header: Option<XmasterHeader>,
}

impl Catalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the equity with exactly `symbol`. The lookup is case-sensitive.
    pub fn get(&self, symbol: &str) -> Option<&EquityRecord> {
        self.equities.get(symbol)
    }

    pub(crate) fn get_mut(&mut self, symbol: &str) -> Option<&mut EquityRecord> {
        self.equities.get_mut(symbol)
    }

    /// Returns `true` if the catalog contains an equity with exactly `symbol`.
    pub fn contains(&self, symbol: &str) -> bool {
        self.equities.contains_key(symbol)
    }

    /// Returns an iterator over the equities in symbol order.
    pub fn iter(&self) -> btree_map::Values<'_, String, EquityRecord> {
        self.equities.values()
    }

    pub(crate) fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, String, EquityRecord> {
        self.equities.values_mut()
    }

    /// Returns an iterator over the symbols in order.
    pub fn symbols(&self) -> btree_map::Keys<'_, String, EquityRecord> {
        self.equities.keys()
    }

    /// Returns the number of equities.
    pub fn len(&self) -> usize {
        self.equities.len()
    }

    /// Returns `true` if the catalog contains no equities.
    pub fn is_empty(&self) -> bool {
        self.equities.is_empty()
    }

    /// Returns the decoded `MASTER` header, if `MASTER` has been read.
    pub fn master_header(&self) -> Option<&MasterHeader> {
        self.master_header.as_ref()
    }

    /// Returns the decoded `XMASTER` header, if `XMASTER` has been read.
    pub fn xmaster_header(&self) -> Option<&XmasterHeader> {
        self.xmaster_header.as_ref()
    }

    /// Reads `MASTER` from `reader`, adding one equity per record. Equities added
    /// before a failing record remain in the catalog.
    ///
    /// # Errors
    /// This function returns an error if any field can't be read or a
    /// periodicity code is invalid.
    pub fn read_master<R: Read + Seek>(&mut self, reader: R) -> Result<()> {
        master::read(self, reader)
    }

    /// Reads `EMASTER` from `reader`, checking it against the equities read from
    /// `MASTER` and merging its extra attributes into them.
    ///
    /// # Errors
    /// This function returns an error if any field can't be read, if the header
    /// or a record contradicts `MASTER`, or if a symbol isn't in the catalog.
    pub fn read_emaster<R: Read + Seek>(&mut self, reader: R) -> Result<()> {
        emaster::read(self, reader)
    }

    /// Reads `XMASTER` from `reader`, adding one equity per record.
    ///
    /// # Errors
    /// This function returns an error if any field can't be read, a periodicity
    /// code is invalid, or an active field bitmask isn't canonical.
    pub fn read_xmaster<R: Read + Seek>(&mut self, reader: R) -> Result<()> {
        xmaster::read(self, reader)
    }

    /// Adds `equity`, keeping the existing entry if its symbol is already present.
    fn insert(&mut self, file: IndexFile, record: u32, equity: EquityRecord) {
        match self.equities.entry(equity.symbol.clone()) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(equity);
            }
            btree_map::Entry::Occupied(entry) => {
                warn!(
                    "Skipping record {record} of {file}: symbol '{}' is already defined by {}",
                    entry.key(),
                    entry.get().file_kind().index_file()
                );
            }
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a EquityRecord;
    type IntoIter = btree_map::Values<'a, String, EquityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads the named fields of one record of an index file, attaching the file,
/// record number, and field name to any failure. Record `0` is the header.
struct RecordReader<'a, R> {
    fields: &'a mut FieldReader<R>,
    file: IndexFile,
    record: u32,
}

impl<'a, R> RecordReader<'a, R>
where
    R: Read + Seek,
{
    fn header(fields: &'a mut FieldReader<R>, file: IndexFile) -> Self {
        Self::new(fields, file, 0)
    }

    fn new(fields: &'a mut FieldReader<R>, file: IndexFile, record: u32) -> Self {
        Self {
            fields,
            file,
            record,
        }
    }

    fn offset(&self, offset: u64) -> u64 {
        u64::from(self.record) * self.file.record_size() + offset
    }

    fn field_err(&self, field: &'static str) -> impl FnOnce(DecodeError) -> Error {
        let (file, record) = (self.file, self.record);
        move |source| {
            if record == 0 {
                Error::HeaderField {
                    file,
                    field,
                    source,
                }
            } else {
                Error::RecordField {
                    file,
                    record,
                    field,
                    source,
                }
            }
        }
    }

    fn invalid(&self, field: &'static str, value: impl Display) -> Error {
        Error::RecordValue {
            file: self.file,
            record: self.record,
            field,
            value: value.to_string(),
        }
    }

    fn u8(&mut self, field: &'static str, offset: u64) -> Result<u8> {
        let offset = self.offset(offset);
        self.fields.read_u8(offset).map_err(self.field_err(field))
    }

    fn u16(&mut self, field: &'static str, offset: u64) -> Result<u16> {
        let offset = self.offset(offset);
        self.fields.read_u16(offset).map_err(self.field_err(field))
    }

    fn u32(&mut self, field: &'static str, offset: u64) -> Result<u32> {
        let offset = self.offset(offset);
        self.fields.read_u32(offset).map_err(self.field_err(field))
    }

    fn string(&mut self, field: &'static str, offset: u64, width: usize) -> Result<String> {
        let offset = self.offset(offset);
        self.fields
            .read_string(offset, width)
            .map_err(self.field_err(field))
    }

    /// Reads a symbol, trimming padding at both ends.
    fn symbol(&mut self, offset: u64, width: usize) -> Result<String> {
        self.string("symbol", offset, width)
            .map(|s| s.trim_matches(' ').to_owned())
    }

    /// Reads a description, trimming trailing padding.
    fn description(&mut self, offset: u64, width: usize) -> Result<String> {
        self.string("description", offset, width).map(|mut s| {
            s.truncate(s.trim_end_matches(' ').len());
            s
        })
    }

    fn float(&mut self, field: &'static str, offset: u64, format: FloatFormat) -> Result<f32> {
        let offset = self.offset(offset);
        self.fields
            .read_float(offset, format)
            .map_err(self.field_err(field))
    }

    fn date(&mut self, field: &'static str, offset: u64, format: DateFormat) -> Result<time::Date> {
        let offset = self.offset(offset);
        self.fields
            .read_date(offset, format)
            .map_err(self.field_err(field))
    }

    fn filler<const N: usize>(&mut self, field: &'static str, offset: u64) -> Result<Filler<N>> {
        let (file, record) = (self.file, self.record);
        let offset = self.offset(offset);
        self.fields
            .read_filler(offset)
            .map_err(|source| Error::FillerField {
                file,
                record,
                field,
                source,
            })
    }

    fn interday(&mut self, offset: u64) -> Result<InterdayPeriodicity> {
        let code = self.u8("interday periodicity", offset)?;
        InterdayPeriodicity::try_from(code)
            .map_err(|_| self.invalid("interday periodicity", char::from(code).escape_default()))
    }

    fn intraday(&mut self, offset: u64) -> Result<IntradayPeriodicity> {
        let code = self.u16("intraday periodicity", offset)?;
        IntradayPeriodicity::try_from(code).map_err(|_| self.invalid("intraday periodicity", code))
    }
}
