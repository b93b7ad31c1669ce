use std::io::{Read, Seek};

use log::debug;

use super::{Catalog, RecordReader};
use crate::{
    decode::{DateFormat, FieldReader, Filler, FloatFormat},
    enums::{DataFileKind, IndexFile},
    equity::MasterAttributes,
    error::Result,
    fields::ActiveFieldSet,
    series::TimeSeries,
    EquityRecord,
};

/// The header of `MASTER`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasterHeader {
    /// The number of equity records.
    pub record_count: u16,
    /// The highest `F#.DAT` file number in use.
    pub highest_file_number: u16,
    #[doc(hidden)]
    pub reserved: Filler<48>,
}

pub(super) fn read<R: Read + Seek>(catalog: &mut Catalog, reader: R) -> Result<()> {
    let mut fields = FieldReader::new(reader);
    let header = read_header(&mut RecordReader::header(&mut fields, IndexFile::Master))?;
    debug!(
        "Read {} header: {} records, highest file number {}",
        IndexFile::Master,
        header.record_count,
        header.highest_file_number
    );
    catalog.master_header = Some(header);
    for record in 1..=u32::from(header.record_count) {
        let equity = read_record(&mut RecordReader::new(
            &mut fields,
            IndexFile::Master,
            record,
        ))?;
        catalog.insert(IndexFile::Master, record, equity);
    }
    debug!("Read {} equities from {}", catalog.len(), IndexFile::Master);
    Ok(())
}

fn read_header<R: Read + Seek>(r: &mut RecordReader<R>) -> Result<MasterHeader> {
    Ok(MasterHeader {
        record_count: r.u16("record count", 0)?,
        highest_file_number: r.u16("highest file number", 2)?,
        reserved: r.filler("reserved", 4)?,
    })
}

fn read_record<R: Read + Seek>(r: &mut RecordReader<R>) -> Result<EquityRecord> {
    let file_number = r.u8("file number", 0)?;
    let file_type = r.u16("file type", 1)?;
    let field_byte_len = r.u8("field byte length", 3)?;
    let field_count = r.u8("field count", 4)?;
    let reserved1 = r.filler("reserved", 5)?;
    let description = r.description(7, 16)?;
    let reserved2 = r.filler("reserved", 23)?;
    let flag_a = r.u8("flag", 24)?;
    let first_date = r.date("first date", 25, DateFormat::Float(FloatFormat::Mbf32))?;
    let last_date = r.date("last date", 29, DateFormat::Float(FloatFormat::Mbf32))?;
    let interday = r.interday(33)?;
    let intraday = r.intraday(34)?;
    let symbol = r.symbol(36, 14)?;
    let reserved3 = r.filler("reserved", 50)?;
    let flag_b = r.u8("flag", 51)?;
    let reserved4 = r.filler("reserved", 52)?;
    Ok(EquityRecord {
        symbol,
        description,
        file_kind: DataFileKind::Dat,
        file_number: u16::from(file_number),
        active_fields: ActiveFieldSet::from_count(field_count),
        interday,
        intraday,
        first_date,
        last_date,
        master: Some(MasterAttributes {
            file_type,
            field_byte_len,
            flag_a,
            flag_b,
            reserved1,
            reserved2,
            reserved3,
            reserved4,
        }),
        emaster: None,
        xmaster: None,
        series: TimeSeries::with_bounds(first_date, last_date),
    })
}
