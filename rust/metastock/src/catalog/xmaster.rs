use std::io::{Read, Seek};

use log::debug;

use super::{Catalog, RecordReader};
use crate::{
    decode::{DateFormat, FieldReader, Filler, FloatFormat},
    enums::{DataFileKind, IndexFile, IntradayPeriodicity},
    equity::XmasterAttributes,
    error::{Error, Result},
    fields::ActiveFieldSet,
    series::TimeSeries,
    EquityRecord,
};

const DATE_FORMAT: DateFormat = DateFormat::Float(FloatFormat::IeeeReversed);

/// The header of `XMASTER`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XmasterHeader {
    /// The number of equity records.
    pub record_count: u16,
    /// The highest `C#.MWD` file number in use.
    pub highest_file_number: u16,
    #[doc(hidden)]
    pub reserved1: Filler<6>,
    #[doc(hidden)]
    pub reserved2: Filler<2>,
    #[doc(hidden)]
    pub reserved3: Filler<2>,
    #[doc(hidden)]
    pub reserved4: Filler<129>,
}

pub(super) fn read<R: Read + Seek>(catalog: &mut Catalog, reader: R) -> Result<()> {
    let mut fields = FieldReader::new(reader);
    let header = read_header(&mut RecordReader::header(&mut fields, IndexFile::Xmaster))?;
    debug!(
        "Read {} header: {} records, highest file number {}",
        IndexFile::Xmaster,
        header.record_count,
        header.highest_file_number
    );
    catalog.xmaster_header = Some(header);
    let initial_len = catalog.len();
    for record in 1..=u32::from(header.record_count) {
        let equity = read_record(&mut RecordReader::new(
            &mut fields,
            IndexFile::Xmaster,
            record,
        ))?;
        catalog.insert(IndexFile::Xmaster, record, equity);
    }
    debug!(
        "Read {} equities from {}",
        catalog.len() - initial_len,
        IndexFile::Xmaster
    );
    Ok(())
}

fn read_header<R: Read + Seek>(r: &mut RecordReader<R>) -> Result<XmasterHeader> {
    Ok(XmasterHeader {
        reserved1: r.filler("reserved", 4)?,
        record_count: r.u16("record count", 10)?,
        reserved2: r.filler("reserved", 12)?,
        reserved3: r.filler("reserved", 16)?,
        highest_file_number: r.u16("highest file number", 18)?,
        reserved4: r.filler("reserved", 20)?,
    })
}

fn read_record<R: Read + Seek>(r: &mut RecordReader<R>) -> Result<EquityRecord> {
    let reserved1 = r.filler("reserved", 0)?;
    let symbol = r.symbol(1, 14)?;
    let reserved2 = r.filler("reserved", 15)?;
    let description = r.description(16, 23)?;
    let reserved3 = r.filler("reserved", 39)?;
    let interday = r.interday(61)?;
    let reserved4 = r.filler("reserved", 62)?;
    let file_number = r.u16("file number", 65)?;
    let reserved5 = r.filler("reserved", 67)?;
    let bitmask = r.u8("active field bitmask", 70)?;
    if !ActiveFieldSet::is_valid_bitmask(bitmask) {
        return Err(Error::BitmaskInvalid {
            file: IndexFile::Xmaster,
            record: r.record,
            bitmask,
        });
    }
    let reserved6 = r.filler("reserved", 71)?;
    let first_date_long = r.date("first date", 80, DateFormat::Long)?;
    let first_date = r.date("first date", 84, DATE_FORMAT)?;
    let reserved7 = r.filler("reserved", 88)?;
    let last_date_long = r.date("last date", 104, DateFormat::Long)?;
    let last_date = r.date("last date", 108, DATE_FORMAT)?;
    let reserved8 = r.filler("reserved", 112)?;
    Ok(EquityRecord {
        symbol,
        description,
        file_kind: DataFileKind::Mwd,
        file_number,
        active_fields: ActiveFieldSet::from_bitmask(bitmask),
        interday,
        intraday: IntradayPeriodicity::None,
        first_date,
        last_date,
        master: None,
        emaster: None,
        xmaster: Some(XmasterAttributes {
            first_date_long,
            last_date_long,
            reserved1,
            reserved2,
            reserved3,
            reserved4,
            reserved5,
            reserved6,
            reserved7,
            reserved8,
        }),
        series: TimeSeries::with_bounds(first_date, last_date),
    })
}
