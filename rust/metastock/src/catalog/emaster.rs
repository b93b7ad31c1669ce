use std::io::{Read, Seek};

use log::debug;

use super::{Catalog, RecordReader};
use crate::{
    decode::{DateFormat, FieldReader, Filler, FloatFormat},
    enums::IndexFile,
    equity::EmasterAttributes,
    error::{Error, Result},
};

const DATE_FORMAT: DateFormat = DateFormat::Float(FloatFormat::IeeeReversed);

/// The header of `EMASTER`, which must repeat the counts of `MASTER`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct EmasterHeader {
    record_count: u16,
    highest_file_number: u16,
    _reserved: Filler<187>,
}

pub(super) fn read<R: Read + Seek>(catalog: &mut Catalog, reader: R) -> Result<()> {
    let mut fields = FieldReader::new(reader);
    let header = {
        let mut r = RecordReader::header(&mut fields, IndexFile::Emaster);
        EmasterHeader {
            record_count: r.u16("record count", 0)?,
            highest_file_number: r.u16("highest file number", 2)?,
            _reserved: r.filler("reserved", 4)?,
        }
    };
    let primary = catalog.master_header.unwrap_or_default();
    if header.record_count != primary.record_count {
        return Err(Error::HeaderMismatch {
            field: "record count",
            primary: primary.record_count,
            extended: header.record_count,
        });
    }
    if header.highest_file_number != primary.highest_file_number {
        return Err(Error::HeaderMismatch {
            field: "highest file number",
            primary: primary.highest_file_number,
            extended: header.highest_file_number,
        });
    }
    debug!(
        "Read {} header: {} records, highest file number {}",
        IndexFile::Emaster,
        header.record_count,
        header.highest_file_number
    );
    for record in 1..=u32::from(header.record_count) {
        merge_record(
            catalog,
            &mut RecordReader::new(&mut fields, IndexFile::Emaster, record),
        )?;
    }
    debug!(
        "Merged {} records from {}",
        header.record_count,
        IndexFile::Emaster
    );
    Ok(())
}

/// Checks one record against the catalog entry with the same symbol and merges
/// its extra attributes into it.
fn merge_record<R: Read + Seek>(catalog: &mut Catalog, r: &mut RecordReader<R>) -> Result<()> {
    let symbol = r.symbol(11, 13)?;
    let Some(equity) = catalog.get(&symbol) else {
        return Err(r.invalid("symbol", symbol));
    };

    let file_number = u16::from(r.u8("file number", 2)?);
    if file_number != equity.file_number {
        return Err(Error::record_mismatch(
            &symbol,
            "file number",
            equity.file_number,
            file_number,
        ));
    }
    let field_count = r.u8("field count", 6)?;
    if field_count != equity.active_fields.field_count() {
        return Err(Error::record_mismatch(
            &symbol,
            "field count",
            equity.active_fields.field_count(),
            field_count,
        ));
    }
    let description = r.description(32, 16)?;
    if description != equity.description {
        return Err(Error::record_mismatch(
            &symbol,
            "description",
            format!("'{}'", equity.description),
            format!("'{description}'"),
        ));
    }
    let first_date = r.date("first date", 64, DATE_FORMAT)?;
    if first_date != equity.first_date {
        return Err(Error::record_mismatch(
            &symbol,
            "first date",
            equity.first_date,
            first_date,
        ));
    }
    let last_date = r.date("last date", 72, DATE_FORMAT)?;
    if last_date != equity.last_date {
        return Err(Error::record_mismatch(
            &symbol,
            "last date",
            equity.last_date,
            last_date,
        ));
    }
    let bitmask = r.u8("active field bitmask", 7)?;
    if bitmask != equity.active_fields.bitmask() {
        return Err(Error::record_mismatch(
            &symbol,
            "active field bitmask",
            format!("{:#04x}", equity.active_fields.bitmask()),
            format!("{bitmask:#04x}"),
        ));
    }

    let attributes = EmasterAttributes {
        id_code: r.u16("id code", 0)?,
        reserved1: r.filler("reserved", 3)?,
        reserved2: r.filler("reserved", 8)?,
        auto_run: r.u8("auto run", 9)?,
        reserved3: r.filler("reserved", 10)?,
        reserved4: r.filler("reserved", 24)?,
        reserved5: r.filler("reserved", 48)?,
        reserved6: r.filler("reserved", 68)?,
        reserved7: r.filler("reserved", 76)?,
        intraday_start: r.float("intraday start time", 80, FloatFormat::IeeeReversed)?,
        intraday_end: r.float("intraday end time", 84, FloatFormat::IeeeReversed)?,
        reserved8: r.filler("reserved", 88)?,
        reserved9: r.filler("reserved", 126)?,
        last_div_paid: r.u32("last dividend paid", 131)?,
        last_div_adj_rate: r.float(
            "last dividend adjustment rate",
            135,
            FloatFormat::IeeeReversed,
        )?,
        reserved10: r.filler("reserved", 139)?,
    };
    if let Some(equity) = catalog.get_mut(&symbol) {
        equity.emaster = Some(attributes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::{
        test_utils::{emaster_file, master_file, EmasterRecord, MasterRecord},
        ErrorKind,
    };

    fn masters() -> Vec<MasterRecord> {
        vec![
            MasterRecord::new(1, "AAA", "FIRST"),
            MasterRecord::new(2, "BBB", "SECOND"),
            MasterRecord::new(3, "CCC", "THIRD"),
        ]
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.read_master(master_file(&masters())).unwrap();
        catalog
    }

    #[test]
    fn test_merge() {
        let mut catalog = catalog();
        let mut records: Vec<_> = masters().iter().map(EmasterRecord::matching).collect();
        records[1].id_code = 0x3436;
        records[1].auto_run = 1;
        records[1].intraday_start = 930.0;
        records[1].intraday_end = 1600.0;
        records[1].last_div_paid = 25;
        records[1].last_div_adj_rate = 0.5;
        catalog.read_emaster(emaster_file(&records, None)).unwrap();
        assert!(catalog.iter().all(|e| e.emaster().is_some()));
        let attrs = catalog.get("BBB").unwrap().emaster().unwrap();
        assert_eq!(attrs.id_code, 0x3436);
        assert_eq!(attrs.auto_run, 1);
        assert_eq!(attrs.intraday_start, 930.0);
        assert_eq!(attrs.intraday_end, 1600.0);
        assert_eq!(attrs.last_div_paid, 25);
        assert_eq!(attrs.last_div_adj_rate, 0.5);
    }

    #[rstest]
    #[case::eight(8)]
    #[case::nine(9)]
    fn test_merge_wide_field_count(#[case] field_count: u8) {
        let mut masters = masters();
        masters[2].field_count = field_count;
        let mut catalog = Catalog::new();
        catalog.read_master(master_file(&masters)).unwrap();
        let records: Vec<_> = masters.iter().map(EmasterRecord::matching).collect();
        assert_eq!(records[2].bitmask, 0xFF);
        catalog.read_emaster(emaster_file(&records, None)).unwrap();
        let equity = catalog.get("CCC").unwrap();
        assert!(equity.emaster().is_some());
        assert_eq!(equity.active_fields().field_count(), field_count);
        assert_eq!(equity.active_fields().record_size(), 4 * field_count as usize);
    }

    #[test]
    fn test_description_mismatch_keeps_earlier() {
        let mut catalog = catalog();
        let mut records: Vec<_> = masters().iter().map(EmasterRecord::matching).collect();
        records[1].description = "SECOND CORP".to_owned();
        let res = catalog.read_emaster(emaster_file(&records, None));
        let err = res.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossFileRecordMismatch);
        let msg = err.to_string();
        assert!(msg.contains("'SECOND' in MASTER"), "{msg}");
        assert!(msg.contains("'SECOND CORP' in EMASTER"), "{msg}");
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get("AAA").unwrap().emaster().is_some());
        assert!(catalog.get("BBB").unwrap().emaster().is_none());
        assert!(catalog.get("CCC").unwrap().emaster().is_none());
    }

    #[rstest]
    #[case::file_number(|r: &mut EmasterRecord| r.file_number = 9, "file number")]
    #[case::field_count(|r: &mut EmasterRecord| r.field_count = 6, "field count")]
    #[case::first_date(|r: &mut EmasterRecord| r.first_date = 1200101.0, "first date")]
    #[case::last_date(|r: &mut EmasterRecord| r.last_date = 1200101.0, "last date")]
    #[case::bitmask(|r: &mut EmasterRecord| r.bitmask = 0x3F, "active field bitmask is 0x1f in MASTER and 0x3f in EMASTER")]
    fn test_record_mismatch(#[case] corrupt: fn(&mut EmasterRecord), #[case] exp_msg: &str) {
        let mut catalog = catalog();
        let mut records: Vec<_> = masters().iter().map(EmasterRecord::matching).collect();
        corrupt(&mut records[0]);
        let res = catalog.read_emaster(emaster_file(&records, None));
        assert!(
            matches!(&res, Err(e @ Error::RecordMismatch { .. }) if e.to_string().contains(exp_msg)),
            "{res:?}"
        );
    }

    #[rstest]
    #[case::record_count(Some((4, 3)), "record count is 3 in MASTER and 4 in EMASTER")]
    #[case::highest_file_number(Some((3, 7)), "highest file number is 3 in MASTER and 7 in EMASTER")]
    fn test_header_mismatch(#[case] header: Option<(u16, u16)>, #[case] exp_msg: &str) {
        let mut catalog = catalog();
        let records: Vec<_> = masters().iter().map(EmasterRecord::matching).collect();
        let res = catalog.read_emaster(emaster_file(&records, header));
        assert!(
            matches!(&res, Err(e) if e.kind() == ErrorKind::CrossFileHeaderMismatch && e.to_string().contains(exp_msg)),
            "{res:?}"
        );
        assert!(catalog.iter().all(|e| e.emaster().is_none()));
    }

    #[test]
    fn test_unknown_symbol() {
        let mut catalog = catalog();
        let mut records: Vec<_> = masters().iter().map(EmasterRecord::matching).collect();
        records[2].symbol = "ccc".to_owned();
        let res = catalog.read_emaster(emaster_file(&records, None));
        assert!(
            matches!(&res, Err(e @ Error::RecordValue { record: 3, field: "symbol", .. }) if e.to_string().contains("invalid symbol 'ccc'")),
            "{res:?}"
        );
    }
}
