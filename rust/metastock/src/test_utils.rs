//! Builders of synthetic index and time series files.

use std::io::Cursor;

use time::Date;

use crate::{
    enums::{BarField, IndexFile},
    fields::ActiveFieldSet,
    Bar,
};

/// Encodes `value` as Microsoft Binary Format single precision.
pub fn f32_to_mbf32(value: f32) -> [u8; 4] {
    if value == 0.0 {
        return [0; 4];
    }
    let [b0, b1, b2, b3] = value.to_le_bytes();
    let ieee_exp = (b3 << 1) | (b2 >> 7);
    let sign = b3 & 0x80;
    [b0, b1, sign | (b2 & 0x7F), ieee_exp + 2]
}

/// Encodes `date` as a packed date, with a leading `1` for dates from 2000.
pub fn packed_date(date: Date) -> u32 {
    let yymmdd = (date.year() % 100) as u32 * 10_000
        + u32::from(u8::from(date.month())) * 100
        + u32::from(date.day());
    if date.year() >= 2000 {
        1_000_000 + yymmdd
    } else {
        yymmdd
    }
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn index_file(file: IndexFile, record_count: usize) -> Vec<u8> {
    vec![0; (record_count + 1) * file.record_size() as usize]
}

#[derive(Clone, Debug)]
pub struct MasterRecord {
    pub file_number: u8,
    pub field_count: u8,
    pub description: String,
    pub flag_a: u8,
    pub first_date: f32,
    pub last_date: f32,
    pub interday: u8,
    pub intraday: u16,
    pub symbol: String,
}

impl MasterRecord {
    pub fn new(file_number: u8, symbol: &str, description: &str) -> Self {
        Self {
            file_number,
            field_count: 5,
            description: description.to_owned(),
            flag_a: 0,
            first_date: 1180102.0,
            last_date: 1180115.0,
            interday: b'D',
            intraday: 0,
            symbol: symbol.to_owned(),
        }
    }
}

pub fn master_bytes(records: &[MasterRecord]) -> Vec<u8> {
    let size = IndexFile::Master.record_size() as usize;
    let mut buf = index_file(IndexFile::Master, records.len());
    put(&mut buf, 0, &(records.len() as u16).to_le_bytes());
    let highest = records.iter().map(|r| r.file_number).max().unwrap_or(0);
    put(&mut buf, 2, &u16::from(highest).to_le_bytes());
    for (i, record) in records.iter().enumerate() {
        let base = (i + 1) * size;
        buf[base] = record.file_number;
        put(&mut buf, base + 1, &0xE0u16.to_le_bytes());
        buf[base + 3] = record.field_count * 4;
        buf[base + 4] = record.field_count;
        put(&mut buf, base + 7, record.description.as_bytes());
        buf[base + 24] = record.flag_a;
        put(&mut buf, base + 25, &f32_to_mbf32(record.first_date));
        put(&mut buf, base + 29, &f32_to_mbf32(record.last_date));
        buf[base + 33] = record.interday;
        put(&mut buf, base + 34, &record.intraday.to_le_bytes());
        put(&mut buf, base + 36, record.symbol.as_bytes());
    }
    buf
}

pub fn master_file(records: &[MasterRecord]) -> Cursor<Vec<u8>> {
    Cursor::new(master_bytes(records))
}

#[derive(Clone, Debug)]
pub struct EmasterRecord {
    pub id_code: u16,
    pub file_number: u8,
    pub field_count: u8,
    pub bitmask: u8,
    pub auto_run: u8,
    pub symbol: String,
    pub description: String,
    pub first_date: f32,
    pub last_date: f32,
    pub intraday_start: f32,
    pub intraday_end: f32,
    pub last_div_paid: u32,
    pub last_div_adj_rate: f32,
}

impl EmasterRecord {
    /// Creates a record that agrees with `master`.
    pub fn matching(master: &MasterRecord) -> Self {
        Self {
            id_code: 0x3436,
            file_number: master.file_number,
            field_count: master.field_count,
            bitmask: ActiveFieldSet::from_count(master.field_count).bitmask(),
            auto_run: 0,
            symbol: master.symbol.clone(),
            description: master.description.clone(),
            first_date: master.first_date,
            last_date: master.last_date,
            intraday_start: 0.0,
            intraday_end: 0.0,
            last_div_paid: 0,
            last_div_adj_rate: 0.0,
        }
    }
}

/// `header` overrides the record count and highest file number.
pub fn emaster_bytes(records: &[EmasterRecord], header: Option<(u16, u16)>) -> Vec<u8> {
    let size = IndexFile::Emaster.record_size() as usize;
    let mut buf = index_file(IndexFile::Emaster, records.len());
    let (count, highest) = header.unwrap_or_else(|| {
        (
            records.len() as u16,
            records
                .iter()
                .map(|r| u16::from(r.file_number))
                .max()
                .unwrap_or(0),
        )
    });
    put(&mut buf, 0, &count.to_le_bytes());
    put(&mut buf, 2, &highest.to_le_bytes());
    for (i, record) in records.iter().enumerate() {
        let base = (i + 1) * size;
        put(&mut buf, base, &record.id_code.to_le_bytes());
        buf[base + 2] = record.file_number;
        buf[base + 6] = record.field_count;
        buf[base + 7] = record.bitmask;
        buf[base + 9] = record.auto_run;
        put(&mut buf, base + 11, record.symbol.as_bytes());
        put(&mut buf, base + 32, record.description.as_bytes());
        put(&mut buf, base + 64, &record.first_date.to_be_bytes());
        put(&mut buf, base + 72, &record.last_date.to_be_bytes());
        put(&mut buf, base + 80, &record.intraday_start.to_be_bytes());
        put(&mut buf, base + 84, &record.intraday_end.to_be_bytes());
        put(&mut buf, base + 131, &record.last_div_paid.to_le_bytes());
        put(&mut buf, base + 135, &record.last_div_adj_rate.to_be_bytes());
    }
    buf
}

pub fn emaster_file(records: &[EmasterRecord], header: Option<(u16, u16)>) -> Cursor<Vec<u8>> {
    Cursor::new(emaster_bytes(records, header))
}

#[derive(Clone, Debug)]
pub struct XmasterRecord {
    pub symbol: String,
    pub description: String,
    pub interday: u8,
    pub file_number: u16,
    pub bitmask: u8,
    pub first_date_long: u32,
    pub first_date: f32,
    pub last_date_long: u32,
    pub last_date: f32,
}

impl XmasterRecord {
    pub fn new(file_number: u16, symbol: &str, description: &str) -> Self {
        Self {
            symbol: symbol.to_owned(),
            description: description.to_owned(),
            interday: b'D',
            file_number,
            bitmask: 0x1F,
            first_date_long: 1180102,
            first_date: 1180102.0,
            last_date_long: 1180115,
            last_date: 1180115.0,
        }
    }
}

pub fn xmaster_bytes(records: &[XmasterRecord]) -> Vec<u8> {
    let size = IndexFile::Xmaster.record_size() as usize;
    let mut buf = index_file(IndexFile::Xmaster, records.len());
    put(&mut buf, 10, &(records.len() as u16).to_le_bytes());
    let highest = records.iter().map(|r| r.file_number).max().unwrap_or(0);
    put(&mut buf, 18, &highest.to_le_bytes());
    for (i, record) in records.iter().enumerate() {
        let base = (i + 1) * size;
        put(&mut buf, base + 1, record.symbol.as_bytes());
        put(&mut buf, base + 16, record.description.as_bytes());
        buf[base + 61] = record.interday;
        put(&mut buf, base + 65, &record.file_number.to_le_bytes());
        buf[base + 70] = record.bitmask;
        put(&mut buf, base + 80, &record.first_date_long.to_le_bytes());
        put(&mut buf, base + 84, &record.first_date.to_be_bytes());
        put(&mut buf, base + 104, &record.last_date_long.to_le_bytes());
        put(&mut buf, base + 108, &record.last_date.to_be_bytes());
    }
    buf
}

pub fn xmaster_file(records: &[XmasterRecord]) -> Cursor<Vec<u8>> {
    Cursor::new(xmaster_bytes(records))
}

/// Encodes `bars` as a time series file with the layout of `fields`.
pub fn series_bytes(fields: ActiveFieldSet, bars: &[Bar]) -> Vec<u8> {
    let size = fields.record_size();
    let mut buf = vec![0; (bars.len() + 1) * size];
    put(&mut buf, 2, &(bars.len() as u16 + 1).to_le_bytes());
    for (i, bar) in bars.iter().enumerate() {
        let base = (i + 1) * size;
        for (field, offset) in fields.active_offsets() {
            let value = match field {
                BarField::Date => packed_date(bar.date) as f32,
                BarField::Time => bar.time,
                BarField::Open => bar.open,
                BarField::High => bar.high,
                BarField::Low => bar.low,
                BarField::Close => bar.close,
                BarField::Volume => bar.volume as f32,
                BarField::OpenInterest => bar.open_interest,
            };
            put(&mut buf, base + offset, &f32_to_mbf32(value));
        }
    }
    buf
}

/// A bar with distinct, exactly representable prices.
pub fn sample_bar(date: Date, volume: u64) -> Bar {
    let day = f32::from(date.day());
    Bar {
        open: 10.0 + day,
        high: 12.5 + day,
        low: 9.25 + day,
        close: 11.0 + day,
        volume,
        ..Bar::new(date)
    }
}
