//! The set of fields physically present in the records of a time series file.

use std::fmt;

use crate::enums::BarField;

/// Bit of the trading date.
pub const DATE: u8 = 1 << 0;
/// Bit of the opening price.
pub const OPEN: u8 = 1 << 1;
/// Bit of the highest price.
pub const HIGH: u8 = 1 << 2;
/// Bit of the lowest price.
pub const LOW: u8 = 1 << 3;
/// Bit of the closing price.
pub const CLOSE: u8 = 1 << 4;
/// Bit of the traded volume.
pub const VOLUME: u8 = 1 << 5;
/// Bit of the open interest.
pub const OPEN_INTEREST: u8 = 1 << 6;
/// Bit of the time of day.
pub const TIME: u8 = 1 << 7;

const BASE: u8 = DATE | OPEN | HIGH | LOW | CLOSE;

/// The only bitmasks a time series file may declare, from 5 to 8 fields.
pub const CANONICAL_BITMASKS: [u8; 4] = [
    BASE,
    BASE | VOLUME,
    BASE | VOLUME | OPEN_INTEREST,
    BASE | VOLUME | OPEN_INTEREST | TIME,
];

/// The fields present in each record of an equity's time series file. Every
/// active field is [`FIELD_WIDTH`](crate::FIELD_WIDTH) bytes wide and fields
/// appear in the order of [`BarField::ALL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveFieldSet {
    raw: u8,
    field_count: u8,
}

impl ActiveFieldSet {
    /// Creates a field set from the declared number of fields. Date, open, high,
    /// low, and close are always active; 6 fields adds volume, 7 adds open
    /// interest, and 8 adds time. Counts above 8 activate every field and counts
    /// below 5 only the base fields.
    ///
    /// The declared count is kept as is, so it still determines
    /// [`record_size()`](Self::record_size) when it differs from the number of
    /// active fields.
    pub const fn from_count(field_count: u8) -> Self {
        let raw = match field_count {
            0..=5 => CANONICAL_BITMASKS[0],
            6 => CANONICAL_BITMASKS[1],
            7 => CANONICAL_BITMASKS[2],
            _ => CANONICAL_BITMASKS[3],
        };
        Self { raw, field_count }
    }

    /// Creates a field set with each bit of `bitmask` mapping to one field. The
    /// bitmask isn't validated; see [`is_valid_bitmask()`](Self::is_valid_bitmask).
    pub const fn from_bitmask(bitmask: u8) -> Self {
        Self {
            raw: bitmask,
            field_count: bitmask.count_ones() as u8,
        }
    }

    /// Returns `true` if `bitmask` is one of the [canonical bitmasks](CANONICAL_BITMASKS).
    pub const fn is_valid_bitmask(bitmask: u8) -> bool {
        matches!(bitmask, 0x1F | 0x3F | 0x7F | 0xFF)
    }

    /// Returns the bitmask of active fields.
    pub const fn bitmask(&self) -> u8 {
        self.raw
    }

    /// Returns `true` if the bitmask is one of the four canonical layouts.
    pub const fn is_valid(&self) -> bool {
        Self::is_valid_bitmask(self.raw)
    }

    /// Returns the number of fields in each record.
    pub const fn field_count(&self) -> u8 {
        self.field_count
    }

    /// Returns the size in bytes of each record.
    pub const fn record_size(&self) -> usize {
        self.field_count as usize * crate::FIELD_WIDTH
    }

    /// Returns `true` if `field` is present in each record.
    pub const fn is_active(&self, field: BarField) -> bool {
        self.raw & Self::bit(field) != 0
    }

    /// Returns the byte offset of `field` within a record: the width of all
    /// active fields preceding it in [`BarField::ALL`] order.
    pub fn offset(&self, field: BarField) -> usize {
        BarField::ALL
            .iter()
            .take_while(|f| **f != field)
            .filter(|f| self.is_active(**f))
            .count()
            * crate::FIELD_WIDTH
    }

    /// Returns an iterator over the active fields and their offsets in record
    /// order.
    pub fn active_offsets(&self) -> impl Iterator<Item = (BarField, usize)> + '_ {
        BarField::ALL
            .into_iter()
            .filter(|f| self.is_active(*f))
            .enumerate()
            .map(|(i, f)| (f, i * crate::FIELD_WIDTH))
    }

    /// Formats the bitmask as `0b` followed by 8 binary digits, time first.
    pub fn as_binary_string(&self) -> String {
        format!("{:#010b}", self.raw)
    }

    /// Formats the active fields as letters from the most significant bit: `T`
    /// time, `Oi` open interest, `V` volume, `C` close, `L` low, `H` high, `O`
    /// open, and `D` date.
    pub fn as_letters(&self) -> String {
        Self::named_bits()
            .iter()
            .filter(|(bit, _, _)| self.raw & bit != 0)
            .map(|(_, _, letters)| *letters)
            .collect()
    }

    const fn bit(field: BarField) -> u8 {
        match field {
            BarField::Date => DATE,
            BarField::Time => TIME,
            BarField::Open => OPEN,
            BarField::High => HIGH,
            BarField::Low => LOW,
            BarField::Close => CLOSE,
            BarField::Volume => VOLUME,
            BarField::OpenInterest => OPEN_INTEREST,
        }
    }

    const fn named_bits() -> [(u8, &'static str, &'static str); 8] {
        [
            (TIME, stringify!(TIME), "T"),
            (OPEN_INTEREST, stringify!(OPEN_INTEREST), "Oi"),
            (VOLUME, stringify!(VOLUME), "V"),
            (CLOSE, stringify!(CLOSE), "C"),
            (LOW, stringify!(LOW), "L"),
            (HIGH, stringify!(HIGH), "H"),
            (OPEN, stringify!(OPEN), "O"),
            (DATE, stringify!(DATE), "D"),
        ]
    }
}

impl fmt::Debug for ActiveFieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut has_written_field = false;
        for (bit, name, _) in Self::named_bits() {
            if self.raw & bit != 0 {
                if has_written_field {
                    write!(f, " | {name}")?;
                } else {
                    write!(f, "{name}")?;
                    has_written_field = true;
                }
            }
        }
        if has_written_field {
            write!(f, " ({:#04x})", self.raw)
        } else {
            write!(f, "{:#04x}", self.raw)
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ActiveFieldSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_letters())
    }
}
