//! Enums used in MetaStock index and time series files.
use std::fmt::{self, Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// One of the three index files of a MetaStock database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexFile {
    /// The primary index, `MASTER`, addressing up to 255 equities.
    Master,
    /// The extended index, `EMASTER`, which repeats and extends `MASTER`.
    Emaster,
    /// The secondary index, `XMASTER`, for equities beyond the range of `MASTER`.
    Xmaster,
}

impl IndexFile {
    /// Returns the file name of the index.
    pub const fn file_name(&self) -> &'static str {
        match self {
            IndexFile::Master => crate::MASTER_FILE_NAME,
            IndexFile::Emaster => crate::EMASTER_FILE_NAME,
            IndexFile::Xmaster => crate::XMASTER_FILE_NAME,
        }
    }

    /// Returns the size in bytes of the header and of each record.
    pub const fn record_size(&self) -> u64 {
        match self {
            IndexFile::Master => 53,
            IndexFile::Emaster => 192,
            IndexFile::Xmaster => 150,
        }
    }
}

impl Display for IndexFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// The sampling frequency of an equity with daily or longer bars, stored as a
/// single ASCII letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum InterdayPeriodicity {
    /// Not an interday series.
    None = b'N',
    /// One bar per trading day.
    Daily = b'D',
    /// One bar per week.
    Weekly = b'W',
    /// One bar per month.
    Monthly = b'M',
    /// One bar per quarter.
    Quarterly = b'Q',
    /// One bar per year.
    Yearly = b'Y',
}

impl InterdayPeriodicity {
    /// Converts the periodicity to its `str` representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InterdayPeriodicity::None => "none",
            InterdayPeriodicity::Daily => "daily",
            InterdayPeriodicity::Weekly => "weekly",
            InterdayPeriodicity::Monthly => "monthly",
            InterdayPeriodicity::Quarterly => "quarterly",
            InterdayPeriodicity::Yearly => "yearly",
        }
    }
}

impl Display for InterdayPeriodicity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sampling frequency of an equity with sub-daily bars, stored as a number
/// of minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u16)]
pub enum IntradayPeriodicity {
    /// Not an intraday series.
    None = 0,
    /// One bar per minute.
    OneMinute = 1,
    /// One bar per 5 minutes.
    FiveMinutes = 5,
    /// One bar per 10 minutes.
    TenMinutes = 10,
    /// One bar per hour.
    OneHour = 60,
}

impl IntradayPeriodicity {
    /// Converts the periodicity to its `str` representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            IntradayPeriodicity::None => "none",
            IntradayPeriodicity::OneMinute => "1min",
            IntradayPeriodicity::FiveMinutes => "5min",
            IntradayPeriodicity::TenMinutes => "10min",
            IntradayPeriodicity::OneHour => "1hr",
        }
    }
}

impl Display for IntradayPeriodicity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The layout family of an equity's time series file, determined by the index
/// that defined the equity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataFileKind {
    /// An `F#.DAT` file of an equity defined in `MASTER`.
    Dat,
    /// A `C#.MWD` file of an equity defined in `XMASTER`.
    Mwd,
}

impl DataFileKind {
    /// Returns the name of time series file number `number`.
    pub fn file_name(&self, number: u16) -> String {
        match self {
            DataFileKind::Dat => format!("F{number}.DAT"),
            DataFileKind::Mwd => format!("C{number}.MWD"),
        }
    }

    /// Returns the index file that defines equities with this kind of time
    /// series file.
    pub const fn index_file(&self) -> IndexFile {
        match self {
            DataFileKind::Dat => IndexFile::Master,
            DataFileKind::Mwd => IndexFile::Xmaster,
        }
    }
}

/// A field of a [`Bar`](crate::Bar), listed in the order fields are laid out in a
/// time series record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BarField {
    /// The trading date.
    Date,
    /// The time of day of intraday bars.
    Time,
    /// The opening price.
    Open,
    /// The highest price.
    High,
    /// The lowest price.
    Low,
    /// The closing price.
    Close,
    /// The traded volume.
    Volume,
    /// The open interest.
    OpenInterest,
}

impl BarField {
    /// Every field in record layout order.
    pub const ALL: [BarField; 8] = [
        BarField::Date,
        BarField::Time,
        BarField::Open,
        BarField::High,
        BarField::Low,
        BarField::Close,
        BarField::Volume,
        BarField::OpenInterest,
    ];

    /// Converts the field to its `str` representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BarField::Date => "date",
            BarField::Time => "time",
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Volume => "volume",
            BarField::OpenInterest => "open_interest",
        }
    }
}

impl Display for BarField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
