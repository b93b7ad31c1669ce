//! Catalog entries: one per equity, merged from the index files.

use time::Date;

use crate::{
    decode::Filler,
    enums::{DataFileKind, InterdayPeriodicity, IntradayPeriodicity},
    fields::ActiveFieldSet,
    series::TimeSeries,
};

/// The capabilities shared by every kind of catalog entry.
pub trait Equity {
    /// Returns the ticker symbol, the unique key of the entry.
    fn symbol(&self) -> &str;
    /// Returns the human-readable name.
    fn description(&self) -> &str;
    /// Returns the fields present in each record of the time series file.
    fn active_fields(&self) -> ActiveFieldSet;
    /// Returns the bars, which are empty until the series is loaded.
    fn time_series(&self) -> &TimeSeries;
}

/// Attributes only found in `MASTER`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MasterAttributes {
    /// A reserved file type code.
    pub file_type: u16,
    /// The length in bytes of each field of the time series file.
    pub field_byte_len: u8,
    /// The flag byte preceding the first date.
    pub flag_a: u8,
    /// The flag byte following the symbol.
    pub flag_b: u8,
    /// Bytes 5 to 6 of the record.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub reserved1: Filler<2>,
    /// Byte 23 of the record.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub reserved2: Filler<1>,
    /// Byte 50 of the record.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub reserved3: Filler<1>,
    /// Byte 52 of the record.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub reserved4: Filler<1>,
}

/// Attributes only found in `EMASTER`, merged into the matching `MASTER` entry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmasterAttributes {
    /// The identification code of the record.
    pub id_code: u16,
    /// Whether the equity is refreshed automatically.
    pub auto_run: u8,
    /// The start time of intraday trading.
    pub intraday_start: f32,
    /// The end time of intraday trading.
    pub intraday_end: f32,
    /// The last dividend paid.
    pub last_div_paid: u32,
    /// The last dividend adjustment rate.
    pub last_div_adj_rate: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved1: Filler<3>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved2: Filler<1>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved3: Filler<1>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved4: Filler<8>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved5: Filler<16>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved6: Filler<4>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved7: Filler<4>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved8: Filler<38>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved9: Filler<5>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved10: Filler<53>,
}

/// Attributes only found in `XMASTER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct XmasterAttributes {
    /// The first date, decoded from its redundant integer encoding.
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::bar::serialize_date"))]
    pub first_date_long: Date,
    /// The last date, decoded from its redundant integer encoding.
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::bar::serialize_date"))]
    pub last_date_long: Date,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved1: Filler<1>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved2: Filler<1>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved3: Filler<22>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved4: Filler<3>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved5: Filler<3>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved6: Filler<9>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved7: Filler<16>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[doc(hidden)]
    pub reserved8: Filler<38>,
}

/// An equity in the catalog: its identity, the layout of its time series file,
/// the attributes of the index files that describe it, and its bars.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EquityRecord {
    pub(crate) symbol: String,
    pub(crate) description: String,
    pub(crate) file_kind: DataFileKind,
    pub(crate) file_number: u16,
    pub(crate) active_fields: ActiveFieldSet,
    pub(crate) interday: InterdayPeriodicity,
    pub(crate) intraday: IntradayPeriodicity,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::bar::serialize_date"))]
    pub(crate) first_date: Date,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::bar::serialize_date"))]
    pub(crate) last_date: Date,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub(crate) master: Option<MasterAttributes>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub(crate) emaster: Option<EmasterAttributes>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub(crate) xmaster: Option<XmasterAttributes>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) series: TimeSeries,
}

impl EquityRecord {
    /// Returns the ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the human-readable name.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the layout family of the time series file.
    pub fn file_kind(&self) -> DataFileKind {
        self.file_kind
    }

    /// Returns the number of the time series file.
    pub fn file_number(&self) -> u16 {
        self.file_number
    }

    /// Returns the name of the time series file, such as `F12.DAT`.
    pub fn file_name(&self) -> String {
        self.file_kind.file_name(self.file_number)
    }

    /// Returns the fields present in each record of the time series file.
    pub fn active_fields(&self) -> ActiveFieldSet {
        self.active_fields
    }

    /// Returns the interday sampling frequency.
    pub fn interday_periodicity(&self) -> InterdayPeriodicity {
        self.interday
    }

    /// Returns the intraday sampling frequency. Always
    /// [`None`](IntradayPeriodicity::None) for equities defined in `XMASTER`.
    pub fn intraday_periodicity(&self) -> IntradayPeriodicity {
        self.intraday
    }

    /// Returns the first trading date recorded in the index.
    pub fn first_date(&self) -> Date {
        self.first_date
    }

    /// Returns the last trading date recorded in the index.
    pub fn last_date(&self) -> Date {
        self.last_date
    }

    /// Returns the `MASTER` attributes, present for `F#.DAT` equities.
    pub fn master(&self) -> Option<&MasterAttributes> {
        self.master.as_ref()
    }

    /// Returns the `EMASTER` attributes, present once `EMASTER` has been merged.
    pub fn emaster(&self) -> Option<&EmasterAttributes> {
        self.emaster.as_ref()
    }

    /// Returns the `XMASTER` attributes, present for `C#.MWD` equities.
    pub fn xmaster(&self) -> Option<&XmasterAttributes> {
        self.xmaster.as_ref()
    }

    /// Returns the bars.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }
}

impl Equity for EquityRecord {
    fn symbol(&self) -> &str {
        self.symbol()
    }

    fn description(&self) -> &str {
        self.description()
    }

    fn active_fields(&self) -> ActiveFieldSet {
        self.active_fields
    }

    fn time_series(&self) -> &TimeSeries {
        &self.series
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use time::macros::date;

    use crate::{
        test_utils::{master_file, MasterRecord},
        Bar, Catalog,
    };

    #[test]
    fn test_serialize_master_entry() {
        let mut catalog = Catalog::new();
        catalog
            .read_master(master_file(&[MasterRecord::new(1, "AAA", "FIRST")]))
            .unwrap();
        let json = serde_json::to_string(catalog.get("AAA").unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"symbol":"AAA","description":"FIRST","file_kind":"dat","file_number":1,"active_fields":"CLHOD","interday":"daily","intraday":"none","first_date":"2018-01-02","last_date":"2018-01-15","master":{"file_type":224,"field_byte_len":20,"flag_a":0,"flag_b":0}}"#
        );
    }

    #[test]
    fn test_serialize_bar_date() {
        let mut bar = Bar::new(date!(2018 - 01 - 02));
        bar.close = 1.5;
        bar.volume = 100;
        let json = serde_json::to_string(&bar).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2018-01-02","time":0.0,"open":0.0,"high":0.0,"low":0.0,"close":1.5,"volume":100,"open_interest":0.0}"#
        );
    }
}
