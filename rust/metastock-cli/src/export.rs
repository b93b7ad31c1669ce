use std::io;

use anyhow::Context;
use metastock::{
    Bar, DataSource, Database, EquityRecord, InterdayPeriodicity, IntradayPeriodicity,
};
use serde::Serialize;

use crate::{output_from_args, Args, OutputEncoding};

/// One line of the CSV catalog listing. JSON listings serialize each
/// [`EquityRecord`] in full.
#[derive(Debug, Serialize)]
pub struct EquityRow<'a> {
    pub symbol: &'a str,
    pub description: &'a str,
    pub file_name: String,
    pub fields: String,
    pub interday: InterdayPeriodicity,
    pub intraday: IntradayPeriodicity,
    pub first_date: String,
    pub last_date: String,
}

impl<'a> From<&'a EquityRecord> for EquityRow<'a> {
    fn from(equity: &'a EquityRecord) -> Self {
        Self {
            symbol: equity.symbol(),
            description: equity.description(),
            file_name: equity.file_name(),
            fields: equity.active_fields().as_letters(),
            interday: equity.interday_periodicity(),
            intraday: equity.intraday_periodicity(),
            first_date: equity.first_date().to_string(),
            last_date: equity.last_date().to_string(),
        }
    }
}

/// One bar with the symbol of its equity, for JSON output.
#[derive(Debug, Serialize)]
pub struct LabeledBar<'a> {
    pub symbol: &'a str,
    #[serde(flatten)]
    pub bar: &'a Bar,
}

/// One CSV row of bars, labeled with the symbol of its equity.
#[derive(Debug, Serialize)]
pub struct BarRow<'a> {
    pub symbol: &'a str,
    pub date: String,
    pub time: f32,
    pub open: f32,
    pub high: f32,
    pub low: f32,
    pub close: f32,
    pub volume: u64,
    pub open_interest: f32,
}

impl<'a> BarRow<'a> {
    pub fn new(symbol: &'a str, bar: &Bar) -> Self {
        Self {
            symbol,
            date: bar.date.to_string(),
            time: bar.time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            open_interest: bar.open_interest,
        }
    }
}

/// Writes `rows` to `writer` in `encoding`.
pub fn write_rows<W, T, I>(writer: W, encoding: OutputEncoding, rows: I) -> anyhow::Result<()>
where
    W: io::Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    match encoding {
        OutputEncoding::Csv => {
            let mut writer = csv::Writer::from_writer(writer);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputEncoding::Json => {
            let mut writer = writer;
            for row in rows {
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Writes the catalog listing or the bars selected by `args`. Time series that
/// haven't been loaded yet are loaded first.
pub fn export<S: DataSource>(db: &mut Database<S>, args: &Args) -> anyhow::Result<()> {
    let symbols: Vec<String> = match &args.symbol {
        Some(symbol) if db.get(symbol).is_some() => vec![symbol.clone()],
        Some(symbol) => return Err(anyhow::anyhow!("No equity with symbol '{symbol}'")),
        None => db.catalog().symbols().cloned().collect(),
    };
    let encoding = args.output_encoding();
    if !args.bars {
        let equities = symbols.iter().filter_map(|symbol| db.get(symbol));
        let output = output_from_args(args)?;
        return match encoding {
            OutputEncoding::Csv => write_rows(output, encoding, equities.map(EquityRow::from)),
            OutputEncoding::Json => write_rows(output, encoding, equities),
        };
    }
    for symbol in symbols.iter() {
        let is_loaded = db.get(symbol).is_some_and(|e| e.series().is_loaded());
        if !is_loaded {
            db.load_series(symbol)
                .with_context(|| format!("Failed to load time series for '{symbol}'"))?;
        }
    }
    let bars = symbols
        .iter()
        .filter_map(|symbol| db.get(symbol))
        .flat_map(|equity| {
            equity
                .series()
                .iter()
                .map(move |bar| (equity.symbol(), bar))
        });
    let output = output_from_args(args)?;
    match encoding {
        OutputEncoding::Csv => write_rows(
            output,
            encoding,
            bars.map(|(symbol, bar)| BarRow::new(symbol, bar)),
        ),
        OutputEncoding::Json => write_rows(
            output,
            encoding,
            bars.map(|(symbol, bar)| LabeledBar { symbol, bar }),
        ),
    }
}
