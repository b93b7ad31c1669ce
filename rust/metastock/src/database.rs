//! The read path of a database: loading the catalog from the index files and
//! populating each equity's time series.

use std::{
    io::{Read, Seek},
    path::Path,
};

use log::{debug, warn};

use crate::{
    decode::{DateFormat, FieldReader, FloatFormat},
    enums::BarField,
    error::{DecodeError, Error, Result},
    fields::ActiveFieldSet,
    source::{DataSource, DirSource},
    Bar, Catalog, EquityRecord, TimeSeries, EMASTER_FILE_NAME, MASTER_FILE_NAME,
    SERIES_RECORD_COUNT_OFFSET, XMASTER_FILE_NAME,
};

/// Options for opening a [`Database`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenOptions {
    lazy_load: bool,
}

impl OpenOptions {
    /// Creates the default options: every time series is loaded on open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to defer loading time series until
    /// [`Database::load_series()`] or [`Database::load_all_series()`] is called.
    pub fn lazy_load(mut self, lazy_load: bool) -> Self {
        self.lazy_load = lazy_load;
        self
    }

    /// Returns `true` if time series are loaded on demand.
    pub fn is_lazy_load(&self) -> bool {
        self.lazy_load
    }
}

/// A MetaStock database: its catalog of equities and the source of its files.
#[derive(Debug)]
pub struct Database<S = DirSource> {
    source: S,
    options: OpenOptions,
    catalog: Catalog,
    last_series_error: Option<Error>,
}

impl Database<DirSource> {
    /// Opens the database in the directory `dir`, reading the index files and,
    /// unless `options` request lazy loading, every time series.
    ///
    /// An equity whose time series fails to load stays in the catalog with an
    /// unloaded series. The most recent such failure is available from
    /// [`last_series_error()`](Self::last_series_error).
    ///
    /// # Errors
    /// This function returns an error if `MASTER` can't be opened or any index
    /// file fails to decode.
    pub fn open(dir: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        Self::with_source(DirSource::new(dir), options)
    }
}

impl<S> Database<S>
where
    S: DataSource,
{
    /// Creates a database over `source` with an empty catalog. Nothing is read
    /// until [`load_catalog()`](Self::load_catalog) is called.
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: OpenOptions::default(),
            catalog: Catalog::new(),
            last_series_error: None,
        }
    }

    /// Opens the database in `source`, reading the index files and, unless
    /// `options` request lazy loading, every time series.
    ///
    /// An equity whose time series fails to load stays in the catalog with an
    /// unloaded series. The most recent such failure is available from
    /// [`last_series_error()`](Self::last_series_error).
    ///
    /// # Errors
    /// This function returns an error if `MASTER` can't be opened or any index
    /// file fails to decode.
    pub fn with_source(source: S, options: OpenOptions) -> Result<Self> {
        let mut db = Self {
            options,
            ..Self::new(source)
        };
        db.load_catalog()?;
        if !options.is_lazy_load() {
            if let Err(err) = db.load_all_series() {
                db.last_series_error = Some(err);
            }
        }
        Ok(db)
    }

    /// Returns the catalog of equities.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consumes the database and returns its catalog.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Returns the source of the database's files.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the options the database was opened with.
    pub fn options(&self) -> OpenOptions {
        self.options
    }

    /// Returns the equity with exactly `symbol`. The lookup is case-sensitive.
    pub fn get(&self, symbol: &str) -> Option<&EquityRecord> {
        self.catalog.get(symbol)
    }

    /// Returns the most recent time series failure from opening the database,
    /// if any time series failed to load.
    pub fn last_series_error(&self) -> Option<&Error> {
        self.last_series_error.as_ref()
    }

    /// Removes and returns the most recent time series failure from opening
    /// the database.
    pub fn take_last_series_error(&mut self) -> Option<Error> {
        self.last_series_error.take()
    }

    /// Rebuilds the catalog from the index files. `MASTER` is required. `EMASTER`
    /// is read only if it exists and `MASTER` was read successfully, and
    /// `XMASTER` only if `EMASTER` was read successfully.
    ///
    /// On failure, the equities read before the failing record remain in the
    /// catalog.
    ///
    /// # Errors
    /// This function returns an error if `MASTER` can't be opened or any index
    /// file fails to decode or contradicts another.
    pub fn load_catalog(&mut self) -> Result<()> {
        self.catalog = Catalog::new();
        let master = self
            .source
            .open(MASTER_FILE_NAME)
            .map_err(|e| Error::file_open(e, MASTER_FILE_NAME))?;
        self.catalog.read_master(master)?;
        if !self.source.exists(EMASTER_FILE_NAME) {
            warn!("No {EMASTER_FILE_NAME} file, skipping extended attributes and {XMASTER_FILE_NAME}");
            return Ok(());
        }
        let emaster = self
            .source
            .open(EMASTER_FILE_NAME)
            .map_err(|e| Error::file_open(e, EMASTER_FILE_NAME))?;
        self.catalog.read_emaster(emaster)?;
        if !self.source.exists(XMASTER_FILE_NAME) {
            debug!("No {XMASTER_FILE_NAME} file");
            return Ok(());
        }
        let xmaster = self
            .source
            .open(XMASTER_FILE_NAME)
            .map_err(|e| Error::file_open(e, XMASTER_FILE_NAME))?;
        self.catalog.read_xmaster(xmaster)
    }

    /// Loads the time series of the equity with exactly `symbol`. Returns
    /// `false` if the catalog has no such equity.
    ///
    /// If loading fails, the equity's series is left as it was.
    ///
    /// # Errors
    /// This function returns an error if the time series file is missing, a
    /// field can't be decoded, or the file contains a date twice.
    pub fn load_series(&mut self, symbol: &str) -> Result<bool> {
        match self.catalog.get_mut(symbol) {
            Some(equity) => populate(&self.source, equity).map(|_| true),
            None => Ok(false),
        }
    }

    /// Loads the time series of every equity. An equity that fails to load
    /// doesn't stop the others from loading.
    ///
    /// # Errors
    /// This function returns the error of the last equity that failed to load.
    pub fn load_all_series(&mut self) -> Result<()> {
        let mut last_err = None;
        for equity in self.catalog.iter_mut() {
            if let Err(err) = populate(&self.source, equity) {
                warn!("Failed to load time series for '{}': {err}", equity.symbol);
                last_err = Some(err);
            }
        }
        last_err.map_or(Ok(()), Err)
    }
}

/// Replaces the series of `equity` with the contents of its time series file.
fn populate<S: DataSource>(source: &S, equity: &mut EquityRecord) -> Result<()> {
    let file_name = equity.file_name();
    if !source.exists(&file_name) {
        return Err(Error::SeriesFileMissing {
            symbol: equity.symbol.clone(),
            file_name,
        });
    }
    let reader = source
        .open(&file_name)
        .map_err(|e| Error::file_open(e, &file_name))?;
    let series = read_series(
        reader,
        &equity.symbol,
        &file_name,
        equity.active_fields,
        TimeSeries::with_bounds(equity.first_date, equity.last_date),
    )?;
    debug!(
        "Read {} bars for '{}' from {file_name}",
        series.len(),
        equity.symbol
    );
    equity.series = series;
    Ok(())
}

/// Decodes a time series file with the layout of `fields` into `series`. The
/// header declares one more than the number of records that follow it.
fn read_series<R: Read + Seek>(
    reader: R,
    symbol: &str,
    file_name: &str,
    fields: ActiveFieldSet,
    mut series: TimeSeries,
) -> Result<TimeSeries> {
    let field_err = |record: u32, field: &'static str| {
        move |source: DecodeError| Error::SeriesField {
            symbol: symbol.to_owned(),
            file_name: file_name.to_owned(),
            record,
            field,
            source,
        }
    };
    let mut reader = FieldReader::new(reader);
    let record_count = reader
        .read_u16(SERIES_RECORD_COUNT_OFFSET)
        .map_err(field_err(0, "record count"))?;
    let record_size = fields.record_size() as u64;
    for record in 1..u32::from(record_count) {
        let base = u64::from(record) * record_size;
        let date = reader
            .read_date(
                base + fields.offset(BarField::Date) as u64,
                DateFormat::Float(FloatFormat::Mbf32),
            )
            .map_err(field_err(record, BarField::Date.as_str()))?;
        let mut bar = Bar::new(date);
        for (field, offset) in fields.active_offsets() {
            if field == BarField::Date {
                continue;
            }
            let value = reader
                .read_float(base + offset as u64, FloatFormat::Mbf32)
                .map_err(field_err(record, field.as_str()))?;
            match field {
                BarField::Date => {}
                BarField::Time => bar.time = value,
                BarField::Open => bar.open = value,
                BarField::High => bar.high = value,
                BarField::Low => bar.low = value,
                BarField::Close => bar.close = value,
                // `as` truncates toward zero and saturates negative values to 0
                BarField::Volume => bar.volume = value as u64,
                BarField::OpenInterest => bar.open_interest = value,
            }
        }
        if !series.insert(bar) {
            return Err(Error::DuplicateDate {
                symbol: symbol.to_owned(),
                file_name: file_name.to_owned(),
                date,
            });
        }
    }
    series.mark_loaded();
    Ok(series)
}
