use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

pub mod export;

/// How the output of the `msdb` command will be encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputEncoding {
    Csv,
    /// Newline-delimited JSON
    Json,
}

#[derive(Debug, Parser)]
#[clap(version, about)]
#[cfg_attr(test, derive(Default))]
pub struct Args {
    #[clap(
        help = "A MetaStock database directory containing a MASTER file",
        value_name = "DIR"
    )]
    pub input: PathBuf,
    #[clap(
        short,
        long,
        help = "Only output the equity with this exact (case-sensitive) symbol",
        value_name = "SYMBOL"
    )]
    pub symbol: Option<String>,
    #[clap(
        short,
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Output the bars of each equity instead of the catalog"
    )]
    pub bars: bool,
    #[clap(
        short,
        long,
        help = "Saves the result to FILE. If no path is specified, the output will be written to standard output",
        value_name = "FILE"
    )]
    pub output: Option<PathBuf>,
    #[clap(
        short = 'J',
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "output_encoding",
        help = "Output the result as NDJSON (newline-delimited JSON)"
    )]
    pub json: bool,
    #[clap(
        short = 'C',
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "output_encoding",
        help = "Output the result as CSV. This is the default"
    )]
    pub csv: bool,
    #[clap(
        short,
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Allow overwriting of existing files, such as the output file"
    )]
    pub force: bool,
    #[clap(
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Only read the index files up front and load time series as they're needed"
    )]
    pub lazy: bool,
    #[clap(
        short,
        long,
        action = ArgAction::Count,
        help = "Log more detail to standard error. Repeat for more. RUST_LOG takes precedence"
    )]
    pub verbose: u8,
}

impl Args {
    /// Consolidates the output flag booleans into a single enum.
    pub fn output_encoding(&self) -> OutputEncoding {
        if self.json {
            OutputEncoding::Json
        } else {
            OutputEncoding::Csv
        }
    }

    /// Returns the log filter used when `RUST_LOG` isn't set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Sends log records, including those of the `metastock` library, to standard
/// error.
pub fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns a writeable object where the `msdb` output will be directed.
pub fn output_from_args(args: &Args) -> anyhow::Result<Box<dyn io::Write>> {
    if let Some(output) = &args.output {
        let file = create_output_file(output, args.force)?;
        Ok(Box::new(BufWriter::new(file)))
    } else {
        Ok(Box::new(io::stdout().lock()))
    }
}

/// Creates the file at `path`, only replacing an existing one when `force` is
/// set.
fn create_output_file(path: &Path, force: bool) -> anyhow::Result<File> {
    let res = if force {
        File::create(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)
    };
    res.map_err(|err| {
        if err.kind() == io::ErrorKind::AlreadyExists {
            anyhow!(
                "Output file exists at '{}'. Pass --force to replace it",
                path.display()
            )
        } else {
            anyhow::Error::new(err)
                .context(format!("Unable to create output file '{}'", path.display()))
        }
    })
}

/// Returns `true` if `err` was caused by the reader of standard output going
/// away, such as when piping into `head`.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}
