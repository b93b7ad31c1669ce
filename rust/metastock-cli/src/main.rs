use anyhow::Context;
use clap::Parser;
use metastock::{Database, OpenOptions};
use metastock_cli::{export::export, init_logging, is_broken_pipe, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);
    if !args.input.is_dir() {
        return Err(anyhow::anyhow!(
            "'{}' isn't a directory",
            args.input.display()
        ));
    }
    // Equities whose series fail to load are logged and stay in the catalog
    let mut db = Database::open(&args.input, OpenOptions::new().lazy_load(args.lazy))
        .with_context(|| {
            format!(
                "Failed to read the catalog of '{}'",
                args.input.display()
            )
        })?;
    match export(&mut db, &args) {
        // Handle broken pipe as a non-error.
        Err(e) if is_broken_pipe(&e) => Ok(()),
        res => res,
    }
}
