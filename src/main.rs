use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use hv_24x7_catalog::{render_catalog, CatalogFile, Renderer, Verbosity};

/// Decode an hv-24x7 catalog and print event descriptors for each event.
#[derive(Parser)]
#[command(name = "hv-24x7-catalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the catalog file
    catalog: PathBuf,

    /// Debug level: 1 dumps schemas and groups, 5 dumps events, 100 adds hex dumps
    #[arg(short, long, default_value_t = 0)]
    debug: u8,
}

fn init_tracing(verbosity: Verbosity) {
    let default_level = if verbosity.is_at_least(Verbosity::EVENT_DETAIL) {
        "trace"
    } else if verbosity.is_at_least(Verbosity::RECORDS) {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp
            || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            e.exit()
        }
        Err(_) => {
            let program = std::env::args().next().unwrap_or_else(|| "parse".into());
            eprintln!("usage: {program} <catalog file>");
            return ExitCode::SUCCESS;
        }
    };

    let verbosity = Verbosity(cli.debug);
    init_tracing(verbosity);

    let catalog = match CatalogFile::open(&cli.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let stdout = std::io::stdout().lock();
    let mut renderer = Renderer::new(BufWriter::new(stdout), verbosity);
    let result = render_catalog(&catalog, &mut renderer)
        .and_then(|_report| renderer.into_inner().flush());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("could not write output: {e}");
            ExitCode::FAILURE
        }
    }
}
