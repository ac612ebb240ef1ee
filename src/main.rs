use std::path::PathBuf;
use std::process::ExitCode;

use surveygraph::construct::RecordStore;
use surveygraph::render::render;
use surveygraph::settings::Settings;
use surveygraph::table::CsvSource;
use surveygraph::Result;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

fn run(config: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;
    info!(
        source = %settings.source.display(),
        visualization = ?settings.visualization,
        "settings loaded"
    );
    let source = CsvSource::open(&settings.source)?.with_options(settings.load_options()?);
    let store = RecordStore::load(source)?;
    info!("{}", store);
    render(&store, &settings)?;
    Ok(())
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // the only argument is an optional configuration file
    let config = std::env::args_os().nth(1).map(PathBuf::from);
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
