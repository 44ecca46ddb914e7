use log::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use crate::config::{load_dotenv, Config};
use crate::pipeline::Pipeline;

mod config;
mod error;
mod geocode;
mod http;
mod pipeline;
mod record;
mod schema;
mod store;
mod usps;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        log::error!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("capitol_geo=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .with(ErrorLayer::default())
        .init();
}

async fn run() -> color_eyre::Result<()> {
    color_eyre::install()?;

    match load_dotenv()? {
        Some(path) => debug!("loaded environment from [{}]", path.display()),
        None => debug!("no .env file found, using the process environment"),
    }
    let config = Config::from_env()?;
    let report = Pipeline::new(config)?.run().await?;

    info!(
        "done: [{}] verified, [{}] geocoded, written to [{}]",
        report.verified.len(),
        report.geocoded.len(),
        report.output.display()
    );
    Ok(())
}
