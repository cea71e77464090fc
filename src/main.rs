use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use nb_classify::config::Config;
use nb_classify::logging::setup_logger;
use nb_classify::options::Options;
use nb_classify::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();

    let mut config = Config::load(options.config.as_deref()).context("loading configuration")?;
    options.apply(&mut config);
    config.validate()?;

    setup_logger(&config.logging.level);
    info!("Starting run: {}", config);

    let summary = pipeline::run(&options.corpora(), &config).await?;

    for metric in summary.undefined_metrics() {
        warn!("{} is undefined: its denominator is zero", metric);
    }

    if config.report.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }

    Ok(())
}
