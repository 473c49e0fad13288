//! Vortex Meter - headless client for the vortex network test engine
//!
//! This is the binary entry point. All session logic lives in the library
//! crates; this file only wires CLI arguments into settings and runs the
//! headless session loop.

use std::path::PathBuf;

use clap::Parser;

use vmeter_app::Settings;
use vmeter_core::TestDuration;

mod headless;

/// Vortex Meter - drive a test session against the vortex network engine
#[derive(Parser, Debug)]
#[command(name = "vmeter")]
#[command(about = "Drive a test session against the vortex network engine", long_about = None)]
struct Args {
    /// Test duration in seconds (one of 5, 15, 30, 60)
    #[arg(short, long, value_name = "SECS")]
    duration: Option<u64>,

    /// WebSocket address of the test engine (overrides config)
    #[arg(long, value_name = "URL")]
    engine_url: Option<String>,

    /// Path to an alternate config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    vmeter_core::logging::init()?;

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(url) = args.engine_url {
        settings.engine_url = url;
    }
    if let Some(secs) = args.duration {
        settings.default_duration = secs;
    }
    settings.validate()?;

    let duration = TestDuration::new(settings.default_duration)?;
    headless::runner::run_headless(&settings, duration).await?;
    Ok(())
}
