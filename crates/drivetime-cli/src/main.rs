use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use drivetime_cli::{run, Cli};

fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .compact()
        .finish();
    // Only the first initializer wins; tests may have installed one already.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
