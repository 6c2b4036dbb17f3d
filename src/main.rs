//! Synopsis - summarization and AI chat from the terminal
//!
#![doc = "Main entry point for the synopsis CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use synopsis::app::AppContext;
use synopsis::cli::Cli;
use synopsis::commands;
use synopsis::config::Config;
use synopsis::layout;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config = Config::load(&cli.config, &cli)?;
    config.validate()?;

    let ctx = AppContext::init(config).await?;
    tracing::debug!(state = ?ctx.auth.state(), "Application context ready");

    let result = commands::dispatch(&ctx, cli.command).await;

    // Registration success and session expiry both leave a notice behind.
    if let Some(notice) = ctx.navigator.take_notice() {
        layout::print_notice(&notice);
    }
    ctx.shutdown();
    result
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output stays pipeable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "synopsis=debug"
    } else {
        "synopsis=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
