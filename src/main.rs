use anyhow::Result;
use std::process::ExitCode;

use expense_client::commands::App;
use expense_client::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Load configuration first (for log level)
    let (config, command) = Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level; RUST_LOG wins when set
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::debug!(
        api = %config.api_base_url,
        auth = %config.auth_base_url,
        timeout_ms = config.http_request_timeout,
        "Configuration loaded"
    );
    tracing::debug!(
        "Credential store: {}",
        config.credentials_db_file.display()
    );

    let app = App::new(&config)?;
    let mut stdout = std::io::stdout().lock();
    app.run(command, &mut stdout).await
}
