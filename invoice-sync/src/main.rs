use clap::Parser;
use invoice_sync::{cli::Cli, config::SyncConfig, services::RunMode, Application};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Tracing is configured from these settings, so report failures directly.
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = service_core::observability::init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    ) {
        eprintln!("Failed to initialize tracing: {}", e);
        return ExitCode::FAILURE;
    }

    let mode = if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Submit
    };
    tracing::info!(
        since = %cli.start_date,
        mode = ?mode,
        version = env!("CARGO_PKG_VERSION"),
        "Starting invoice generation"
    );

    let result = match Application::build(config) {
        Ok(application) => application.run(cli.start_date, mode).await,
        Err(e) => Err(e),
    };

    let code = match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, retryable = e.is_retryable(), "Invoice generation aborted");
            ExitCode::FAILURE
        }
    };

    service_core::observability::shutdown_tracing();
    code
}
