use std::process::ExitCode;

use clap::Parser;
use tracing::Instrument;

use auth_service::config::{load_config, AuthServiceConfig, EnvArgs, ResolvedEnvironment};
use auth_service::lifecycle::{startup, ShutdownSignal};
use auth_service::observability::Logger;

const SERVICE_NAME: &str = "auth-service";
const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";

#[derive(Parser)]
#[command(name = "auth-service")]
#[command(about = "Authentication RPC service", long_about = None)]
struct Cli {
    #[command(flatten)]
    env: EnvArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let resolved = ResolvedEnvironment::resolve(&cli.env, DEFAULT_CONFIG_DIR, DEFAULT_ENV);

    // No logger exists before the config is loaded.
    let config: AuthServiceConfig = match load_config(&resolved.config_dir, &resolved.environment) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{SERVICE_NAME}: failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (logger, flush) = match Logger::init(SERVICE_NAME, &resolved.environment, &config.log.level) {
        Ok(initialized) => initialized,
        Err(e) => {
            eprintln!("{SERVICE_NAME}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let span = logger.root_span();
    span.in_scope(|| {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            config_dir = %resolved.config_dir.display(),
            "auth-service starting"
        )
    });

    let result = startup::run(&config, &logger, ShutdownSignal::os())
        .instrument(span.clone())
        .await;

    let code = match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            span.in_scope(|| tracing::error!(error = %e, "Fatal error"));
            ExitCode::FAILURE
        }
    };

    flush.flush();
    code
}
