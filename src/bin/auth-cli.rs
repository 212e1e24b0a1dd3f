use auth_sdk::{ClientError, RpcClient};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "auth-cli")]
#[command(about = "Management CLI for the auth service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:50051")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check serving status
    Health,
    /// Invoke an RPC operation
    Call {
        /// Service name, e.g. auth.AuthService
        service: String,
        /// Method name, e.g. Login
        method: String,
        /// JSON payload
        #[arg(default_value = "{}")]
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = RpcClient::new(&cli.url);

    match cli.command {
        Commands::Health => {
            let status = client.health().await?;
            println!("{status}");
        }
        Commands::Call {
            service,
            method,
            payload,
        } => {
            let payload: Value = serde_json::from_str(&payload)?;
            match client.call(&service, &method, &payload).await {
                Ok(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                Err(ClientError::Status { code, message }) => {
                    eprintln!("Error: {code}: {message}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
