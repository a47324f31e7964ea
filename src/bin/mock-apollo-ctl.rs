use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "mock-apollo-ctl")]
#[command(about = "Control CLI for the mock Apollo internal port", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9090")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show sources, their load state and pending long polls
    Status,
    /// Re-read every source without waking long polls
    Reload,
    /// Re-read every source and wake all pending long polls
    Trigger,
    /// Check that the server is responsive
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{url}/status")).send().await?,
        Commands::Reload => client.post(format!("{url}/reload")).send().await?,
        Commands::Trigger => client.post(format!("{url}/trigger")).send().await?,
        Commands::Health => client.get(format!("{url}/healthz")).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: internal API returned status {}", status);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if status.is_success() {
        Ok(())
    } else {
        Err(format!("request failed with status {status}").into())
    }
}
