use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lifecycle-cli")]
#[command(about = "Probe, toggle and load a safe-lifecycle server", long_about = None)]
struct Cli {
    /// Public server URL (probes and work).
    #[arg(short, long, default_value = "http://localhost:8085")]
    server_url: String,

    /// Admin server URL (dependency signals).
    #[arg(short, long, default_value = "http://localhost:9090")]
    admin_url: String,

    /// Admin API key, if the server requires one.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Health {
    Healthy,
    Unhealthy,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a health probe (liveness, readiness, startup)
    Probe { kind: String },
    /// Show version, lifecycle flags and dependencies
    Status,
    /// List dependency health
    Dependencies,
    /// Set a dependency healthy or unhealthy
    Set { name: String, health: Health },
    /// Flip a dependency's health
    Toggle { name: String },
    /// Send work requests in a loop and report each outcome
    Work {
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
        /// Stop after this many requests
        #[arg(long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    match cli.command {
        Commands::Probe { kind } => {
            let res = client
                .get(format!("{}/health/{}", cli.server_url, kind))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.admin_url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Dependencies => {
            let res = client
                .get(format!("{}/admin/dependencies", cli.admin_url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Set { name, health } => {
            let healthy = matches!(health, Health::Healthy);
            let res = client
                .put(format!("{}/admin/dependencies/{}", cli.admin_url, name))
                .headers(headers)
                .json(&json!({ "healthy": healthy }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Toggle { name } => {
            let res = client
                .post(format!("{}/admin/dependencies/{}/toggle", cli.admin_url, name))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Work {
            interval_ms,
            timeout_ms,
            count,
        } => {
            send_work(&client, &cli.server_url, interval_ms, timeout_ms, count).await;
        }
    }

    Ok(())
}

async fn send_work(
    client: &reqwest::Client,
    server_url: &str,
    interval_ms: u64,
    timeout_ms: u64,
    count: Option<u64>,
) {
    println!("Sending work to {}", server_url);
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    let mut sent = 0u64;

    loop {
        ticker.tick().await;
        if count.is_some_and(|limit| sent >= limit) {
            break;
        }
        sent += 1;

        let res = client
            .post(format!("{}/work", server_url))
            .timeout(Duration::from_millis(timeout_ms))
            .json(&json!({ "data": format!("request-{}", sent) }))
            .send()
            .await;

        match res {
            Ok(res) if res.status().is_success() => println!("request-{}: ok", sent),
            Ok(res) => println!("request-{}: failed with status {}", sent, res.status()),
            Err(e) => println!("request-{}: failed: {}", sent, e),
        }
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{}", pretty);
            } else {
                eprintln!("Status {}", status);
                eprintln!("{}", pretty);
            }
        }
        Err(_) => eprintln!("Status {}: {}", status, text),
    }
    Ok(())
}
