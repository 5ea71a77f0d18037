use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

use agent_relay::config::load_config;
use agent_relay::relay::Sanitized;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for the agent relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// POST a JSON payload through the relay ("-" reads stdin)
    Send {
        payload: String,
        #[arg(short, long, default_value = "/api/ai_agent")]
        route: String,
    },
    /// Check relay liveness
    Health,
    /// Validate a config file and print the effective settings
    Check { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Send { payload, route } => {
            let payload = if payload == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                payload
            };
            // Fail locally rather than sending something the relay will reject.
            let _: Value = serde_json::from_str(&payload)?;

            let res = client
                .post(format!("{}{}", cli.url, route))
                .header(CONTENT_TYPE, "application/json")
                .body(payload)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/healthz", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Check { path } => {
            let config = load_config(&path)?;
            let endpoint = match config.upstream.endpoint.as_deref().map(url::Url::parse) {
                Some(Ok(url)) => Sanitized(&url).to_string(),
                Some(Err(e)) => format!("invalid ({e})"),
                None => "not configured".to_string(),
            };
            println!("config:            {}", path.display());
            println!("bind_address:      {}", config.listener.bind_address);
            println!("route:             {}", config.listener.route);
            println!("client:            {:?}", config.upstream.client);
            println!("endpoint:          {endpoint}");
            println!("missing_endpoint:  {:?}", config.upstream.missing_endpoint);
            println!("fallback_endpoint: {}", config.upstream.fallback_endpoint);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
