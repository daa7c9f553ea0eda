use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Command-line client for the voice demo bridge", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a persona a question and print the reply
    Ask {
        /// Persona to address (e.g. CEO)
        persona: String,
        /// Question text
        message: String,
    },
    /// Show voice service health diagnostics
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let endpoint = format!("{}/api/voice-demo", cli.url.trim_end_matches('/'));

    let res = match cli.command {
        Commands::Ask { persona, message } => {
            client
                .post(&endpoint)
                .json(&json!({ "persona": persona, "message": message }))
                .send()
                .await?
        }
        Commands::Health => client.get(&endpoint).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: bridge returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(())
}
