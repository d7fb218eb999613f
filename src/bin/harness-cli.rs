use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "harness-cli")]
#[command(about = "Management CLI for the backend test harness", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8070")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check harness status
    Status,
    /// List backend targets and their liveness
    Backends,
    /// Run an operation (health, get, create, update, delete) against a target
    Run {
        target: String,
        operation: String,
        #[arg(long)]
        id: Option<String>,
        /// Raw JSON text sent as the record data
        #[arg(long)]
        data: Option<String>,
    },
    /// Show the result log
    Results,
    /// Clear the result log
    ClearResults,
    /// Show the stored user and application context
    Context,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", cli.url)).send().await?,
        Commands::Backends => client.get(format!("{}/backends", cli.url)).send().await?,
        Commands::Run {
            target,
            operation,
            id,
            data,
        } => {
            client
                .post(format!("{}/backends/{}/{}", cli.url, target, operation))
                .json(&json!({ "id": id, "data": data }))
                .send()
                .await?
        }
        Commands::Results => client.get(format!("{}/results", cli.url)).send().await?,
        Commands::ClearResults => client.delete(format!("{}/results", cli.url)).send().await?,
        Commands::Context => client.get(format!("{}/context", cli.url)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: harness API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
