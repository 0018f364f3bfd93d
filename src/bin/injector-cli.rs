use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;

use sidecar_injector::config::{load_config, SidecarConfig};
use sidecar_injector::http::{InjectRequest, SelectResponse};
use sidecar_injector::inject::try_select;
use sidecar_injector::{BackendInstance, Injector, Workload};

#[derive(Parser)]
#[command(name = "injector-cli")]
#[command(about = "Run the sidecar injector offline or against a running service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inject a sidecar into a workload read from disk
    Inject {
        #[arg(short, long)]
        workload: PathBuf,
        #[arg(short, long)]
        instances: PathBuf,
        /// Service config whose [sidecar] section is used
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show which backend instance a workload would report to
    Select {
        #[arg(short, long)]
        workload: PathBuf,
        #[arg(short, long)]
        instances: PathBuf,
    },
    /// Send a workload to a running injector
    Remote {
        #[arg(short, long, default_value = "http://localhost:8443")]
        url: String,
        #[arg(short, long)]
        workload: PathBuf,
        #[arg(short, long)]
        instances: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inject {
            workload,
            instances,
            config,
        } => {
            let sidecar = match config {
                Some(path) => load_config(&path)?.sidecar,
                None => SidecarConfig::default(),
            };
            let workload: Workload = read_json(&workload)?;
            let instances: Vec<BackendInstance> = read_json(&instances)?;

            let outcome = Injector::new(sidecar).process(workload, &instances);
            if let Some(reason) = &outcome.reason {
                eprintln!("Not injected: {}", reason);
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Select { workload, instances } => {
            let workload: Workload = read_json(&workload)?;
            let instances: Vec<BackendInstance> = read_json(&instances)?;

            let response = match try_select(&workload, &instances) {
                Ok(instance) => SelectResponse {
                    instance: Some(instance.name.clone()),
                    reason: None,
                },
                Err(e) => SelectResponse {
                    instance: None,
                    reason: Some(e.to_string()),
                },
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Remote {
            url,
            workload,
            instances,
        } => {
            let request = InjectRequest {
                workload: read_json(&workload)?,
                instances: read_json(&instances)?,
            };
            let res = reqwest::Client::new()
                .post(format!("{}/v1/inject", url.trim_end_matches('/')))
                .json(&request)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    Ok(value)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: injector returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
