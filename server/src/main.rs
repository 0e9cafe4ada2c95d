mod config;
mod http;

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use entity::{Department, EmployeeDraft};
use platform_obs::{ObsConfig, init_tracing};
use platform_store::EmployeeStore;
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "registry-server", version, about = "Employee registry service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Write sample employee records through the store.
    Seed(SeedCommand),
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[derive(Args, Debug)]
struct SeedCommand {
    #[arg(long, default_value_t = 5)]
    count: usize,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Seed(cmd) => run_seed(cmd, app_config),
    }
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let store = Arc::new(EmployeeStore::at_path(&config.store_path));
    let state = AppState {
        store,
        config: config.clone(),
    };
    http::serve(cmd.into(), state).await
}

fn run_seed(cmd: SeedCommand, config: Arc<AppConfig>) -> Result<()> {
    let store = EmployeeStore::at_path(&config.store_path);
    for draft in sample_drafts(cmd.count) {
        let employee = store.create(draft)?;
        info!(id = %employee.id, name = %employee.name, "seeded employee");
    }
    info!(
        count = cmd.count,
        path = %config.store_path.display(),
        "seed complete"
    );
    Ok(())
}

fn sample_drafts(count: usize) -> Vec<EmployeeDraft> {
    const NAMES: [&str; 5] = [
        "Ada Lovelace",
        "Grace Hopper",
        "Alan Turing",
        "Edsger Dijkstra",
        "Barbara Liskov",
    ];
    (0..count)
        .map(|i| {
            let name = NAMES[i % NAMES.len()];
            let local = name.to_lowercase().replace(' ', ".");
            EmployeeDraft {
                name: name.to_string(),
                email: format!("{local}@example.com"),
                contact: 9_000_000_000 + i as u64,
                department: Department::ALL[i % Department::ALL.len()],
            }
        })
        .collect()
}
