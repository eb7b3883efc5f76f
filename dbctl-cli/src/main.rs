///! dbctl CLI
///!
///! Command-line interface for composing and submitting database clusters

mod api;
mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::cluster::ClusterCommands;

#[derive(Parser)]
#[command(name = "dbctl", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API server address (defaults to the configured server)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Namespace of the cluster
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage database clusters
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().unwrap_or_default();

    logging::LoggingConfig::new(&config.log_level, config.json_logs, cli.verbose).init()?;

    let server = cli.server.as_deref().unwrap_or(&config.default_server);
    let namespace = cli.namespace.as_deref().unwrap_or(&config.default_namespace);
    let output = cli.output.as_deref().unwrap_or(&config.default_output);

    let api_client = api::ApiClient::new(server);

    if let Some(token) = &config.token {
        api_client.set_token(token.clone()).await;
    }

    match cli.command {
        Commands::Cluster { command } => {
            commands::cluster::handle_cluster_command(
                command,
                &api_client,
                &config,
                namespace,
                output,
            )
            .await?
        }
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
