///! Cluster commands

use crate::api::ApiClient;
use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dbctl_core::{ClusterCreatePipeline, ClusterCreationRequest, Manifest, SourceLocator};

const TERMINATION_POLICIES: [&str; 4] = ["DoNotTerminate", "Halt", "Delete", "WipeOut"];

#[derive(Subcommand)]
pub enum ClusterCommands {
    /// Create a database cluster
    #[command(after_help = CREATE_EXAMPLES)]
    Create(CreateArgs),
}

const CREATE_EXAMPLES: &str = "Examples:
  # Keep workloads and pvcs when the cluster is deleted
  dbctl cluster create mycluster --components=component.yaml --termination-policy=DoNotTerminate

  # Delete workloads but keep pvcs when the cluster is deleted
  dbctl cluster create mycluster --components=component.yaml --termination-policy=Halt

  # Load components from a URL
  dbctl cluster create mycluster --components=http://kubeblocks.io/yamls/wesql_single.yaml --termination-policy=Halt

  # Load components from stdin
  cat component.yaml | dbctl cluster create mycluster --termination-policy=Halt --components -";

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Cluster name
    pub name: Option<String>,

    /// ClusterDefinition reference
    #[arg(long = "cluster-definition")]
    pub cluster_definition: Option<String>,

    /// AppVersion reference
    #[arg(long)]
    pub app_version: Option<String>,

    /// Termination policy, one of: (DoNotTerminate, Halt, Delete, WipeOut)
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(TERMINATION_POLICIES))]
    pub termination_policy: Option<String>,

    /// Pod anti-affinity type
    #[arg(long)]
    pub pod_anti_affinity: Option<String>,

    /// Set monitor enabled
    #[arg(long)]
    pub monitor: bool,

    /// Enable all logs of every component, ignoring the component level enabledLogs
    #[arg(long)]
    pub enable_all_logs: bool,

    /// Topology keys for affinity (repeatable)
    #[arg(long = "topology-keys")]
    pub topology_keys: Option<Vec<String>>,

    /// Node label selector, e.g. disk=ssd,zone=z1
    #[arg(long, value_delimiter = ',', value_parser = parse_label)]
    pub node_labels: Vec<(String, String)>,

    /// Use a yaml file, URL, or stdin (-) to specify the cluster components
    #[arg(long)]
    pub components: Option<String>,

    /// Set a source backup to restore data
    #[arg(long)]
    pub backup: Option<String>,

    /// Print the composed manifest instead of submitting it
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid label '{}', expected key=value", s)),
    }
}

/// Decide once where the components come from
pub fn parse_components_source(value: &str) -> Option<SourceLocator> {
    match value {
        "" => None,
        "-" => Some(SourceLocator::Stdin),
        url if url.starts_with("http://") || url.starts_with("https://") => {
            Some(SourceLocator::Remote(url.to_string()))
        }
        path => Some(SourceLocator::File(path.into())),
    }
}

pub fn build_request(args: CreateArgs, namespace: &str) -> ClusterCreationRequest {
    let mut request = ClusterCreationRequest::new(args.name.unwrap_or_default(), namespace);
    request.cluster_definition_ref = args.cluster_definition.unwrap_or_default();
    request.app_version_ref = args.app_version.unwrap_or_default();
    request.termination_policy = args.termination_policy.unwrap_or_default();
    request.pod_anti_affinity = args.pod_anti_affinity.unwrap_or_default();
    request.monitor = args.monitor;
    request.enable_all_logs = args.enable_all_logs;
    request.topology_keys = args.topology_keys;
    request.node_labels = args.node_labels.into_iter().collect();
    request.components_source = args
        .components
        .as_deref()
        .and_then(parse_components_source);
    request.backup = args.backup.filter(|b| !b.is_empty());
    request
}

/// Stdout carries nothing but the rendered manifest on a dry run
pub fn render_dry_run(manifest: &Manifest, output_format: &str) -> Result<String> {
    output::render(manifest.content(), OutputFormat::from_str(output_format))
}

pub async fn handle_cluster_command(
    command: ClusterCommands,
    api: &ApiClient,
    config: &Config,
    namespace: &str,
    output_format: &str,
) -> Result<()> {
    match command {
        ClusterCommands::Create(args) => {
            let dry_run = args.dry_run;
            let mut request = build_request(args, namespace);
            let mut pipeline = ClusterCreatePipeline::new(config.defaults.clone(), api);

            if let Some(backup) = &request.backup {
                tracing::info!(backup = %backup, "restoring data from backup");
            }

            let mut stdin = tokio::io::stdin();
            let manifest = pipeline.run(&mut request, &mut stdin).await?;

            if dry_run {
                println!("{}", render_dry_run(&manifest, output_format)?);
                return Ok(());
            }

            match api.create_cluster(&manifest).await {
                Ok(_) => {
                    pipeline.record_submission(true)?;
                    output::print_created("Cluster", &request.name, &request.namespace);
                }
                Err(e) => {
                    pipeline.record_submission(false)?;
                    return Err(dbctl_core::Error::Submission(format!("{:#}", e)))
                        .with_context(|| format!("cluster '{}' was not created", request.name));
                }
            }
        }
    }
    Ok(())
}
