///! Output formatting for CLI
///!
///! Renders composed manifests and command results consistently.

use colored::Colorize;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Table,
        }
    }
}

/// Render a document; table format has no layout for documents and uses JSON
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Table | OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
    };
    Ok(rendered)
}

/// Print a success message for resource creation
pub fn print_created(resource_type: &str, name: &str, namespace: &str) {
    println!(
        "{} {} '{}' created in namespace {}",
        "✓".green().bold(),
        resource_type.green(),
        name.green().bold(),
        namespace.dimmed()
    );
}
