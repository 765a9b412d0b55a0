mod demo;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use veil_core::{PropertyKey, Record, ViewBuilder, ViewConfig};

#[derive(Debug, Parser)]
#[command(name = "veil", version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk through private fields, revocation and the view registry
    Demo {
        /// Names starting with this character are private
        #[arg(long, default_value_t = '_')]
        marker: char,
    },
    /// Wrap a JSON object in a view and show what it exposes
    Inspect {
        /// JSON object to wrap
        #[arg(long)]
        record: String,

        /// Names starting with this character are private (overrides --config)
        #[arg(long)]
        marker: Option<char>,

        /// TOML view configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Additional keys to probe through the view
        #[arg(long = "probe")]
        probes: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { marker } => {
            for line in demo::run(marker) {
                println!("{}", line);
            }
        }
        Commands::Inspect {
            record,
            marker,
            config,
            probes,
        } => {
            let mut view_config = match config {
                Some(path) => match ViewConfig::from_file(&path) {
                    Ok(config) => config,
                    Err(e) => {
                        error!("Failed to load config {}: {}", path.display(), e);
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                None => ViewConfig::default(),
            };
            if let Some(marker) = marker {
                view_config.marker = marker;
            }

            match inspect(&record, &view_config, &probes) {
                Ok(lines) => {
                    for line in lines {
                        println!("{}", line);
                    }
                }
                Err(message) => {
                    error!("{}", message);
                    eprintln!("Error: {}", message);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Wrap `json` and describe every visible key plus the requested probes.
fn inspect(json: &str, config: &ViewConfig, probes: &[String]) -> Result<Vec<String>, String> {
    config.validate().map_err(|e| e.to_string())?;
    let parsed: Value =
        serde_json::from_str(json).map_err(|e| format!("Invalid JSON for --record: {}", e))?;
    let record = Record::from_json(parsed).map_err(|e| e.to_string())?;
    let total = record.len();

    let view = ViewBuilder::from_config(record, config).build();
    info!(view_id = %view.id(), "inspecting record");

    let keys = view.list_keys().map_err(|e| e.to_string())?;
    let mut lines = vec![format!(
        "{} of {} properties visible ({})",
        keys.len(),
        total,
        view.policy().description()
    )];

    for key in &keys {
        let value = view.read(key.clone()).map_err(|e| e.to_string())?;
        lines.push(format!("  {} = {}", key, demo::describe_value(&value)));
    }

    for probe in probes {
        let key = PropertyKey::from(probe.as_str());
        lines.push(format!(
            "probe {} -> {}",
            probe,
            demo::describe(&view.read(key), demo::describe_value)
        ));
    }

    Ok(lines)
}
