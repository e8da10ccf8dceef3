//! Ingress annotation resolver CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   controller.toml ──▶ config::loader ──▶ ControllerConfig (features, baseline)
//!                                               │
//!   manifest.toml ──▶ group_by_host ──▶ role filter/merge ──▶ resolver ──▶ JSON on stdout
//!                                                                 │
//!                                                                 ▼
//!                                                   observability (logs, counters)
//! ```
//!
//! `watch` re-resolves every time the controller config changes.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

use ingress_annotations::annotations::{
    group_by_host, keys, resolve_mergeable, resolve_resource, ResourceGroup,
};
use ingress_annotations::config::loader::{load_config, load_manifest, ConfigError};
use ingress_annotations::config::watcher::ConfigWatcher;
use ingress_annotations::config::ControllerConfig;
use ingress_annotations::observability::logging;

#[derive(Parser)]
#[command(name = "ingress-annotations")]
#[command(
    about = "Resolve routing resource annotations into proxy configuration",
    long_about = None
)]
struct Cli {
    /// Controller configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable commercial edition capabilities
    #[arg(long)]
    plus: bool,

    /// App Protect WAF module is installed
    #[arg(long)]
    app_protect: bool,

    /// App Protect DoS module is installed
    #[arg(long)]
    app_protect_dos: bool,

    /// Enable internal routes
    #[arg(long)]
    internal_routes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every resource in the given manifests
    Resolve { manifests: Vec<PathBuf> },
    /// Resolve again whenever the controller config changes
    Watch { manifests: Vec<PathBuf> },
    /// Print the key classification tables
    Keys,
}

impl Cli {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => ControllerConfig::default(),
        };
        Ok(self.apply_flags(config))
    }

    fn apply_flags(&self, mut config: ControllerConfig) -> ControllerConfig {
        let features = &mut config.features;
        features.is_plus |= self.plus;
        features.has_app_protect |= self.app_protect;
        features.has_app_protect_dos |= self.app_protect_dos;
        features.enable_internal_routes |= self.internal_routes;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability);

    tracing::info!(
        plus = config.features.is_plus,
        app_protect = config.features.has_app_protect,
        app_protect_dos = config.features.has_app_protect_dos,
        internal_routes = config.features.enable_internal_routes,
        "Configuration loaded"
    );

    match &cli.command {
        Commands::Resolve { manifests } => {
            print_json(&resolve_manifests(&config, manifests)?)?;
        }
        Commands::Watch { manifests } => {
            let Some(path) = &cli.config else {
                return Err("watch requires --config".into());
            };
            watch(&cli, path, config, manifests).await?;
        }
        Commands::Keys => {
            print_json(&serde_json::to_value(keys::classification())?)?;
        }
    }

    Ok(())
}

async fn watch(
    cli: &Cli,
    path: &Path,
    mut config: ControllerConfig,
    manifests: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;

    print_json(&resolve_manifests(&config, manifests)?)?;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(new_config) = update else { break };
                config = cli.apply_flags(new_config);
                match resolve_manifests(&config, manifests) {
                    Ok(output) => print_json(&output)?,
                    Err(e) => tracing::error!("Failed to resolve manifests: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn resolve_manifests(
    config: &ControllerConfig,
    paths: &[PathBuf],
) -> Result<Value, Box<dyn std::error::Error>> {
    let baseline = config.effective_baseline();
    let mut output = Vec::new();

    for path in paths {
        let manifest = load_manifest(path)?;
        let grouping = group_by_host(manifest.resources);
        logging::report_orphans(&grouping.orphans);

        for group in grouping.groups {
            let resolved = match group {
                ResourceGroup::Standalone(resource) => {
                    vec![resolve_resource(&baseline, &resource, &config.features)]
                }
                ResourceGroup::Mergeable { master, minions } => {
                    let merged = resolve_mergeable(&baseline, &master, &minions, &config.features);
                    std::iter::once(merged.master).chain(merged.minions).collect()
                }
            };
            for resolution in resolved {
                logging::report(&resolution);
                output.push(serde_json::to_value(&resolution)?);
            }
        }
    }

    Ok(Value::Array(output))
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
