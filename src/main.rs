//! devspec - Main entry point
//!
//! Wires the Linux host providers and the configured override table into a
//! `CapabilityResolver` and prints what it resolves.

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use devspec::cli::{Cli, Commands};
use devspec::hardware::props::MapPropertyStore;
use devspec::types::CapabilityKind;
use devspec::{CapabilityResolver, DevspecConfig, HostProviders};

/// Initialize logging; RUST_LOG overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {:?}", cli);

    match cli.command.clone().unwrap_or(Commands::All { json: false }) {
        Commands::Validate { config } => {
            info!("Validating configuration file: {:?}", config);
            let result = DevspecConfig::load_from_file(&config).and_then(|c| c.validate());
            match result {
                Ok(()) => println!("✓ Configuration file is valid: {:?}", config),
                Err(e) => {
                    error!("Configuration validation failed: {:#}", e);
                    eprintln!("✗ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Defaults => {
            let json = serde_json::to_string_pretty(&DevspecConfig::default())
                .context("Failed to serialize default configuration")?;
            println!("{}", json);
        }
        Commands::Show { kind, labelled } => {
            let resolver = build_resolver(&cli)?;
            let result = match (kind, labelled) {
                (CapabilityKind::StorageSize, true) => resolver.storage_info(),
                (CapabilityKind::RamSize, true) => resolver.ram_info(),
                _ => resolver.resolve(kind),
            };
            match result {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("✗ {}: {}", kind.label(), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::All { json } => {
            let resolver = build_resolver(&cli)?;
            let report = resolver.report();
            if json {
                let out = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize capability report")?;
                println!("{}", out);
            } else {
                for entry in &report {
                    match (&entry.value, &entry.error) {
                        (Some(value), _) => println!("{:<14} {}", entry.kind.label(), value),
                        (None, Some(e)) => println!("{:<14} unavailable ({})", entry.kind.label(), e),
                        (None, None) => println!("{:<14} unavailable", entry.kind.label()),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load configuration, apply CLI options and wire the Linux host.
fn build_resolver(cli: &Cli) -> Result<CapabilityResolver> {
    let config = DevspecConfig::discover(cli.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    let overlay = MapPropertyStore::from_assignments(&cli.props)
        .context("Invalid --prop assignment")?;
    if !overlay.is_empty() {
        debug!("{} properties set on the command line", cli.props.len());
    }

    let host = HostProviders::linux(&config.host, overlay);
    let mut resolver = CapabilityResolver::from_config(&config, host);
    if let Some(data_dir) = &cli.data_dir {
        resolver = resolver.with_data_dir(data_dir);
    }

    info!("Resolving against data dir {:?}", resolver.data_dir());
    Ok(resolver)
}
