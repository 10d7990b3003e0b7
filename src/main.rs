use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ga4_reporter::cache::CacheStore;
use ga4_reporter::cli::{CacheCommands, Cli, Commands, RunArgs};
use ga4_reporter::client::http::HttpClients;
use ga4_reporter::config::Config;
use ga4_reporter::executor::ReportExecutor;
use ga4_reporter::registry::ReportRegistry;
use ga4_reporter::session::{grouped_properties, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(|p| PathBuf::from(shellexpand::tilde(&p).as_ref()))
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_logging(&config.logging.level);

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_session(args, &config),
        Commands::Reports => {
            list_reports();
            Ok(())
        }
        Commands::Properties => list_properties(&config),
        Commands::Cache { command } => handle_cache(command, &config),
    }
}

/// RUST_LOG wins over the configured level when set.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_session(args: RunArgs, config: &Config) -> Result<()> {
    let cache = CacheStore::new(config.cache_dir(), config.cache_ttl());
    let removed = cache.sweep();
    if removed > 0 {
        tracing::info!("Swept {removed} stale cache entries");
    }

    let registry = ReportRegistry::builtin();
    let executor = ReportExecutor::new(cache);
    let clients = HttpClients::new(
        config.require_token()?,
        config.api.data_endpoint.clone(),
        config.api.admin_endpoint.clone(),
    )?;

    Session::new(&registry, &executor, &clients, &clients, config, args).run()
}

fn list_reports() {
    let registry = ReportRegistry::builtin();
    println!("Available reports:");
    for descriptor in registry.discover() {
        println!("  {:<22} {}", descriptor.key, descriptor.name);
    }
}

fn list_properties(config: &Config) -> Result<()> {
    let clients = HttpClients::new(
        config.require_token()?,
        config.api.data_endpoint.clone(),
        config.api.admin_endpoint.clone(),
    )?;

    let groups = grouped_properties(&clients)?;
    if groups.is_empty() {
        println!("No GA4 accounts are accessible with this token.");
        return Ok(());
    }
    for (account, properties) in groups {
        println!("\n--- Account: {account} ---");
        if properties.is_empty() {
            println!("  No properties found for this account.");
            continue;
        }
        for property in properties {
            println!("  {} (ID: {})", property.display_name, property.property_id);
        }
    }
    Ok(())
}

fn handle_cache(command: CacheCommands, config: &Config) -> Result<()> {
    let cache = CacheStore::new(config.cache_dir(), config.cache_ttl());
    match command {
        CacheCommands::Clear => {
            let removed = cache.clear();
            println!("Removed {removed} cache entries.");
        }
        CacheCommands::Stats => {
            println!("Cache dir: {}", cache.dir().display());
            println!("Entries:   {}", cache.count());
            println!("TTL:       {}s", cache.ttl().as_secs());
        }
    }
    Ok(())
}
