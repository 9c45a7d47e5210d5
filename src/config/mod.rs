pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bowling-hub")]
#[command(about = "Browse bowling venues, reviews and city hub pages")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the content API base URL
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Override the number of retries for transient failures
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a city name to its hub page
    Hub { city: String },
    /// List every known city hub
    Hubs,
    /// List venues, optionally for one city
    Venues {
        #[arg(long)]
        city: Option<String>,
    },
    /// Show one venue with its reviews
    Venue { id: String },
    /// List blog posts, or show one by slug
    Blog { slug: Option<String> },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(url) = &self.api_base_url {
            config.api.base_url = Some(url.clone());
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = Some(max_retries);
        }

        Ok(config)
    }
}
