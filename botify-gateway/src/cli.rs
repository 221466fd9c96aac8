//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::GatewayConfig;

#[derive(Parser)]
#[command(name = "botify-gateway")]
#[command(about = "Botify recommendation chat gateway", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway (config from env; bind can override BIND_ADDR).
    Run {
        #[arg(short, long)]
        bind: Option<String>,
    },
}

/// Load GatewayConfig from environment. If `bind` is provided it overrides
/// BIND_ADDR.
pub fn load_config(bind: Option<String>) -> Result<GatewayConfig> {
    GatewayConfig::load(bind)
}
