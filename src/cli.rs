//! Command line interface

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "tradeproxy", version, about = "Static asset server with a trade-data API proxy")]
pub struct Cli {
    /// Directory static assets are served from (overrides `static_files.root`)
    pub root: Option<PathBuf>,

    /// Configuration file, without extension
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Listen host (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.static_files.root.clone_from(root);
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
