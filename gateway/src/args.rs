use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// HTTP identity gateway behind an mTLS-terminating reverse proxy.
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about)]
pub struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overrides `server.listen_address`.
    #[arg(short, long)]
    pub listen_address: Option<SocketAddr>,

    /// Log filter, e.g. "info" or "server=debug,config=debug".
    #[arg(long, default_value = "info")]
    pub log: String,
}
