use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LOG_FILTER: &str = "sketchsync_server=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// Directory with the client bundle and index.html.
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
    /// Overrides RUST_LOG, e.g. `sketchsync_server=debug`.
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub public_dir: Option<PathBuf>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let public_dir = args
            .public_dir
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
        Self {
            addr: SocketAddr::new(args.host, args.port),
            public_dir: Some(public_dir),
        }
    }
}
