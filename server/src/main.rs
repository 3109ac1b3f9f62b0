use clap::Parser;
use sketchsync_server::config::{Args, ServerConfig, DEFAULT_LOG_FILTER};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let filter = match &args.log_filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(error) = sketchsync_server::run(ServerConfig::from(args)).await {
        error!(%error, "server exited");
        std::process::exit(1);
    }
}
