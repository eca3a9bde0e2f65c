//! relayd: forge webhook listener that mirrors pushes to the client remote
//! and rejects pushes introducing Indonesian comments.
//!
//! Configuration comes from the environment (`LOCAL_REPOS_ROOT`,
//! `CLIENT_REMOTE_PREFIX`, `OPENAI_API_KEY`); the listen address is the only
//! flag.

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;

use relay_core::Config;
use relay_daemon::{run, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "relayd",
    version,
    about = "Mirror forge pushes to the client remote, enforcing the comment-language policy"
)]
struct Cli {
    /// Address to listen on for forge webhooks.
    #[arg(long, default_value = "0.0.0.0:8787")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env();
    if config.client_remote_prefix.is_none() {
        tracing::warn!(
            "CLIENT_REMOTE_PREFIX is not set, every push will fail with a configuration error"
        );
    }
    tracing::info!(repos_root = %config.repos_root.display(), "starting relayd");

    run(cli.bind, AppState::new(config)).await?;
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
