//! `POST /user` demo service.
//!
//! Run with:
//!   cargo run -- --bind 127.0.0.1:5000 --debug
//!
//! Try:
//!   curl -i -X POST http://127.0.0.1:5000/user \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"Ann","age":30,"email":"a@b.com"}'
//!   curl -i -X POST http://127.0.0.1:5000/user -d '{"name":"Ann"}'

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use vetted::{Server, user};

#[derive(Parser)]
#[command(name = "vetted", version)]
#[command(about = "Schema-validated POST /user endpoint", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "VETTED_BIND", default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Log at debug level (RUST_LOG, when set, takes precedence)
    #[arg(long, env = "VETTED_DEBUG", default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match Server::bind(cli.bind).serve(user::router()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
