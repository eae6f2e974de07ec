use anyhow::Result;
use axum::Router;
use clap::Parser;
use ftsearch_server::{build_app, AppConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Integer field holding the document id
    #[arg(long, default_value = "id")]
    id_field: String,
    /// Fields to leave out of the index
    #[arg(long)]
    ignore: Vec<String>,
    /// Index literal words instead of stems
    #[arg(long, default_value_t = false)]
    no_stem: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = AppConfig {
        id_field: args.id_field,
        ignore: args.ignore,
        no_stem: args.no_stem,
        admin_token: std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
    };
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, indexing endpoints are open");
    }
    let app: Router = build_app(config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
