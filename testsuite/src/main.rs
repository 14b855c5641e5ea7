use anyhow::Result;
use axum::http::StatusCode;
use clap::Parser;
use sparql_kit_testsuite::{serve, FakeFusekiOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
/// Fake Fuseki server backed by an in-memory store
struct Args {
    /// Host and port the server listens on
    #[arg(short, long, default_value = "localhost:3030")]
    bind: String,
    /// Answer SPARQL requests sent with POST with this status, like 405 or 422
    #[arg(long, value_name = "STATUS")]
    reject_post: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let reject_post = args.reject_post.map(StatusCode::from_u16).transpose()?;
    serve(
        &args.bind,
        FakeFusekiOptions {
            reject_post,
            authorization: None,
        },
    )
    .await
}
