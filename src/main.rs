use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use sigcount::server;
use sigcount::utils::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "sigcount")]
#[command(about = "Signature counting service for scanned documents")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Address to listen on, overrides `host_url` from the configuration
    #[arg(long, short = 'a')]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_ort()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigcount=info,tower_http=debug".into()),
        )
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load_default()?,
    };

    run_server(args.addr, &config).await?;

    Ok(())
}

fn setup_ort() -> Result<(), Box<dyn std::error::Error>> {
    let dylib_path =
        env::var("ORT_DYLIB_PATH").unwrap_or_else(|_| "/usr/lib/libonnxruntime.so".to_string());

    ort::init_from(dylib_path)
        .with_execution_providers([ort::execution_providers::CUDAExecutionProvider::default()
            .with_device_id(0)
            .build()])
        .commit()?;

    Ok(())
}

async fn run_server(
    addr: Option<String>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = addr
        .or_else(|| env::var("SIGCOUNT_ADDR").ok())
        .unwrap_or_else(|| config.host_url.to_string());

    let socket_addr: SocketAddr = addr.parse()?;

    let state = server::build_state(config)?;

    server::start_server(socket_addr, state).await?;

    Ok(())
}
