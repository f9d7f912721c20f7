use anyhow::Result;
use bichrome::persistence::{DEFAULT_MODEL_PATH, ModelStore};
use bichrome::server::{self, DEFAULT_PORT, Server};
use bichrome::service::ClassifierService;
use bichrome::training::TrainingSet;
use clap::Parser;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bichrome-server",
    version,
    about = "Serves two-class image classification decisions over TCP"
)]
struct Cli {
    /// Directory of class-A sample images.
    class_a: PathBuf,
    /// Directory of class-B sample images.
    class_b: PathBuf,
    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Where the trained classifier is persisted across restarts.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let set = TrainingSet {
        class_a: cli.class_a,
        class_b: cli.class_b,
    };
    let store = ModelStore::new(cli.model_path);

    // Claim the port before the potentially long train-or-load step.
    let listener = TcpListener::bind(("0.0.0.0", cli.port))?;

    let service = Arc::new(ClassifierService::initialize(&set, &store)?);
    server::install_shutdown_flush(store, Arc::clone(&service))?;

    let server = Server::from_listener(listener, service);
    info!(port = cli.port, "ready to predict");
    server.serve()?;
    Ok(())
}
