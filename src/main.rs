//! Panen CLI - palm productivity inference server
//!
//! # Commands
//!
//! - `serve` - Start the prediction server
//! - `info` - Inspect a model artifact

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use panen::{
    api::{create_router, AppState},
    error::{PanenError, Result},
    model::GbtModel,
    service::Predictor,
};

/// Panen - palm productivity prediction over HTTP
///
/// Loads a pretrained gradient-boosted tree model and a reference
/// dataset at startup, then serves batch predictions.
#[derive(Parser)]
#[command(name = "panen")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction server
    Serve {
        /// Path to the serialized model artifact (JSON)
        #[arg(long, conflicts_with = "demo")]
        model: Option<PathBuf>,

        /// Path to the reference dataset CSV used to build category
        /// vocabularies
        #[arg(long, requires = "model")]
        dataset: Option<PathBuf>,

        /// Use the built-in demo model instead of loading artifacts
        #[arg(long)]
        demo: bool,

        /// Host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Maximum number of instances accepted per request
        #[arg(long, default_value_t = panen::api::DEFAULT_MAX_BATCH)]
        max_batch: usize,
    },
    /// Inspect a model artifact
    Info {
        /// Path to the serialized model artifact (JSON)
        #[arg(long)]
        model: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            model,
            dataset,
            demo,
            host,
            port,
            max_batch,
        } => {
            let state = if demo {
                println!("Starting Panen inference server (demo mode)...");
                AppState::demo()?
            } else {
                let (Some(model), Some(dataset)) = (model, dataset) else {
                    eprintln!("Error: either --demo or both --model and --dataset are required");
                    eprintln!();
                    eprintln!("Usage:");
                    eprintln!("  panen serve --demo");
                    eprintln!("  panen serve --model xgb_model_palm.json \\");
                    eprintln!("              --dataset palm_productivity_timeseries.csv");
                    std::process::exit(1);
                };
                load_state(&model, &dataset)
            };

            serve(state.with_max_batch(max_batch), &host, port).await?;
        }
        Commands::Info { model } => {
            let model = GbtModel::load(&model)?;
            println!("Panen model artifact");
            println!("  format version: {}", panen::model::FORMAT_VERSION);
            println!("  features:       {}", model.n_features());
            println!("  trees:          {}", model.tree_count());
            println!("  base score:     {}", model.base_score());
        }
    }

    Ok(())
}

/// Run the fallible startup load. On failure the server still starts,
/// but in the failed state: /predict answers 503 with the reason.
fn load_state(model_path: &PathBuf, dataset_path: &PathBuf) -> AppState {
    println!("Loading model from: {}", model_path.display());
    println!("Building vocabularies from: {}", dataset_path.display());

    match Predictor::load(model_path, dataset_path) {
        Ok(predictor) => {
            println!(
                "Model and preprocessing vocabularies loaded successfully ({} trees).",
                predictor.tree_count()
            );
            AppState::ready(predictor)
        }
        Err(e) => {
            eprintln!("FATAL: could not load model or vocabularies: {e}");
            eprintln!("Serving anyway; /predict will return 503 until restart.");
            AppState::failed(e.to_string())
        }
    }
}

async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse().map_err(|e| {
        PanenError::Server {
            reason: format!("invalid address: {e}"),
        }
    })?;

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /         - Welcome message");
    println!("  GET  /health   - Readiness check");
    println!("  GET  /metrics  - Prometheus metrics");
    println!("  POST /predict  - Batch prediction");
    println!();
    println!("Example:");
    println!("  curl http://{addr}/health");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PanenError::Server {
            reason: format!("failed to bind {addr}: {e}"),
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PanenError::Server {
            reason: format!("server error: {e}"),
        })?;

    Ok(())
}
