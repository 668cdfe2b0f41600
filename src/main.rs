use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use log::info;

use amygdala::server::{self, AppState};
use amygdala::{BuiltinModel, Classifier, FeedbackStore, ModelManager, DEFAULT_THRESHOLD};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Path to the feedback database
    #[arg(long, default_value = "feedback_data.db")]
    db: String,

    /// Decision threshold for label membership
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,
}

async fn ensure_model_downloaded(fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let manager = ModelManager::new_default()?;
    let model = BuiltinModel::ToxicBert;

    if fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(model)?;
    }

    manager.ensure_model_downloaded(model).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting toxicity classification service ===");

    // Model artifacts are fetched and verified before anything binds
    ensure_model_downloaded(args.fresh).await?;

    info!("Building classifier...");
    let classifier = Classifier::builder()
        .with_model(BuiltinModel::ToxicBert)?
        .with_threshold(args.threshold)?
        .build()?;
    info!("Classifier ready (threshold: {})", args.threshold);

    let store = FeedbackStore::open(&args.db)?;
    info!("Feedback store open at {}", args.db);

    let state = AppState {
        scorer: Arc::new(classifier),
        store: Arc::new(store),
        threshold: args.threshold,
    };

    server::serve(args.addr, state).await?;
    Ok(())
}
