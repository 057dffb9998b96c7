use clap::Parser;
use conversation_intent_classifier::{
    config::{Backend, Config},
    pipeline::{process_conversations, BatchOptions, OutputPaths},
    IntentClassifier,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Multi-turn intent classification for WhatsApp-style conversations
#[derive(Parser, Debug)]
#[command(name = "classify-intents")]
#[command(about = "Classify chat conversations into sales intents with rationales")]
struct Args {
    /// Path to input JSON file
    #[arg(long, default_value = "sample_input.json")]
    input: PathBuf,

    /// Path for output JSON file
    #[arg(long, default_value = "output.json")]
    output_json: PathBuf,

    /// Path for output CSV file
    #[arg(long, default_value = "output.csv")]
    output_csv: PathBuf,

    /// Zero-shot backend: "huggingface" or "keyword" (overrides INTENT_MODEL_BACKEND)
    #[arg(long)]
    backend: Option<String>,

    /// Add confidence and key signals to the reports
    #[arg(long)]
    detailed: bool,

    /// Debug-level logging (RUST_LOG still wins when set)
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(backend) = &args.backend {
        config.backend = backend.parse::<Backend>()?;
    }

    if config.backend == Backend::HuggingFace && config.api_token.is_none() {
        info!("HF_API_TOKEN not set, calling the inference API anonymously");
    }

    let classifier = IntentClassifier::new(config.build_model()?);
    info!(backend = %config.backend, model = classifier.model_name(), "Classifier ready");

    let outputs = OutputPaths {
        json: args.output_json,
        csv: args.output_csv,
    };
    let options = BatchOptions {
        detailed: args.detailed,
    };

    let summary = process_conversations(&args.input, &outputs, &classifier, options).await?;

    println!("\n{}", summary);
    println!("Processing complete!");

    Ok(())
}
