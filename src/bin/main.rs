use clap::Parser;
use fund_qa_assistant::{
    config::{AssistantConfig, ClassifierBackend},
    AnswerResolver, DataStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Asked when no questions are given on the command line
const REFERENCE_QUESTIONS: [&str; 3] = [
    "What is the total Yearly P&L for all funds combined?",
    "What is the total number of trades for Northpoint 401K?",
    "Who is the manager of the Garfield fund?",
];

#[derive(Parser, Debug)]
#[command(name = "fund-qa", about = "Answer questions about fund holdings and trades")]
struct Cli {
    /// Holdings CSV (overrides FUND_QA_HOLDINGS_PATH)
    #[arg(long)]
    holdings: Option<PathBuf>,

    /// Trades CSV (overrides FUND_QA_TRADES_PATH)
    #[arg(long)]
    trades: Option<PathBuf>,

    /// keyword or zero-shot (overrides FUND_QA_CLASSIFIER)
    #[arg(long)]
    classifier: Option<String>,

    /// Print the rule and top intent behind each answer
    #[arg(long)]
    trace: bool,

    /// Questions to ask, in order
    questions: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AssistantConfig::from_env()?;
    if let Some(path) = cli.holdings {
        config.holdings_path = path;
    }
    if let Some(path) = cli.trades {
        config.trades_path = path;
    }
    if let Some(backend) = cli.classifier.as_deref() {
        config.classifier = backend.parse::<ClassifierBackend>()?;
    }

    info!("Fund Q&A assistant starting");

    let store = Arc::new(DataStore::load(&config.holdings_path, &config.trades_path)?);
    let classifier = config.build_classifier()?;

    info!(classifier = classifier.name(), "Classifier ready");

    let resolver = AnswerResolver::new(store, classifier);

    let questions: Vec<String> = if cli.questions.is_empty() {
        REFERENCE_QUESTIONS.iter().map(|q| q.to_string()).collect()
    } else {
        cli.questions
    };

    for (i, question) in questions.iter().enumerate() {
        let resolution = resolver.resolve(question).await?;

        println!("\n--- QUESTION {}:", i + 1);
        println!("Q: {}", question);
        println!("A: {}", resolution.answer);

        if cli.trace {
            match &resolution.top_intent {
                Some(top) => println!(
                    "   rule={} route={} intent=\"{}\" score={:.3}",
                    resolution.rule, resolution.route, top.label, top.score
                ),
                None => println!(
                    "   rule={} route={} intent=none",
                    resolution.rule, resolution.route
                ),
            }
        }
    }

    info!(
        answered = resolver.audit_log().len().await,
        "Session complete"
    );

    Ok(())
}
