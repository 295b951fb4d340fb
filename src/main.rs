use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conversation_coach::transport::{event_channel, NatsTransport};
use conversation_coach::{
    create_router, AppState, Config, ConversationSession, Evaluator, OpenAiEvaluator,
    SessionController, SessionHandle, Transcript,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "conversation-coach",
    version,
    about = "Rehearse difficult conversations and get scored feedback"
)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/conversation-coach")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the practice API
    Serve,

    /// Evaluate a saved transcript and print the result as JSON
    Evaluate {
        /// Transcript JSON file
        #[arg(short, long)]
        transcript: String,

        /// Scenario description the conversation was practising
        #[arg(short, long)]
        scenario: String,

        /// Focus area for the feedback (repeatable)
        #[arg(short, long = "focus")]
        focus: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Evaluate {
            transcript,
            scenario,
            focus,
        } => evaluate(cfg, &transcript, &scenario, &focus).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    info!("Agent: {} via NATS at {}", cfg.agent.agent_id, cfg.agent.nats_url);
    info!("Evaluation model: {}", cfg.evaluation.model);
    if cfg.evaluation.api_key.is_none() {
        info!("No evaluation API key configured; evaluations will use the fallback result");
    }

    let (events_tx, events_rx) = event_channel();
    let transport = NatsTransport::new(cfg.agent.nats_url.clone(), events_tx);
    let evaluator = OpenAiEvaluator::from_config(&cfg.evaluation);

    let controller =
        SessionController::new(Arc::new(transport), Arc::new(evaluator), cfg.agent.clone());
    let (session, _dispatch) =
        SessionHandle::spawn(controller, ConversationSession::new(), events_rx);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(session)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn evaluate(cfg: Config, path: &str, scenario: &str, focus: &[String]) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read transcript {}", path))?;
    let transcript: Transcript =
        serde_json::from_str(&raw).with_context(|| format!("Invalid transcript {}", path))?;

    info!(
        "Evaluating {} utterances from {}",
        transcript.message_count(),
        path
    );

    let evaluator = OpenAiEvaluator::from_config(&cfg.evaluation);
    let result = evaluator.evaluate(&transcript, scenario, focus).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
