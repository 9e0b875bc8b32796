use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ticket_enricher::agents::graph::mermaid_diagram;
use ticket_enricher::api::{self, AppState};
use ticket_enricher::config::Config;
use ticket_enricher::llm::create_llm_provider;
use ticket_enricher::tools::ComposioClient;
use ticket_enricher::trigger::{EnrichmentRunner, RunnerSettings, TicketDispatcher};

#[derive(Debug, Parser)]
#[command(name = "ticket-enricher", about = "Enrich new tickets with repository pointers")]
struct Args {
    /// Print the agent graph as Mermaid and exit
    #[arg(long)]
    print_graph: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_graph {
        println!("{}", mermaid_diagram());
        return Ok(());
    }

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ticket_enricher=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let llm = create_llm_provider(&config.llm).context("Failed to create LLM provider")?;
    tracing::info!(backend = %config.llm.backend, model = llm.model_name(), "LLM provider ready");

    let executor = Arc::new(ComposioClient::new(&config.composio));
    let runner = Arc::new(EnrichmentRunner::new(
        llm,
        executor,
        RunnerSettings::from_config(&config),
    ));

    tracing::info!(projects = config.projects.len(), "Project allow-list loaded");
    let dispatcher = Arc::new(TicketDispatcher::new(config.projects.clone(), runner));

    let app = api::router(AppState::new(dispatcher, config.webhook_secret.clone()));

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
