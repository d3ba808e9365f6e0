//! CLI entry point (spec section 6): `datcom query "<text>" [--collection C]
//! [--top-k N] [--retrieve-only] [--debug]`.
//!
//! Exit codes: 0 success, 2 user error, 3 config error, 4 fatal runtime error.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datcom_core::agent::ReasoningAgent;
use datcom_core::chat_client::ChatClient;
use datcom_core::embedding_client::EmbedClient;
use datcom_core::errors::UserError;
use datcom_core::retrieval_tools;
use datcom_core::router::IntentRouter;
use datcom_core::tool_registry::ToolRegistry;
use datcom_core::vector_store::{MetadataFilter, VectorStoreAdapter};
use datcom_core::{Config, Workflow, WorkflowState};

#[derive(Parser)]
#[command(name = "datcom", about = "UAV/DATCOM aerodynamic design query engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a design question or generate a DATCOM `.dat` input file.
    Query {
        text: String,
        #[arg(long)]
        collection: Option<String>,
        /// Falls back to `DEFAULT_TOP_K` from the environment when omitted.
        #[arg(long)]
        top_k: Option<usize>,
        /// Skip the workflow entirely and only run the semantic retrieval tool.
        #[arg(long)]
        retrieve_only: bool,
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {}", e);
            ExitCode::from(4)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let Command::Query {
        text,
        collection,
        top_k,
        retrieve_only,
        debug,
    } = cli.command;

    init_logging(debug);
    dotenvy::dotenv().ok();

    if text.trim().is_empty() {
        eprintln!("error: {}", UserError::EmptyQuery);
        return Ok(ExitCode::from(2));
    }
    if top_k == Some(0) {
        eprintln!("error: {}", UserError::InvalidTopK("0".to_string()));
        return Ok(ExitCode::from(2));
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {:#}", e);
            return Ok(ExitCode::from(3));
        }
    };

    info!("configuration loaded");

    let top_k = top_k.unwrap_or(config.default_top_k);

    let store = match VectorStoreAdapter::connect(&config.vector_db_url, 8) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("configuration error: {:#}", e);
            return Ok(ExitCode::from(3));
        }
    };
    let embed = Arc::new(EmbedClient::with_tls_verification(
        &config.embed_api_base,
        &config.embed_api_key,
        &config.embed_model,
        config.embed_batch_size,
        config.verify_ssl,
    ));
    let chat = ChatClient::with_tls_verification(
        &config.chat_api_base,
        &config.chat_api_key,
        &config.chat_model,
        config.verify_ssl,
    );

    let default_collection = collection.unwrap_or_else(|| "default".to_string());

    if retrieve_only {
        let vector = embed.embed_query(&text).await?;
        let filter = MetadataFilter::default();
        let docs = store
            .similarity_search(&default_collection, &vector, top_k, &filter)
            .await?;
        for doc in docs {
            println!("(source: {}) [similarity={:.3}]\n{}\n", doc.source, doc.similarity, doc.content);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut registry = ToolRegistry::new();
    datcom_core::tool_registry::register_pure_tools(&mut registry);
    retrieval_tools::register_all(
        &mut registry,
        store.clone(),
        embed.clone(),
        &default_collection,
        config.content_max_length,
    );
    let registry = Arc::new(registry);

    let router = IntentRouter::new(chat.clone());
    let agent = ReasoningAgent::with_temperature(
        chat.clone(),
        registry.clone(),
        config.agent_max_steps,
        config.temperature,
    );
    let workflow = Workflow::new(router, agent, chat);

    let state = WorkflowState::new(text);
    let cancellation = CancellationToken::new();

    match workflow.run(state, cancellation).await {
        Ok(final_state) => {
            println!("{}", final_state.generation.unwrap_or_default());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("workflow error: {}", e);
            eprintln!("error: {}", e);
            Ok(ExitCode::from(4))
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "datcom_core=debug,info" } else { "datcom_core=info,warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
