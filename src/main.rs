use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use factpad::config::{FactpadConfig, ModelConfig, SessionConfig, SourceMode};
use factpad::dispatcher::LocalVerifier;
use factpad::editor::EditingSession;
use factpad::protocol::FactCheckResponse;
use factpad::server;

#[derive(Parser, Debug)]
#[command(name = "factpad")]
#[command(about = "Incremental fact-checking for a note-taking editor")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Fact sources to consult
    #[arg(long, value_enum, default_value_t = SourceMode::Chain)]
    sources: SourceMode,

    /// Generative model API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Generative model name
    #[arg(long, default_value = factpad::fact_source::gemini::DEFAULT_GEMINI_MODEL)]
    gemini_model: String,

    /// Generative model API base URL
    #[arg(long, default_value = factpad::fact_source::gemini::GEMINI_API_BASE)]
    gemini_base_url: String,

    /// Upper bound on one model call
    #[arg(long, default_value_t = 5000)]
    model_timeout_ms: u64,

    /// Quiet period after the last keystroke before a check is sent
    #[arg(long, default_value_t = 3000)]
    debounce_ms: u64,

    /// JSON file with extra knowledge base entries
    #[arg(long)]
    knowledge_base: Option<PathBuf>,

    /// Base URL of the verification server used by API clients
    #[arg(long, env = "FACTPAD_API_BASE_URL", default_value = "http://127.0.0.1:5000")]
    api_base_url: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the verification server
    Serve {
        /// Listen address
        #[arg(long, env = "FACTPAD_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
    },
    /// Check one sentence and print the response body
    Check { sentence: String },
    /// Type a file into an editing session and print the highlighted result
    Replay { file: PathBuf },
}

impl Args {
    fn config(&self) -> FactpadConfig {
        let mut config = FactpadConfig {
            sources: self.sources,
            model: ModelConfig {
                api_key: self.gemini_api_key.clone(),
                model: self.gemini_model.clone(),
                base_url: self.gemini_base_url.clone(),
                timeout: Duration::from_millis(self.model_timeout_ms),
            },
            session: SessionConfig {
                debounce: Duration::from_millis(self.debounce_ms),
            },
            knowledge_base: self.knowledge_base.clone(),
            api_base_url: self.api_base_url.clone(),
            ..FactpadConfig::default()
        };
        if let Command::Serve { bind } = &self.command {
            config.bind = *bind;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: .env lets local runs pick up GEMINI_API_KEY without exporting it
    dotenvy::dotenv().ok();

    // WHY: structured JSON logging keeps server output machine-readable
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let args = Args::parse();
    info!(command = ?args.command, sources = ?args.sources, "Starting factpad");

    let config = args.config();
    let chain = config.build_chain()?;

    match args.command {
        Command::Serve { .. } => {
            let listener = TcpListener::bind(config.bind)
                .await
                .with_context(|| format!("Failed to bind {}", config.bind))?;
            server::serve(listener, chain).await?;
        }
        Command::Check { sentence } => {
            let corrections = chain.check(&sentence).await.into_corrections();
            let body = serde_json::to_string_pretty(&FactCheckResponse { corrections })?;
            println!("{body}");
        }
        Command::Replay { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let mut session = EditingSession::new(Arc::new(LocalVerifier::new(chain)), &config.session)?;
            let mut typed = String::with_capacity(text.len());
            for ch in text.chars() {
                typed.push(ch);
                // WHY: pausing after each newly completed sentence mimics a typist who lets the check fire
                if session.apply_edit(typed.clone()).scheduled.is_some() {
                    session.settle().await;
                }
            }
            session.settle().await;

            println!("{}", session.render().to_html());
            println!("Flagged sentences: {}", session.flagged_count());
        }
    }

    Ok(())
}
