// WHY: Runtime configuration shared by the server, the CLI and editing sessions

use anyhow::{bail, Result};
use clap::ValueEnum;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::debounce::DEFAULT_DEBOUNCE_WINDOW;
use crate::fact_source::gemini::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE};
use crate::fact_source::model::DEFAULT_MODEL_TIMEOUT;
use crate::fact_source::{FactSource, FactSourceChain, FactSourceModel, GeminiBackend, KnowledgeBase};

/// Which fact sources a deployment consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceMode {
    /// Built-in rule matcher only
    KnowledgeBase,
    /// Generative model only
    Model,
    /// Rule matcher first, model as fallback
    #[default]
    Chain,
}

/// Generative model settings
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }
}

/// Editing session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period after the last edit before a check is dispatched
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct FactpadConfig {
    pub bind: SocketAddr,
    pub sources: SourceMode,
    pub model: ModelConfig,
    pub session: SessionConfig,
    /// Extra knowledge base entries loaded on top of the built-in table
    pub knowledge_base: Option<PathBuf>,
    pub api_base_url: String,
}

impl Default for FactpadConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            sources: SourceMode::default(),
            model: ModelConfig::default(),
            session: SessionConfig::default(),
            knowledge_base: None,
            api_base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

impl FactpadConfig {
    fn knowledge_source(&self) -> Result<Arc<dyn FactSource>> {
        let mut kb = KnowledgeBase::builtin();
        if let Some(path) = &self.knowledge_base {
            kb.extend_from_json_file(path)?;
        }
        Ok(Arc::new(kb))
    }

    fn model_source(&self) -> Option<Arc<dyn FactSource>> {
        let api_key = self.model.api_key.as_deref().filter(|key| !key.trim().is_empty())?;
        let backend = GeminiBackend::new(api_key)
            .with_model(&self.model.model)
            .with_base_url(&self.model.base_url);
        Some(Arc::new(FactSourceModel::with_timeout(
            Arc::new(backend),
            self.model.timeout,
        )))
    }

    /// Assemble the fact source chain for the configured mode
    /// WHY: chain mode without an API key degrades to the knowledge base; model mode cannot
    pub fn build_chain(&self) -> Result<FactSourceChain> {
        let chain = match self.sources {
            SourceMode::KnowledgeBase => FactSourceChain::new().with_source(self.knowledge_source()?),
            SourceMode::Model => match self.model_source() {
                Some(model) => FactSourceChain::new().with_source(model),
                None => bail!("Model fact source requires GEMINI_API_KEY"),
            },
            SourceMode::Chain => {
                let chain = FactSourceChain::new().with_source(self.knowledge_source()?);
                match self.model_source() {
                    Some(model) => chain.with_source(model),
                    None => {
                        warn!("GEMINI_API_KEY not set, using the knowledge base only");
                        chain
                    }
                }
            }
        };

        info!(sources = ?chain.source_names(), "Fact source chain ready");
        Ok(chain)
    }
}
