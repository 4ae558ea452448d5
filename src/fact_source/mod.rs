// WHY: Fact sources are interchangeable strategies behind one trait
// Deployments pick the knowledge base, the model, or both chained in order.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::corrections::FactCheckVerdict;

pub mod gemini;
pub mod knowledge_base;
pub mod model;

pub use gemini::GeminiBackend;
pub use knowledge_base::{KnowledgeBase, KnowledgeEntry};
pub use model::{FactSourceModel, ModelBackend, ModelOutcome};

/// Anything that turns a sentence into a verdict
#[async_trait]
pub trait FactSource: Send + Sync {
    fn name(&self) -> &str;

    /// Must always resolve to a determinate verdict, never panic or hang
    async fn check(&self, sentence: &str) -> FactCheckVerdict;
}

/// Ordered list of fact sources consulted until one flags the sentence
#[derive(Clone, Default)]
pub struct FactSourceChain {
    sources: Vec<Arc<dyn FactSource>>,
}

impl FactSourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source consulted after those already present
    pub fn with_source(mut self, source: Arc<dyn FactSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// First `Corrected` verdict wins; otherwise `Inconclusive` if any source could not decide
    pub async fn check(&self, sentence: &str) -> FactCheckVerdict {
        let mut inconclusive = self.sources.is_empty();

        for source in &self.sources {
            match source.check(sentence).await {
                FactCheckVerdict::Corrected(corrections) if !corrections.is_empty() => {
                    debug!(source = source.name(), count = corrections.len(), "Sentence flagged");
                    return FactCheckVerdict::Corrected(corrections);
                }
                FactCheckVerdict::Inconclusive => {
                    debug!(source = source.name(), "Fact source inconclusive");
                    inconclusive = true;
                }
                _ => {}
            }
        }

        if inconclusive {
            FactCheckVerdict::Inconclusive
        } else {
            FactCheckVerdict::NoIssue
        }
    }
}
