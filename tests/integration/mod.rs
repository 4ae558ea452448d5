// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use factpad::config::SessionConfig;
use factpad::corrections::Correction;
use factpad::dispatcher::SentenceVerifier;
use factpad::editor::EditingSession;
use factpad::error::VerificationError;
use factpad::fact_source::{FactSourceChain, KnowledgeBase};
use factpad::server;

/// Verification server bound to an ephemeral local port
pub struct TestServer {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start(chain: FactSourceChain) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, server::router(chain)).await.expect("Test server failed");
        });
        Self { addr, handle }
    }

    /// Server backed by the built-in knowledge base
    pub async fn with_knowledge_base() -> Self {
        Self::start(FactSourceChain::new().with_source(Arc::new(KnowledgeBase::builtin()))).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Verifier that records every request and answers from the built-in knowledge base
pub struct RecordingVerifier {
    requests: Mutex<Vec<String>>,
    knowledge: KnowledgeBase,
}

impl RecordingVerifier {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            knowledge: KnowledgeBase::builtin(),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SentenceVerifier for RecordingVerifier {
    async fn verify(&self, sentence: &str) -> Result<Vec<Correction>, VerificationError> {
        self.requests.lock().unwrap().push(sentence.to_string());
        Ok(self.knowledge.lookup(sentence))
    }
}

pub fn session_with(verifier: Arc<dyn SentenceVerifier>, window: Duration) -> EditingSession {
    EditingSession::new(verifier, &SessionConfig { debounce: window }).expect("Session creation should succeed")
}

/// Feed text one character at a time, returning the final raw text
pub fn type_text(session: &mut EditingSession, prefix: &str, text: &str) -> String {
    let mut typed = prefix.to_string();
    for ch in text.chars() {
        typed.push(ch);
        session.apply_edit(typed.clone());
    }
    typed
}
