// WHY: Decides which sentences reach a fact source and folds results into the store
// Requests are deduplicated against the store and the in-flight set; failures are
// absorbed here so the user only ever sees the absence of a highlight.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::corrections::{Correction, CorrectionStore, FactCheckVerdict};
use crate::error::VerificationError;
use crate::fact_source::FactSourceChain;

/// Where verification requests go: the remote endpoint or an in-process chain
#[async_trait]
pub trait SentenceVerifier: Send + Sync {
    async fn verify(&self, sentence: &str) -> Result<Vec<Correction>, VerificationError>;
}

/// Verifier that runs a fact source chain in-process
pub struct LocalVerifier {
    chain: FactSourceChain,
}

impl LocalVerifier {
    pub fn new(chain: FactSourceChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl SentenceVerifier for LocalVerifier {
    async fn verify(&self, sentence: &str) -> Result<Vec<Correction>, VerificationError> {
        match self.chain.check(sentence).await {
            FactCheckVerdict::NoIssue => Ok(Vec::new()),
            FactCheckVerdict::Corrected(corrections) => Ok(corrections),
            FactCheckVerdict::Inconclusive => Err(VerificationError::Inconclusive),
        }
    }
}

/// Why a dispatch did not happen; a policy decision, not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    AlreadyCached,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchDecision {
    Dispatched,
    Suppressed(SuppressReason),
}

/// Result of a verification request, delivered back to the event loop
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationFinished {
    /// Document epoch the request was sent under
    pub epoch: u64,
    pub sentence: String,
    pub result: Result<Vec<Correction>, VerificationError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Stored { flagged: bool },
    /// A faster duplicate already populated the entry
    AlreadyPresent,
    /// Left unset so the next edit can retry
    Discarded(VerificationError),
    /// Sent for a document that has since been replaced
    Abandoned,
}

/// Rate-limited, deduplicated bridge from the editing surface to a verifier
pub struct VerificationDispatcher<E> {
    verifier: Arc<dyn SentenceVerifier>,
    in_flight: HashSet<String>,
    events: UnboundedSender<E>,
    wrap: fn(VerificationFinished) -> E,
    dispatched: u64,
    epoch: u64,
}

impl<E: Send + 'static> VerificationDispatcher<E> {
    pub fn new(
        verifier: Arc<dyn SentenceVerifier>,
        events: UnboundedSender<E>,
        wrap: fn(VerificationFinished) -> E,
    ) -> Self {
        Self {
            verifier,
            in_flight: HashSet::new(),
            events,
            wrap,
            dispatched: 0,
            epoch: 0,
        }
    }

    /// Send the sentence for verification unless it is cached or already in flight
    pub fn dispatch(&mut self, sentence: &str, store: &CorrectionStore) -> DispatchDecision {
        if store.contains(sentence) {
            debug!(sentence, "Dispatch suppressed: already cached");
            return DispatchDecision::Suppressed(SuppressReason::AlreadyCached);
        }
        if self.in_flight.contains(sentence) {
            debug!(sentence, "Dispatch suppressed: already in flight");
            return DispatchDecision::Suppressed(SuppressReason::InFlight);
        }

        self.in_flight.insert(sentence.to_string());
        self.dispatched += 1;

        let verifier = Arc::clone(&self.verifier);
        let events = self.events.clone();
        let wrap = self.wrap;
        let epoch = self.epoch;
        let sentence = sentence.to_string();

        tokio::spawn(async move {
            let request = sentence.clone();
            // A panicking verifier still has to release the in-flight slot
            let result = match tokio::spawn(async move { verifier.verify(&request).await }).await {
                Ok(result) => result,
                Err(e) => Err(VerificationError::Transport(format!("verification task failed: {e}"))),
            };
            let _ = events.send(wrap(VerificationFinished {
                epoch,
                sentence,
                result,
            }));
        });

        debug!("Verification dispatched");
        DispatchDecision::Dispatched
    }

    /// Fold a finished request into the store, consulting the store at write time
    pub fn complete(&mut self, finished: VerificationFinished, store: &mut CorrectionStore) -> CompletionOutcome {
        if finished.epoch != self.epoch {
            debug!(sentence = %finished.sentence, "Dropping result for a replaced document");
            return CompletionOutcome::Abandoned;
        }
        self.in_flight.remove(&finished.sentence);

        match finished.result {
            Ok(corrections) => {
                if store.contains(&finished.sentence) {
                    return CompletionOutcome::AlreadyPresent;
                }
                let flagged = !corrections.is_empty();
                store.insert(finished.sentence, corrections);
                CompletionOutcome::Stored { flagged }
            }
            Err(e) => {
                warn!(sentence = %finished.sentence, "Verification failed, will retry on next edit: {}", e);
                CompletionOutcome::Discarded(e)
            }
        }
    }

    /// Start a new document: forget outstanding requests and ignore their results
    pub fn reset(&mut self) {
        self.in_flight.clear();
        self.epoch += 1;
    }

    pub fn is_in_flight(&self, sentence: &str) -> bool {
        self.in_flight.contains(sentence)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of requests actually sent
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }
}
