// WHY: Editing surface driving the incremental fact-check pipeline
// One session owns the raw text, the correction store and a single event receiver.
// Timer expiries and verification results arrive as discrete events, so nothing
// here ever blocks while waiting on the network.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::corrections::CorrectionStore;
use crate::debounce::{Debouncer, Fired};
use crate::dispatcher::{
    CompletionOutcome, DispatchDecision, SentenceVerifier, VerificationDispatcher, VerificationFinished,
};
use crate::error::PersistenceError;
use crate::highlight::{HighlightRenderer, RenderedDocument};
use crate::protocol::{Note, NoteDraft};
use crate::segmenter::SentenceSegmenter;

/// Note persistence collaborator used to load and save raw text
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn get_note(&self, id: &str) -> Result<Note, PersistenceError>;
    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, PersistenceError>;
    async fn update_note(&self, id: &str, draft: &NoteDraft) -> Result<Note, PersistenceError>;
}

/// Events delivered to the session's loop
#[derive(Debug)]
pub enum SessionEvent {
    DebounceElapsed(Fired<String>),
    VerificationFinished(VerificationFinished),
}

/// What applying an edit did
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditOutcome {
    /// Store entries dropped because their sentence left the document
    pub pruned: usize,
    /// Sentence whose check was (re)scheduled
    pub scheduled: Option<String>,
}

/// What handling one event did
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Dispatch { sentence: String, decision: DispatchDecision },
    /// Pending sentence was edited away before the window elapsed
    Stale { sentence: String },
    Completed { sentence: String, outcome: CompletionOutcome },
    /// Expiry of a timer that had already been replaced
    Superseded,
}

/// One document being edited with live fact-checking
pub struct EditingSession {
    note_id: Option<String>,
    title: String,
    raw_text: String,
    segmenter: SentenceSegmenter,
    store: CorrectionStore,
    renderer: HighlightRenderer,
    debouncer: Debouncer<String, SessionEvent>,
    dispatcher: VerificationDispatcher<SessionEvent>,
    events: UnboundedReceiver<SessionEvent>,
}

impl EditingSession {
    pub fn new(verifier: Arc<dyn SentenceVerifier>, config: &SessionConfig) -> Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();

        Ok(Self {
            note_id: None,
            title: String::new(),
            raw_text: String::new(),
            segmenter: SentenceSegmenter::new()?,
            store: CorrectionStore::new(),
            renderer: HighlightRenderer::new(),
            debouncer: Debouncer::new(config.debounce, tx.clone(), SessionEvent::DebounceElapsed),
            dispatcher: VerificationDispatcher::new(verifier, tx, SessionEvent::VerificationFinished),
            events,
        })
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn note_id(&self) -> Option<&str> {
        self.note_id.as_deref()
    }

    pub fn store(&self) -> &CorrectionStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &VerificationDispatcher<SessionEvent> {
        &self.dispatcher
    }

    /// Replace the raw text after a keystroke
    ///
    /// Prunes corrections for sentences that are gone, then restarts the debounce
    /// window for the newest completed sentence unless it is cached or in flight.
    pub fn apply_edit(&mut self, text: impl Into<String>) -> EditOutcome {
        self.raw_text = text.into();

        let live = self.segmenter.sentence_set(&self.raw_text);
        let pruned = self.store.prune(&live);

        let scheduled = match self.segmenter.latest_completed(&self.raw_text) {
            Some(latest)
                if !self.store.contains(latest.text) && !self.dispatcher.is_in_flight(latest.text) =>
            {
                let sentence = latest.to_key();
                self.debouncer.schedule(sentence.clone());
                Some(sentence)
            }
            _ => None,
        };

        EditOutcome { pruned, scheduled }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> SessionUpdate {
        match event {
            SessionEvent::DebounceElapsed(fired) => {
                let Some(sentence) = self.debouncer.acknowledge(fired) else {
                    return SessionUpdate::Superseded;
                };

                if !self.segmenter.sentence_set(&self.raw_text).contains(sentence.as_str()) {
                    debug!(sentence = %sentence, "Pending sentence no longer in document");
                    return SessionUpdate::Stale { sentence };
                }

                let decision = self.dispatcher.dispatch(&sentence, &self.store);
                SessionUpdate::Dispatch { sentence, decision }
            }
            SessionEvent::VerificationFinished(finished) => {
                let sentence = finished.sentence.clone();
                let outcome = self.dispatcher.complete(finished, &mut self.store);
                debug!(sentence = %sentence, ?outcome, "Verification folded into store");
                SessionUpdate::Completed { sentence, outcome }
            }
        }
    }

    /// Wait for and handle the next event
    pub async fn pump(&mut self) -> Option<SessionUpdate> {
        let event = self.events.recv().await?;
        Some(self.handle_event(event))
    }

    /// Whether a timer is pending or a verification is outstanding
    pub fn is_busy(&self) -> bool {
        self.debouncer.is_pending() || self.dispatcher.in_flight_count() > 0
    }

    /// Pump events until no timer is pending and nothing is in flight
    pub async fn settle(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while self.is_busy() {
            match self.pump().await {
                Some(update) => updates.push(update),
                None => break,
            }
        }
        updates
    }

    /// Display representation of the current text
    pub fn render(&self) -> RenderedDocument {
        let live = self.segmenter.sentence_set(&self.raw_text);
        self.renderer.render(&self.raw_text, &self.store, &live)
    }

    /// Number of live sentences currently flagged
    pub fn flagged_count(&self) -> usize {
        let live = self.segmenter.sentence_set(&self.raw_text);
        self.store
            .iter_flagged()
            .filter(|(sentence, _)| live.contains(sentence))
            .count()
    }

    /// Replace the session contents with a stored note; nothing is checked until the next edit
    /// Requests still running for the previous text are abandoned.
    pub async fn load_note(&mut self, notes: &dyn NotesApi, id: &str) -> Result<(), PersistenceError> {
        let note = notes.get_note(id).await?;

        self.debouncer.cancel_pending();
        self.dispatcher.reset();
        self.store.clear();
        self.note_id = Some(note.id);
        self.title = note.title;
        self.raw_text = note.content;

        info!(note_id = id, "Note loaded");
        Ok(())
    }

    /// Save title and raw text; the first save creates the note and adopts its id
    pub async fn save_note(&mut self, notes: &dyn NotesApi) -> Result<Note, PersistenceError> {
        if self.title.trim().is_empty() && self.raw_text.trim().is_empty() {
            return Err(PersistenceError::NothingToSave);
        }

        let draft = NoteDraft {
            title: self.title.clone(),
            content: self.raw_text.clone(),
        };

        let saved = match &self.note_id {
            Some(id) => notes.update_note(id, &draft).await?,
            None => {
                let created = notes.create_note(&draft).await?;
                self.note_id = Some(created.id.clone());
                created
            }
        };

        info!(note_id = %saved.id, "Note saved");
        Ok(saved)
    }
}
