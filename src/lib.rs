pub mod api_client;
pub mod config;
pub mod corrections;
pub mod debounce;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod fact_source;
pub mod highlight;
pub mod protocol;
pub mod segmenter;
pub mod server;
pub mod session;

// Re-export main types for convenient access
pub use corrections::{Correction, CorrectionStore, FactCheckVerdict};
pub use segmenter::{SegmentedSentence, SentenceSegmenter, Span};

// Re-export the pipeline pieces an embedding editor needs
pub use api_client::ApiClient;
pub use config::{FactpadConfig, SessionConfig, SourceMode};
pub use dispatcher::{LocalVerifier, SentenceVerifier, VerificationDispatcher};
pub use editor::{EditingSession, NotesApi, SessionEvent, SessionUpdate};
pub use error::{AuthError, PersistenceError, VerificationError};
pub use fact_source::{FactSource, FactSourceChain};
pub use highlight::{HighlightRenderer, RenderedDocument};
pub use session::AuthSession;
