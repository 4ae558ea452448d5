// WHY: Best-effort generative fact source wrapped so it always resolves
// Every request ends in exactly one ModelOutcome; timeouts and bad replies become Inconclusive.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::FactSource;
use crate::corrections::{Correction, FactCheckVerdict};
use crate::error::ModelError;

/// Hard limit on one model call
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Text generation capability behind the model fact source
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Terminal state of one model request
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Ok,
    Corrected(Correction),
    TimedOut,
    MalformedResponse(String),
    TransportError(String),
}

impl From<ModelOutcome> for FactCheckVerdict {
    fn from(outcome: ModelOutcome) -> Self {
        match outcome {
            ModelOutcome::Ok => FactCheckVerdict::NoIssue,
            ModelOutcome::Corrected(correction) => FactCheckVerdict::Corrected(vec![correction]),
            ModelOutcome::TimedOut
            | ModelOutcome::MalformedResponse(_)
            | ModelOutcome::TransportError(_) => FactCheckVerdict::Inconclusive,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ModelReply {
    status: Option<String>,
    suggestion: Option<String>,
    explanation: Option<String>,
}

/// Prompt constraining the model to one of the two accepted JSON shapes
pub fn build_prompt(sentence: &str) -> String {
    format!(
        "You are a fact-checker. Analyze this sentence: \"{sentence}\".\n\
         Respond with VALID JSON ONLY. No code blocks, no extra text.\n\
         If accurate: {{\"status\": \"ok\"}}\n\
         If inaccurate: {{\"suggestion\": \"Corrected sentence\", \"explanation\": \"Brief reason with source URL\"}}\n"
    )
}

/// Drop every line that opens or closes a code fence, concatenate the rest, then trim
/// Line breaks are dropped, including any inside JSON strings
pub fn strip_code_fences(reply: &str) -> String {
    reply
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Interpret a cleaned model reply
pub fn parse_reply(cleaned: &str) -> ModelOutcome {
    let reply: ModelReply = match serde_json::from_str(cleaned) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Model reply is not valid JSON: {}", e);
            return ModelOutcome::MalformedResponse(e.to_string());
        }
    };

    if reply.status.as_deref() == Some("ok") {
        return ModelOutcome::Ok;
    }

    match (reply.suggestion, reply.explanation) {
        (Some(suggestion), Some(explanation))
            if !suggestion.trim().is_empty() && !explanation.trim().is_empty() =>
        {
            ModelOutcome::Corrected(Correction::new(suggestion, explanation))
        }
        _ => {
            warn!("Model reply matches neither accepted shape");
            ModelOutcome::MalformedResponse(cleaned.to_string())
        }
    }
}

/// Generative-model fact source with a hard timeout
pub struct FactSourceModel {
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
}

impl FactSourceModel {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_MODEL_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn ModelBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one request to completion, racing the backend against the timeout
    pub async fn classify(&self, sentence: &str) -> ModelOutcome {
        let prompt = build_prompt(sentence);

        let reply = match tokio::time::timeout(self.timeout, self.backend.generate(&prompt)).await {
            Err(_) => {
                warn!("Model call exceeded {}ms", self.timeout.as_millis());
                return ModelOutcome::TimedOut;
            }
            Ok(Err(e)) => {
                warn!("Model call failed: {}", e);
                return ModelOutcome::TransportError(e.to_string());
            }
            Ok(Ok(reply)) => reply,
        };

        debug!(raw = %reply, "Model reply received");
        parse_reply(&strip_code_fences(&reply))
    }
}

#[async_trait]
impl FactSource for FactSourceModel {
    fn name(&self) -> &str {
        "model"
    }

    async fn check(&self, sentence: &str) -> FactCheckVerdict {
        self.classify(sentence).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    enum Script {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct ScriptedBackend {
        script: Script,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.script {
                Script::Reply(text) => Ok(text.to_string()),
                Script::Fail => Err(ModelError::Api {
                    status: 403,
                    message: "API key invalid".to_string(),
                }),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(r#"{"status":"ok"}"#.to_string())
                }
            }
        }
    }

    #[test]
    fn test_strip_code_fences() {
        let reply = "```json\n{\"status\": \"ok\"}\n```\n";
        assert_eq!(strip_code_fences(reply), r#"{"status": "ok"}"#);
        assert_eq!(strip_code_fences("  {\"a\":1}  "), r#"{"a":1}"#);
    }

    #[test]
    fn test_reply_wrapped_inside_string_still_parses() {
        let reply = "```json\n{\"suggestion\": \"Water boils at \n100°C.\", \"explanation\": \"Physics.\"}\n```";
        match parse_reply(&strip_code_fences(reply)) {
            ModelOutcome::Corrected(c) => assert_eq!(c.suggestion, "Water boils at 100°C."),
            other => panic!("expected correction, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ok_and_corrected() {
        assert_eq!(parse_reply(r#"{"status":"ok"}"#), ModelOutcome::Ok);

        let outcome = parse_reply(r#"{"suggestion":"Paris is in France.","explanation":"Geography."}"#);
        match outcome {
            ModelOutcome::Corrected(c) => {
                assert_eq!(c.suggestion, "Paris is in France.");
                assert_eq!(c.confidence, None);
                assert_eq!(c.sources, None);
            }
            other => panic!("expected correction, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_reply("Sure! Here you go"), ModelOutcome::MalformedResponse(_)));
        assert!(matches!(parse_reply(r#"{"status":"error"}"#), ModelOutcome::MalformedResponse(_)));
        assert!(matches!(parse_reply(r#"{"suggestion":"only half"}"#), ModelOutcome::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed() {
        let backend = ScriptedBackend::new(Script::Reply(
            "```json\n{\"suggestion\": \"Water boils at 100°C.\", \"explanation\": \"Physics.\"}\n```",
        ));
        let model = FactSourceModel::new(backend.clone());

        let verdict = model.check("Water boils at 0 degrees.").await;
        assert!(verdict.is_corrected());

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"Water boils at 0 degrees.\""));
        assert!(prompts[0].contains(r#"{"status": "ok"}"#));
    }

    #[tokio::test]
    async fn test_transport_error_is_inconclusive() {
        let model = FactSourceModel::new(ScriptedBackend::new(Script::Fail));
        assert!(matches!(model.classify("x.").await, ModelOutcome::TransportError(_)));
        assert_eq!(model.check("x.").await, FactCheckVerdict::Inconclusive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_backend_times_out() {
        let model = FactSourceModel::new(ScriptedBackend::new(Script::Hang));
        let started = tokio::time::Instant::now();

        assert_eq!(model.classify("x.").await, ModelOutcome::TimedOut);
        assert!(started.elapsed() < DEFAULT_MODEL_TIMEOUT + Duration::from_millis(50));
    }
}
