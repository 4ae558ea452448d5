// WHY: Content-addressed cache of fact-check results for one editing session
// Absence of a key means "not yet checked"; an empty list means "checked, no issues".

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A suggested fix plus its rationale for a flagged sentence
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Correction {
    pub suggestion: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl Correction {
    pub fn new(suggestion: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            suggestion: suggestion.into(),
            explanation: explanation.into(),
            confidence: None,
            sources: None,
        }
    }

    /// Text shown when hovering a highlighted sentence
    pub fn tooltip(&self) -> String {
        format!("{}\n\n{}", self.suggestion, self.explanation)
    }
}

/// Outcome of submitting one sentence to a fact source
#[derive(Debug, Clone, PartialEq)]
pub enum FactCheckVerdict {
    NoIssue,
    Corrected(Vec<Correction>),
    /// Source unavailable or timed out; displayed like `NoIssue` but never cached
    Inconclusive,
}

impl FactCheckVerdict {
    /// Corrections to display; inconclusive verdicts show nothing
    pub fn into_corrections(self) -> Vec<Correction> {
        match self {
            Self::Corrected(corrections) => corrections,
            Self::NoIssue | Self::Inconclusive => Vec::new(),
        }
    }

    pub fn is_corrected(&self) -> bool {
        matches!(self, Self::Corrected(list) if !list.is_empty())
    }
}

impl From<Vec<Correction>> for FactCheckVerdict {
    fn from(corrections: Vec<Correction>) -> Self {
        if corrections.is_empty() {
            Self::NoIssue
        } else {
            Self::Corrected(corrections)
        }
    }
}

/// Mapping from sentence text to the corrections found for it
#[derive(Debug, Default, Clone)]
pub struct CorrectionStore {
    entries: HashMap<String, Vec<Correction>>,
}

impl CorrectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict; an empty list marks the sentence as checked and clean
    pub fn insert(&mut self, sentence: impl Into<String>, corrections: Vec<Correction>) {
        self.entries.insert(sentence.into(), corrections);
    }

    pub fn get(&self, sentence: &str) -> Option<&[Correction]> {
        self.entries.get(sentence).map(Vec::as_slice)
    }

    /// Whether the sentence has been checked, regardless of outcome
    pub fn contains(&self, sentence: &str) -> bool {
        self.entries.contains_key(sentence)
    }

    /// Drop every entry whose sentence is no longer live, returning how many were removed
    pub fn prune(&mut self, live: &HashSet<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|sentence, _| live.contains(sentence.as_str()));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Pruned {} stale correction entries", removed);
        }
        removed
    }

    /// Sentences with at least one correction
    pub fn iter_flagged(&self) -> impl Iterator<Item = (&str, &[Correction])> {
        self.entries
            .iter()
            .filter(|(_, corrections)| !corrections.is_empty())
            .map(|(sentence, corrections)| (sentence.as_str(), corrections.as_slice()))
    }

    pub fn flagged_count(&self) -> usize {
        self.iter_flagged().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
