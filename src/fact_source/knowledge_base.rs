// WHY: Zero-latency rule matcher over a fixed table of common misconceptions
// Matching is a case-insensitive substring test; there is no scoring beyond each entry's static confidence.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::FactSource;
use crate::corrections::{Correction, FactCheckVerdict};

/// One misconception: any trigger phrase in a sentence attaches the correction
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    pub triggers: Vec<String>,
    pub correction: Correction,
}

impl KnowledgeEntry {
    fn new(triggers: &[&str], correction: Correction) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            correction,
        }
    }

    fn matches(&self, lowered_sentence: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| lowered_sentence.contains(trigger.as_str()))
    }
}

/// Read-only table of knowledge entries
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeBase {
    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.triggers = entry.triggers.iter().map(|t| t.to_lowercase()).collect();
                entry
            })
            .collect();
        Self { entries }
    }

    /// Add entries from a JSON array of `{ "triggers": [...], "correction": {...} }`
    pub fn extend_from_json_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge base {}", path.display()))?;
        let extra: Vec<KnowledgeEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid knowledge base JSON in {}", path.display()))?;

        let added = extra.len();
        self.entries.extend(Self::from_entries(extra).entries);
        info!("Loaded {} knowledge base entries from {}", added, path.display());
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of corrections for every entry with a trigger inside the sentence
    pub fn lookup(&self, sentence: &str) -> Vec<Correction> {
        let lowered = sentence.to_lowercase();
        let corrections: Vec<Correction> = self
            .entries
            .iter()
            .filter(|entry| entry.matches(&lowered))
            .map(|entry| entry.correction.clone())
            .collect();

        debug!("Knowledge base matched {} entries", corrections.len());
        corrections
    }

    /// Built-in table of well-known misconceptions
    pub fn builtin() -> Self {
        let entries = vec![
            KnowledgeEntry::new(
                &["earth is flat", "earth flat"],
                sourced(
                    "The Earth is an oblate spheroid (slightly flattened at the poles).",
                    "NASA satellite images, gravity measurements and centuries of astronomical observation show Earth is almost spherical.",
                    0.95,
                    &[
                        "https://solarsystem.nasa.gov/planet/earth",
                        "https://science.nasa.gov/earth/facts",
                    ],
                ),
            ),
            KnowledgeEntry::new(
                &["water boils at 0", "water freezes at 100"],
                sourced(
                    "Water boils at 100°C (212°F) and freezes at 0°C (32°F) at standard atmospheric pressure.",
                    "At sea level atmospheric pressure (1 atm), water has a boiling point of 100°C and freezing point of 0°C.",
                    0.98,
                    &[
                        "https://physics.info/boiling/",
                        "https://en.wikipedia.org/wiki/Properties_of_water",
                    ],
                ),
            ),
            KnowledgeEntry::new(
                &["great wall china space", "great wall visible space"],
                sourced(
                    "The Great Wall of China is not visible from space with the naked eye.",
                    "This is a common myth. Astronauts have confirmed that the Great Wall is not visible from low Earth orbit without aid.",
                    0.92,
                    &[
                        "https://www.nasa.gov/vision/space/workinginspace/great_wall.html",
                        "https://www.snopes.com/fact-check/great-wall-of-china-space/",
                    ],
                ),
            ),
            KnowledgeEntry::new(
                &["humans use 10% brain", "only use 10% brain"],
                sourced(
                    "Humans use virtually all of their brain, not just 10%.",
                    "Neuroimaging shows that we use nearly every part of our brain, and even damage to small areas can have profound effects.",
                    0.96,
                    &[
                        "https://www.scientificamerican.com/article/do-people-only-use-10-percent-of-their-brains/",
                        "https://www.mayoclinic.org/healthy-lifestyle/adult-health/expert-answers/10-percent-of-brain-myth/faq-20058442",
                    ],
                ),
            ),
            KnowledgeEntry::new(
                &["lightning never strikes twice", "lightning same place"],
                sourced(
                    "Lightning can and often does strike the same place multiple times.",
                    "The Empire State Building is struck by lightning about 25 times per year. Tall structures are frequently hit multiple times.",
                    0.94,
                    &[
                        "https://www.weather.gov/safety/lightning-myths",
                        "https://www.nssl.noaa.gov/education/svrwx101/lightning/faq/",
                    ],
                ),
            ),
            KnowledgeEntry::new(
                &["goldfish 3 second memory", "goldfish memory 3 seconds"],
                sourced(
                    "Goldfish have much longer memories than 3 seconds, possibly months.",
                    "Studies show goldfish can remember things for at least 3 months and can be trained to respond to different colors, sounds, and cues.",
                    0.89,
                    &[
                        "https://www.bbc.com/news/magazine-19321067",
                        "https://www.livescience.com/goldfish-memory.html",
                    ],
                ),
            ),
        ];

        Self { entries }
    }
}

fn sourced(suggestion: &str, explanation: &str, confidence: f64, sources: &[&str]) -> Correction {
    Correction {
        suggestion: suggestion.to_string(),
        explanation: explanation.to_string(),
        confidence: Some(confidence),
        sources: Some(sources.iter().map(|s| s.to_string()).collect()),
    }
}

#[async_trait]
impl FactSource for KnowledgeBase {
    fn name(&self) -> &str {
        "knowledge-base"
    }

    async fn check(&self, sentence: &str) -> FactCheckVerdict {
        FactCheckVerdict::from(self.lookup(sentence))
    }
}
