// WHY: Sentence segmentation for the incremental fact-check pipeline
// A sentence is identified by its trimmed text, so the segmenter only needs to find
// runs closed by terminal punctuation; abbreviations are deliberately not special-cased.

use anyhow::Result;
use regex_automata::meta::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Terminal punctuation that closes a sentence
pub const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Byte range of a sentence's trimmed text inside the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Sentence borrowed from the document it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedSentence<'a> {
    pub index: usize,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> SegmentedSentence<'a> {
    /// Owned copy of the sentence text, used as the correction cache key
    pub fn to_key(&self) -> String {
        self.text.to_string()
    }
}

/// Splits raw text into completed sentences
///
/// The segmenter is a pure function of its input: the same text always yields the
/// same sentences, and trailing text without terminal punctuation is never returned
/// because the user is still typing it.
pub struct SentenceSegmenter {
    pattern: Regex,
}

impl SentenceSegmenter {
    /// Compile the sentence pattern
    /// WHY: one or more terminators close a sentence so "Wow!!" never yields an empty piece
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"[^.!?]+[.!?]+")?;
        Ok(Self { pattern })
    }

    /// All completed sentences in document order
    pub fn segment<'a>(&self, text: &'a str) -> Vec<SegmentedSentence<'a>> {
        let mut sentences = Vec::new();

        for m in self.pattern.find_iter(text) {
            let raw = &text[m.start()..m.end()];
            let leading = raw.len() - raw.trim_start().len();
            let trimmed = raw.trim();

            // Terminators are never whitespace, so a match always survives trimming
            if trimmed.is_empty() {
                continue;
            }

            let start = m.start() + leading;
            sentences.push(SegmentedSentence {
                index: sentences.len(),
                text: trimmed,
                span: Span {
                    start,
                    end: start + trimmed.len(),
                },
            });
        }

        debug!("Segmented {} bytes into {} sentences", text.len(), sentences.len());
        sentences
    }

    /// The most recently completed sentence, if any
    pub fn latest_completed<'a>(&self, text: &'a str) -> Option<SegmentedSentence<'a>> {
        self.segment(text).pop()
    }

    /// Set of sentence texts currently present, used to prune stale corrections
    pub fn sentence_set<'a>(&self, text: &'a str) -> HashSet<&'a str> {
        self.segment(text).into_iter().map(|s| s.text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        let segmenter = SentenceSegmenter::new().unwrap();
        segmenter.segment(text).into_iter().map(|s| s.to_key()).collect()
    }

    #[test]
    fn test_basic_terminators() {
        assert_eq!(texts("A. B! C?"), vec!["A.", "B!", "C?"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(texts("").is_empty());
        assert!(texts("   \n\t ").is_empty());
    }

    #[test]
    fn test_trailing_partial_not_yielded() {
        assert_eq!(texts("Done here. Still typing"), vec!["Done here."]);
        assert!(texts("no punctuation yet").is_empty());
    }

    #[test]
    fn test_consecutive_terminators() {
        assert_eq!(texts("Wow!! Really?!"), vec!["Wow!!", "Really?!"]);
        assert_eq!(texts("Wait... what?"), vec!["Wait...", "what?"]);
    }

    #[test]
    fn test_leading_terminators_skipped() {
        assert_eq!(texts("?! Hello."), vec!["Hello."]);
    }

    #[test]
    fn test_abbreviations_not_special_cased() {
        assert_eq!(texts("Dr. Smith left."), vec!["Dr.", "Smith left."]);
    }

    #[test]
    fn test_spans_point_at_trimmed_text() {
        let segmenter = SentenceSegmenter::new().unwrap();
        let text = "  First one.\n\nSecond one! ";
        let sentences = segmenter.segment(text);

        assert_eq!(sentences.len(), 2);
        for sentence in &sentences {
            assert_eq!(&text[sentence.span.start..sentence.span.end], sentence.text);
        }
        assert_eq!(sentences[1].index, 1);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            texts("Café crème est bon. Ça va?"),
            vec!["Café crème est bon.", "Ça va?"]
        );
    }

    #[test]
    fn test_latest_completed() {
        let segmenter = SentenceSegmenter::new().unwrap();
        let latest = segmenter.latest_completed("One. Two! Thr").unwrap();
        assert_eq!(latest.text, "Two!");
        assert!(segmenter.latest_completed("nothing").is_none());
    }

    #[test]
    fn test_idempotent() {
        let segmenter = SentenceSegmenter::new().unwrap();
        let text = "Same input. Same output?";
        assert_eq!(segmenter.segment(text), segmenter.segment(text));
    }

    #[test]
    fn test_sentence_set_deduplicates() {
        let segmenter = SentenceSegmenter::new().unwrap();
        let set = segmenter.sentence_set("Hi. Hi. Bye.");
        assert_eq!(set.len(), 2);
        assert!(set.contains("Hi."));
        assert!(set.contains("Bye."));
    }
}
