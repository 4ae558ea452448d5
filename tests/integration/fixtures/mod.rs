// Test fixtures with known note texts
// WHY: Deterministic inputs shared by the segmentation and pipeline tests

/// Single flagged sentence as a user would type it
pub const BOILING_WATER: &str = "Water boils at 0 degrees. ";

/// Mixed note: two sentences the knowledge base flags, one it does not
pub const MIXED_NOTE: &str = "The Earth is flat. The sky is blue. Lightning never strikes twice.";

/// Trailing sentence still being typed
pub const UNFINISHED_NOTE: &str = "First thought. Second thought is still";

/// Punctuation the segmenter must absorb into the preceding sentence
pub const PUNCTUATION_NOTE: &str = "Wow!! Really?! Wait... what? Fine.";
