//! Prompt change classification.
//!
//! Decides whether an edit to a prompt is a major, minor, or patch change
//! using phrase tables and a handful of numeric ratios over the normalized
//! text. The classifier is a pure function of its two inputs.
//!
//! Major rules are evaluated before minor rules, and within each tier the
//! first rule that fires decides the outcome.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::semver::BumpKind;

/// Phrases whose first appearance in the new prompt signals a breaking change.
pub const BREAKING_PHRASES: &[&str] = &[
    "instead of",
    "no longer",
    "removed",
    "deprecated",
    "breaking",
    "change from",
    "replaced with",
    "completely different",
    "new approach",
    "different format",
    "different structure",
    "different output",
    "must not",
    "cannot",
    "will not",
    "discontinued",
    "obsolete",
    "migrate to",
    "upgrade to",
    "switch to",
    "abandoned",
];

/// Phrases whose first appearance in the new prompt signals added features.
pub const FEATURE_PHRASES: &[&str] = &[
    "also",
    "additionally",
    "new",
    "enhanced",
    "improved",
    "better",
    "more",
    "extra",
    "additional",
    "further",
    "extended",
    "expanded",
    "support for",
    "now supports",
    "can also",
    "in addition",
    "optionally",
    "option",
    "feature",
    "capability",
    "functionality",
    "include",
    "incorporate",
    "integrate",
    "combine",
    "merge",
];

/// Phrases announcing a new capability, checked after the numeric minor rules.
pub const CAPABILITY_PHRASES: &[&str] = &[
    "you can now",
    "it is now possible",
    "added support",
    "new feature",
    "enhanced with",
    "upgraded to include",
    "now includes",
    "now provides",
    "now offers",
];

/// Sentence-count change, relative to the old count, above which an edit is major.
pub const MAJOR_SENTENCE_DELTA_RATIO: f64 = 0.6;

/// Word-set Jaccard similarity below which an edit is a rewrite.
pub const MAJOR_MIN_WORD_SIMILARITY: f64 = 0.25;

/// Character-length change, relative to the old length, above which an edit is major.
pub const MAJOR_LENGTH_CHANGE_RATIO: f64 = 0.8;

/// Number of previously unseen words above which an edit is minor.
pub const MINOR_NEW_WORD_LIMIT: usize = 8;

/// Character-length growth, relative to the old length, above which an edit is minor.
pub const MINOR_LENGTH_GROWTH_RATIO: f64 = 0.3;

/// Number of added sentences above which an edit is minor.
pub const MINOR_EXTRA_SENTENCE_LIMIT: usize = 1;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

/// The rule that decided a classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeTrigger {
    /// Old and new prompts are byte-for-byte identical.
    Identical,
    /// A breaking phrase appears only in the new prompt.
    BreakingPhrase(&'static str),
    /// The number of `.`-delimited segments changed too much.
    SentenceDelta(f64),
    /// The word sets barely overlap.
    LowSimilarity(f64),
    /// The prompt grew or shrank too much.
    LengthChange(f64),
    /// A feature phrase appears only in the new prompt.
    FeaturePhrase(&'static str),
    /// Many words were introduced.
    NewVocabulary(usize),
    /// The prompt grew noticeably.
    LengthGrowth(f64),
    /// More than one sentence was added.
    AddedSentences(usize),
    /// A capability announcement appears only in the new prompt.
    CapabilityPhrase(&'static str),
    /// No rule fired; the edit is small.
    MinorEdit,
}

impl fmt::Display for ChangeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeTrigger::Identical => write!(f, "prompt unchanged"),
            ChangeTrigger::BreakingPhrase(p) => write!(f, "breaking phrase \"{p}\" added"),
            ChangeTrigger::SentenceDelta(r) => write!(f, "sentence count changed by {:.0}%", r * 100.0),
            ChangeTrigger::LowSimilarity(s) => write!(f, "word similarity only {:.0}%", s * 100.0),
            ChangeTrigger::LengthChange(r) => write!(f, "length changed by {:.0}%", r * 100.0),
            ChangeTrigger::FeaturePhrase(p) => write!(f, "feature phrase \"{p}\" added"),
            ChangeTrigger::NewVocabulary(n) => write!(f, "{n} new words"),
            ChangeTrigger::LengthGrowth(r) => write!(f, "length grew by {:.0}%", r * 100.0),
            ChangeTrigger::AddedSentences(n) => write!(f, "{n} sentences added"),
            ChangeTrigger::CapabilityPhrase(p) => write!(f, "capability phrase \"{p}\" added"),
            ChangeTrigger::MinorEdit => write!(f, "small edit"),
        }
    }
}

/// Outcome of comparing two prompts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeAnalysis {
    pub kind: BumpKind,
    pub trigger: ChangeTrigger,
}

impl ChangeAnalysis {
    fn new(kind: BumpKind, trigger: ChangeTrigger) -> Self {
        Self { kind, trigger }
    }
}

/// Classifies the edit from `old` to `new`.
///
/// ```
/// use chorus_cli::versioning::{classify_change, BumpKind};
///
/// let kind = classify_change(
///     "Summarize the text.",
///     "Translate the text into French instead of summarizing.",
/// );
/// assert_eq!(kind, BumpKind::Major);
/// ```
pub fn classify_change(old: &str, new: &str) -> BumpKind {
    analyze_change(old, new).kind
}

/// Classifies the edit from `old` to `new` and reports which rule decided it.
pub fn analyze_change(old: &str, new: &str) -> ChangeAnalysis {
    if old == new {
        return ChangeAnalysis::new(BumpKind::Patch, ChangeTrigger::Identical);
    }

    let old = PromptText::new(old);
    let new = PromptText::new(new);

    if let Some(trigger) = major_trigger(&old, &new) {
        return ChangeAnalysis::new(BumpKind::Major, trigger);
    }
    if let Some(trigger) = minor_trigger(&old, &new) {
        return ChangeAnalysis::new(BumpKind::Minor, trigger);
    }
    ChangeAnalysis::new(BumpKind::Patch, ChangeTrigger::MinorEdit)
}

/// Collapses whitespace runs to one space, trims, and lower-cases.
pub fn normalize(prompt: &str) -> String {
    WHITESPACE_RUN
        .replace_all(prompt.trim(), " ")
        .to_lowercase()
}

/// A normalized prompt with the measurements the rules need.
struct PromptText {
    text: String,
    chars: usize,
}

impl PromptText {
    fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let chars = text.chars().count();
        Self { text, chars }
    }

    fn is_empty(&self) -> bool {
        self.chars == 0
    }

    fn contains(&self, phrase: &str) -> bool {
        self.text.contains(phrase)
    }

    fn words(&self) -> HashSet<&str> {
        self.text.split_whitespace().collect()
    }

    /// Number of `.`-delimited segments, empty ones included.
    fn segments(&self) -> usize {
        self.text.split('.').count()
    }

    /// Number of non-blank `.`-delimited segments.
    fn sentences(&self) -> usize {
        self.text.split('.').filter(|s| !s.trim().is_empty()).count()
    }
}

fn added_phrase(old: &PromptText, new: &PromptText, table: &[&'static str]) -> Option<&'static str> {
    table
        .iter()
        .copied()
        .find(|phrase| new.contains(phrase) && !old.contains(phrase))
}

fn major_trigger(old: &PromptText, new: &PromptText) -> Option<ChangeTrigger> {
    if let Some(phrase) = added_phrase(old, new, BREAKING_PHRASES) {
        return Some(ChangeTrigger::BreakingPhrase(phrase));
    }

    let old_segments = old.segments();
    let delta = new.segments().abs_diff(old_segments) as f64 / old_segments.max(1) as f64;
    if delta > MAJOR_SENTENCE_DELTA_RATIO {
        return Some(ChangeTrigger::SentenceDelta(delta));
    }

    if !old.is_empty() && !new.is_empty() {
        let old_words = old.words();
        let new_words = new.words();
        let union = old_words.union(&new_words).count();
        if union > 0 {
            let similarity = old_words.intersection(&new_words).count() as f64 / union as f64;
            if similarity < MAJOR_MIN_WORD_SIMILARITY {
                return Some(ChangeTrigger::LowSimilarity(similarity));
            }
        }
    }

    if !old.is_empty() {
        let change = new.chars.abs_diff(old.chars) as f64 / old.chars as f64;
        if change > MAJOR_LENGTH_CHANGE_RATIO {
            return Some(ChangeTrigger::LengthChange(change));
        }
    }

    None
}

fn minor_trigger(old: &PromptText, new: &PromptText) -> Option<ChangeTrigger> {
    if let Some(phrase) = added_phrase(old, new, FEATURE_PHRASES) {
        return Some(ChangeTrigger::FeaturePhrase(phrase));
    }

    let old_words = old.words();
    let introduced = new
        .words()
        .into_iter()
        .filter(|w| !old_words.contains(w))
        .count();
    if introduced > MINOR_NEW_WORD_LIMIT {
        return Some(ChangeTrigger::NewVocabulary(introduced));
    }

    if !old.is_empty() && new.chars as f64 > old.chars as f64 * (1.0 + MINOR_LENGTH_GROWTH_RATIO) {
        let growth = (new.chars - old.chars) as f64 / old.chars as f64;
        return Some(ChangeTrigger::LengthGrowth(growth));
    }

    let old_sentences = old.sentences();
    let new_sentences = new.sentences();
    if new_sentences > old_sentences + MINOR_EXTRA_SENTENCE_LIMIT {
        return Some(ChangeTrigger::AddedSentences(new_sentences - old_sentences));
    }

    if let Some(phrase) = added_phrase(old, new, CAPABILITY_PHRASES) {
        return Some(ChangeTrigger::CapabilityPhrase(phrase));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "You are a helpful assistant. Read the document carefully and \
        summarize the key points in three bullet points. Keep the tone neutral.";

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello\n\n  WORLD\tagain  "), "hello world again");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_identical_is_patch() {
        let analysis = analyze_change(BASE, BASE);
        assert_eq!(analysis.kind, BumpKind::Patch);
        assert_eq!(analysis.trigger, ChangeTrigger::Identical);
    }

    #[test]
    fn test_identical_is_patch_for_any_prompt() {
        for prompt in ["x", "instead of", "...", "Also new!", "  spaced  out  "] {
            assert_eq!(classify_change(prompt, prompt), BumpKind::Patch);
        }
    }

    #[test]
    fn test_whitespace_and_case_only_is_patch() {
        let reformatted = BASE.to_uppercase().replace(". ", ".\n\n   ");
        let analysis = analyze_change(BASE, &reformatted);
        assert_eq!(analysis.kind, BumpKind::Patch);
        assert_eq!(analysis.trigger, ChangeTrigger::MinorEdit);
    }

    #[test]
    fn test_breaking_phrase_is_major() {
        let analysis = analyze_change(
            "Summarize the text.",
            "Translate the text into French instead of summarizing.",
        );
        assert_eq!(analysis.kind, BumpKind::Major);
        assert_eq!(analysis.trigger, ChangeTrigger::BreakingPhrase("instead of"));
    }

    #[test]
    fn test_breaking_phrase_already_present_does_not_fire() {
        let old = format!("{BASE} Do not use markdown instead of plain text.");
        let new = format!("{BASE} Do not use html instead of plain text.");
        assert_eq!(classify_change(&old, &new), BumpKind::Patch);
    }

    #[test]
    fn test_breaking_phrase_is_substring_match() {
        // "cannot" matches inside "cannoted"; containment, not whole words
        let new = BASE.replace("Keep the tone neutral.", "Keep the tone cannoted.");
        let analysis = analyze_change(BASE, &new);
        assert_eq!(analysis.trigger, ChangeTrigger::BreakingPhrase("cannot"));
    }

    #[test]
    fn test_sentence_delta_is_major() {
        // 2 segments -> 4 segments: delta 2 / 2 = 1.0
        let old = "alpha beta gamma delta epsilon zeta.";
        let new = "alpha beta gamma. delta epsilon. zeta.";
        let analysis = analyze_change(old, new);
        assert_eq!(analysis.kind, BumpKind::Major);
        assert!(matches!(analysis.trigger, ChangeTrigger::SentenceDelta(r) if (r - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_sentence_delta_at_threshold_is_not_major() {
        // 5 segments -> 8 segments: delta 3 / 5 = 0.6, not above the threshold
        let old = "a. b. c. d.";
        let new = "a. b. c. d. a. b. c.";
        let analysis = analyze_change(old, new);
        assert!(!matches!(analysis.trigger, ChangeTrigger::SentenceDelta(_)));
    }

    #[test]
    fn test_low_similarity_is_major() {
        let old = "Summarize the quarterly report for executives";
        let new = "Write a haiku about autumn leaves falling gently";
        let analysis = analyze_change(old, new);
        assert_eq!(analysis.kind, BumpKind::Major);
        assert!(matches!(analysis.trigger, ChangeTrigger::LowSimilarity(s) if s < MAJOR_MIN_WORD_SIMILARITY));
    }

    #[test]
    fn test_similarity_at_threshold_is_not_a_rewrite() {
        // common {a}, union {a, b, c, d}: similarity exactly 0.25
        let analysis = analyze_change("a b", "a c d");
        assert!(!matches!(analysis.trigger, ChangeTrigger::LowSimilarity(_)));
    }

    #[test]
    fn test_length_change_is_major() {
        let old = format!("{BASE} Mention the author. Mention the date. Mention the venue.");
        let analysis = analyze_change(&old, BASE);
        // shrinking by less than 80% is not a length change
        assert!(!matches!(analysis.trigger, ChangeTrigger::LengthChange(_)));

        let padded = BASE.replace("three", &"three ".repeat(40));
        let analysis = analyze_change(BASE, &padded);
        assert_eq!(analysis.kind, BumpKind::Major);
        assert!(matches!(analysis.trigger, ChangeTrigger::LengthChange(r) if r > MAJOR_LENGTH_CHANGE_RATIO));
    }

    #[test]
    fn test_length_change_boundary() {
        // 10 chars -> 18 chars: change 0.8 exactly, not above the threshold
        let analysis = analyze_change("abcde abcd", "abcde abcd abcde a");
        assert!(!matches!(analysis.trigger, ChangeTrigger::LengthChange(_)));
        // 10 chars -> 19 chars: change 0.9
        let analysis = analyze_change("abcde abcd", "abcde abcd abcde ab");
        assert!(matches!(analysis.trigger, ChangeTrigger::LengthChange(_)));
    }

    #[test]
    fn test_feature_phrase_is_minor() {
        let new = format!("{BASE} Also supports new optional retries.");
        let analysis = analyze_change(BASE, &new);
        assert_eq!(analysis.kind, BumpKind::Minor);
        assert_eq!(analysis.trigger, ChangeTrigger::FeaturePhrase("also"));
    }

    #[test]
    fn test_major_wins_over_minor() {
        let new = format!("{BASE} Also, it is no longer neutral.");
        assert_eq!(classify_change(BASE, &new), BumpKind::Major);
    }

    #[test]
    fn test_new_vocabulary_is_minor() {
        // nine unseen words, none of them feature phrases
        let old = "one two three four five six seven eight nine ten eleven twelve thirteen \
            fourteen fifteen sixteen seventeen eighteen nineteen twenty";
        let new = format!("{old} red orange yellow green blue indigo violet black white");
        let analysis = analyze_change(old, &new);
        assert_eq!(analysis.kind, BumpKind::Minor);
        assert_eq!(analysis.trigger, ChangeTrigger::NewVocabulary(9));
    }

    #[test]
    fn test_eight_new_words_is_not_enough() {
        let old = "one two three four five six seven eight nine ten eleven twelve thirteen \
            fourteen fifteen sixteen seventeen eighteen nineteen twenty";
        let new = format!("{old} red orange yellow green blue indigo violet black");
        let analysis = analyze_change(old, &new);
        assert!(!matches!(analysis.trigger, ChangeTrigger::NewVocabulary(_)));
    }

    #[test]
    fn test_length_growth_is_minor() {
        // 20 chars -> 27 chars: growth 0.35 with only two unseen words
        let old = "aaaa bbbb cccc dddd.";
        let new = "aaaa bbbb cccc dddd dddddd.";
        let analysis = analyze_change(old, new);
        assert_eq!(analysis.kind, BumpKind::Minor);
        assert!(matches!(analysis.trigger, ChangeTrigger::LengthGrowth(g) if (g - 0.35).abs() < 1e-9));
    }

    #[test]
    fn test_length_growth_at_threshold_is_not_minor() {
        // 20 chars -> 26 chars: growth exactly 0.3
        let analysis = analyze_change("aaaa bbbb cccc dddd.", "aaaa bbbb cccc dddd ddddd.");
        assert_eq!(analysis.kind, BumpKind::Patch);
    }

    const SHORT_SENTENCES: &str = "aa bb cc dd ee ff gg hh ii jj kk ll mm nn oo pp qq rr ss tt uu vv ww xx. \
        yy. zz. ab. ac.";

    #[test]
    fn test_two_added_sentences_is_minor() {
        let new = format!("{SHORT_SENTENCES} ad. ae.");
        let analysis = analyze_change(SHORT_SENTENCES, &new);
        assert_eq!(analysis.kind, BumpKind::Minor);
        assert_eq!(analysis.trigger, ChangeTrigger::AddedSentences(2));
    }

    #[test]
    fn test_one_added_sentence_is_not_enough() {
        let new = format!("{SHORT_SENTENCES} ad.");
        let analysis = analyze_change(SHORT_SENTENCES, &new);
        assert_eq!(analysis.kind, BumpKind::Patch);
        assert_eq!(analysis.trigger, ChangeTrigger::MinorEdit);
    }

    #[test]
    fn test_capability_phrase_is_minor() {
        let old = format!("{BASE} It also handles tables.");
        let new = format!("{BASE} It also handles tables, you can now cite.");
        let analysis = analyze_change(&old, &new);
        assert_eq!(analysis.kind, BumpKind::Minor);
        assert_eq!(analysis.trigger, ChangeTrigger::CapabilityPhrase("you can now"));
    }

    #[test]
    fn test_small_edit_is_patch() {
        let new = BASE.replace("carefully", "thoroughly");
        let analysis = analyze_change(BASE, &new);
        assert_eq!(analysis.kind, BumpKind::Patch);
        assert_eq!(analysis.trigger, ChangeTrigger::MinorEdit);
    }

    #[test]
    fn test_empty_old_prompt() {
        // "" has one segment; "hello" has one segment; no ratios apply to an empty base
        assert_eq!(classify_change("", "hello"), BumpKind::Patch);
        assert_eq!(classify_change("", "a new thing"), BumpKind::Minor);
    }

    #[test]
    fn test_trigger_display() {
        assert_eq!(
            ChangeTrigger::BreakingPhrase("no longer").to_string(),
            "breaking phrase \"no longer\" added"
        );
        assert_eq!(ChangeTrigger::NewVocabulary(9).to_string(), "9 new words");
    }
}
