//! Sentence segmentation with offset tracking.
//!
//! ## The Hard Part: Finding Sentences
//!
//! Sentence detection seems simple until you encounter:
//!
//! ```text
//! "Dr. Smith went to Washington D.C. on Jan. 15th."
//!     ^                          ^       ^
//!     Not a sentence end (abbreviation)
//! ```
//!
//! The splitter here looks for sentence-ending punctuation (`.` `!` `?`)
//! followed by whitespace and a capital letter, then vetoes the split when
//! the preceding word is a known abbreviation ("Mr.", "Dr.", "etc.") or
//! carries internal periods ("D.C.", "e.g.", "U.S.").
//!
//! ## Offsets Are Positional, Not Textual
//!
//! Each segment records its exact `[start, end)` byte span in the original
//! document. Spans are resolved by searching for the trimmed sentence text
//! *starting from the previous match's end*, so a document that repeats the
//! same sentence twice gets two distinct, increasing spans:
//!
//! ```text
//! "Same. Same."
//!  ^^^^^  ^^^^^
//!  [0,5)  [6,11)   <- second occurrence found from offset 5, not 0
//! ```
//!
//! This positional discipline is what makes every downstream span invariant
//! (non-overlapping, increasing) hold for free.

/// Atomic span of text produced by segmentation.
///
/// `start` and `end` are byte offsets into the original document, and
/// `text` always equals `&original[start..end]`:
///
/// ```rust
/// use seams::{SentenceSegmenter, TextSegmenter};
///
/// let text = "First point. Second point.";
/// let segments = SentenceSegmenter::new().segment(text);
///
/// for segment in &segments {
///     assert_eq!(&text[segment.start..segment.end], segment.text);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The segment text, trimmed of surrounding whitespace.
    pub text: String,
    /// Byte offset where this segment starts in the original document.
    pub start: usize,
    /// Byte offset where this segment ends (exclusive).
    pub end: usize,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// The length of this segment in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this segment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The byte span of this segment in the original document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// A text segmentation strategy.
///
/// Injectable at chunker construction, so markdown-aware or model-based
/// splitters can replace the sentence heuristic without touching the
/// pipeline.
pub trait TextSegmenter: Send + Sync {
    /// Split `text` into ordered, non-overlapping segments.
    ///
    /// Empty or whitespace-only input yields an empty vector. Input with no
    /// detectable boundary yields a single segment holding the trimmed text.
    fn segment(&self, text: &str) -> Vec<Segment>;
}

/// Titles and other tokens whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Mt", "Capt", "Col", "Gen", "Lt", "Sgt",
    "Rev", "Hon", "Inc", "Ltd", "Co", "Corp", "Ave", "Blvd", "Rd", "No", "Fig", "Vol", "Jan",
    "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec", "vs", "etc",
    "approx", "dept", "est", "cf", "al",
];

/// Default sentence-boundary segmenter.
///
/// ## Example
///
/// ```rust
/// use seams::{SentenceSegmenter, TextSegmenter};
///
/// let segmenter = SentenceSegmenter::new();
/// let segments = segmenter.segment("Hello world. How are you? Fine.");
///
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[0].text, "Hello world.");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSegmenter;

impl SentenceSegmenter {
    /// Create a new sentence segmenter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether the word ending at byte `dot` (exclusive) vetoes a split.
    fn is_abbreviation(text: &str, dot: usize) -> bool {
        let before = &text[..dot];
        let word_start = before
            .rfind(char::is_whitespace)
            .map_or(0, |p| p + before[p..].chars().next().map_or(1, char::len_utf8));
        let word = before[word_start..].trim_end_matches('.');

        if word.is_empty() {
            return false;
        }
        // Internal periods ("D.C", "e.g", "U.S") read as abbreviations.
        if word.contains('.') {
            return true;
        }
        ABBREVIATIONS.iter().any(|abbr| word.eq_ignore_ascii_case(abbr))
    }

    /// Trim `text[raw_start..raw_end]` and resolve its span positionally.
    fn push_candidate(
        text: &str,
        raw_start: usize,
        raw_end: usize,
        search_from: &mut usize,
        out: &mut Vec<Segment>,
    ) {
        let trimmed = text[raw_start..raw_end].trim();
        if trimmed.is_empty() {
            return;
        }

        // Locate the trimmed candidate from the previous match's end, so
        // repeated identical sentences resolve to distinct spans.
        let start = text[*search_from..]
            .find(trimmed)
            .map_or(raw_start, |pos| *search_from + pos);
        let end = start + trimmed.len();

        out.push(Segment::new(trimmed, start, end));
        *search_from = end;
    }
}

impl TextSegmenter for SentenceSegmenter {
    fn segment(&self, text: &str) -> Vec<Segment> {
        if text.trim().is_empty() {
            return vec![];
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut segments = Vec::new();
        let mut search_from = 0;
        let mut seg_start = 0;

        let mut idx = 0;
        while idx < chars.len() {
            let (i, c) = chars[idx];
            if !matches!(c, '.' | '!' | '?') {
                idx += 1;
                continue;
            }

            // Treat a punctuation run ("...", "?!") as one boundary at its end.
            if idx + 1 < chars.len() && matches!(chars[idx + 1].1, '.' | '!' | '?') {
                idx += 1;
                continue;
            }

            // Require whitespace then a capital letter after the punctuation.
            let mut next = idx + 1;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }
            let followed_by_capital =
                next > idx + 1 && next < chars.len() && chars[next].1.is_uppercase();

            if followed_by_capital && !(c == '.' && Self::is_abbreviation(text, i)) {
                let raw_end = i + c.len_utf8();
                Self::push_candidate(text, seg_start, raw_end, &mut search_from, &mut segments);
                seg_start = chars[next].0;
                idx = next;
            } else {
                idx += 1;
            }
        }

        // Remainder (or the whole text when no boundary was found).
        Self::push_candidate(text, seg_start, text.len(), &mut search_from, &mut segments);

        segments
    }
}
