//! Text Splitting - words, lines, and highlight ranges
//!
//! Stagger controllers animate per word or per line, so the text has to be
//! split the same way every time regardless of host. Words are runs of
//! non-whitespace with punctuation kept attached ("term," stays one word);
//! lines are a greedy wrap over display width, so CJK and other wide
//! characters count double.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Split text into display words.
///
/// Whitespace of any kind separates words; punctuation stays attached to
/// its neighbor. Empty input yields no words.
///
/// # Example
///
/// ```
/// use scrollstage::motion::text::split_words;
///
/// let words = split_words("Build for the long term, today.");
/// assert_eq!(words[4], "term,");
/// assert_eq!(words.len(), 6);
/// ```
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            current.push_str(segment);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Display width of a string in monospace cells. Wide characters (CJK,
/// full-width forms) count as two.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Greedy wrap into lines of at most `max_width` display cells.
///
/// Words never break mid-word; a word wider than `max_width` gets a line
/// of its own and overflows.
pub fn split_lines(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;

    for word in split_words(text) {
        let word_width = display_width(&word);
        if line.is_empty() {
            line_width = word_width;
            line = word;
        } else if line_width + 1 + word_width <= max_width {
            line.push(' ');
            line.push_str(&word);
            line_width += 1 + word_width;
        } else {
            lines.push(std::mem::replace(&mut line, word));
            line_width = word_width;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Locate the word range spanned by a highlight phrase.
///
/// Matching ignores leading and trailing punctuation on both sides, so a
/// highlight of "long term" finds `["long", "term,"]`. Returns the first
/// occurrence, or `None` when the phrase does not appear.
pub fn highlight_range(words: &[String], highlight: &str) -> Option<Range<usize>> {
    let needle = split_words(highlight);
    if needle.is_empty() || needle.len() > words.len() {
        return None;
    }

    (0..=words.len() - needle.len()).find(|&start| {
        needle
            .iter()
            .enumerate()
            .all(|(i, phrase_word)| words_match(&words[start + i], phrase_word))
    })
    .map(|start| start..start + needle.len())
}

fn words_match(word: &str, phrase_word: &str) -> bool {
    if word == phrase_word {
        return true;
    }
    fn strip(s: &str) -> &str {
        s.trim_matches(|c: char| !c.is_alphanumeric())
    }
    let stripped = strip(word);
    !stripped.is_empty() && stripped == strip(phrase_word)
}

// =============================================================================
// TESTS
// =============================================================================
