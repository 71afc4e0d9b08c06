//! Reading time estimate

use crate::cms::ContentGroup;

/// Reading speed used when none is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Words across the bodies of every content group
pub fn body_word_count(content: &[ContentGroup]) -> usize {
    content
        .iter()
        .filter_map(|group| group.body.as_ref())
        .map(|body| body.word_count())
        .sum()
}

/// `words / wpm` rounded to the nearest minute, never below one
pub fn estimated_read_minutes(words: usize, words_per_minute: u32) -> u32 {
    let wpm = if words_per_minute == 0 {
        DEFAULT_WORDS_PER_MINUTE
    } else {
        words_per_minute
    };
    let minutes = (words as f64 / f64::from(wpm)).round();
    (minutes as u32).max(1)
}
