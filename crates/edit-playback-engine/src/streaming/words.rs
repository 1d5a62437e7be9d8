/// The next piece of text handed out by a [`WordTokenizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordChunk {
    pub value: String,
    /// True when `value` is everything that was left.
    pub is_full_string: bool,
}

/// Splits the remaining replacement text into playback chunks.
pub trait WordTokenizer {
    /// Takes the next `count` words from the front of `text`.
    fn next_words(&self, text: &str, count: usize) -> WordChunk;
}

/// A word is any leading whitespace, a run of non-whitespace, and the
/// whitespace that follows it. Concatenating the chunks reproduces the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceWords;

impl WordTokenizer for WhitespaceWords {
    fn next_words(&self, text: &str, count: usize) -> WordChunk {
        let end = end_of_words(text, count.max(1));
        WordChunk {
            value: text[..end].to_string(),
            is_full_string: end == text.len(),
        }
    }
}

/// Byte offset just past the first `count` words.
fn end_of_words(text: &str, count: usize) -> usize {
    let mut words = 0;
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            if words == count {
                return i;
            }
            words += 1;
            in_word = true;
        }
    }
    text.len()
}
