//! Token-bounded text chunking.
//!
//! [`Chunker::chunk`] splits raw text into the fewest segments that each fit
//! inside a token budget, preferring natural breakpoints: paragraph breaks
//! first, sentence boundaries next, greedy word runs as a last resort. The
//! split is a pure function of `(text, budget)` — identical inputs always
//! yield identical chunk sequences.
//!
//! Token counts come from `tiktoken-rs` (cl100k_base) when the default
//! `chunking-tiktoken` feature is enabled, with a character-based estimate as
//! the feature-off fallback.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::IndexError;
use crate::types::Chunk;

/// Default per-chunk token budget.
pub const DEFAULT_CHUNK_TOKENS: usize = 512;

enum TokenCounter {
    #[cfg(feature = "chunking-tiktoken")]
    Tiktoken(Box<tiktoken_rs::CoreBPE>),
    #[cfg(not(feature = "chunking-tiktoken"))]
    Heuristic,
}

/// Deterministic recursive text splitter.
pub struct Chunker {
    max_tokens: usize,
    counter: TokenCounter,
}

impl Chunker {
    /// Creates a chunker with the given token budget.
    ///
    /// Loading the tokenizer vocabulary happens here, once, so the split
    /// itself stays infallible.
    pub fn new(max_tokens: usize) -> Result<Self, IndexError> {
        if max_tokens == 0 {
            return Err(IndexError::InvalidConfig(
                "chunk token budget must be at least 1".into(),
            ));
        }

        #[cfg(feature = "chunking-tiktoken")]
        let counter = TokenCounter::Tiktoken(Box::new(
            tiktoken_rs::cl100k_base().map_err(|err| IndexError::Chunking(err.to_string()))?,
        ));
        #[cfg(not(feature = "chunking-tiktoken"))]
        let counter = TokenCounter::Heuristic;

        Ok(Self {
            max_tokens,
            counter,
        })
    }

    /// Number of tokens `text` occupies under the configured counter.
    pub fn token_count(&self, text: &str) -> usize {
        match &self.counter {
            #[cfg(feature = "chunking-tiktoken")]
            TokenCounter::Tiktoken(bpe) => bpe.encode_ordinary(text).len(),
            #[cfg(not(feature = "chunking-tiktoken"))]
            TokenCounter::Heuristic => text.chars().count().div_ceil(4),
        }
    }

    /// Splits `text` into ordered chunks, each within the token budget.
    ///
    /// Empty or whitespace-only input yields an empty sequence.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut packer = Packer::new(self);
        for paragraph in text
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
        {
            if self.token_count(paragraph) <= self.max_tokens {
                packer.push(paragraph, "\n\n");
            } else {
                self.pack_oversized_paragraph(paragraph, &mut packer);
            }
        }

        packer
            .finish()
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Chunk { text, ordinal })
            .collect()
    }

    fn pack_oversized_paragraph(&self, paragraph: &str, packer: &mut Packer<'_>) {
        for sentence in paragraph
            .split_sentence_bounds()
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
        {
            if self.token_count(sentence) <= self.max_tokens {
                packer.push(sentence, " ");
            } else {
                for run in self.split_hard(sentence) {
                    packer.push(&run, " ");
                }
            }
        }
    }

    /// Greedy word-level split for a sentence that alone exceeds the budget.
    /// Every returned run fits within the budget.
    fn split_hard(&self, sentence: &str) -> Vec<String> {
        let mut runs = Vec::new();
        let mut run = String::new();

        for word in sentence.split_whitespace() {
            if self.token_count(word) > self.max_tokens {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
                runs.extend(self.split_word(word));
                continue;
            }

            if run.is_empty() {
                run.push_str(word);
                continue;
            }

            let candidate = format!("{run} {word}");
            if self.token_count(&candidate) <= self.max_tokens {
                run = candidate;
            } else {
                runs.push(std::mem::take(&mut run));
                run.push_str(word);
            }
        }

        if !run.is_empty() {
            runs.push(run);
        }
        runs
    }

    /// Grapheme-level split for a single word that alone exceeds the budget.
    fn split_word(&self, word: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();

        for grapheme in word.graphemes(true) {
            let mut candidate = piece.clone();
            candidate.push_str(grapheme);
            if !piece.is_empty() && self.token_count(&candidate) > self.max_tokens {
                pieces.push(std::mem::take(&mut piece));
                piece.push_str(grapheme);
            } else {
                piece = candidate;
            }
        }

        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

/// Accumulates atoms into chunks, merging neighbors while the merged text
/// still fits the budget. Atoms handed to [`Packer::push`] must individually
/// fit the budget.
struct Packer<'a> {
    chunker: &'a Chunker,
    chunks: Vec<String>,
    current: String,
}

impl<'a> Packer<'a> {
    fn new(chunker: &'a Chunker) -> Self {
        Self {
            chunker,
            chunks: Vec::new(),
            current: String::new(),
        }
    }

    fn push(&mut self, atom: &str, separator: &str) {
        if self.current.is_empty() {
            self.current.push_str(atom);
            return;
        }

        let mut candidate =
            String::with_capacity(self.current.len() + separator.len() + atom.len());
        candidate.push_str(&self.current);
        candidate.push_str(separator);
        candidate.push_str(atom);

        if self.chunker.token_count(&candidate) <= self.chunker.max_tokens {
            self.current = candidate;
        } else {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current.push_str(atom);
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.chunks.push(self.current);
        }
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(max_tokens: usize) -> Chunker {
        Chunker::new(max_tokens).unwrap()
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(matches!(
            Chunker::new(0),
            Err(IndexError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_and_whitespace_input_produce_no_chunks() {
        let chunker = chunker(64);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = chunker(64);
        let chunks = chunker.chunk("the quick brown fox");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[0].text, "the quick brown fox");
    }

    #[test]
    fn chunking_is_deterministic() {
        let chunker = chunker(16);
        let text = "one two three four five six seven eight nine ten. \
                    eleven twelve thirteen fourteen fifteen sixteen seventeen. \
                    eighteen nineteen twenty twenty-one twenty-two twenty-three."
            .repeat(3);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn every_chunk_fits_the_budget_and_ordinals_are_sequential() {
        let chunker = chunker(12);
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa. \
                    lambda mu nu xi omicron pi rho sigma tau upsilon phi chi."
            .repeat(4);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for (index, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, index);
            assert!(!chunk.text.trim().is_empty());
            assert!(chunker.token_count(&chunk.text) <= 12);
        }
    }

    #[test]
    fn paragraph_breaks_win_over_mid_paragraph_splits() {
        let chunker = chunker(24);
        let first = "the cat sat on the mat and the dog ran off down the long road";
        let second = "a bird flew over the old barn and then it came back home again";
        assert!(chunker.token_count(first) <= 24);
        assert!(chunker.token_count(second) <= 24);
        let chunks = chunker.chunk(&format!("{first}\n\n{second}"));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, first);
        assert_eq!(chunks[1].text, second);
    }

    #[test]
    fn pathological_single_word_still_splits() {
        let chunker = chunker(8);
        let word = "a".repeat(2000);
        let chunks = chunker.chunk(&word);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunker.token_count(&chunk.text) <= 8);
        }
        // Nothing is lost in the hard split (merged runs are space-joined).
        let rebuilt: String = chunks
            .iter()
            .map(|chunk| chunk.text.replace(' ', ""))
            .collect();
        assert_eq!(rebuilt, word);
    }
}
