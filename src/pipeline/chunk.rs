//! Recursive character text splitting.
//!
//! The document is split on the coarsest separator that appears in it
//! (paragraph break, then line break, then space, then individual
//! characters). Pieces that still exceed `chunk_size` are split again with the
//! next separator; pieces that fit are merged greedily back into chunks of at
//! most `chunk_size` characters, each new chunk repeating up to `overlap`
//! characters from the end of the previous one so that a fact straddling a
//! boundary is seen whole at least once.
//!
//! Lengths are counted in `char`s, not bytes.

use std::collections::VecDeque;
use tracing::{debug, warn};

/// Separators tried in order; `""` means "between every character".
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into overlapping chunks.
///
/// Returns no chunks for empty or whitespace-only input. Every returned
/// chunk is trimmed and non-empty; a chunk exceeds `chunk_size` only when a
/// single unsplittable piece is longer than the limit, which cannot happen
/// once the character-level separator is reached.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let splitter = Splitter {
        chunk_size: chunk_size.max(1),
        overlap: overlap.min(chunk_size.saturating_sub(1)),
    };
    let chunks = splitter.split(text, &SEPARATORS);
    debug!(
        "Split {} chars into {} chunks (size {}, overlap {})",
        char_len(text),
        chunks.len(),
        splitter.chunk_size,
        splitter.overlap
    );
    chunks
}

struct Splitter {
    chunk_size: usize,
    overlap: usize,
}

impl Splitter {
    fn split(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Pick the first separator present in the text; the rest are used
        // for pieces that are still too long.
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(idx).copied().unwrap_or("");
        let finer = separators.get(idx + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split(piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    /// Greedily pack small pieces into chunks joined by `separator`.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joined_len = |window: &VecDeque<&str>, total: usize| {
                total + len + if window.is_empty() { 0 } else { sep_len }
            };

            if joined_len(&window, total) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of {} chars, longer than the {} limit",
                        total, self.chunk_size
                    );
                }
                if !window.is_empty() {
                    push_chunk(&mut chunks, &window, separator);
                    // Drop from the front until what remains fits as overlap
                    // and leaves room for the incoming piece.
                    while total > self.overlap
                        || (total > 0 && joined_len(&window, total) > self.chunk_size)
                    {
                        let Some(front) = window.pop_front() else {
                            break;
                        };
                        total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                    }
                }
            }

            window.push_back(piece);
            total += len + if window.len() > 1 { sep_len } else { 0 };
        }

        if !window.is_empty() {
            push_chunk(&mut chunks, &window, separator);
        }
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
