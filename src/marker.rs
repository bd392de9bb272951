//! # Marker Codec
//!
//! The marker is the only persistent trace an interrupted shift leaves in the
//! file. The writer appends it after every chunk; each following write covers
//! it again, so only the marker behind the last completed write survives.
//! Content depends on `(gap, marker_size)` alone, which lets a later run
//! rebuild the exact bytes and search for them.

use memchr::memchr;

/// Symbols the marker cycles through, indexed by byte position.
pub const MARKER_ALPHABET: &[u8; 16] = b"0123456789ABCDEF";

/// Length of the marker for a given gap: `min(gap, marker_size)`.
pub fn marker_len(gap: u64, marker_size: usize) -> usize {
    gap.min(marker_size as u64) as usize
}

/// Build the marker for a shift with the given gap.
pub fn build_marker(gap: u64, marker_size: usize) -> Vec<u8> {
    (0..marker_len(gap, marker_size))
        .map(|i| MARKER_ALPHABET[i % MARKER_ALPHABET.len()])
        .collect()
}

/// Streaming substring matcher for the marker.
///
/// Keeps a partial-match length across calls so a marker split over two read
/// blocks is still found. On a mismatch the partial match falls back along
/// the failure table instead of restarting at zero, which matters because the
/// cyclic marker overlaps itself every 16 bytes.
#[derive(Debug, Clone)]
pub struct MarkerMatcher {
    pattern: Vec<u8>,
    failure: Vec<usize>,
    matched: usize,
}

impl MarkerMatcher {
    /// Returns `None` for an empty pattern, which would match everywhere.
    pub fn new(pattern: Vec<u8>) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        let failure = failure_table(&pattern);
        Some(Self {
            pattern,
            failure,
            matched: 0,
        })
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Bytes of the pattern matched by the input seen so far.
    pub fn partial(&self) -> usize {
        self.matched
    }

    /// Feed one byte; returns true when it completes a match.
    pub fn feed(&mut self, byte: u8) -> bool {
        while self.matched > 0 && self.pattern[self.matched] != byte {
            self.matched = self.failure[self.matched - 1];
        }
        if self.pattern[self.matched] == byte {
            self.matched += 1;
        }
        if self.matched == self.pattern.len() {
            self.matched = self.failure[self.matched - 1];
            return true;
        }
        false
    }

    /// Scan `data` and return the index of the byte that completes the first
    /// match, continuing any partial match left by earlier calls.
    pub fn find(&mut self, data: &[u8]) -> Option<usize> {
        let first = self.pattern[0];
        let mut pos = 0usize;
        while pos < data.len() {
            if self.matched == 0 {
                pos += memchr(first, &data[pos..])?;
            }
            if self.feed(data[pos]) {
                return Some(pos);
            }
            pos += 1;
        }
        None
    }
}

fn failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut failure = vec![0usize; pattern.len()];
    let mut k = 0usize;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = failure[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        failure[i] = k;
    }
    failure
}
