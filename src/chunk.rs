/// One block of source data travelling from the reader to the writer.
///
/// The payload is allocated with spare capacity for the marker, so the
/// writer can append it without reallocating. A zero-length chunk ends the
/// stream.
#[derive(Debug)]
pub struct Chunk {
    pub source_offset: u64,
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Zeroed buffer of `len` bytes with room for `marker_len` more.
    pub fn with_capacity(source_offset: u64, len: usize, marker_len: usize) -> Self {
        let mut payload = Vec::with_capacity(len.saturating_add(marker_len));
        payload.resize(len, 0);
        Self {
            source_offset,
            payload,
        }
    }

    /// End-of-stream sentinel.
    pub fn end() -> Self {
        Self {
            source_offset: 0,
            payload: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_end(&self) -> bool {
        self.payload.is_empty()
    }

    /// Offset where this chunk lands after the shift.
    pub fn destination(&self, gap: u64) -> Option<u64> {
        self.source_offset.checked_sub(gap)
    }

    /// Append the marker behind the payload and return the bytes to write.
    pub fn seal(mut self, marker: &[u8]) -> Vec<u8> {
        self.payload.extend_from_slice(marker);
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserves_marker_capacity() {
        let chunk = Chunk::with_capacity(100, 64, 16);
        assert_eq!(chunk.len(), 64);
        assert!(chunk.payload.capacity() >= 80);
        assert!(!chunk.is_end());
    }

    #[test]
    fn end_chunk_is_empty() {
        let chunk = Chunk::end();
        assert!(chunk.is_end());
        assert_eq!(chunk.len(), 0);
    }

    #[test]
    fn destination_subtracts_gap() {
        let chunk = Chunk::with_capacity(4096, 8, 0);
        assert_eq!(chunk.destination(1024), Some(3072));
        assert_eq!(chunk.destination(5000), None);
    }

    #[test]
    fn seal_appends_marker() {
        let mut chunk = Chunk::with_capacity(0, 3, 2);
        chunk.payload.copy_from_slice(b"abc");
        assert_eq!(chunk.seal(b"01"), b"abc01".to_vec());
    }
}
