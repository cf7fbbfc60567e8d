//! Incremental UTF-8 decoding for chunked response bodies.
//!
//! Network chunks are not aligned to character boundaries, so a code point
//! may arrive split across two (or more) chunks. [`Utf8ChunkDecoder`] holds
//! back the incomplete tail of each chunk until the remaining bytes arrive.

/// Longest possible UTF-8 encoded code point.
const MAX_UTF8_LEN: usize = 4;

/// UTF-8 encoded byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Stateful UTF-8 decoder that buffers incomplete multi-byte sequences.
///
/// Bytes that can never form valid UTF-8 are replaced with U+FFFD, the same
/// way a non-fatal text decoder behaves. A sequence that is merely cut off at
/// the end of a chunk is never replaced; it is kept until the next call.
///
/// One byte order mark at the very start of the stream is dropped, even when
/// it arrives split across chunks.
#[derive(Debug, Default, Clone)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
    /// Set once the first bytes have been checked for a BOM
    bom_checked: bool,
}

impl Utf8ChunkDecoder {
    /// Create a decoder with an empty carry-over buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes currently held back waiting for the rest of a code point.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode one chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut rest: &[u8] = &bytes;
        if !self.bom_checked {
            if rest.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(rest) {
                self.pending = bytes;
                return String::new();
            }
            self.bom_checked = true;
            if let Some(after) = rest.strip_prefix(UTF8_BOM) {
                tracing::trace!("dropping leading byte order mark");
                rest = after;
            }
        }

        let mut out = String::with_capacity(rest.len());

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is well-formed
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            // Truncated sequence at the end of input: wait for more bytes.
                            debug_assert!(after.len() < MAX_UTF8_LEN);
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush the decoder at end of stream.
    ///
    /// Any bytes still held back can no longer be completed and decode to a
    /// single replacement character.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert_eq!(decoder.pending_len(), 0);
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_split_two_byte_char() {
        let bytes = "é".as_bytes();
        let mut decoder = Utf8ChunkDecoder::new();

        assert_eq!(decoder.decode(&bytes[..1]), "");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(decoder.decode(&bytes[1..]), "é");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_split_four_byte_char_across_three_chunks() {
        let bytes = "a🦀b".as_bytes();
        let mut decoder = Utf8ChunkDecoder::new();

        let mut out = String::new();
        out.push_str(&decoder.decode(&bytes[..2]));
        out.push_str(&decoder.decode(&bytes[2..4]));
        out.push_str(&decoder.decode(&bytes[4..]));

        assert_eq!(out, "a🦀b");
        assert!(!out.contains(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn test_invalid_byte_replaced() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"ab\xffcd"), "ab\u{FFFD}cd");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_truncated_sequence_at_end_of_stream() {
        let bytes = "€".as_bytes();
        let mut decoder = Utf8ChunkDecoder::new();

        assert_eq!(decoder.decode(&bytes[..2]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_leading_bom_dropped() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"\xEF\xBB\xBFdata: x"), "data: x");
    }

    #[test]
    fn test_leading_bom_split_byte_by_byte() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"\xEF"), "");
        assert_eq!(decoder.decode(b"\xBB"), "");
        assert_eq!(decoder.pending_len(), 2);
        assert_eq!(decoder.decode(b"\xBFHi"), "Hi");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_only_first_bom_dropped() {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = decoder.decode(b"\xEF\xBB\xBFa");
        out.push_str(&decoder.decode(b"\xEF\xBB\xBFb"));
        assert_eq!(out, "a\u{FEFF}b");
    }

    #[test]
    fn test_empty_chunk_does_not_consume_bom_check() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b""), "");
        assert_eq!(decoder.decode(b"\xEF\xBB\xBFok"), "ok");
    }

    #[test]
    fn test_bom_prefix_then_other_bytes() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"\xEF"), "");
        // EF 41 can never be a BOM or a valid sequence
        assert_eq!(decoder.decode(b"A"), "\u{FFFD}A");
    }

    #[test]
    fn test_truncated_bom_at_end_of_stream() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"\xEF\xBB"), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_every_split_point_round_trips() {
        let text = "naïve café — 日本語 🦀 done";
        let bytes = text.as_bytes();

        for split in 0..=bytes.len() {
            let mut decoder = Utf8ChunkDecoder::new();
            let mut out = decoder.decode(&bytes[..split]);
            out.push_str(&decoder.decode(&bytes[split..]));
            out.push_str(&decoder.finish());
            assert_eq!(out, text, "split at byte {}", split);
        }
    }
}
