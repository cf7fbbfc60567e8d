//! Line framing for SSE-style and plain-text response bodies.
//!
//! The chat endpoint may answer with either of:
//! - `data: <json>` lines (OpenAI-style SSE), terminated by `data: [DONE]`
//! - bare text lines
//!
//! [`FrameDecoder`] reassembles lines across arbitrary chunk boundaries and
//! hands back one [`Frame`] per non-empty line.

use super::decoder::Utf8ChunkDecoder;

/// SSE data field marker.
pub const DATA_PREFIX: &str = "data:";

/// End-of-stream sentinel sent by OpenAI-compatible backends.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A single logical line of the transport, trimmed and stripped of `data:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Line content after trimming and prefix stripping
    pub text: String,
    /// Whether the line carried a `data:` prefix
    pub had_data_prefix: bool,
}

/// Classification of one raw transport line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameLine {
    /// Whitespace-only line
    Empty,
    /// The `[DONE]` sentinel
    Sentinel,
    /// A line carrying content
    Frame(Frame),
}

/// Byte order mark, trimmed along with whitespace.
const BOM: char = '\u{FEFF}';

fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == BOM
}

/// Classify a single raw line (without its line terminator).
///
/// Surrounding whitespace and stray byte order marks are ignored.
pub fn parse_frame_line(line: &str) -> FrameLine {
    let trimmed = line.trim_matches(is_trimmable);
    if trimmed.is_empty() {
        return FrameLine::Empty;
    }

    let (text, had_data_prefix) = match trimmed.strip_prefix(DATA_PREFIX) {
        Some(rest) => (rest.trim_matches(is_trimmable), true),
        None => (trimmed, false),
    };

    if text == DONE_SENTINEL {
        return FrameLine::Sentinel;
    }

    // "data:" with nothing after it
    if text.is_empty() {
        return FrameLine::Empty;
    }

    FrameLine::Frame(Frame {
        text: text.to_string(),
        had_data_prefix,
    })
}

/// Stateful line splitter over a chunked byte stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    decoder: Utf8ChunkDecoder,
    /// Unterminated partial line left over from the previous chunk
    buffer: String,
}

impl FrameDecoder {
    /// Create a new frame decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The unterminated partial line currently buffered.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Feed one chunk of bytes, returning every line it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<FrameLine> {
        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);

        let mut lines = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            lines.push(parse_frame_line(&line));
        }
        lines
    }

    /// Flush remaining state at end of stream.
    ///
    /// Whatever is left in the buffer, plus any bytes the UTF-8 decoder was
    /// still holding, becomes a final line even without a trailing newline.
    pub fn finish(&mut self) -> Option<FrameLine> {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);

        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Some(parse_frame_line(&line))
    }
}
