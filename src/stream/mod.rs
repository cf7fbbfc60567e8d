//! Incremental stream-to-text reconstruction.
//!
//! Turns a chunked chat response body into readable text:
//!
//! 1. [`decoder`] - UTF-8 decoding that survives code points split across chunks
//! 2. [`frame`] - line reassembly, `data:` stripping, `[DONE]` detection
//! 3. [`payload`] - delta extraction from JSON payloads, verbatim fallback
//! 4. [`sanitize`] - control and zero-width character removal
//! 5. [`respace`] - whitespace reconstruction between fragments
//! 6. [`session`] - per-request state tying the above together
//! 7. [`reader`] - async driver over a live body

pub mod decoder;
pub mod frame;
pub mod payload;
pub mod reader;
pub mod respace;
pub mod sanitize;
pub mod session;

pub use decoder::Utf8ChunkDecoder;
pub use frame::{parse_frame_line, Frame, FrameDecoder, FrameLine, DONE_SENTINEL};
pub use payload::{
    extract_delta, extract_fragment, fragment_from_payload, Fragment, FragmentSource,
};
pub use reader::read_stream;
pub use respace::{
    decide_spacing, respace, respace_with, SpacingDecision, SpacingRule, TokenBoundaries,
};
pub use sanitize::remove_control_chars;
pub use session::{SessionOptions, SessionState, StreamSession};

/// Run a complete in-memory chunk sequence through a fresh session.
pub fn reconstruct<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut session = StreamSession::new();
    for chunk in chunks {
        session.feed(chunk, |_| {});
    }
    session.finish(|_| {});
    session.into_output()
}
