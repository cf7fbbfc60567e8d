//! Per-request stream session.
//!
//! A [`StreamSession`] owns everything one chat response needs: the frame
//! decoder's partial-line buffer, the accumulated output used as spacing
//! context, and the lifecycle state. Sessions share nothing; two open chat
//! surfaces simply hold two sessions.

use super::frame::{FrameDecoder, FrameLine};
use super::payload::{extract_fragment, Fragment};
use super::respace::{respace_with, TokenBoundaries};
use super::sanitize::remove_control_chars;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No chunk received yet
    #[default]
    Idle,
    /// At least one chunk received, stream still open
    Streaming,
    /// Underlying stream ended; terminal
    Completed,
}

/// Options that shape how fragments are cleaned before re-spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Drop control and zero-width characters from fragments
    pub strip_control_chars: bool,
    /// Treat OpenAI-style delta tokens as carrying their own spacing
    pub trust_delta_spacing: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            strip_control_chars: true,
            trust_delta_spacing: true,
        }
    }
}

/// Incremental stream-to-text reconstruction for one response.
#[derive(Debug, Default)]
pub struct StreamSession {
    frames: FrameDecoder,
    output: String,
    state: SessionState,
    options: SessionOptions,
    saw_sentinel: bool,
    fragments: usize,
}

impl StreamSession {
    /// Create a session with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with explicit options.
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// All text delivered so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consume the session, returning the accumulated text.
    pub fn into_output(self) -> String {
        self.output
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Whether a `[DONE]` sentinel has been seen.
    pub fn saw_sentinel(&self) -> bool {
        self.saw_sentinel
    }

    /// Number of fragments processed so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Feed one raw chunk, calling `sink` with the corrected delta of every
    /// fragment it completes, in arrival order.
    pub fn feed<F>(&mut self, chunk: &[u8], mut sink: F)
    where
        F: FnMut(&str),
    {
        match self.state {
            SessionState::Completed => {
                tracing::warn!(
                    bytes = chunk.len(),
                    "chunk received after stream completed, ignoring"
                );
                return;
            }
            SessionState::Idle => {
                tracing::debug!("stream session started");
                self.state = SessionState::Streaming;
            }
            SessionState::Streaming => {}
        }

        for line in self.frames.feed(chunk) {
            self.handle_line(line, &mut sink);
        }
    }

    /// Mark the underlying stream as ended, flushing any unterminated line.
    pub fn finish<F>(&mut self, mut sink: F)
    where
        F: FnMut(&str),
    {
        if self.is_completed() {
            return;
        }
        if let Some(line) = self.frames.finish() {
            self.handle_line(line, &mut sink);
        }
        self.state = SessionState::Completed;
        tracing::debug!(
            fragments = self.fragments,
            chars = self.output.chars().count(),
            saw_sentinel = self.saw_sentinel,
            "stream session completed"
        );
    }

    /// Re-space one fragment against the accumulated output and append it.
    ///
    /// Returns the delta that was appended (possibly empty).
    pub fn push_fragment(&mut self, fragment: &Fragment) -> String {
        self.fragments += 1;

        let boundaries = if self.options.trust_delta_spacing {
            fragment.source.boundaries()
        } else {
            TokenBoundaries::Inferred
        };

        let delta = if self.options.strip_control_chars {
            respace_with(&remove_control_chars(&fragment.text), &self.output, boundaries)
        } else {
            respace_with(&fragment.text, &self.output, boundaries)
        };
        self.output.push_str(&delta);
        delta
    }

    fn handle_line<F>(&mut self, line: FrameLine, sink: &mut F)
    where
        F: FnMut(&str),
    {
        match line {
            FrameLine::Empty => {}
            FrameLine::Sentinel => {
                tracing::trace!("received [DONE] sentinel");
                self.saw_sentinel = true;
            }
            FrameLine::Frame(frame) => {
                let fragment = extract_fragment(&frame);
                let delta = self.push_fragment(&fragment);
                sink(&delta);
            }
        }
    }
}
