//! Driving a [`StreamSession`] from a live response body.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::time::Duration;

use super::session::StreamSession;
use crate::error::{LillyError, LillyResult};
use crate::traits::HttpError;

/// Pull chunks from `body` until it ends, feeding each through `session`.
///
/// Awaiting the next chunk is the only suspension point; each chunk is fully
/// decoded, re-spaced and delivered to `sink` before the next is requested.
/// With `idle_timeout` set, a gap longer than that between chunks fails the
/// read with [`LillyError::IdleTimeout`]; otherwise a stalled upstream keeps
/// the session open until the transport itself errors.
pub async fn read_stream<S, F>(
    mut body: S,
    session: &mut StreamSession,
    idle_timeout: Option<Duration>,
    mut sink: F,
) -> LillyResult<()>
where
    S: Stream<Item = Result<Bytes, HttpError>> + Unpin,
    F: FnMut(&str),
{
    loop {
        let next = match idle_timeout {
            Some(limit) => tokio::time::timeout(limit, body.next())
                .await
                .map_err(|_| {
                    tracing::warn!(timeout_ms = limit.as_millis() as u64, "stream idle timeout");
                    LillyError::IdleTimeout { after: limit }
                })?,
            None => body.next().await,
        };

        match next {
            Some(Ok(chunk)) => session.feed(&chunk, &mut sink),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "stream read failed");
                return Err(e.into());
            }
            None => {
                session.finish(&mut sink);
                return Ok(());
            }
        }
    }
}
