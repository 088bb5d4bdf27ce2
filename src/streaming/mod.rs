//! Stream relay
//!
//! Pumps an upstream response body to the downstream connection one chunk at
//! a time. A chunk is handed downstream before the next upstream read is
//! issued, nothing is inspected or rewritten, and dropping the relay (client
//! gone) drops the upstream body with it.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::{
    error::RelayError,
    proxy::{ByteStream, RequestContext},
    routes::metrics::{record_relay_abort, record_relay_chunk},
};

/// Downstream body produced by the relay
pub type RelayStream = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>;

/// Build the relay for one response.
///
/// `upstream` is `None` when no body reader could be obtained; the result is
/// then a stream that closes immediately with zero bytes. `idle_timeout`
/// bounds the wait for each individual chunk, not the whole stream.
pub fn relay(
    upstream: Option<ByteStream>,
    idle_timeout: Option<Duration>,
    ctx: RequestContext,
) -> RelayStream {
    let Some(mut upstream) = upstream else {
        ctx.log_warning("Upstream body unavailable, closing stream with no data");
        return Box::pin(futures::stream::empty());
    };

    Box::pin(async_stream::stream! {
        let mut progress = RelayProgress::new(ctx);

        loop {
            let next = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, upstream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        let err = RelayError::IdleTimeout(limit);
                        progress.abort(&err);
                        yield Err(err);
                        break;
                    }
                },
                None => upstream.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    progress.record(&chunk);
                    yield Ok(chunk);
                    // Hand control back once so the connection writes this chunk
                    // before the next upstream read
                    tokio::task::yield_now().await;
                }
                Some(Err(e)) => {
                    let err = RelayError::Upstream(e.to_string());
                    progress.abort(&err);
                    yield Err(err);
                    break;
                }
                None => {
                    progress.finish();
                    break;
                }
            }
        }
    })
}

#[derive(Debug, PartialEq, Eq)]
enum RelayState {
    Open,
    Finished,
    Aborted,
}

/// Per-relay counters. Dropped while still open means the client disconnected.
struct RelayProgress {
    ctx: RequestContext,
    chunks: u64,
    bytes: u64,
    state: RelayState,
}

impl RelayProgress {
    fn new(ctx: RequestContext) -> Self {
        ctx.log_stream_started();
        Self {
            ctx,
            chunks: 0,
            bytes: 0,
            state: RelayState::Open,
        }
    }

    fn record(&mut self, chunk: &Bytes) {
        self.chunks += 1;
        self.bytes += chunk.len() as u64;
        record_relay_chunk(chunk.len());
    }

    fn finish(&mut self) {
        self.state = RelayState::Finished;
        self.ctx.log_stream_ended(self.chunks, self.bytes);
    }

    fn abort(&mut self, err: &RelayError) {
        self.state = RelayState::Aborted;
        record_relay_abort(err.reason());
        self.ctx.log_stream_aborted(self.chunks, &err.to_string());
    }
}

impl Drop for RelayProgress {
    fn drop(&mut self) {
        if self.state == RelayState::Open {
            record_relay_abort("client_disconnect");
            self.ctx.log_client_disconnected(self.chunks);
        }
    }
}
