//! Line-oriented event-stream consumption.
//!
//! `EventStream` is a pull-based state machine over a byte stream. Each
//! pull yields the payload of the next `data: ` line, `None` once the
//! stream is over, or the error that ended it. Any other line is skipped.
//! A `data: [DONE]` line ends the stream without producing a value.
//!
//! Payloads must be valid UTF-8, and no line may grow past the line limit
//! before its newline arrives; either violation ends the stream with
//! `ApiError::InvalidEvent`.
//!
//! Dropping the stream, calling [`EventStream::cancel`], or cancelling an
//! attached `CancellationToken` drops the underlying body, which releases
//! the connection.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::{BoxStream, FusedStream, Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, warn};

use crate::error::{ApiError, Result};

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_MARKER: &str = "[DONE]";
/// Longest line, in bytes, kept while waiting for its newline.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

pub(crate) type ByteStream = BoxStream<'static, Result<Bytes>>;
pub(crate) type Connect = BoxFuture<'static, Result<ByteStream>>;

enum State {
    /// Request sent (or about to be), waiting for the response head.
    Connecting(Connect),
    /// No complete line buffered; next step reads more bytes.
    AwaitingLine(ByteStream),
    /// At least one complete line is buffered.
    HaveLine(ByteStream),
    Closed,
    Errored,
}

enum Line {
    Event(String),
    Done,
    Ignored,
}

pub struct EventStream {
    state: State,
    buffer: Vec<u8>,
    max_line_length: usize,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
}

impl EventStream {
    pub(crate) fn connecting(connect: Connect) -> Self {
        Self {
            state: State::Connecting(connect),
            buffer: Vec::new(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            cancelled: None,
        }
    }

    /// Parse events out of an already-open byte stream.
    pub fn from_bytes<S>(bytes: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            state: State::AwaitingLine(bytes.boxed()),
            buffer: Vec::new(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            cancelled: None,
        }
    }

    /// Stop the stream as soon as `token` is cancelled. Events still
    /// sitting in the buffer are discarded.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancelled = Some(Box::pin(token.cancelled_owned()));
        self
    }

    /// Fail the stream once a line reaches `max` bytes without a newline.
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Stop consuming and release the connection. Later pulls return `None`.
    pub fn cancel(&mut self) {
        if !self.is_terminated() {
            debug!("event stream cancelled by consumer");
        }
        self.close();
    }

    /// Pull the next payload. `Ok(None)` means the stream is over.
    pub async fn next_event(&mut self) -> Result<Option<String>> {
        self.next().await.transpose()
    }

    fn close(&mut self) {
        self.state = State::Closed;
        self.buffer.clear();
        self.cancelled = None;
    }

    fn fail(&mut self, error: ApiError) -> Poll<Option<Result<String>>> {
        warn!(error = %error, "event stream failed");
        self.state = State::Errored;
        self.buffer.clear();
        self.cancelled = None;
        Poll::Ready(Some(Err(error)))
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    fn overflowed(&self) -> bool {
        self.buffer.len() > self.max_line_length
    }

    fn overflow_error(&self) -> ApiError {
        ApiError::InvalidEvent(format!(
            "line exceeds {} bytes without a newline",
            self.max_line_length
        ))
    }
}

/// Only `data: ` lines are decoded, so bytes elsewhere never fail the stream.
fn classify(line: &[u8]) -> Result<Line> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let Some(payload) = line.strip_prefix(DATA_PREFIX.as_bytes()) else {
        return Ok(Line::Ignored);
    };
    match std::str::from_utf8(payload) {
        Ok(DONE_MARKER) => Ok(Line::Done),
        Ok(payload) => Ok(Line::Event(payload.to_string())),
        Err(e) => Err(ApiError::InvalidEvent(format!("data line is not UTF-8: {}", e))),
    }
}

impl Stream for EventStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(cancelled) = this.cancelled.as_mut() {
            if cancelled.as_mut().poll(cx).is_ready() {
                this.cancel();
                return Poll::Ready(None);
            }
        }

        loop {
            match std::mem::replace(&mut this.state, State::Closed) {
                State::Connecting(mut connect) => match connect.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.state = State::Connecting(connect);
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok(body)) => this.state = State::AwaitingLine(body),
                    Poll::Ready(Err(e)) => return this.fail(e),
                },
                State::AwaitingLine(mut body) => match body.poll_next_unpin(cx) {
                    Poll::Pending => {
                        this.state = State::AwaitingLine(body);
                        return Poll::Pending;
                    }
                    Poll::Ready(Some(Ok(chunk))) => {
                        this.buffer.extend_from_slice(&chunk);
                        if chunk.contains(&b'\n') {
                            this.state = State::HaveLine(body);
                        } else if this.overflowed() {
                            let error = this.overflow_error();
                            return this.fail(error);
                        } else {
                            this.state = State::AwaitingLine(body);
                        }
                    }
                    Poll::Ready(Some(Err(e))) => return this.fail(e),
                    Poll::Ready(None) => {
                        debug!("event stream closed by server");
                        // The last line may arrive without a trailing newline.
                        let rest = std::mem::take(&mut this.buffer);
                        this.cancelled = None;
                        return match classify(&rest) {
                            Ok(Line::Event(payload)) => Poll::Ready(Some(Ok(payload))),
                            Ok(Line::Done | Line::Ignored) => Poll::Ready(None),
                            Err(e) => this.fail(e),
                        };
                    }
                },
                State::HaveLine(body) => match this.take_line() {
                    Some(line) => match classify(&line) {
                        Ok(Line::Event(payload)) => {
                            this.state = State::HaveLine(body);
                            return Poll::Ready(Some(Ok(payload)));
                        }
                        Ok(Line::Done) => {
                            debug!("event stream finished with {}", DONE_MARKER);
                            this.close();
                            return Poll::Ready(None);
                        }
                        Ok(Line::Ignored) => this.state = State::HaveLine(body),
                        Err(e) => return this.fail(e),
                    },
                    // The partial tail may already be over the limit.
                    None if this.overflowed() => {
                        let error = this.overflow_error();
                        return this.fail(error);
                    }
                    None => this.state = State::AwaitingLine(body),
                },
                State::Closed => return Poll::Ready(None),
                State::Errored => {
                    this.state = State::Errored;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl FusedStream for EventStream {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Closed | State::Errored)
    }
}
