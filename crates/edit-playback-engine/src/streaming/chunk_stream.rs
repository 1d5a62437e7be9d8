use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use futures::Stream;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::streaming::{WhitespaceWords, WordTokenizer};

/// Playback never runs slower than this many words per second.
pub const MIN_WORDS_PER_SECOND: u32 = 30;

/// Time between chunks for a requested rate, after applying the floor.
pub fn chunk_period(words_per_second: u32) -> Duration {
    let rate = words_per_second.max(MIN_WORDS_PER_SECOND);
    Duration::from_secs_f64(1.0 / f64::from(rate)).max(Duration::from_nanos(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Emitting,
    Done,
    Cancelled,
}

/// Replacement text handed out a few words at a time on a fixed timer.
///
/// The first chunk arrives one period after the stream is first polled. The
/// stream ends after the chunk that empties the remaining text, or as soon as
/// the cancellation token fires, whichever comes first. Both endings run the
/// same teardown exactly once: the timer and the cancellation listener are
/// dropped and every later poll returns `None`.
pub struct ChunkStream<T = WhitespaceWords> {
    remaining: String,
    tokenizer: T,
    words_per_chunk: usize,
    period: Duration,
    state: StreamState,
    emitted: usize,
    /// Created on first poll so the stream can be built outside a runtime
    interval: Option<Interval>,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    teardowns: usize,
}

impl ChunkStream<WhitespaceWords> {
    pub fn new(
        text: impl Into<String>,
        words_per_second: u32,
        cancellation: &CancellationToken,
    ) -> Self {
        Self::with_tokenizer(text, words_per_second, cancellation, WhitespaceWords)
    }
}

impl<T: WordTokenizer> ChunkStream<T> {
    pub fn with_tokenizer(
        text: impl Into<String>,
        words_per_second: u32,
        cancellation: &CancellationToken,
        tokenizer: T,
    ) -> Self {
        let remaining = text.into();
        let (state, cancelled) = if remaining.is_empty() {
            (StreamState::Done, None)
        } else {
            (
                StreamState::Emitting,
                Some(Box::pin(cancellation.clone().cancelled_owned())),
            )
        };

        Self {
            remaining,
            tokenizer,
            words_per_chunk: 1,
            period: chunk_period(words_per_second),
            state,
            emitted: 0,
            interval: None,
            cancelled,
            teardowns: 0,
        }
    }

    /// Emit `count` words per tick instead of one.
    #[must_use]
    pub fn words_per_chunk(mut self, count: usize) -> Self {
        self.words_per_chunk = count.max(1);
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    #[cfg(test)]
    pub(crate) fn teardowns(&self) -> usize {
        self.teardowns
    }

    fn close(&mut self, state: StreamState) {
        if self.state != StreamState::Emitting {
            return;
        }
        self.state = state;
        self.interval = None;
        self.cancelled = None;
        self.teardowns += 1;
        log::debug!(
            "chunk stream closed as {state:?} after {} chunks",
            self.emitted
        );
    }
}

impl<T: WordTokenizer + Unpin> Stream for ChunkStream<T> {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        let this = self.get_mut();
        if this.state != StreamState::Emitting {
            return Poll::Ready(None);
        }

        // Checked before the timer so a cancel during the wait wins the race
        if let Some(cancelled) = this.cancelled.as_mut() {
            if cancelled.as_mut().poll(cx).is_ready() {
                this.close(StreamState::Cancelled);
                return Poll::Ready(None);
            }
        }

        let period = this.period;
        let interval = this.interval.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        ready!(interval.poll_tick(cx));

        let chunk = this
            .tokenizer
            .next_words(&this.remaining, this.words_per_chunk);
        let value = if !chunk.value.is_empty() && this.remaining.starts_with(&chunk.value) {
            this.remaining.drain(..chunk.value.len());
            chunk.value
        } else {
            // Not a prefix, or no progress: hand out the rest so nothing is lost
            log::warn!(
                "tokenizer returned {:?}, which is not a non-empty prefix of the remaining text",
                chunk.value
            );
            std::mem::take(&mut this.remaining)
        };
        this.emitted += 1;
        log::trace!("chunk {}: {:?}", this.emitted, value);

        // The remaining text is the source of truth, not `is_full_string`
        if this.remaining.is_empty() {
            this.close(StreamState::Done);
        }
        Poll::Ready(Some(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            StreamState::Emitting => (0, Some(self.remaining.len())),
            StreamState::Done | StreamState::Cancelled => (0, Some(0)),
        }
    }
}
