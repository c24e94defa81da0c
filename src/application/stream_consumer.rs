//! StreamConsumer - folds a fragment sequence into one growing string.
//!
//! Consumption stops as soon as the turn's cancellation token fires; after
//! that no further progress callbacks run. An optional deadline bounds the
//! whole turn, including the initial handshake.

use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::ports::{FragmentStream, GenerationError};

/// Why consumption ended without a final text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The service could not be reached or returned no usable sequence.
    #[error("stream could not be opened: {0}")]
    Init(GenerationError),

    /// The sequence failed partway.
    #[error("stream failed: {0}")]
    Fault(GenerationError),

    #[error("stream cancelled")]
    Cancelled,

    #[error("stream exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl StreamError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}

/// Progress notifications, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamProgress<'a> {
    /// The sequence was obtained; fragments may follow.
    Opened,
    /// Cumulative text after one more fragment.
    Accumulated(&'a str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamConsumer {
    deadline: Option<Duration>,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every consumption by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Opens the sequence and accumulates it.
    ///
    /// Concatenation is exact: no trimming, no deduplication. Returns the
    /// final text once the sequence is exhausted.
    ///
    /// # Errors
    ///
    /// - `Init` if `open` fails
    /// - `Fault` if a fragment is an error
    /// - `Cancelled` if `cancellation` fires first
    /// - `DeadlineExceeded` if the deadline elapses first
    pub async fn consume<F, P>(
        &self,
        open: F,
        cancellation: &CancellationToken,
        mut on_progress: P,
    ) -> Result<String, StreamError>
    where
        F: Future<Output = Result<FragmentStream, GenerationError>>,
        P: FnMut(StreamProgress<'_>),
    {
        let body = async {
            let mut fragments = open.await.map_err(StreamError::Init)?;
            if cancellation.is_cancelled() {
                return Err(StreamError::Cancelled);
            }
            on_progress(StreamProgress::Opened);

            let mut accumulated = String::new();
            while let Some(item) = fragments.next().await {
                let fragment = item.map_err(StreamError::Fault)?;
                if cancellation.is_cancelled() {
                    return Err(StreamError::Cancelled);
                }
                accumulated.push_str(&fragment.text);
                on_progress(StreamProgress::Accumulated(&accumulated));
            }
            Ok(accumulated)
        };

        let bounded = async {
            match self.deadline {
                Some(limit) => tokio::time::timeout(limit, body)
                    .await
                    .map_err(|_| StreamError::DeadlineExceeded(limit))?,
                None => body.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(StreamError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerationService;
    use crate::ports::{GenerationRequest, GenerationService};

    fn request() -> GenerationRequest {
        GenerationRequest {
            persona: None,
            profile: None,
            history: vec![],
            language: "English".to_string(),
        }
    }

    mod accumulation {
        use super::*;

        #[tokio::test]
        async fn accumulates_in_order_and_reports_each_step() {
            let service = MockGenerationService::new().with_fragments(["Hel", "lo", ", ", "world"]);
            let token = CancellationToken::new();
            let mut seen = Vec::new();

            let text = StreamConsumer::new()
                .consume(service.open_stream(request()), &token, |p| {
                    if let StreamProgress::Accumulated(acc) = p {
                        seen.push(acc.to_string());
                    }
                })
                .await
                .unwrap();

            assert_eq!(text, "Hello, world");
            assert_eq!(seen, vec!["Hel", "Hello", "Hello, ", "Hello, world"]);
        }

        #[tokio::test]
        async fn whitespace_is_preserved_exactly() {
            let service = MockGenerationService::new().with_fragments([" a ", " ", "b\n"]);
            let text = StreamConsumer::new()
                .consume(service.open_stream(request()), &CancellationToken::new(), |_| {})
                .await
                .unwrap();
            assert_eq!(text, " a  b\n");
        }

        #[tokio::test]
        async fn empty_sequence_yields_empty_text() {
            let service = MockGenerationService::new();
            let mut opened = false;
            let text = StreamConsumer::new()
                .consume(service.open_stream(request()), &CancellationToken::new(), |p| {
                    opened |= p == StreamProgress::Opened;
                })
                .await
                .unwrap();
            assert!(text.is_empty());
            assert!(opened);
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn open_failure_is_init_error() {
            let service = MockGenerationService::new()
                .with_open_error(GenerationError::Unavailable("down".into()));
            let err = StreamConsumer::new()
                .consume(service.open_stream(request()), &CancellationToken::new(), |_| {})
                .await
                .unwrap_err();
            assert!(matches!(err, StreamError::Init(GenerationError::Unavailable(_))));
        }

        #[tokio::test]
        async fn mid_sequence_failure_is_fault() {
            let service = MockGenerationService::new()
                .with_fragments(["one", "two"])
                .with_fault_after(1, GenerationError::Network("reset".into()));
            let mut updates = 0;
            let err = StreamConsumer::new()
                .consume(service.open_stream(request()), &CancellationToken::new(), |p| {
                    if matches!(p, StreamProgress::Accumulated(_)) {
                        updates += 1;
                    }
                })
                .await
                .unwrap_err();
            assert!(matches!(err, StreamError::Fault(_)));
            assert_eq!(updates, 1);
        }
    }

    mod cancellation {
        use super::*;

        #[tokio::test]
        async fn cancelled_before_start_never_reports() {
            let service = MockGenerationService::new().with_fragments(["x"]);
            let token = CancellationToken::new();
            token.cancel();
            let mut calls = 0;
            let err = StreamConsumer::new()
                .consume(service.open_stream(request()), &token, |_| calls += 1)
                .await
                .unwrap_err();
            assert!(err.is_cancelled());
            assert_eq!(calls, 0);
        }

        #[tokio::test]
        async fn cancel_mid_stream_stops_updates() {
            let service = MockGenerationService::new()
                .with_fragments(["a", "b", "c", "d", "e"])
                .with_fragment_delay(Duration::from_millis(10));
            let token = CancellationToken::new();
            let trigger = token.clone();
            let mut seen = Vec::new();

            let err = StreamConsumer::new()
                .consume(service.open_stream(request()), &token, |p| {
                    if let StreamProgress::Accumulated(acc) = p {
                        seen.push(acc.to_string());
                        if seen.len() == 2 {
                            trigger.cancel();
                        }
                    }
                })
                .await
                .unwrap_err();

            assert!(err.is_cancelled());
            assert_eq!(seen, vec!["a", "ab"]);
        }

        #[tokio::test(start_paused = true)]
        async fn deadline_elapses_as_error() {
            let service = MockGenerationService::new()
                .with_fragments(["slow", "slower"])
                .with_fragment_delay(Duration::from_secs(5));
            let err = StreamConsumer::new()
                .with_deadline(Duration::from_secs(3))
                .consume(service.open_stream(request()), &CancellationToken::new(), |_| {})
                .await
                .unwrap_err();
            assert_eq!(err, StreamError::DeadlineExceeded(Duration::from_secs(3)));
        }
    }
}
