//! Mock generation service for tests and offline mode.
//!
//! Replays scripted fragment sequences, one script per call.
//!
//! # Features
//!
//! - Scripted fragments, consumed in order
//! - Open failures and mid-sequence faults
//! - Per-fragment delay for cancellation and deadline testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let service = MockGenerationService::new()
//!     .with_fragments(["Hel", "lo"])
//!     .with_fault_after(1, GenerationError::Network("reset".into()));
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{Fragment, FragmentStream, GenerationError, GenerationRequest, GenerationService};

/// One scripted reply.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    fragments: Vec<String>,
    open_error: Option<GenerationError>,
    /// Fails after this many fragments were delivered.
    fault: Option<(usize, GenerationError)>,
}

impl MockScript {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn open_error(error: GenerationError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::default()
        }
    }

    fn into_items(self) -> Vec<Result<Fragment, GenerationError>> {
        let mut items: Vec<_> = self.fragments.into_iter().map(|text| Ok(Fragment::new(text))).collect();
        if let Some((after, error)) = self.fault {
            items.truncate(after);
            items.push(Err(error));
        }
        items
    }
}

/// Scripted [`GenerationService`].
#[derive(Debug, Clone, Default)]
pub struct MockGenerationService {
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
    /// Used once the queue is empty.
    fallback: MockScript,
    fragment_delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply made of these fragments.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockScript::fragments(fragments))
    }

    /// Queues a call that fails before any sequence is returned.
    pub fn with_open_error(self, error: GenerationError) -> Self {
        self.with_script(MockScript::open_error(error))
    }

    /// Makes the most recently queued reply fail after `after` fragments.
    pub fn with_fault_after(self, after: usize, error: GenerationError) -> Self {
        if let Some(script) = lock(&self.scripts).back_mut() {
            script.fault = Some((after, error));
        }
        self
    }

    pub fn with_script(self, script: MockScript) -> Self {
        lock(&self.scripts).push_back(script);
        self
    }

    /// Reply used when no scripted reply is left.
    pub fn with_fallback(mut self, script: MockScript) -> Self {
        self.fallback = script;
        self
    }

    /// Delay before each fragment is delivered.
    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    fn next_script(&self) -> MockScript {
        lock(&self.scripts)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn open_stream(&self, request: GenerationRequest) -> Result<FragmentStream, GenerationError> {
        lock(&self.calls).push(request);

        let mut script = self.next_script();
        if let Some(error) = script.open_error.take() {
            return Err(error);
        }

        let delay = self.fragment_delay;
        let items = stream::iter(script.into_items());
        if delay.is_zero() {
            return Ok(Box::pin(items));
        }
        Ok(Box::pin(items.then(move |item| async move {
            sleep(delay).await;
            item
        })))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            persona: None,
            profile: None,
            history: vec![],
            language: "English".into(),
        }
    }

    async fn collect(service: &MockGenerationService) -> Result<Vec<Result<Fragment, GenerationError>>, GenerationError> {
        Ok(service.open_stream(request()).await?.collect().await)
    }

    #[tokio::test]
    async fn scripts_are_consumed_in_order() {
        let service = MockGenerationService::new()
            .with_fragments(["a", "b"])
            .with_fragments(["c"]);

        assert_eq!(collect(&service).await.unwrap().len(), 2);
        assert_eq!(collect(&service).await.unwrap(), vec![Ok(Fragment::new("c"))]);
        assert!(collect(&service).await.unwrap().is_empty());
        assert_eq!(service.call_count(), 3);
    }

    #[tokio::test]
    async fn fallback_is_used_when_queue_is_empty() {
        let service = MockGenerationService::new().with_fallback(MockScript::fragments(["offline"]));
        assert_eq!(collect(&service).await.unwrap(), vec![Ok(Fragment::new("offline"))]);
        assert_eq!(collect(&service).await.unwrap(), vec![Ok(Fragment::new("offline"))]);
    }

    #[tokio::test]
    async fn open_error_is_returned() {
        let service = MockGenerationService::new().with_open_error(GenerationError::AuthenticationFailed);
        assert_eq!(collect(&service).await.unwrap_err(), GenerationError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn fault_truncates_and_appends_error() {
        let service = MockGenerationService::new()
            .with_fragments(["1", "2", "3"])
            .with_fault_after(2, GenerationError::Parse("bad".into()));
        let items = collect(&service).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
    }

    #[tokio::test]
    async fn records_requests() {
        let service = MockGenerationService::new();
        let _ = collect(&service).await;
        assert_eq!(service.calls()[0].language, "English");
    }
}
