// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event-driven wait: list, then watch, re-listing whenever the watch drops.

use crate::config::Config;
use crate::constants::wait::DEFAULT_RECONNECT_DELAY_MS;
use crate::error::{HarnessError, Result};
use crate::kubernetes::source::{ChangeEvent, EventStream, ResourceClient};
use crate::selector::Selector;
use crate::wait::predicate::{Conditions, Verdict};
use futures::StreamExt;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

/// Terminal result of a wait, produced exactly once
pub enum Outcome<K> {
    /// A snapshot satisfied the success predicate
    Success(K),
    /// A snapshot satisfied the failure predicate; carries its reason text
    Failure(String),
    /// Nothing conclusive happened within the given budget
    Timeout(Duration),
    /// The initial list or watch call could not be made
    TransportError(HarnessError),
}

impl<K> Outcome<K> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Convert into a `Result`, describing the awaited thing as `what`
    pub fn into_result(self, what: &str) -> Result<K> {
        match self {
            Outcome::Success(obj) => Ok(obj),
            Outcome::Failure(reason) => Err(HarnessError::ConditionFailed(reason)),
            Outcome::Timeout(budget) => Err(HarnessError::Timeout(budget, what.to_string())),
            Outcome::TransportError(e) => Err(e),
        }
    }
}

impl<K> fmt::Debug for Outcome<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => write!(f, "Success"),
            Outcome::Failure(reason) => f.debug_tuple("Failure").field(reason).finish(),
            Outcome::Timeout(budget) => f.debug_tuple("Timeout").field(budget).finish(),
            Outcome::TransportError(e) => f.debug_tuple("TransportError").field(e).finish(),
        }
    }
}

/// Where the waiter stands. `Reconciling` always leads back to `Listing`
/// unless the deadline has passed.
enum State<K> {
    Listing,
    Watching(EventStream<K>),
    Reconciling,
    Terminal(Outcome<K>),
}

/// Blocks until a snapshot selected by `selector` satisfies one of the
/// `conditions`, or the timeout elapses.
///
/// A successful initial listing returns without opening a watch. Setup errors
/// on list or watch are returned as `Outcome::TransportError` without retry;
/// a watch that errors or closes mid-stream is dropped and the collection is
/// re-listed. Every exit path drops the open watch.
pub struct ConditionWaiter<'a, K, C: ?Sized> {
    client: &'a C,
    selector: &'a Selector,
    conditions: &'a Conditions<K>,
    reconnect_delay: Duration,
}

impl<'a, K, C> ConditionWaiter<'a, K, C>
where
    C: ResourceClient<K> + ?Sized,
    K: Send + 'static,
{
    pub fn new(client: &'a C, selector: &'a Selector, conditions: &'a Conditions<K>) -> Self {
        Self {
            client,
            selector,
            conditions,
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        }
    }

    /// Pause before re-listing after a dropped watch, bounded by the deadline
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Apply the configured reconnect delay
    pub fn with_config(self, config: &Config) -> Self {
        self.reconnect_delay(config.reconnect_delay)
    }

    #[instrument(skip(self), fields(selector = %self.selector))]
    pub async fn run(self, timeout: Duration) -> Outcome<K> {
        let deadline = Instant::now() + timeout;
        let mut state = State::Listing;
        let mut reconnects = 0u32;

        loop {
            state = match state {
                State::Listing => self.list(deadline, timeout).await,
                State::Watching(stream) => self.consume(stream, deadline, timeout).await,
                State::Reconciling => {
                    reconnects += 1;
                    sleep_until((Instant::now() + self.reconnect_delay).min(deadline)).await;
                    if Instant::now() >= deadline {
                        State::Terminal(Outcome::Timeout(timeout))
                    } else {
                        debug!(reconnects, "Re-listing after watch disconnect");
                        State::Listing
                    }
                }
                State::Terminal(outcome) => {
                    match &outcome {
                        Outcome::Success(_) => info!(reconnects, "Condition met"),
                        Outcome::Failure(reason) => warn!(reconnects, "Condition failed: {}", reason),
                        Outcome::Timeout(_) => warn!(reconnects, "Timed out after {:?}", timeout),
                        Outcome::TransportError(e) => warn!("Could not list or watch: {}", e),
                    }
                    return outcome;
                }
            };
        }
    }

    async fn list(&self, deadline: Instant, timeout: Duration) -> State<K> {
        let listing = match timeout_at(deadline, self.client.list(self.selector)).await {
            Err(_) => return State::Terminal(Outcome::Timeout(timeout)),
            Ok(Err(e)) => return State::Terminal(Outcome::TransportError(e)),
            Ok(Ok(listing)) => listing,
        };

        debug!(
            "Listed {} items at resource version {}",
            listing.items.len(),
            listing.resource_version
        );

        let mut failure = None;
        for item in listing.items {
            match self.conditions.check(&item) {
                Some(Verdict::Success) => return State::Terminal(Outcome::Success(item)),
                Some(Verdict::Failure(reason)) => {
                    failure.get_or_insert(reason);
                }
                None => {}
            }
        }
        if let Some(reason) = failure {
            return State::Terminal(Outcome::Failure(reason));
        }

        let watch = self.client.watch(self.selector, &listing.resource_version);
        match timeout_at(deadline, watch).await {
            Err(_) => State::Terminal(Outcome::Timeout(timeout)),
            Ok(Err(e)) => State::Terminal(Outcome::TransportError(e)),
            Ok(Ok(stream)) => State::Watching(stream),
        }
    }

    async fn consume(
        &self,
        mut stream: EventStream<K>,
        deadline: Instant,
        timeout: Duration,
    ) -> State<K> {
        loop {
            let event = match timeout_at(deadline, stream.next()).await {
                Err(_) => return State::Terminal(Outcome::Timeout(timeout)),
                Ok(None) => {
                    debug!("Watch stream closed");
                    return State::Reconciling;
                }
                Ok(Some(event)) => event,
            };

            let verdict = match event {
                ChangeEvent::Added(obj) | ChangeEvent::Modified(obj) => {
                    match self.conditions.check(&obj) {
                        Some(Verdict::Success) => return State::Terminal(Outcome::Success(obj)),
                        other => other,
                    }
                }
                ChangeEvent::Deleted(obj) => self.conditions.check_deleted(&obj),
                ChangeEvent::Error(msg) => {
                    warn!("Watch error, re-listing: {}", msg);
                    return State::Reconciling;
                }
            };

            if let Some(Verdict::Failure(reason)) = verdict {
                return State::Terminal(Outcome::Failure(reason));
            }
        }
    }
}

/// Wait for one of `conditions` on the resources selected by `selector`.
///
/// See [`ConditionWaiter`] for the exact semantics.
pub async fn wait<K, C>(
    client: &C,
    selector: &Selector,
    conditions: &Conditions<K>,
    timeout: Duration,
) -> Outcome<K>
where
    C: ResourceClient<K> + ?Sized,
    K: Send + 'static,
{
    ConditionWaiter::new(client, selector, conditions)
        .run(timeout)
        .await
}
