// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! List + watch access to a resource collection.

use crate::error::Result;
use crate::selector::Selector;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use kube::api::WatchEvent;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::pin::Pin;
use tracing::{debug, instrument};

/// A change observed on a watch stream
#[derive(Debug, Clone)]
pub enum ChangeEvent<K> {
    Added(K),
    Modified(K),
    Deleted(K),
    /// The server reported an error (expired cursor, compaction, ...) or the
    /// stream broke; the watch cannot be resumed from it
    Error(String),
}

/// Result of a list call: the current items and the cursor to watch from
#[derive(Debug, Clone)]
pub struct Listing<K> {
    pub items: Vec<K>,
    pub resource_version: String,
}

/// An open watch subscription. Dropping it releases the subscription.
pub type EventStream<K> = BoxStream<'static, ChangeEvent<K>>;

/// Cluster collection that can be listed and watched with a selector.
///
/// Errors returned from `list` or `watch` are setup failures, including a watch
/// request the server rejects. Failures after a watch is established arrive
/// in-band as `ChangeEvent::Error` or as the end
/// of the stream.
#[async_trait]
pub trait ResourceClient<K>: Send + Sync {
    async fn list(&self, selector: &Selector) -> Result<Listing<K>>;

    async fn watch(&self, selector: &Selector, resource_version: &str) -> Result<EventStream<K>>;
}

#[async_trait]
impl<K> ResourceClient<K> for Api<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    #[instrument(skip(self), fields(selector = %selector))]
    async fn list(&self, selector: &Selector) -> Result<Listing<K>> {
        let list = Api::list(self, &selector.list_params()).await?;
        let resource_version = list.metadata.resource_version.unwrap_or_default();

        debug!(
            "Listed {} items at resource version {}",
            list.items.len(),
            resource_version
        );

        Ok(Listing {
            items: list.items,
            resource_version,
        })
    }

    #[instrument(skip(self), fields(selector = %selector))]
    async fn watch(&self, selector: &Selector, resource_version: &str) -> Result<EventStream<K>> {
        let mut events = Api::watch(self, &selector.watch_params(), resource_version)
            .await?
            .boxed()
            .peekable();

        // A rejected watch request arrives as a Status body in place of the
        // first event. An expired cursor is left in-band so the caller re-lists.
        let rejected = matches!(
            Pin::new(&mut events).peek().await,
            Some(Err(kube::Error::Api(e))) if e.code != 410
        );
        if rejected {
            if let Some(Err(e)) = events.next().await {
                return Err(e.into());
            }
        }

        Ok(events
            .filter_map(|event| async move {
                match event {
                    Ok(WatchEvent::Added(obj)) => Some(ChangeEvent::Added(obj)),
                    Ok(WatchEvent::Modified(obj)) => Some(ChangeEvent::Modified(obj)),
                    Ok(WatchEvent::Deleted(obj)) => Some(ChangeEvent::Deleted(obj)),
                    Ok(WatchEvent::Bookmark(_)) => None,
                    Ok(WatchEvent::Error(e)) => Some(ChangeEvent::Error(format!(
                        "{} (reason: {}, code: {})",
                        e.message, e.reason, e.code
                    ))),
                    Err(e) => Some(ChangeEvent::Error(e.to_string())),
                }
            })
            .boxed())
    }
}
