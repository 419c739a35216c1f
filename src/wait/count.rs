// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Poll-based wait for a number of matching resources.

use crate::error::Result;
use crate::kubernetes::source::ResourceClient;
use crate::selector::Selector;
use crate::wait::poll::poll;
use crate::wait::predicate::Predicate;
use kube::{Resource, ResourceExt};
use std::time::Duration;
use tracing::{debug, instrument};

/// Poll `client` every `interval` until one listing holds at least `count`
/// items satisfying `predicate`, returning the names of those items.
///
/// Matches are never accumulated across polls. A list error ends the wait
/// immediately; running out of time is a `HarnessError::Timeout`, never an
/// empty success.
#[instrument(skip(client, predicate), fields(selector = %selector))]
pub async fn wait_for_count<K, C, P>(
    client: &C,
    selector: &Selector,
    predicate: &P,
    count: usize,
    interval: Duration,
    timeout: Duration,
) -> Result<Vec<String>>
where
    K: Resource,
    C: ResourceClient<K> + ?Sized,
    P: Predicate<K> + ?Sized,
{
    let what = format!("{} matching resources for selector {}", count, selector);

    poll(interval, timeout, &what, move || async move {
        let listing = client.list(selector).await?;
        let names: Vec<String> = listing
            .items
            .iter()
            .filter(|item| predicate.test(item))
            .map(|item| item.name_any())
            .collect();

        if names.len() >= count {
            Ok(Some(names))
        } else {
            debug!("Found {} of {} matching resources", names.len(), count);
            Ok(None)
        }
    })
    .await
}
