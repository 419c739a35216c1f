// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiters for the resources test scenarios care about: builds, image
//! streams, deployments, pods and the builder service account.

use crate::constants::annotations::DEPLOYMENT_CONFIG;
use crate::constants::poll::{BUILDER_ACCOUNT_INTERVAL, BUILDER_ACCOUNT_TIMEOUT, PODS_INTERVAL};
use crate::error::{HarnessError, Result};
use crate::kubernetes::source::ResourceClient;
use crate::selector::Selector;
use crate::types::{Build, DeploymentPhase, ImageStream};
use crate::wait::condition::wait;
use crate::wait::count::wait_for_count;
use crate::wait::poll::poll;
use crate::wait::predicate::{from_condition, Conditions, Predicate};
use k8s_openapi::api::core::v1::{Pod, ReplicationController, ServiceAccount};
use kube::{Api, ResourceExt};
use kube_runtime::wait::conditions::is_pod_running;
use std::time::Duration;
use tracing::{debug, instrument};

/// Success: phase `Complete`. Failure: phase `Failed`/`Error`, or a snapshot
/// of some other build slipping through the name selector.
pub fn build_conditions(name: &str) -> Conditions<Build> {
    let ok_name = name.to_string();
    let failed_name = name.to_string();
    let reason_name = name.to_string();

    Conditions::new(
        move |b: &Build| b.name_any() == ok_name && b.is_complete(),
        move |b: &Build| b.name_any() != failed_name || b.is_failed(),
    )
    .with_reason(move |b: &Build| format!("build {:?} status is {:?}", reason_name, b.phase()))
}

/// Wait for the named build to complete
#[instrument(skip(client))]
pub async fn wait_for_build<C>(client: &C, name: &str, timeout: Duration) -> Result<Build>
where
    C: ResourceClient<Build> + ?Sized,
{
    wait(client, &Selector::name(name), &build_conditions(name), timeout)
        .await
        .into_result(&format!("build {:?}", name))
}

/// Success: the `latest` tag is populated. Failure: the registry check
/// annotation reports a missing tag or an error.
pub fn image_stream_conditions(name: &str) -> Conditions<ImageStream> {
    let name = name.to_string();

    Conditions::new(ImageStream::has_latest_tag, ImageStream::is_tag_not_found).with_reason(
        move |s: &ImageStream| {
            format!("image stream {:?} status is {:?}", name, s.repository_check())
        },
    )
}

/// Wait for the named image stream to get a `latest` tag
#[instrument(skip(client))]
pub async fn wait_for_image_stream<C>(
    client: &C,
    name: &str,
    timeout: Duration,
) -> Result<ImageStream>
where
    C: ResourceClient<ImageStream> + ?Sized,
{
    wait(
        client,
        &Selector::name(name),
        &image_stream_conditions(name),
        timeout,
    )
    .await
    .into_result(&format!("image stream {:?}", name))
}

/// Success and failure from the deployment phase annotation
pub fn deployment_conditions(name: &str) -> Conditions<ReplicationController> {
    let name = name.to_string();

    Conditions::new(
        |rc: &ReplicationController| rc.is_deployment_complete(),
        |rc: &ReplicationController| rc.is_deployment_failed(),
    )
    .with_reason(move |rc: &ReplicationController| {
        format!("deployment {:?} status is {:?}", name, rc.deployment_phase())
    })
}

/// Wait for a rollout of the named DeploymentConfig to complete
#[instrument(skip(client))]
pub async fn wait_for_deployment<C>(
    client: &C,
    name: &str,
    timeout: Duration,
) -> Result<ReplicationController>
where
    C: ResourceClient<ReplicationController> + ?Sized,
{
    wait(
        client,
        &Selector::label(DEPLOYMENT_CONFIG, name),
        &deployment_conditions(name),
        timeout,
    )
    .await
    .into_result(&format!("deployment {:?}", name))
}

/// Names of the pods selected by `selector` that are in the Running phase
#[instrument(skip(client), fields(selector = %selector))]
pub async fn get_running_pod_names<C>(client: &C, selector: &Selector) -> Result<Vec<String>>
where
    C: ResourceClient<Pod> + ?Sized,
{
    let running = from_condition(is_pod_running());
    let listing = client.list(selector).await?;

    Ok(listing
        .items
        .into_iter()
        .filter(|pod: &Pod| running.test(pod))
        .map(|pod| pod.name_any())
        .collect())
}

/// Wait until at least `count` pods selected by `selector` are running at
/// the same time, returning their names
#[instrument(skip(client), fields(selector = %selector))]
pub async fn wait_for_pods<C>(
    client: &C,
    selector: &Selector,
    count: usize,
    timeout: Duration,
) -> Result<Vec<String>>
where
    C: ResourceClient<Pod> + ?Sized,
{
    wait_for_count(
        client,
        selector,
        &from_condition(is_pod_running()),
        count,
        PODS_INTERVAL,
        timeout,
    )
    .await
}

/// Wait until the `builder` service account has its dockercfg secret
#[instrument(skip(api))]
pub async fn wait_for_builder_account(api: &Api<ServiceAccount>) -> Result<()> {
    poll(
        BUILDER_ACCOUNT_INTERVAL,
        BUILDER_ACCOUNT_TIMEOUT,
        "builder service account",
        move || async move {
            let account = api.get("builder").await?;
            let provisioned = account
                .secrets
                .iter()
                .flatten()
                .filter_map(|s| s.name.as_deref())
                .any(|name| name.contains("dockercfg"));

            debug!(provisioned, "Checked builder service account");
            Ok(provisioned.then_some(()))
        },
    )
    .await
}

/// Full pull spec of the most recent image behind `name:tag`
#[instrument(skip(api))]
pub async fn get_docker_image_reference(
    api: &Api<ImageStream>,
    name: &str,
    tag: &str,
) -> Result<String> {
    let stream = api.get(name).await?;

    let Some(history) = stream.tag(tag) else {
        return Err(HarnessError::ImageTagError(format!(
            "ImageStream {:?} does not have tag {:?}",
            name, tag
        )));
    };

    let Some(latest) = history.items.first() else {
        return Err(HarnessError::ImageTagError(format!(
            "ImageStreamTag {:?} is empty",
            tag
        )));
    };

    Ok(latest.docker_image_reference.clone())
}
