// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod manifests for running a built image.

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A run-once pod named `test-pod-<uuid>` with a single container running
/// `image_reference`, labeled `name=<pod name>`.
///
/// Pair with `get_docker_image_reference` to run the output of a build.
pub fn pod_for_image(image_reference: &str) -> Pod {
    let name = format!("test-pod-{}", Uuid::new_v4());

    Pod {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            labels: Some(BTreeMap::from([("name".to_string(), name.clone())])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name,
                image: Some(image_reference.to_string()),
                ..Default::default()
            }],
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
