// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Host-path PersistentVolume provisioning for database templates

use crate::constants::PV_PREFIX;
use crate::error::{HarnessError, Result};
use k8s_openapi::api::core::v1::{
    HostPathVolumeSource, PersistentVolume, PersistentVolumeSpec,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::{
    api::{DeleteParams, ListParams, ObjectMeta, PostParams},
    Api, ResourceExt,
};
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Build a ReadWriteOnce PersistentVolume backed by `host_path`
pub fn host_path_volume(name: &str, capacity: &str, host_path: &str) -> PersistentVolume {
    PersistentVolume {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([("name".to_string(), name.to_string())])),
            ..Default::default()
        },
        spec: Some(PersistentVolumeSpec {
            host_path: Some(HostPathVolumeSource {
                path: host_path.to_string(),
                ..Default::default()
            }),
            capacity: Some(BTreeMap::from([(
                "storage".to_string(),
                Quantity(capacity.to_string()),
            )])),
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn volume_name_prefix(prefix: &str) -> String {
    format!("{}{}-", PV_PREFIX, prefix)
}

/// Create `count` host-path volumes named `pv-<prefix>-NNNN`.
///
/// Each volume gets its own world-writable directory under a fresh directory
/// in `output_dir`. The directories are left in place for the cluster to use.
/// When a create call fails, the volumes already created are logged and left
/// for `cleanup_host_path_volumes`.
#[instrument(skip(api, output_dir))]
pub async fn setup_host_path_volumes(
    api: &Api<PersistentVolume>,
    output_dir: &Path,
    prefix: &str,
    capacity: &str,
    count: usize,
) -> Result<Vec<PersistentVolume>> {
    if count < 1 {
        return Err(HarnessError::InvalidVolumeCount(count));
    }

    let root = tempfile::Builder::new()
        .prefix("persistent-volumes")
        .tempdir_in(output_dir)?
        .keep();

    let mut volumes: Vec<PersistentVolume> = Vec::with_capacity(count);
    for i in 0..count {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{:04}", i))
            .tempdir_in(&root)?
            .keep();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o777))?;

        let name = format!("{}{:04}", volume_name_prefix(prefix), i);
        let host_path = dir.to_string_lossy();
        let pv = match api
            .create(
                &PostParams::default(),
                &host_path_volume(&name, capacity, &host_path),
            )
            .await
        {
            Ok(pv) => pv,
            Err(e) => {
                let created: Vec<String> = volumes.iter().map(ResourceExt::name_any).collect();
                warn!(
                    "Failed to create volume {} after creating {:?}; clean up with prefix {:?}",
                    name, created, prefix
                );
                return Err(e.into());
            }
        };

        debug!("Created volume {} at {}", name, host_path);
        volumes.push(pv);
    }

    info!("Created {} host-path volumes under {}", count, root.display());
    Ok(volumes)
}

/// Delete every volume created by `setup_host_path_volumes` with `prefix`.
///
/// Individual delete failures are logged and skipped.
#[instrument(skip(api))]
pub async fn cleanup_host_path_volumes(api: &Api<PersistentVolume>, prefix: &str) -> Result<()> {
    let name_prefix = volume_name_prefix(prefix);
    let volumes = api.list(&ListParams::default()).await?;

    for pv in volumes.items {
        let name = pv.name_any();
        if !name.starts_with(&name_prefix) {
            continue;
        }
        match api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => debug!("Deleted volume {}", name),
            Err(e) => warn!("Failed to delete volume {}: {}", name, e),
        }
    }

    Ok(())
}
