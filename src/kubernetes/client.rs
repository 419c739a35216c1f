// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation and kubeconfig utilities

use crate::config::Config;
use crate::error::{HarnessError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Create a Kubernetes client for the cluster under test.
///
/// Uses the configured kubeconfig file when set, otherwise the inferred
/// in-cluster or default kubeconfig.
#[instrument(skip(config), fields(kubeconfig = ?config.kubeconfig))]
pub async fn connect(config: &Config) -> Result<Client> {
    match &config.kubeconfig {
        Some(path) => {
            let kubeconfig = read_kubeconfig(path).await?;
            let client = create_client_from_kubeconfig(&kubeconfig).await?;
            info!("Connected to cluster using kubeconfig {}", path.display());
            Ok(client)
        }
        None => {
            let client = Client::try_default().await?;
            info!("Connected to cluster using inferred configuration");
            Ok(client)
        }
    }
}

async fn read_kubeconfig(path: &Path) -> Result<String> {
    debug!("Reading kubeconfig from {}", path.display());
    tokio::fs::read_to_string(path).await.map_err(|e| {
        HarnessError::KubeconfigError(format!(
            "Failed to read kubeconfig {}: {}",
            path.display(),
            e
        ))
    })
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| HarnessError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                HarnessError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| HarnessError::KubeconfigError(format!("Failed to create client: {}", e)))
}
