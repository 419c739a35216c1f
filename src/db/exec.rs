// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Running shell commands inside pod containers.

use crate::error::{HarnessError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::api::{AttachParams, AttachedProcess};
use kube::Api;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument};

/// Runs a shell command in a container and returns its standard output.
///
/// A command that runs but exits unsuccessfully is reported as
/// `HarnessError::CommandFailed`; any other error means the command could not
/// be run at all.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn exec(&self, pod: &str, container: &str, command: &str) -> Result<String>;
}

/// `CommandExecutor` over the pod exec subresource, running commands with
/// `/bin/sh -c`
pub struct PodExecutor {
    api: Api<Pod>,
}

impl PodExecutor {
    pub fn new(api: Api<Pod>) -> Self {
        Self { api }
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> Result<String> {
    let mut out = String::new();
    if let Some(mut reader) = reader {
        reader.read_to_string(&mut out).await?;
    }
    Ok(out)
}

/// Map the exec status channel to a result.
///
/// A session that ends without reporting a status is an exec error, not a
/// successful command.
fn check_status(status: Option<Status>, stderr: &str) -> Result<()> {
    let Some(status) = status else {
        return Err(HarnessError::ExecError(
            "exec session ended without a status".to_string(),
        ));
    };

    if status.status.as_deref() == Some("Success") {
        return Ok(());
    }

    let message = status
        .message
        .unwrap_or_else(|| "unknown failure".to_string());
    let stderr = stderr.trim();
    if stderr.is_empty() {
        Err(HarnessError::CommandFailed(message))
    } else {
        Err(HarnessError::CommandFailed(format!("{}: {}", message, stderr)))
    }
}

async fn collect(mut attached: AttachedProcess) -> Result<(String, String, Option<Status>)> {
    let status = attached.take_status();
    let (stdout, stderr) = tokio::join!(read_all(attached.stdout()), read_all(attached.stderr()));
    let (stdout, stderr) = (stdout?, stderr?);

    let status = match status {
        Some(status) => status.await,
        None => None,
    };

    attached
        .join()
        .await
        .map_err(|e| HarnessError::ExecError(e.to_string()))?;

    Ok((stdout, stderr, status))
}

#[async_trait]
impl CommandExecutor for PodExecutor {
    #[instrument(skip(self))]
    async fn exec(&self, pod: &str, container: &str, command: &str) -> Result<String> {
        let params = AttachParams::default().container(container).stderr(true);
        let attached = self
            .api
            .exec(pod, vec!["/bin/sh", "-c", command], &params)
            .await?;

        let (stdout, stderr, status) = collect(attached).await?;
        debug!(stdout_len = stdout.len(), stderr_len = stderr.len(), "Command finished");

        check_status(status, &stderr)?;
        Ok(stdout)
    }
}
