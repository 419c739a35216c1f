// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    #[error("{0}")]
    ConditionFailed(String),

    #[error("Remote exec failed: {0}")]
    ExecError(String),

    #[error("Command exited unsuccessfully: {0}")]
    CommandFailed(String),

    #[error("Image tag lookup failed: {0}")]
    ImageTagError(String),

    #[error("Invalid number of volumes: '{0}'")]
    InvalidVolumeCount(usize),
}

impl HarnessError {
    /// True when a remote command ran but exited non-zero
    pub fn is_command_failure(&self) -> bool {
        matches!(self, HarnessError::CommandFailed(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Timeout(..))
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
