// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment state recorded on the ReplicationController backing each
//! DeploymentConfig rollout.

use crate::constants::annotations::DEPLOYMENT_PHASE;
use k8s_openapi::api::core::v1::ReplicationController;

pub mod phase {
    pub const NEW: &str = "New";
    pub const PENDING: &str = "Pending";
    pub const RUNNING: &str = "Running";
    pub const COMPLETE: &str = "Complete";
    pub const FAILED: &str = "Failed";
}

pub trait DeploymentPhase {
    /// Value of the deployment phase annotation, empty when absent
    fn deployment_phase(&self) -> &str;

    fn is_deployment_complete(&self) -> bool {
        self.deployment_phase() == phase::COMPLETE
    }

    fn is_deployment_failed(&self) -> bool {
        self.deployment_phase() == phase::FAILED
    }
}

impl DeploymentPhase for ReplicationController {
    fn deployment_phase(&self) -> &str {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(DEPLOYMENT_PHASE))
            .map(String::as_str)
            .unwrap_or_default()
    }
}
