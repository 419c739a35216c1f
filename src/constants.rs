// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Annotation and label keys read by the typed waiters
pub mod annotations {
    /// Deployment phase recorded on a deployment's ReplicationController
    pub const DEPLOYMENT_PHASE: &str = "openshift.io/deployment.phase";
    /// Label linking a ReplicationController to its DeploymentConfig
    pub const DEPLOYMENT_CONFIG: &str = "openshift.io/deployment-config.name";
    /// Result of the registry check performed on an ImageStream
    pub const IMAGE_REPOSITORY_CHECK: &str = "openshift.io/image.dockerRepositoryCheck";
}

/// Polling intervals used by the poll-based waiters
pub mod poll {
    use std::time::Duration;

    /// Interval between pod listings in `wait_for_pods`
    pub const PODS_INTERVAL: Duration = Duration::from_secs(1);
    /// Interval and cap for the builder service account check
    pub const BUILDER_ACCOUNT_INTERVAL: Duration = Duration::from_secs(1);
    pub const BUILDER_ACCOUNT_TIMEOUT: Duration = Duration::from_secs(60);
    /// Interval between `mysqladmin ping` attempts
    pub const MYSQL_PING_INTERVAL: Duration = Duration::from_secs(2);
    /// Interval between repeated queries in `wait_for_output`
    pub const MYSQL_QUERY_INTERVAL: Duration = Duration::from_secs(5);
}

/// Defaults for the wait configuration
pub mod wait {
    pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 200;
}

/// Prefix given to every PersistentVolume created by the harness
pub const PV_PREFIX: &str = "pv-";

/// Default log filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "info,kube=warn";
