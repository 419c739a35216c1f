// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Helper for driving a MySQL server running in a pod.

use crate::constants::poll::{MYSQL_PING_INTERVAL, MYSQL_QUERY_INTERVAL};
use crate::db::exec::CommandExecutor;
use crate::error::{HarnessError, Result};
use crate::wait::poll::poll;
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

const ALIVE: &str = "mysqld is alive";

/// A MySQL server in `pod`, with the environment of its container (and of
/// its replication master, if any) captured for credentials.
pub struct MySql<'a, E: ?Sized> {
    executor: &'a E,
    pub pod: String,
    pub container: String,
    pub env: BTreeMap<String, String>,
}

fn read_env(pod: &Pod, env: &mut BTreeMap<String, String>) {
    for container in pod.spec.iter().flat_map(|s| s.containers.iter()) {
        for var in container.env.iter().flatten() {
            env.insert(var.name.clone(), var.value.clone().unwrap_or_default());
        }
    }
}

impl<'a, E: CommandExecutor + ?Sized> MySql<'a, E> {
    /// Look up `pod` and collect the environment used for credentials.
    ///
    /// Variables from `master` are read first so the pod's own values win.
    #[instrument(skip(pods, executor))]
    pub async fn connect(
        pods: &Api<Pod>,
        executor: &'a E,
        pod: &str,
        master: Option<&str>,
    ) -> Result<MySql<'a, E>> {
        let own = pods.get(pod).await?;
        let container = own
            .spec
            .as_ref()
            .and_then(|s| s.containers.first())
            .map(|c| c.name.clone())
            .ok_or_else(|| HarnessError::ExecError(format!("pod {:?} has no containers", pod)))?;

        let mut env = BTreeMap::new();
        if let Some(master) = master {
            let master = pods.get(master).await?;
            read_env(&master, &mut env);
        }
        read_env(&own, &mut env);

        Ok(MySql {
            executor,
            pod: pod.to_string(),
            container,
            env,
        })
    }

    fn var(&self, name: &str) -> &str {
        self.env.get(name).map(String::as_str).unwrap_or_default()
    }

    /// True when the server answers a ping. A failed ping command means the
    /// server is not up yet.
    pub async fn ping(&self) -> Result<bool> {
        match self
            .executor
            .exec(&self.pod, &self.container, "mysqladmin -h 127.0.0.1 -uroot ping")
            .await
        {
            Ok(out) => Ok(out.trim() == ALIVE),
            Err(e) if e.is_command_failure() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Ping every two seconds until the server answers
    #[instrument(skip(self), fields(pod = %self.pod))]
    pub async fn wait_until_up(&self, timeout: Duration) -> Result<()> {
        let what = format!("mysql in pod {:?}", self.pod);
        poll(MYSQL_PING_INTERVAL, timeout, &what, move || async move {
            Ok(self.ping().await?.then_some(()))
        })
        .await
    }

    pub async fn query_as_root(&self, sql: &str) -> Result<String> {
        let command = format!(
            "mysql -h 127.0.0.1 -uroot -e \"{}\" {}",
            sql,
            self.var("MYSQL_DATABASE")
        );
        self.executor.exec(&self.pod, &self.container, &command).await
    }

    pub async fn query_as_user(&self, sql: &str) -> Result<String> {
        let command = format!(
            "mysql -h 127.0.0.1 -u{} -p{} -e \"{}\" {}",
            self.var("MYSQL_USER"),
            self.var("MYSQL_PASSWORD"),
            sql,
            self.var("MYSQL_DATABASE")
        );
        self.executor.exec(&self.pod, &self.container, &command).await
    }

    /// Re-run `sql` every five seconds until its output contains `expected`.
    ///
    /// Failing queries (e.g. a table not yet replicated) are retried.
    #[instrument(skip(self), fields(pod = %self.pod))]
    pub async fn wait_for_output(
        &self,
        timeout: Duration,
        as_root: bool,
        sql: &str,
        expected: &str,
    ) -> Result<()> {
        let what = format!("{:?} in output of {:?} on pod {:?}", expected, sql, self.pod);
        poll(MYSQL_QUERY_INTERVAL, timeout, &what, move || async move {
            let out = if as_root {
                self.query_as_root(sql).await
            } else {
                self.query_as_user(sql).await
            };

            match out {
                Ok(out) => Ok(out.contains(expected).then_some(())),
                Err(e) if e.is_command_failure() => {
                    debug!("Query failed, retrying: {}", e);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
    }
}
