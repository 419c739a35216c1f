// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::wait::DEFAULT_RECONNECT_DELAY_MS;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Harness configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit kubeconfig file; the client config is inferred when unset
    pub kubeconfig: Option<PathBuf>,
    /// Root directory for test fixtures
    pub extended_test_path: PathBuf,
    /// Directory receiving host-path volume directories and other test output
    pub output_dir: PathBuf,
    /// Pause before re-listing after a watch stream drops
    pub reconnect_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kubeconfig: None,
            extended_test_path: PathBuf::from("."),
            output_dir: env::temp_dir(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let kubeconfig = env::var_os("KUBECONFIG")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let extended_test_path = env::var_os("EXTENDED_TEST_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.extended_test_path);
        let output_dir = env::var_os("TEST_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let reconnect_delay = millis_from_env("WAIT_RECONNECT_DELAY_MS")?
            .unwrap_or(defaults.reconnect_delay);

        Ok(Config {
            kubeconfig,
            extended_test_path,
            output_dir,
            reconnect_delay,
        })
    }

    /// Absolute path to a fixture, relative to `extended_test_path`
    pub fn fixture_path<P: AsRef<Path>>(&self, elems: &[P]) -> PathBuf {
        let mut path = self.extended_test_path.clone();
        for elem in elems {
            path.push(elem);
        }
        path
    }
}

fn millis_from_env(key: &str) -> Result<Option<Duration>> {
    match env::var(key) {
        Ok(v) => {
            let ms: u64 = v
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds, got '{}'", key, v))?;
            Ok(Some(Duration::from_millis(ms)))
        }
        Err(_) => Ok(None),
    }
}
