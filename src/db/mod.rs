// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Database helpers that run commands inside pods.

pub mod exec;
pub mod mysql;

pub use exec::{CommandExecutor, PodExecutor};
pub use mysql::MySql;
