// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, list/watch access, pod manifests
//! and volume provisioning.

pub mod client;
pub mod pods;
pub mod source;
pub mod volumes;

pub use client::connect;
pub use pods::pod_for_image;
pub use source::{ChangeEvent, EventStream, Listing, ResourceClient};
pub use volumes::{cleanup_host_path_volumes, host_path_volume, setup_host_path_volumes};
