// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types read by the typed waiters, with their state predicates.

pub mod build;
pub mod deployment;
pub mod image_stream;

pub use build::{Build, BuildSpec, BuildStatus};
pub use deployment::DeploymentPhase;
pub use image_stream::{ImageStream, ImageStreamSpec, ImageStreamStatus, NamedTagEventList, TagEvent};
