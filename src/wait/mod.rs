// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting on cluster state: event-driven condition waits and poll-based
//! count waits.

pub mod condition;
pub mod count;
pub mod poll;
pub mod predicate;
pub mod resources;

pub use condition::{wait, ConditionWaiter, Outcome};
pub use count::wait_for_count;
pub use poll::poll;
pub use predicate::{from_condition, never, Conditions, Predicate};
pub use resources::{
    get_docker_image_reference, get_running_pod_names, wait_for_build, wait_for_builder_account,
    wait_for_deployment, wait_for_image_stream, wait_for_pods,
};
