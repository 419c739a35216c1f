// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Predicates over a single resource snapshot.

use kube::{Resource, ResourceExt};
use kube_runtime::wait::Condition;

/// A pure, cheap test evaluated inline against one snapshot.
pub trait Predicate<K>: Send + Sync {
    fn test(&self, obj: &K) -> bool;
}

impl<K, F> Predicate<K> for F
where
    F: Fn(&K) -> bool + Send + Sync,
{
    fn test(&self, obj: &K) -> bool {
        self(obj)
    }
}

/// Adapter turning a `kube::runtime::wait::Condition` into a `Predicate`
pub struct FromCondition<C>(C);

/// Reuse one of kube's stock conditions, e.g. `conditions::is_pod_running()`
pub fn from_condition<C>(condition: C) -> FromCondition<C> {
    FromCondition(condition)
}

impl<K, C> Predicate<K> for FromCondition<C>
where
    C: Condition<K> + Send + Sync,
{
    fn test(&self, obj: &K) -> bool {
        self.0.matches_object(Some(obj))
    }
}

/// Predicate that never matches
pub fn never<K>(_: &K) -> bool {
    false
}

pub(crate) enum Verdict {
    Success,
    Failure(String),
}

type Reason<K> = Box<dyn Fn(&K) -> String + Send + Sync>;

/// Success and failure predicates for one wait, plus how to describe a
/// failure and whether deletion counts as one.
pub struct Conditions<K> {
    success: Box<dyn Predicate<K>>,
    failure: Box<dyn Predicate<K>>,
    reason: Reason<K>,
    deletion_is_failure: bool,
}

impl<K: Resource + 'static> Conditions<K> {
    pub fn new(
        success: impl Predicate<K> + 'static,
        failure: impl Predicate<K> + 'static,
    ) -> Self {
        Self {
            success: Box::new(success),
            failure: Box::new(failure),
            reason: Box::new(|obj: &K| format!("{:?} reached a failed state", obj.name_any())),
            deletion_is_failure: false,
        }
    }

    /// Wait for `success` only; nothing counts as failure
    pub fn until(success: impl Predicate<K> + 'static) -> Self {
        Self::new(success, never::<K>)
    }

    /// Describe a failed snapshot, typically with its recorded status text
    pub fn with_reason<F>(mut self, reason: F) -> Self
    where
        F: Fn(&K) -> String + Send + Sync + 'static,
    {
        self.reason = Box::new(reason);
        self
    }

    /// Treat a deletion event as a failure regardless of the snapshot
    pub fn deletion_is_failure(mut self) -> Self {
        self.deletion_is_failure = true;
        self
    }
}

impl<K> Conditions<K> {
    pub fn is_success(&self, obj: &K) -> bool {
        self.success.test(obj)
    }

    pub fn is_failure(&self, obj: &K) -> bool {
        self.failure.test(obj)
    }

    pub(crate) fn reason(&self, obj: &K) -> String {
        (self.reason)(obj)
    }

    /// Success is checked first: a snapshot matching both is a success
    pub(crate) fn check(&self, obj: &K) -> Option<Verdict> {
        if self.is_success(obj) {
            Some(Verdict::Success)
        } else if self.is_failure(obj) {
            Some(Verdict::Failure(self.reason(obj)))
        } else {
            None
        }
    }

    pub(crate) fn check_deleted(&self, obj: &K) -> Option<Verdict> {
        if self.deletion_is_failure || self.is_failure(obj) {
            Some(Verdict::Failure(self.reason(obj)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{Pod, PodStatus};
    use kube::api::ObjectMeta;
    use kube_runtime::wait::conditions::is_pod_running;

    fn make_pod(name: &str, phase: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_closure_is_predicate() {
        let p = |pod: &Pod| pod.name_any().starts_with("mysql");
        assert!(p.test(&make_pod("mysql-1", "Running")));
        assert!(!p.test(&make_pod("redis-1", "Running")));
    }

    #[test]
    fn test_from_condition_uses_kube_condition() {
        let running = from_condition(is_pod_running());
        assert!(running.test(&make_pod("a", "Running")));
        assert!(!running.test(&make_pod("a", "Pending")));
    }

    #[test]
    fn test_check_prefers_success_over_failure() {
        let conditions = Conditions::new(|_: &Pod| true, |_: &Pod| true);
        assert!(matches!(
            conditions.check(&make_pod("a", "Running")),
            Some(Verdict::Success)
        ));
    }

    #[test]
    fn test_check_failure_uses_reason() {
        let conditions = Conditions::new(never::<Pod>, |_: &Pod| true).with_reason(|pod: &Pod| {
            format!(
                "pod {} is {}",
                pod.name_any(),
                pod.status.as_ref().and_then(|s| s.phase.clone()).unwrap_or_default()
            )
        });

        match conditions.check(&make_pod("a", "Failed")) {
            Some(Verdict::Failure(reason)) => assert_eq!(reason, "pod a is Failed"),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_default_reason_names_resource() {
        let conditions = Conditions::new(never::<Pod>, |_: &Pod| true);
        match conditions.check(&make_pod("db-0", "Failed")) {
            Some(Verdict::Failure(reason)) => assert!(reason.contains("db-0")),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_check_deleted_respects_policy() {
        let lenient = Conditions::until(|_: &Pod| false);
        assert!(lenient.check_deleted(&make_pod("a", "Running")).is_none());

        let strict = Conditions::until(|_: &Pod| false).deletion_is_failure();
        assert!(matches!(
            strict.check_deleted(&make_pod("a", "Running")),
            Some(Verdict::Failure(_))
        ));
    }
}
