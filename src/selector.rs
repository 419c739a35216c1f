// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label and field selectors shared by list and watch calls.

use crate::error::{HarnessError, Result};
use kube::api::{ListParams, WatchParams};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
}

/// A single `key=value` or `key!=value` requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    pub value: String,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operator {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
        };
        write!(f, "{}{}{}", self.key, op, self.value)
    }
}

/// Immutable label and field requirements scoping a list/watch session.
///
/// The same value renders both the `ListParams` of a listing and the
/// `WatchParams` of the watch resuming from it, so the two calls always see
/// the same collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    labels: Vec<Requirement>,
    fields: Vec<Requirement>,
}

impl Selector {
    /// Selector matching every resource
    pub fn everything() -> Self {
        Self::default()
    }

    /// Parse a label selector such as `deployment=mysql-2,tier!=cache`
    pub fn parse(s: &str) -> Result<Self> {
        Ok(Self {
            labels: parse_requirements(s)?,
            fields: Vec::new(),
        })
    }

    /// Selector requiring a single label value
    pub fn label(key: &str, value: &str) -> Self {
        Self::everything().with_label(key, value)
    }

    /// Selector matching a single object by `metadata.name`
    pub fn name(name: &str) -> Self {
        Self::everything().with_field("metadata.name", name)
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.push(Requirement {
            key: key.to_string(),
            operator: Operator::Equals,
            value: value.to_string(),
        });
        self
    }

    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.push(Requirement {
            key: key.to_string(),
            operator: Operator::Equals,
            value: value.to_string(),
        });
        self
    }

    pub fn is_everything(&self) -> bool {
        self.labels.is_empty() && self.fields.is_empty()
    }

    pub fn label_selector(&self) -> Option<String> {
        join(&self.labels)
    }

    pub fn field_selector(&self) -> Option<String> {
        join(&self.fields)
    }

    pub fn list_params(&self) -> ListParams {
        let mut lp = ListParams::default();
        if let Some(labels) = self.label_selector() {
            lp = lp.labels(&labels);
        }
        if let Some(fields) = self.field_selector() {
            lp = lp.fields(&fields);
        }
        lp
    }

    pub fn watch_params(&self) -> WatchParams {
        let mut wp = WatchParams::default();
        if let Some(labels) = self.label_selector() {
            wp = wp.labels(&labels);
        }
        if let Some(fields) = self.field_selector() {
            wp = wp.fields(&fields);
        }
        wp
    }
}

impl FromStr for Selector {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.label_selector(), self.field_selector()) {
            (None, None) => write!(f, "<everything>"),
            (Some(l), None) => write!(f, "{}", l),
            (None, Some(fs)) => write!(f, "fields({})", fs),
            (Some(l), Some(fs)) => write!(f, "{} fields({})", l, fs),
        }
    }
}

fn join(reqs: &[Requirement]) -> Option<String> {
    if reqs.is_empty() {
        return None;
    }
    Some(
        reqs.iter()
            .map(Requirement::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn parse_requirements(s: &str) -> Result<Vec<Requirement>> {
    let mut reqs = Vec::new();

    for term in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, operator, value) = if let Some((k, v)) = term.split_once("!=") {
            (k, Operator::NotEquals, v)
        } else if let Some((k, v)) = term.split_once("==") {
            (k, Operator::Equals, v)
        } else if let Some((k, v)) = term.split_once('=') {
            (k, Operator::Equals, v)
        } else {
            return Err(HarnessError::InvalidSelector(format!(
                "'{}' is not of the form key=value",
                term
            )));
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || !key.chars().all(is_selector_char) {
            return Err(HarnessError::InvalidSelector(format!(
                "invalid key '{}' in '{}'",
                key, s
            )));
        }
        if !value.chars().all(is_selector_char) {
            return Err(HarnessError::InvalidSelector(format!(
                "invalid value '{}' in '{}'",
                value, s
            )));
        }

        reqs.push(Requirement {
            key: key.to_string(),
            operator,
            value: value.to_string(),
        });
    }

    Ok(reqs)
}

fn is_selector_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')
}
