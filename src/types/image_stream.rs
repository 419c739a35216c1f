// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::annotations::IMAGE_REPOSITORY_CHECK;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "image.openshift.io", version = "v1", kind = "ImageStream")]
#[kube(namespaced)]
#[kube(status = "ImageStreamStatus")]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_image_repository: Option<String>,
}

impl ImageStream {
    /// History of a status tag, if the tag exists
    pub fn tag(&self, name: &str) -> Option<&NamedTagEventList> {
        self.status
            .as_ref()
            .and_then(|s| s.tags.as_ref())
            .and_then(|tags| tags.iter().find(|t| t.tag == name))
    }

    /// True once the `latest` tag has been populated
    pub fn has_latest_tag(&self) -> bool {
        self.tag("latest").is_some()
    }

    /// Result text of the registry check annotation, empty when absent
    pub fn repository_check(&self) -> &str {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(IMAGE_REPOSITORY_CHECK))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// True when the registry check reported a missing tag or an error
    pub fn is_tag_not_found(&self) -> bool {
        let check = self.repository_check();
        check.contains("not") || check.contains("error")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamStatus {
    #[serde(default)]
    pub docker_image_repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<NamedTagEventList>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamedTagEventList {
    pub tag: String,
    #[serde(default)]
    pub items: Vec<TagEvent>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    pub docker_image_reference: String,
    pub image: String,
    #[serde(default)]
    pub generation: i64,
}
