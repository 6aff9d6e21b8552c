//! Resolved resource type identity (group, version, plural resource, kind).
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static RESOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<resource>[a-z0-9][a-z0-9-]*)(?:\.(?P<group>[a-z0-9][a-z0-9.-]*))?/(?P<version>v[0-9][a-z0-9]*)$")
        .expect("resource pattern is valid")
});

// plural resource name → kind, for names the suffix rules get wrong
const IRREGULAR_KINDS: &[(&str, &str)] = &[
    ("configmaps", "ConfigMap"),
    ("endpoints", "Endpoints"),
    ("limitranges", "LimitRange"),
    ("namespaces", "Namespace"),
    ("persistentvolumeclaims", "PersistentVolumeClaim"),
    ("persistentvolumes", "PersistentVolume"),
    ("podtemplates", "PodTemplate"),
    ("replicationcontrollers", "ReplicationController"),
    ("resourcequotas", "ResourceQuota"),
    ("serviceaccounts", "ServiceAccount"),
    ("controllerrevisions", "ControllerRevision"),
    ("daemonsets", "DaemonSet"),
    ("deployments", "Deployment"),
    ("replicasets", "ReplicaSet"),
    ("statefulsets", "StatefulSet"),
    ("cronjobs", "CronJob"),
    ("ingresses", "Ingress"),
    ("ingressclasses", "IngressClass"),
    ("networkpolicies", "NetworkPolicy"),
    ("poddisruptionbudgets", "PodDisruptionBudget"),
    ("podsecuritypolicies", "PodSecurityPolicy"),
    ("clusterrolebindings", "ClusterRoleBinding"),
    ("clusterroles", "ClusterRole"),
    ("rolebindings", "RoleBinding"),
    ("csidrivers", "CSIDriver"),
    ("csinodes", "CSINode"),
    ("csistoragecapacities", "CSIStorageCapacity"),
    ("storageclasses", "StorageClass"),
    ("volumeattachments", "VolumeAttachment"),
    ("priorityclasses", "PriorityClass"),
    ("runtimeclasses", "RuntimeClass"),
    ("horizontalpodautoscalers", "HorizontalPodAutoscaler"),
    ("customresourcedefinitions", "CustomResourceDefinition"),
    ("mutatingwebhookconfigurations", "MutatingWebhookConfiguration"),
    ("validatingwebhookconfigurations", "ValidatingWebhookConfiguration"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid resource type {0:?} (expected <resource>[.<group>]/<version>, e.g. deployments.apps/v1)")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    /// Empty for the core API group.
    pub group: String,
    pub version: String,
    /// Plural resource name (`deployments`).
    pub resource: String,
    pub kind: String,
}

impl ResourceIdentity {
    /// Parses `<resource>[.<group>]/<version>`; `kind` overrides the derived kind.
    pub fn parse(src: &str, kind: Option<&str>) -> Result<Self, IdentityError> {
        let src = src.trim();
        let caps = RESOURCE_RE
            .captures(src)
            .ok_or_else(|| IdentityError::Malformed(src.to_string()))?;
        let resource = caps["resource"].to_string();
        let kind = match kind {
            Some(k) if !k.trim().is_empty() => k.trim().to_string(),
            _ => kind_for_resource(&resource),
        };
        Ok(Self {
            group: caps.name("group").map(|g| g.as_str().to_string()).unwrap_or_default(),
            version: caps["version"].to_string(),
            resource,
            kind,
        })
    }

    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }

    /// `v1` for the core group, `apps/v1` otherwise.
    pub fn api_version(&self) -> String {
        if self.is_core() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Canonical definition name of a built-in type, e.g. `io.k8s.api.apps.v1.Deployment`.
    pub fn builtin_schema_ref(&self) -> String {
        let group = if self.is_core() {
            "core"
        } else {
            self.group.split('.').next().unwrap_or(&self.group)
        };
        format!("io.k8s.api.{group}.{}.{}", self.version, self.kind)
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_core() {
            write!(f, "{}/{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}/{}", self.resource, self.group, self.version)
        }
    }
}

/// Singular, capitalised kind for a plural resource name.
pub fn kind_for_resource(resource: &str) -> String {
    if let Some((_, kind)) = IRREGULAR_KINDS.iter().find(|(plural, _)| *plural == resource) {
        return kind.to_string();
    }
    let singular = singularize(resource);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn singularize(resource: &str) -> String {
    if resource.len() > 3 {
        if let Some(stem) = resource.strip_suffix("ies") {
            return format!("{stem}y");
        }
    }
    if let Some(base) = resource.strip_suffix("es") {
        if base.ends_with(['s', 'x', 'z']) || base.ends_with("ch") || base.ends_with("sh") {
            return base.to_string();
        }
    }
    resource.strip_suffix('s').unwrap_or(resource).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grouped_and_core_resources() {
        let id = ResourceIdentity::parse("deployments.apps/v1", None).unwrap();
        assert_eq!(id.group, "apps");
        assert_eq!(id.api_version(), "apps/v1");
        assert_eq!(id.kind, "Deployment");
        assert_eq!(id.builtin_schema_ref(), "io.k8s.api.apps.v1.Deployment");

        let core = ResourceIdentity::parse("configmaps/v1", None).unwrap();
        assert!(core.is_core());
        assert_eq!(core.api_version(), "v1");
        assert_eq!(core.builtin_schema_ref(), "io.k8s.api.core.v1.ConfigMap");
        assert_eq!(core.to_string(), "configmaps/v1");
    }

    #[test]
    fn dotted_groups_and_kind_override() {
        let id = ResourceIdentity::parse("queues.scheduling.run.ai/v2alpha1", Some("Queue")).unwrap();
        assert_eq!(id.group, "scheduling.run.ai");
        assert_eq!(id.api_version(), "scheduling.run.ai/v2alpha1");
        assert_eq!(id.kind, "Queue");
        assert_eq!(id.builtin_schema_ref(), "io.k8s.api.scheduling.v2alpha1.Queue");
    }

    #[test]
    fn malformed_identities() {
        for bad in ["deployments", "Deployments.apps/v1", "deployments.apps/", "/v1", "a/b/v1"] {
            assert!(ResourceIdentity::parse(bad, None).is_err(), "{bad}");
        }
    }

    #[test]
    fn plural_rules() {
        assert_eq!(kind_for_resource("networkpolicies"), "NetworkPolicy");
        assert_eq!(kind_for_resource("policies"), "Policy");
        assert_eq!(kind_for_resource("boxes"), "Box");
        assert_eq!(kind_for_resource("patches"), "Patch");
        assert_eq!(kind_for_resource("classes"), "Class");
        assert_eq!(kind_for_resource("queues"), "Queue");
        assert_eq!(kind_for_resource("pods"), "Pod");
        assert_eq!(kind_for_resource("endpoints"), "Endpoints");
        assert_eq!(kind_for_resource("ingresses"), "Ingress");
    }
}
