// Data shapes exchanged with the cluster's platform API. The cluster owns
// these records; the tool only reads them and sends threshold updates.

use serde::{Deserialize, Serialize};

/// A quota as returned by `GET /platform/1/quota/quotas`. Unknown fields in
/// the response are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quota {
    pub id: String,
    pub path: String,
    /// `directory`, `user`, `group`, `default-user`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub enforced: bool,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl Quota {
    pub fn is_directory(&self) -> bool {
        self.kind == "directory"
    }

    /// Logical to physical ratio. `None` when there is no usage data or
    /// nothing is stored physically yet.
    pub fn efficiency(&self) -> Option<f64> {
        self.usage.as_ref().and_then(Usage::efficiency)
    }
}

/// Threshold triple. The cluster uses `null` for "not set".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    pub hard: Option<u64>,
    pub soft: Option<u64>,
    pub advisory: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub logical: u64,
    #[serde(default)]
    pub physical: u64,
}

impl Usage {
    pub fn efficiency(&self) -> Option<f64> {
        if self.physical == 0 {
            return None;
        }
        Some(self.logical as f64 / self.physical as f64)
    }
}

/// Criteria for a quota lookup. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaQuery {
    pub enforced: Option<bool>,
    pub path: Option<String>,
}

impl QuotaQuery {
    pub fn enforced(enforced: bool) -> Self {
        QuotaQuery { enforced: Some(enforced), path: None }
    }

    pub fn path(path: &str) -> Self {
        QuotaQuery { enforced: None, path: Some(path.to_string()) }
    }

    pub fn matches(&self, quota: &Quota) -> bool {
        self.enforced.map_or(true, |e| quota.enforced == e)
            && self.path.as_deref().map_or(true, |p| quota.path == p)
    }

    /// Query string pairs for the quota listing endpoint.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(enforced) = self.enforced {
            params.push(("enforced", enforced.to_string()));
        }
        if let Some(path) = &self.path {
            params.push(("path", path.clone()));
        }
        params
    }
}

/// Body of a quota create request. Volumes are directory quotas that only
/// account for usage (`enforced = false`).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewQuota {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enforced: bool,
    pub include_snapshots: bool,
    pub thresholds_include_overhead: bool,
}

impl NewQuota {
    pub fn volume(path: &str) -> Self {
        NewQuota {
            path: path.to_string(),
            kind: "directory".to_string(),
            enforced: false,
            include_snapshots: false,
            thresholds_include_overhead: false,
        }
    }
}

/// One child of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_cluster_quota_with_nulls() {
        let json = r#"{
            "id": "AABpAQEAAAAAAAAAAAAAQA0AAAAAAAAA",
            "path": "/ifs/data/proj",
            "type": "directory",
            "enforced": true,
            "container": true,
            "thresholds": {"hard": 10737418240, "soft": null, "advisory": 9663676416, "soft_grace": null},
            "usage": {"inodes": 12, "logical": 2048, "physical": 1024}
        }"#;
        let quota: Quota = serde_json::from_str(json).unwrap();
        assert_eq!(quota.path, "/ifs/data/proj");
        assert!(quota.is_directory());
        assert_eq!(quota.thresholds.hard, Some(10737418240));
        assert_eq!(quota.thresholds.soft, None);
        assert_eq!(quota.efficiency(), Some(2.0));
    }

    #[test]
    fn efficiency_guards_zero_physical() {
        let usage = Usage { logical: 10, physical: 0 };
        assert_eq!(usage.efficiency(), None);
    }

    #[test]
    fn query_params_skip_unset_fields() {
        assert_eq!(QuotaQuery::enforced(true).params(), vec![("enforced", "true".to_string())]);
        assert_eq!(
            QuotaQuery::path("/ifs/a").params(),
            vec![("path", "/ifs/a".to_string())]
        );
    }

    #[test]
    fn volume_request_is_unenforced_directory() {
        let body = serde_json::to_value(NewQuota::volume("/ifs/vol1")).unwrap();
        assert_eq!(body["type"], "directory");
        assert_eq!(body["enforced"], false);
        assert_eq!(body["include_snapshots"], false);
    }
}
