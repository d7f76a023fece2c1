//! Payload types delivered by the two upstream queries.

use serde::{Deserialize, Deserializer, Serialize};

/// Operating status reported by the store-status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    /// Store is trading normally.
    Open,

    /// Store is temporarily down for maintenance.
    Maintenance,

    /// Store is switched off (closed to customers).
    Off,

    /// Missing or unrecognized value. Treated as "no status" by the gate.
    #[default]
    #[serde(other)]
    Unknown,
}

impl StoreStatus {
    /// Map a wire value to a status. Anything unrecognized is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "open" => StoreStatus::Open,
            "maintenance" => StoreStatus::Maintenance,
            "off" => StoreStatus::Off,
            _ => StoreStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StoreStatus::Open => "open",
            StoreStatus::Maintenance => "maintenance",
            StoreStatus::Off => "off",
            StoreStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One element of the store-status payload.
///
/// Only `status` is interpreted; every other field is carried through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreStatusRecord {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: StoreStatus,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StoreStatusRecord {
    pub fn new(status: StoreStatus) -> Self {
        Self {
            status,
            extra: serde_json::Map::new(),
        }
    }
}

// `null`, numbers and other non-strings decode as `Unknown` instead of failing the record.
fn lenient_status<'de, D>(deserializer: D) -> Result<StoreStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(StoreStatus::from_label)
        .unwrap_or_default())
}

/// Status of the first record, which is the only one the gate reads.
pub fn leading_status(records: &[StoreStatusRecord]) -> Option<StoreStatus> {
    records.first().map(|r| r.status)
}

/// A node of the category catalog tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CategoryNode {
    #[serde(default)]
    pub id: serde_json::Value,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub children: Vec<CategoryNode>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Category catalog. Opaque to the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CatalogTree(pub Vec<CategoryNode>);

impl CatalogTree {
    /// Number of nodes across all levels.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[CategoryNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserialize_known_values() {
        let records: Vec<StoreStatusRecord> = serde_json::from_str(
            r#"[{"status": "open"}, {"status": "maintenance"}, {"status": "off"}]"#,
        )
        .unwrap();
        let statuses: Vec<_> = records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![StoreStatus::Open, StoreStatus::Maintenance, StoreStatus::Off]
        );
    }

    #[test]
    fn test_status_unknown_or_missing() {
        let records: Vec<StoreStatusRecord> =
            serde_json::from_str(r#"[{"status": "holiday"}, {"id": 4}]"#).unwrap();
        assert_eq!(records[0].status, StoreStatus::Unknown);
        assert_eq!(records[1].status, StoreStatus::Unknown);
        assert_eq!(records[1].extra.get("id"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn test_status_non_string_is_unknown() {
        let records: Vec<StoreStatusRecord> =
            serde_json::from_str(r#"[{"status": null}, {"status": 3}, {"status": {"x": 1}}]"#)
                .unwrap();
        assert!(records.iter().all(|r| r.status == StoreStatus::Unknown));
    }

    #[test]
    fn test_leading_status_reads_first_record_only() {
        let records = vec![
            StoreStatusRecord::new(StoreStatus::Off),
            StoreStatusRecord::new(StoreStatus::Maintenance),
        ];
        assert_eq!(leading_status(&records), Some(StoreStatus::Off));
        assert_eq!(leading_status(&[]), None);
    }

    #[test]
    fn test_catalog_node_count() {
        let tree: CatalogTree = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Shoes", "children": [{"id": 2, "name": "Boots"}]},
                {"id": 3, "name": "Hats"}
            ]"#,
        )
        .unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.0[0].children[0].name, "Boots");
    }
}
