use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar property bag attached to nodes and relationships.
pub type Properties = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: Properties::new(),
        }
    }
}

/// Directed edge between two nodes. Two relationships with the same
/// (sourceId, targetId, type) are the same edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "sourceId")]
    pub source_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            rel_type: rel_type.into(),
            properties: Properties::new(),
        }
    }

    /// Identity key for deduplication and store-side upserts.
    pub fn key(&self) -> (String, String, String) {
        (
            self.source_id.clone(),
            self.target_id.clone(),
            self.rel_type.clone(),
        )
    }
}

/// Everything extracted from one source document: a set of nodes and the
/// relationships between them. This is also the cache wire format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphFragment {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl GraphFragment {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_format_round_trips() {
        let mut node = Node::new("Berlin", "City");
        node.properties
            .insert("population".to_string(), serde_json::json!(3_700_000));
        let fragment = GraphFragment {
            nodes: vec![node, Node::new("Germany", "Country")],
            relationships: vec![Relationship::new("Berlin", "Germany", "CAPITAL_OF")],
        };

        let json = serde_json::to_string(&fragment).unwrap();
        let restored: GraphFragment = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, fragment);
    }

    #[test]
    fn wire_field_names_match_cache_contract() {
        let fragment = GraphFragment {
            nodes: vec![Node::new("A", "Person")],
            relationships: vec![Relationship::new("A", "B", "KNOWS")],
        };
        let value = serde_json::to_value(&fragment).unwrap();

        assert!(value["nodes"][0].get("type").is_some());
        let rel = &value["relationships"][0];
        assert!(rel.get("sourceId").is_some());
        assert!(rel.get("targetId").is_some());
        assert!(rel.get("type").is_some());
    }

    #[test]
    fn missing_properties_default_to_empty() {
        let json = r#"{"nodes":[{"id":"A","type":"Person"}],"relationships":[]}"#;
        let fragment: GraphFragment = serde_json::from_str(json).unwrap();
        assert!(fragment.nodes[0].properties.is_empty());
    }
}
