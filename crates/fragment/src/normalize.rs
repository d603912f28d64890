use crate::identity::IdentityResolver;
use crate::schema::{GraphFragment, Node, Relationship};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Sentinel type for nodes synthesized from edges whose endpoints the
/// extractor never emitted as nodes.
pub const PLACEHOLDER_TYPE: &str = "UNKNOWN";

/// Canonicalize a raw extraction into a fragment safe to cache and merge:
/// ids resolved through [`IdentityResolver`], nodes deduplicated by id
/// (first occurrence wins), relationships deduplicated by
/// (source, target, type), and placeholder nodes synthesized for edge
/// endpoints missing from the node set.
pub fn normalize(raw: GraphFragment) -> GraphFragment {
    let mut resolver = IdentityResolver::new();

    let mut nodes: Vec<Node> = Vec::new();
    let mut seen_nodes: HashSet<String> = HashSet::new();
    for mut node in raw.nodes {
        node.id = resolver.canonical_id(&node.id);
        if seen_nodes.insert(node.id.clone()) {
            nodes.push(node);
        } else {
            debug!(id = %node.id, "dropping duplicate node");
        }
    }

    let mut relationships: Vec<Relationship> = Vec::new();
    let mut seen_edges: HashSet<(String, String, String)> = HashSet::new();
    for mut rel in raw.relationships {
        rel.source_id = resolver.canonical_id(&rel.source_id);
        rel.target_id = resolver.canonical_id(&rel.target_id);

        if !seen_edges.insert(rel.key()) {
            debug!(
                source = %rel.source_id,
                target = %rel.target_id,
                rel_type = %rel.rel_type,
                "dropping duplicate relationship"
            );
            continue;
        }

        for endpoint in [&rel.source_id, &rel.target_id] {
            if seen_nodes.insert(endpoint.clone()) {
                warn!(id = %endpoint, "edge references unknown node, synthesizing placeholder");
                nodes.push(Node::new(endpoint.clone(), PLACEHOLDER_TYPE));
            }
        }

        relationships.push(rel);
    }

    GraphFragment {
        nodes,
        relationships,
    }
}
