use crate::GraphStore;
use async_trait::async_trait;
use fragment::{Node, PipelineError, Relationship, Result};
use neo4rs::{Graph, Query};
use tracing::info;

/// Neo4j-backed store. Properties travel as one JSON string per node/edge,
/// set only on creation so first-write-wins holds per key.
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(connection_error)?;
        Ok(Self::new(graph))
    }

    /// Create indexes backing the upsert keys.
    pub async fn init_schema(&self) -> Result<()> {
        let query = Query::new(
            "CREATE INDEX entity_id_index IF NOT EXISTS FOR (e:Entity) ON (e.id)".to_string(),
        );
        self.graph.run(query).await.map_err(connection_error)?;

        info!("Neo4j schema initialized");
        Ok(())
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let node_query = Query::new("MATCH (e:Entity) RETURN count(e) as count".to_string());
        let mut result = self.graph.execute(node_query).await.map_err(connection_error)?;
        let node_count = match result.next().await.map_err(connection_error)? {
            Some(row) => row.get::<i64>("count").unwrap_or(0) as usize,
            None => 0,
        };

        let rel_query =
            Query::new("MATCH ()-[r:RELATION]->() RETURN count(r) as count".to_string());
        let mut result = self.graph.execute(rel_query).await.map_err(connection_error)?;
        let relationship_count = match result.next().await.map_err(connection_error)? {
            Some(row) => row.get::<i64>("count").unwrap_or(0) as usize,
            None => 0,
        };

        Ok(StoreStats {
            node_count,
            relationship_count,
        })
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn upsert_node(&self, node: &Node) -> Result<()> {
        let query = Query::new(
            r#"
            MERGE (n:Entity {id: $id})
            ON CREATE SET n.name = $id, n.type = $type, n.properties = $properties
            "#
            .to_string(),
        )
        .param("id", node.id.clone())
        .param("type", node.node_type.clone())
        .param("properties", serde_json::to_string(&node.properties)?);

        self.graph.run(query).await.map_err(connection_error)
    }

    async fn upsert_relationship(&self, rel: &Relationship) -> Result<()> {
        let query = Query::new(
            r#"
            MATCH (a:Entity {id: $source_id})
            MATCH (b:Entity {id: $target_id})
            MERGE (a)-[r:RELATION {type: $type}]->(b)
            ON CREATE SET r.properties = $properties
            "#
            .to_string(),
        )
        .param("source_id", rel.source_id.clone())
        .param("target_id", rel.target_id.clone())
        .param("type", rel.rel_type.clone())
        .param("properties", serde_json::to_string(&rel.properties)?);

        self.graph.run(query).await.map_err(connection_error)
    }

    async fn node_exists(&self, id: &str) -> Result<bool> {
        let query = Query::new(
            "MATCH (n:Entity {id: $id}) RETURN count(n) as count".to_string(),
        )
        .param("id", id.to_string());

        let mut result = self.graph.execute(query).await.map_err(connection_error)?;
        let count = match result.next().await.map_err(connection_error)? {
            Some(row) => row.get::<i64>("count").unwrap_or(0),
            None => 0,
        };
        Ok(count > 0)
    }
}

fn connection_error(e: neo4rs::Error) -> PipelineError {
    PipelineError::StoreConnectionFailed(e.to_string())
}

#[derive(Debug)]
pub struct StoreStats {
    pub node_count: usize,
    pub relationship_count: usize,
}
