//! Neo4j connection client.

use anyhow::{Context, Result};
use neo4rs::{ConfigBuilder, Graph, Query, Row};
use serde::de::DeserializeOwned;
use tracing::debug;

use jgq_core::{Neo4jConfig, Record};

/// Client for the code-property graph.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect and ping the database.
    ///
    /// neo4rs builds its pool lazily, so `RETURN 1` is run immediately to
    /// surface an unreachable server here rather than on the first question.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(4)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .with_context(|| format!("Neo4j at {} is not responding to queries", config.uri))?;

        debug!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a Cypher query and return all rows.
    pub async fn query(&self, query: Query) -> Result<Vec<Row>> {
        let mut result = self.graph.execute(query).await.context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.context("Failed to read Neo4j result")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return each row as a JSON record.
    pub async fn query_records(&self, cypher: &str) -> Result<Vec<Record>> {
        let rows = self.query(Query::new(cypher.to_string())).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(
        &self,
        query: Query,
        field: &str,
    ) -> Result<Option<T>> {
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => {
                let val: T = row
                    .get(field)
                    .map_err(|e| anyhow::anyhow!("Failed to get field '{}': {:?}", field, e))?;
                Ok(Some(val))
            }
            None => Ok(None),
        }
    }

    /// Node and relationship counts for status display.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        let node_query = Query::new("MATCH (n) RETURN count(n) as count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) as count".to_string());

        let nodes: i64 = self.query_scalar(node_query, "count").await?.unwrap_or(0);
        let relationships: i64 = self.query_scalar(rel_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: nodes.max(0) as usize,
            relationships: relationships.max(0) as usize,
        })
    }
}

/// Convert a row into a record keyed by the returned column names.
fn row_to_record(row: &Row) -> Result<Record> {
    row.to::<Record>()
        .map_err(|e| anyhow::anyhow!("Failed to convert Neo4j row: {:?}", e))
}

/// Node and relationship counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}
