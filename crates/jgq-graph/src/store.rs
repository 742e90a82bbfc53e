//! [`GraphStore`] implementation backed by Neo4j.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use jgq_core::{GraphSchema, GraphStore, Record};

use crate::schema::introspect_schema;
use crate::GraphClient;

#[async_trait]
impl GraphStore for GraphClient {
    async fn schema(&self) -> Result<GraphSchema> {
        introspect_schema(self).await
    }

    async fn run_query(&self, cypher: &str) -> Result<Vec<Record>> {
        debug!(cypher = %cypher, "Running generated query");
        let records = self.query_records(cypher).await?;
        debug!(rows = records.len(), "Query returned");
        Ok(records)
    }
}
