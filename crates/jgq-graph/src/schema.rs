//! Schema introspection.
//!
//! Builds a [`GraphSchema`] from the built-in `db.schema.*` procedures and a
//! scan of the relationship patterns present in the data. No APOC needed.

use anyhow::{anyhow, Context, Result};
use neo4rs::{Query, Row};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use jgq_core::schema::{NodeType, PropertyDef, RelType, RelationshipTriple};
use jgq_core::GraphSchema;

use crate::GraphClient;

const NODE_PROPERTIES_QUERY: &str = "CALL db.schema.nodeTypeProperties() \
     YIELD nodeLabels, propertyName, propertyTypes \
     RETURN nodeLabels, propertyName, propertyTypes";

const REL_PROPERTIES_QUERY: &str = "CALL db.schema.relTypeProperties() \
     YIELD relType, propertyName, propertyTypes \
     RETURN relType, propertyName, propertyTypes";

const TRIPLES_QUERY: &str = "MATCH (a)-[r]->(b) \
     WITH DISTINCT labels(a) AS starts, type(r) AS rel_type, labels(b) AS ends \
     UNWIND starts AS start \
     UNWIND ends AS end \
     RETURN DISTINCT start, rel_type, end \
     ORDER BY start, rel_type, end";

/// One row of `db.schema.nodeTypeProperties()` / `relTypeProperties()`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropertyRow {
    pub owners: Vec<String>,
    pub property: Option<String>,
    pub types: Vec<String>,
}

/// Fetch the schema of the connected database.
///
/// A row that does not decode fails the whole introspection.
pub async fn introspect_schema(client: &GraphClient) -> Result<GraphSchema> {
    let node_rows = client
        .query(Query::new(NODE_PROPERTIES_QUERY.to_string()))
        .await?
        .iter()
        .map(node_property_row)
        .collect::<Result<Vec<_>>>()
        .context("Failed to read node type properties")?;

    let rel_rows = client
        .query(Query::new(REL_PROPERTIES_QUERY.to_string()))
        .await?
        .iter()
        .map(rel_property_row)
        .collect::<Result<Vec<_>>>()
        .context("Failed to read relationship type properties")?;

    let triples = client
        .query(Query::new(TRIPLES_QUERY.to_string()))
        .await?
        .iter()
        .map(triple_row)
        .collect::<Result<Vec<_>>>()
        .context("Failed to read relationship patterns")?;

    let schema = GraphSchema {
        nodes: collect_node_types(node_rows),
        relationships: collect_rel_types(rel_rows),
        triples,
    };

    info!(
        labels = schema.nodes.len(),
        rel_types = schema.relationships.len(),
        patterns = schema.triples.len(),
        "Graph schema loaded"
    );
    Ok(schema)
}

pub(crate) fn node_property_row(row: &Row) -> Result<PropertyRow> {
    Ok(PropertyRow {
        owners: required(row, "nodeLabels")?,
        property: nullable_string(row, "propertyName")?,
        types: nullable_list(row, "propertyTypes")?,
    })
}

pub(crate) fn rel_property_row(row: &Row) -> Result<PropertyRow> {
    let rel_type: String = required(row, "relType")?;
    Ok(PropertyRow {
        owners: vec![strip_rel_type(&rel_type)],
        property: nullable_string(row, "propertyName")?,
        types: nullable_list(row, "propertyTypes")?,
    })
}

pub(crate) fn triple_row(row: &Row) -> Result<RelationshipTriple> {
    Ok(RelationshipTriple {
        start: required(row, "start")?,
        rel_type: required(row, "rel_type")?,
        end: required(row, "end")?,
    })
}

fn required<T: DeserializeOwned>(row: &Row, key: &str) -> Result<T> {
    row.get(key)
        .map_err(|e| anyhow!("Failed to get schema field '{}': {:?}", key, e))
}

/// `propertyName` is null for labels and types without properties.
fn nullable_string(row: &Row, key: &str) -> Result<Option<String>> {
    let value: Option<String> = required(row, key)?;
    Ok(value.filter(|v| !v.is_empty()))
}

fn nullable_list(row: &Row, key: &str) -> Result<Vec<String>> {
    let value: Option<Vec<String>> = required(row, key)?;
    Ok(value.unwrap_or_default())
}

/// `":`IMPLEMENTS`"` -> `"IMPLEMENTS"`.
pub(crate) fn strip_rel_type(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(':')
        .trim_matches('`')
        .to_string()
}

/// Group property rows by label. Multi-label rows count for each label.
pub(crate) fn collect_node_types(rows: Vec<PropertyRow>) -> Vec<NodeType> {
    group_properties(rows)
        .into_iter()
        .map(|(label, properties)| NodeType { label, properties })
        .collect()
}

/// Group property rows by relationship type.
pub(crate) fn collect_rel_types(rows: Vec<PropertyRow>) -> Vec<RelType> {
    group_properties(rows)
        .into_iter()
        .map(|(rel_type, properties)| RelType {
            rel_type,
            properties,
        })
        .collect()
}

fn group_properties(rows: Vec<PropertyRow>) -> Vec<(String, Vec<PropertyDef>)> {
    let mut groups: Vec<(String, Vec<PropertyDef>)> = Vec::new();

    for row in rows {
        for owner in &row.owners {
            if owner.is_empty() {
                continue;
            }
            let idx = match groups.iter().position(|(name, _)| name == owner) {
                Some(idx) => idx,
                None => {
                    groups.push((owner.clone(), Vec::new()));
                    groups.len() - 1
                }
            };

            let Some(property) = &row.property else {
                continue;
            };
            let props = &mut groups[idx].1;
            match props.iter_mut().find(|p| &p.name == property) {
                Some(existing) => {
                    for ty in &row.types {
                        if !existing.types.contains(ty) {
                            existing.types.push(ty.clone());
                        }
                    }
                }
                None => props.push(PropertyDef {
                    name: property.clone(),
                    types: row.types.clone(),
                }),
            }
        }
    }

    debug!(groups = groups.len(), "Grouped schema properties");
    groups
}
