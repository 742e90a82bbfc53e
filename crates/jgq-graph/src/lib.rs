//! # JGQ Graph
//!
//! Neo4j access for JGQ.
//!
//! Connects to the code-property graph, introspects its schema and runs
//! the read queries generated by the workflow.

pub mod client;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphCounts};
pub use schema::introspect_schema;
