//! # JGQ Workflow
//!
//! The question-answering pipeline: route the question, refine it against
//! the graph schema, generate and run a Cypher query, and summarize the rows.

pub mod chain;
pub mod controller;
pub mod refine;
pub mod router;
pub mod vector;

pub use chain::{ChainOutput, CypherQaChain};
pub use controller::Workflow;
pub use refine::refine_question;
pub use router::route_question;
pub use vector::{vector_search, VECTOR_SEARCH_PLACEHOLDER};
