//! Graph schema snapshot.
//!
//! Fetched from the database once per session. Prompts only ever see the
//! text rendering; the structured form backs query validation.

use serde::Serialize;

/// A property and the value types observed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDef {
    pub name: String,
    pub types: Vec<String>,
}

/// A node label and its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeType {
    pub label: String,
    pub properties: Vec<PropertyDef>,
}

/// A relationship type and its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelType {
    pub rel_type: String,
    pub properties: Vec<PropertyDef>,
}

/// An observed `(:start)-[:rel_type]->(:end)` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationshipTriple {
    pub start: String,
    pub rel_type: String,
    pub end: String,
}

impl RelationshipTriple {
    pub fn new(start: &str, rel_type: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            rel_type: rel_type.to_string(),
            end: end.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphSchema {
    pub nodes: Vec<NodeType>,
    pub relationships: Vec<RelType>,
    pub triples: Vec<RelationshipTriple>,
}

impl GraphSchema {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty() && self.triples.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.nodes.iter().any(|n| n.label == label)
            || self
                .triples
                .iter()
                .any(|t| t.start == label || t.end == label)
    }

    pub fn has_rel_type(&self, rel_type: &str) -> bool {
        self.relationships.iter().any(|r| r.rel_type == rel_type)
            || self.triples.iter().any(|t| t.rel_type == rel_type)
    }

    /// Whether `(:start)-[:rel_type]->(:end)` exists in that direction.
    pub fn allows(&self, start: &str, rel_type: &str, end: &str) -> bool {
        self.triples
            .iter()
            .any(|t| t.start == start && t.rel_type == rel_type && t.end == end)
    }

    /// Render the schema the way the prompts expect it.
    pub fn to_prompt_text(&self) -> String {
        let mut out = String::from("Node properties:\n");
        for node in &self.nodes {
            out.push_str(&format!("{} {}\n", node.label, format_properties(&node.properties)));
        }

        out.push_str("Relationship properties:\n");
        for rel in &self.relationships {
            if rel.properties.is_empty() {
                continue;
            }
            out.push_str(&format!("{} {}\n", rel.rel_type, format_properties(&rel.properties)));
        }

        out.push_str("The relationships:\n");
        for t in &self.triples {
            out.push_str(&format!("(:{})-[:{}]->(:{})\n", t.start, t.rel_type, t.end));
        }

        out.trim_end().to_string()
    }
}

fn format_properties(props: &[PropertyDef]) -> String {
    let inner = props
        .iter()
        .map(|p| {
            let ty = if p.types.is_empty() {
                "ANY".to_string()
            } else {
                p.types.join("|")
            };
            format!("{}: {}", p.name, ty)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", inner)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn prop(name: &str, ty: &str) -> PropertyDef {
        PropertyDef {
            name: name.to_string(),
            types: vec![ty.to_string()],
        }
    }

    /// A small Java code-property graph schema.
    pub fn java_schema() -> GraphSchema {
        GraphSchema {
            nodes: vec![
                NodeType {
                    label: "Package".to_string(),
                    properties: vec![prop("name", "STRING")],
                },
                NodeType {
                    label: "Type".to_string(),
                    properties: vec![prop("name", "STRING")],
                },
                NodeType {
                    label: "Class".to_string(),
                    properties: vec![prop("name", "STRING"), prop("fqn", "STRING")],
                },
                NodeType {
                    label: "Interface".to_string(),
                    properties: vec![prop("name", "STRING")],
                },
                NodeType {
                    label: "Method".to_string(),
                    properties: vec![prop("name", "STRING"), prop("accessModifier", "STRING")],
                },
                NodeType {
                    label: "Constructor".to_string(),
                    properties: vec![prop("name", "STRING")],
                },
            ],
            relationships: vec![
                RelType {
                    rel_type: "CONTAINS".to_string(),
                    properties: vec![],
                },
                RelType {
                    rel_type: "IMPLEMENTS".to_string(),
                    properties: vec![],
                },
                RelType {
                    rel_type: "DECLARES_METHOD".to_string(),
                    properties: vec![prop("order", "INTEGER")],
                },
                RelType {
                    rel_type: "DECLARES_CONSTRUCTOR".to_string(),
                    properties: vec![],
                },
            ],
            triples: vec![
                RelationshipTriple::new("Package", "CONTAINS", "Type"),
                RelationshipTriple::new("Package", "CONTAINS", "Class"),
                RelationshipTriple::new("Package", "CONTAINS", "Interface"),
                RelationshipTriple::new("Class", "IMPLEMENTS", "Interface"),
                RelationshipTriple::new("Class", "DECLARES_METHOD", "Method"),
                RelationshipTriple::new("Interface", "DECLARES_METHOD", "Method"),
                RelationshipTriple::new("Class", "DECLARES_CONSTRUCTOR", "Constructor"),
            ],
        }
    }
}
