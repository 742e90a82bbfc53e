//! Schema checks for generated Cypher.
//!
//! A lightweight scan, not a parser: node and relationship patterns are
//! found with regular expressions after string literals are blanked out.
//! Checks labels, relationship types and the direction of every
//! `(a)-[:R]->(b)` hop whose endpoint labels are known.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{JgqError, JgqResult};
use crate::schema::GraphSchema;

static WRITE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^.\w`])(CREATE|MERGE|DELETE|SET|REMOVE|DROP|LOAD\s+CSV)\b")
        .expect("valid regex")
});

static NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\(\s*(?P<var>[A-Za-z_]\w*)?\s*(?P<labels>(?::\s*`?[A-Za-z_]\w*`?\s*)*)(?:\{[^}]*\})?\s*\)",
    )
    .expect("valid regex")
});

static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*`?(?P<label>[A-Za-z_]\w*)`?").expect("valid regex"));

static REL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s*\[\s*(?:[A-Za-z_]\w*)?\s*(?::\s*(?P<types>[^\]\*\{\s]+))?[^\]]*\]\s*-")
        .expect("valid regex")
});

static HOP: LazyLock<Regex> = LazyLock::new(|| {
    let node = |side: &str| {
        format!(
            r"\(\s*(?P<{side}var>[A-Za-z_]\w*)?\s*(?P<{side}labels>(?::\s*`?[A-Za-z_]\w*`?\s*)*)(?:\{{[^}}]*\}})?\s*\)"
        )
    };
    Regex::new(&format!(
        r"{}\s*(?P<larrow><)?-\s*\[\s*(?:[A-Za-z_]\w*)?\s*(?::\s*(?P<types>[^\]\*\{{\s]+))?[^\]]*\]\s*-(?P<rarrow>>)?\s*(?P<right>{})",
        node("l"),
        node("r"),
    ))
    .expect("valid regex")
});

/// A way a generated query disagrees with the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CypherViolation {
    WriteClause(String),
    UnknownLabel(String),
    UnknownRelType(String),
    ReversedDirection {
        start: String,
        rel_type: String,
        end: String,
    },
    UnmatchedPattern {
        start: String,
        rel_type: String,
        end: String,
    },
}

impl fmt::Display for CypherViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CypherViolation::WriteClause(clause) => {
                write!(f, "write clause '{}' is not allowed", clause)
            }
            CypherViolation::UnknownLabel(label) => write!(f, "unknown node label '{}'", label),
            CypherViolation::UnknownRelType(rel) => {
                write!(f, "unknown relationship type '{}'", rel)
            }
            CypherViolation::ReversedDirection { start, rel_type, end } => write!(
                f,
                "(:{start})-[:{rel_type}]->(:{end}) has the wrong direction; the schema has (:{end})-[:{rel_type}]->(:{start})"
            ),
            CypherViolation::UnmatchedPattern { start, rel_type, end } => write!(
                f,
                "(:{start})-[:{rel_type}]->(:{end}) does not exist in the schema"
            ),
        }
    }
}

/// Check `query` against `schema`, returning every violation found.
pub fn validate(schema: &GraphSchema, query: &str) -> Vec<CypherViolation> {
    let text = strip_literals(query);
    let mut violations = Vec::new();

    for caps in WRITE_CLAUSE.captures_iter(&text) {
        let clause = caps[1].split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        push_unique(&mut violations, CypherViolation::WriteClause(clause));
    }

    if schema.is_empty() {
        return violations;
    }

    let mut var_labels: HashMap<String, Vec<String>> = HashMap::new();
    for caps in NODE.captures_iter(&text) {
        let labels = parse_labels(caps.name("labels").map_or("", |m| m.as_str()));
        for label in &labels {
            if !schema.has_label(label) {
                push_unique(&mut violations, CypherViolation::UnknownLabel(label.clone()));
            }
        }
        if let Some(var) = caps.name("var") {
            if !labels.is_empty() {
                var_labels.entry(var.as_str().to_string()).or_insert(labels);
            }
        }
    }

    for caps in REL.captures_iter(&text) {
        for rel_type in parse_types(caps.name("types").map_or("", |m| m.as_str())) {
            if !schema.has_rel_type(&rel_type) {
                push_unique(&mut violations, CypherViolation::UnknownRelType(rel_type));
            }
        }
    }

    if schema.triples.is_empty() {
        return violations;
    }

    let mut pos = 0;
    while let Some(caps) = HOP.captures_at(&text, pos) {
        // Continue from the right node so chained hops share it.
        pos = caps.name("right").map_or(text.len(), |m| m.start());

        let left = resolve_labels(&caps, "l", &var_labels);
        let right = resolve_labels(&caps, "r", &var_labels);
        let types = parse_types(caps.name("types").map_or("", |m| m.as_str()));
        if left.is_empty() || right.is_empty() || types.is_empty() {
            continue;
        }

        let (starts, ends) = match (caps.name("larrow").is_some(), caps.name("rarrow").is_some()) {
            (false, true) => (&left, &right),
            (true, false) => (&right, &left),
            _ => continue,
        };

        for rel_type in types.iter().filter(|t| schema.has_rel_type(t)) {
            let forward = starts
                .iter()
                .any(|s| ends.iter().any(|e| schema.allows(s, rel_type, e)));
            if forward {
                continue;
            }

            let reversed = starts
                .iter()
                .any(|s| ends.iter().any(|e| schema.allows(e, rel_type, s)));
            let (start, end) = (starts[0].clone(), ends[0].clone());
            let violation = if reversed {
                CypherViolation::ReversedDirection {
                    start,
                    rel_type: rel_type.clone(),
                    end,
                }
            } else {
                CypherViolation::UnmatchedPattern {
                    start,
                    rel_type: rel_type.clone(),
                    end,
                }
            };
            push_unique(&mut violations, violation);
        }
    }

    violations
}

/// Validate and turn violations into [`JgqError::InvalidQuery`].
pub fn check(schema: &GraphSchema, query: &str) -> JgqResult<()> {
    let violations = validate(schema, query);
    if violations.is_empty() {
        return Ok(());
    }
    let detail = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(JgqError::InvalidQuery(detail))
}

fn resolve_labels(
    caps: &regex::Captures<'_>,
    side: &str,
    var_labels: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    let explicit = parse_labels(caps.name(&format!("{side}labels")).map_or("", |m| m.as_str()));
    if !explicit.is_empty() {
        return explicit;
    }
    caps.name(&format!("{side}var"))
        .and_then(|var| var_labels.get(var.as_str()))
        .cloned()
        .unwrap_or_default()
}

fn parse_labels(text: &str) -> Vec<String> {
    LABEL
        .captures_iter(text)
        .map(|c| c["label"].to_string())
        .collect()
}

fn parse_types(text: &str) -> Vec<String> {
    text.split('|')
        .map(|t| t.trim().trim_start_matches(':').trim_matches('`').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn push_unique(violations: &mut Vec<CypherViolation>, violation: CypherViolation) {
    if !violations.contains(&violation) {
        violations.push(violation);
    }
}

/// Blank out the contents of string literals.
fn strip_literals(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut chars = query.chars();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '\'' && c != '"' {
            continue;
        }
        let mut escaped = false;
        for inner in chars.by_ref() {
            if escaped {
                escaped = false;
            } else if inner == '\\' {
                escaped = true;
            } else if inner == c {
                out.push(c);
                break;
            }
        }
    }

    out
}
