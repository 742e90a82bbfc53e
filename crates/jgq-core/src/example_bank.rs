//! Question/query pairs embedded into the Cypher-generation prompt.

use serde::Serialize;

/// A natural-language question and the Cypher that answers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryExample {
    pub question: &'static str,
    pub cypher: &'static str,
}

/// The example bank. Static, so it cannot change between requests.
pub static QUERY_EXAMPLES: &[QueryExample] = &[
    QueryExample {
        question: "Show me all classes that declare less than 3 public methods",
        cypher: "MATCH (c:Class)-[:DECLARES_METHOD]->(m:Method)
WHERE m.accessModifier = \"public\"
WITH c, COUNT(m) AS methodCount
WHERE methodCount < 3
RETURN c.name",
    },
    QueryExample {
        question: "Sort the packages by the number of types",
        cypher: "MATCH (p:Package)-[:CONTAINS]->(t:Type)
WITH p, COUNT(t) AS typeCount
ORDER BY typeCount DESC
RETURN p.name, typeCount",
    },
    QueryExample {
        question: "What classes do not have constructors",
        cypher: "MATCH (c:Class)
WHERE NOT (c)-[:DECLARES_CONSTRUCTOR]->(:Constructor)
RETURN c.name",
    },
    QueryExample {
        question: "Which classes contain the highest number of methods? Show the top 10",
        cypher: "MATCH (c:Class)-[:DECLARES_METHOD]->(m:Method)
WITH c, COUNT(m) AS methodCount
ORDER BY methodCount DESC
LIMIT 10
RETURN c.name, methodCount",
    },
    QueryExample {
        question: "What interfaces do not have an implementation",
        cypher: "MATCH (i:Interface)
WHERE NOT (i)<-[:IMPLEMENTS]-(:Class)
RETURN i.name",
    },
];

/// Render the bank as `# question` / query blocks for the prompt.
pub fn render_examples(examples: &[QueryExample]) -> String {
    examples
        .iter()
        .map(|e| format!("# {}\n{}", e.question, e.cypher))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_examples() {
        let text = render_examples(QUERY_EXAMPLES);
        assert!(text.starts_with("# Show me all classes that declare less than 3 public methods\nMATCH"));
        assert_eq!(text.matches("\n\n# ").count(), QUERY_EXAMPLES.len() - 1);
    }

    #[test]
    fn test_bank_is_stable_across_renders() {
        let first = render_examples(QUERY_EXAMPLES);
        let second = render_examples(QUERY_EXAMPLES);
        assert_eq!(first, second);
        assert_eq!(QUERY_EXAMPLES.len(), 5);
    }

    #[test]
    fn test_unimplemented_interfaces_example() {
        let example = QUERY_EXAMPLES
            .iter()
            .find(|e| e.question == "What interfaces do not have an implementation")
            .unwrap();
        assert!(example.cypher.contains("WHERE NOT (i)<-[:IMPLEMENTS]-(:Class)"));
    }
}
