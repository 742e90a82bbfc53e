//! Prompt templates for the four model roles.
//!
//! Placeholders are written `{name}` and filled in a single pass, so braces
//! inside substituted values (schema property maps, example queries) are left
//! alone.

/// Routing prompt. Placeholder: `question`.
pub const ROUTER_TEMPLATE: &str = r#"You are an expert in routing a question. The question will be about exploring the content of a Java project.
The source code artifacts of a Java project have been exported into a Neo4j knowledge graph.
The question will either be about the design/architecture of the code, i.e. how it is constructed,
or about the semantics and meaning of what certain code artifacts are doing.

That means you have three options to answer:
1. 'javadoc': The question is about the meaning/semantics of what classes, interfaces, methods, etc. are used for, or the user explicitly asks for javadoc content.
2. 'structure': The question is about the structure of Java artifacts, i.e. how packages, classes, methods, fields, etc. interact with each other. The ontology of the code.
3. 'none': You cannot categorize the question as either 'javadoc' or 'structure'.

Return a JSON object with a single key 'source' and no preamble or explanation.
The value must be one of: 'javadoc', 'structure', or 'none'.

Question to route:
{question}"#;

/// Refinement prompt. Placeholders: `schema`, `question`.
pub const REFINEMENT_TEMPLATE: &str = r#"You are an expert in prompt refinement and Java software development.
Your task is to improve the original user question by providing an alternative that is more concise and expressive.

The question will later be used to generate a Cypher query for a knowledge graph.
The knowledge graph is created from parsed Java code, so the entities are things like class, method, field, package.
The relationships are things like:
* a class declares methods
* a package contains classes/interfaces/enums
* a method has parameters
* a method has a return type
* a class implements an interface

As additional input you get the schema of the graph database.
Use the names of the entities, properties and relationships of the schema so that the improved question
stays close to the underlying schema and simplifies the subsequent Cypher generation.

Return a JSON object with a single key 'refinement' and no preamble or explanation.
The value must be the refined question. If you find no better alternative, return the original question.

Schema:
{schema}

The original user question is:
{question}"#;

/// Cypher generation prompt. Placeholders: `schema`, `examples`, `instructions`, `question`.
pub const CYPHER_GENERATION_TEMPLATE: &str = r#"Task: Generate a Cypher statement to query a graph database.
Instructions:
Use only the provided relationship types, node labels, and properties in the schema.
Do not use any other relationship types, node labels, or properties that are not provided.
Schema:
{schema}
Notes:
Do not use the size() function; prefer COUNT instead.
For searching part of strings prefer CONTAINS or STARTS WITH over regular expressions.
You must always use the right direction of a relationship.
Do not include any explanations or apologies in your response; return only the Cypher statement.{instructions}

Examples: Here are a few examples of generated Cypher statements for particular questions:
{examples}

The question is:
{question}"#;

/// Answer prompt. Placeholders: `context`, `question`.
pub const CYPHER_QA_TEMPLATE: &str = r#"You are an assistant that helps to form nice and human understandable answers about a Java code base.
The information part contains the result of a graph query that you must use to construct an answer.
The provided information is authoritative; never doubt it or try to use your internal knowledge to correct it.
Make the answer sound like a response to the question. Do not mention that you based the result on the given information.
If the provided information is empty, say that you don't know the answer.
Information:
{context}

Question: {question}
Helpful Answer:"#;

/// Fill `{name}` placeholders from `vars`. Unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn router_prompt(question: &str) -> String {
    render(ROUTER_TEMPLATE, &[("question", question)])
}

pub fn refinement_prompt(schema: &str, question: &str) -> String {
    render(REFINEMENT_TEMPLATE, &[("schema", schema), ("question", question)])
}

/// Build the generation prompt. Extra instructions are appended to the notes.
pub fn cypher_prompt(
    schema: &str,
    question: &str,
    examples: &str,
    instructions: Option<&str>,
) -> String {
    let extra = instructions
        .map(|text| format!("\n{}", text.trim()))
        .unwrap_or_default();
    render(
        CYPHER_GENERATION_TEMPLATE,
        &[
            ("schema", schema),
            ("question", question),
            ("examples", examples),
            ("instructions", &extra),
        ],
    )
}

pub fn qa_prompt(question: &str, context: &str) -> String {
    render(CYPHER_QA_TEMPLATE, &[("context", context), ("question", question)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_single_pass() {
        let out = render("S: {schema}\nQ: {question}", &[
            ("schema", "Class {name: STRING} {question}"),
            ("question", "why?"),
        ]);
        assert_eq!(out, "S: Class {name: STRING} {question}\nQ: why?");
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_braces() {
        assert_eq!(render("{unknown} {a", &[("a", "x")]), "{unknown} {a");
    }

    #[test]
    fn test_router_prompt() {
        let prompt = router_prompt("Which classes implement Serializable?");
        assert!(prompt.contains("single key 'source'"));
        assert!(prompt.ends_with("Which classes implement Serializable?"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn test_refinement_prompt() {
        let prompt = refinement_prompt("(:Class)-[:IMPLEMENTS]->(:Interface)", "impls?");
        assert!(prompt.contains("single key 'refinement'"));
        assert!(prompt.contains("(:Class)-[:IMPLEMENTS]->(:Interface)"));
        assert!(prompt.ends_with("impls?"));
    }

    #[test]
    fn test_cypher_prompt_rules_and_instructions() {
        let prompt = cypher_prompt("schema-text", "q", "# ex\nMATCH (n) RETURN n", None);
        assert!(prompt.contains("Do not use the size() function; prefer COUNT instead."));
        assert!(prompt.contains("CONTAINS or STARTS WITH"));
        assert!(prompt.contains("right direction of a relationship"));
        assert!(prompt.contains("# ex\nMATCH (n) RETURN n"));
        assert!(!prompt.contains("{instructions}"));

        let with_extra = cypher_prompt("s", "q", "e", Some("The return type is (:Method)-[:RETURNS]->(:Type)\n"));
        assert!(with_extra.contains("return only the Cypher statement.\nThe return type is (:Method)-[:RETURNS]->(:Type)\n\nExamples"));
    }

    #[test]
    fn test_qa_prompt() {
        let prompt = qa_prompt("Which interfaces?", r#"[{"i.name":"Repo"}]"#);
        assert!(prompt.contains(r#"[{"i.name":"Repo"}]"#));
        assert!(prompt.contains("Question: Which interfaces?"));
    }
}
