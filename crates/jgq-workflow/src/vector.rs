//! Semantic search over javadoc. Not implemented yet.

use tracing::warn;

/// Answer returned for every question routed to the vector search.
pub const VECTOR_SEARCH_PLACEHOLDER: &str =
    "To be implemented. Here comes the result of the Vector search";

// TODO: embed javadoc into a vector index and search it here.
pub fn vector_search(question: &str) -> String {
    warn!(question = %question, "Vector search is not implemented; returning placeholder");
    VECTOR_SEARCH_PLACEHOLDER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_for_any_question() {
        assert_eq!(vector_search("What does the Repository interface do?"), VECTOR_SEARCH_PLACEHOLDER);
    }
}
