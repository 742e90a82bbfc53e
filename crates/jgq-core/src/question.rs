//! The question state carried through the workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{JgqError, JgqResult};
use crate::table::ResultTable;

/// A user question. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Question(String);

impl Question {
    /// Validate and wrap a question. Whitespace-only input is rejected.
    pub fn new(text: &str) -> JgqResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(JgqError::EmptyQuestion);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing decision for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// How packages, classes, methods and fields relate to each other.
    Structure,
    /// What code artifacts mean, or their javadoc content.
    Javadoc,
    /// Neither of the above.
    None,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Structure => "structure",
            Route::Javadoc => "javadoc",
            Route::None => "none",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structure" => Ok(Route::Structure),
            "javadoc" => Ok(Route::Javadoc),
            "none" => Ok(Route::None),
            other => Err(format!("unknown route '{}'", other)),
        }
    }
}

/// A workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Route,
    Refine,
    GraphSearch,
    VectorSearch,
    End,
}

impl Step {
    /// Successor of `Route` for a routing decision.
    pub fn after_route(route: Route) -> Step {
        match route {
            Route::Structure => Step::Refine,
            Route::Javadoc => Step::VectorSearch,
            Route::None => Step::End,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Route => "route",
            Step::Refine => "refine",
            Step::GraphSearch => "graph_search",
            Step::VectorSearch => "vector_search",
            Step::End => "end",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which search produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    GraphSearch,
    VectorSearch,
}

/// Evolving record for one request.
///
/// Each field is written only by the step that owns it.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionState {
    pub id: Uuid,
    pub asked_at: DateTime<Utc>,
    pub user_question: Question,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cypher_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cypher_result: Option<ResultTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered_by: Option<AnswerSource>,
    /// Steps in the order they ran.
    pub trail: Vec<Step>,
}

impl QuestionState {
    pub fn new(question: Question) -> Self {
        Self {
            id: Uuid::new_v4(),
            asked_at: Utc::now(),
            user_question: question,
            route: None,
            refined_question: None,
            cypher_query: None,
            cypher_result: None,
            final_answer: None,
            answered_by: None,
            trail: Vec::new(),
        }
    }

    /// The question the graph search should use: refined if available.
    pub fn search_question(&self) -> &str {
        self.refined_question
            .as_deref()
            .unwrap_or_else(|| self.user_question.as_str())
    }

    pub fn ran(&self, step: Step) -> bool {
        self.trail.contains(&step)
    }

    /// Position of a step in the trail.
    pub fn position(&self, step: Step) -> Option<usize> {
        self.trail.iter().position(|s| *s == step)
    }
}
