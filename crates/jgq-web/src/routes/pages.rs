//! HTML page handlers.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::warn;

use jgq_core::models::model_catalog;
use jgq_core::table::cell_text;
use jgq_core::{ModelSelection, Question, QuestionState};

use super::{error_chain, status_for};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    question: String,
    direct: bool,
    cypher_models: Vec<ModelOption>,
    qa_models: Vec<ModelOption>,
    result: Option<ResultView>,
    error: Option<String>,
}

struct ModelOption {
    value: String,
    label: String,
    selected: bool,
}

struct ResultView {
    route: String,
    refined_question: Option<String>,
    cypher: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    answer: Option<String>,
}

impl ResultView {
    fn from_state(state: &QuestionState) -> Self {
        let (columns, rows) = match &state.cypher_result {
            Some(table) => (
                table.columns.clone(),
                table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(cell_text).collect())
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            route: state
                .route
                .map(|r| r.to_string())
                .unwrap_or_else(|| "direct".to_string()),
            refined_question: state.refined_question.clone(),
            cypher: state.cypher_query.clone(),
            columns,
            rows,
            answer: state.final_answer.clone(),
        }
    }
}

fn model_options(selected: &ModelSelection) -> Vec<ModelOption> {
    let mut options: Vec<ModelOption> = model_catalog()
        .into_iter()
        .map(|m| ModelOption {
            selected: &m == selected,
            value: m.to_string(),
            label: m.label(),
        })
        .collect();

    // A configured model outside the catalog is still offered.
    if !options.iter().any(|o| o.selected) {
        options.insert(
            0,
            ModelOption {
                value: selected.to_string(),
                label: selected.label(),
                selected: true,
            },
        );
    }
    options
}

#[derive(Deserialize)]
pub struct AskForm {
    pub question: String,
    pub cypher_model: Option<String>,
    pub qa_model: Option<String>,
    /// Checkbox; present when ticked.
    pub direct: Option<String>,
}

fn render(template: IndexTemplate, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("Template error: {}", e)),
        )
            .into_response(),
    }
}

fn parse_selection(value: Option<&str>) -> Result<Option<ModelSelection>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(|e| format!("{}", e)),
        None => Ok(None),
    }
}

/// GET / - The question form.
pub async fn index(State(state): State<AppState>) -> Response {
    let template = IndexTemplate {
        question: String::new(),
        direct: false,
        cypher_models: model_options(&state.config.models.cypher),
        qa_models: model_options(&state.config.models.qa),
        result: None,
        error: None,
    };
    render(template, StatusCode::OK)
}

/// POST /ask - Answer the submitted question and render the result.
pub async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    let direct = form.direct.is_some();
    let mut template = IndexTemplate {
        question: form.question.clone(),
        direct,
        cypher_models: model_options(&state.config.models.cypher),
        qa_models: model_options(&state.config.models.qa),
        result: None,
        error: None,
    };

    let selections = parse_selection(form.cypher_model.as_deref())
        .and_then(|cypher| Ok((cypher, parse_selection(form.qa_model.as_deref())?)));
    let (cypher_model, qa_model) = match selections {
        Ok(pair) => pair,
        Err(e) => {
            template.error = Some(e);
            return render(template, StatusCode::BAD_REQUEST);
        }
    };

    let models = state
        .config
        .models
        .with_overrides(cypher_model.clone(), qa_model.clone());
    template.cypher_models = model_options(&models.cypher);
    template.qa_models = model_options(&models.qa);

    let question = match Question::new(&form.question) {
        Ok(q) => q,
        Err(e) => {
            template.error = Some(error_chain(&e));
            return render(template, status_for(&e));
        }
    };

    let workflow = match state.workflow(cypher_model, qa_model) {
        Ok(w) => w,
        Err(e) => {
            template.error = Some(format!("{:#}", e));
            return render(template, StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let result = if direct {
        workflow.handle_direct(question.as_str()).await
    } else {
        workflow.handle_query(question.as_str()).await
    };

    match result {
        Ok(answer) => {
            template.result = Some(ResultView::from_state(&answer));
            render(template, StatusCode::OK)
        }
        Err(e) => {
            warn!(error = %e, "Question failed");
            let status = status_for(&e);
            template.error = Some(error_chain(&e));
            render(template, status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_options_mark_selection() {
        let options = model_options(&ModelSelection::groq("gemma2-9b-it"));
        let selected: Vec<&str> = options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["groq:gemma2-9b-it"]);
    }

    #[test]
    fn test_model_options_keep_custom_selection() {
        let options = model_options(&ModelSelection::ollama("llama3:8b"));
        assert_eq!(options[0].value, "ollama:llama3:8b");
        assert!(options[0].selected);
        assert_eq!(options.len(), model_catalog().len() + 1);
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection(None).unwrap(), None);
        assert_eq!(parse_selection(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_selection(Some("ollama:codegemma:instruct")).unwrap(),
            Some(ModelSelection::ollama("codegemma:instruct"))
        );
        assert!(parse_selection(Some("openai:gpt-4")).is_err());
    }
}
