//! Router tests with in-memory models and graph.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use jgq_core::schema::{NodeType, PropertyDef, RelType, RelationshipTriple};
use jgq_core::{
    AppConfig, ChatModel, GraphSchema, GraphStore, ModelSelection, OutputFormat, Record,
    RoleClients, RoleModels,
};
use jgq_web::{create_router, AppState, ClientFactory};

const CYPHER: &str = "MATCH (i:Interface) WHERE NOT (i)<-[:IMPLEMENTS]-(:Class) RETURN i.name";

struct FixedModel {
    selection: ModelSelection,
    response: String,
}

#[async_trait]
impl ChatModel for FixedModel {
    async fn complete(&self, _prompt: &str, _format: OutputFormat) -> anyhow::Result<String> {
        Ok(self.response.clone())
    }

    fn selection(&self) -> &ModelSelection {
        &self.selection
    }
}

struct StaticGraph;

#[async_trait]
impl GraphStore for StaticGraph {
    async fn schema(&self) -> anyhow::Result<GraphSchema> {
        Ok(schema())
    }

    async fn run_query(&self, _cypher: &str) -> anyhow::Result<Vec<Record>> {
        Ok(vec![json!({"i.name": "Repository"}).as_object().cloned().unwrap()])
    }
}

fn schema() -> GraphSchema {
    let node = |label: &str| NodeType {
        label: label.to_string(),
        properties: vec![PropertyDef {
            name: "name".to_string(),
            types: vec!["STRING".to_string()],
        }],
    };
    GraphSchema {
        nodes: vec![node("Class"), node("Interface")],
        relationships: vec![RelType {
            rel_type: "IMPLEMENTS".to_string(),
            properties: Vec::new(),
        }],
        triples: vec![RelationshipTriple::new("Class", "IMPLEMENTS", "Interface")],
    }
}

fn fixed(selection: &ModelSelection, response: &str) -> Arc<dyn ChatModel> {
    Arc::new(FixedModel {
        selection: selection.clone(),
        response: response.to_string(),
    })
}

fn app() -> (Router, Arc<Mutex<Vec<RoleModels>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let factory: ClientFactory = Arc::new(move |models: &RoleModels| -> anyhow::Result<RoleClients> {
        recorder.lock().unwrap().push(models.clone());
        Ok(RoleClients {
            router: fixed(&models.router, r#"{"source": "structure"}"#),
            refiner: fixed(
                &models.refiner,
                r#"{"refinement": "Which Interface nodes have no IMPLEMENTS relationship from a Class?"}"#,
            ),
            cypher: fixed(&models.cypher, CYPHER),
            qa: fixed(&models.qa, "Repository has no implementation."),
        })
    });

    let state = AppState::with_client_factory(
        Arc::new(AppConfig::default()),
        Arc::new(StaticGraph),
        schema(),
        factory,
    );
    (create_router(state), seen)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_models_lists_catalog_and_defaults() {
    let (app, _) = app();
    let resp = app.oneshot(get("/api/models")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["catalog"].as_array().unwrap().len(), 5);
    assert_eq!(body["catalog"][4]["value"], "ollama:codegemma:instruct");
    assert_eq!(body["defaults"]["cypher"], "groq:llama3-70b-8192");
}

#[tokio::test]
async fn test_schema_endpoint() {
    let (app, _) = app();
    let resp = app.oneshot(get("/api/schema")).await.unwrap();
    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();

    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("Node properties:"));
    assert!(text.contains("(:Class)-[:IMPLEMENTS]->(:Interface)"));
    assert_eq!(body["schema"]["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_api_ask_answers_structure_question() {
    let (app, _) = app();
    let resp = app
        .oneshot(post_json(
            "/api/ask",
            json!({"question": "What interfaces do not have an implementation"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["route"], "structure");
    assert_eq!(body["cypher_query"], CYPHER);
    assert_eq!(body["cypher_result"]["columns"], json!(["i.name"]));
    assert_eq!(body["cypher_result"]["rows"], json!([["Repository"]]));
    assert_eq!(body["final_answer"], "Repository has no implementation.");
    assert_eq!(body["trail"], json!(["route", "refine", "graph_search", "end"]));
}

#[tokio::test]
async fn test_api_ask_direct() {
    let (app, _) = app();
    let resp = app
        .oneshot(post_json(
            "/api/ask",
            json!({"question": "What interfaces do not have an implementation", "direct": true}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert!(body.get("route").is_none());
    assert_eq!(body["trail"], json!(["graph_search", "end"]));
}

#[tokio::test]
async fn test_api_ask_rejects_empty_question() {
    let (app, seen) = app();
    let resp = app
        .oneshot(post_json("/api/ask", json!({"question": "   "})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("empty"));
    assert!(seen.lock().unwrap().is_empty());
}

fn app_without_clients() -> Router {
    let factory: ClientFactory = Arc::new(|_: &RoleModels| -> anyhow::Result<RoleClients> {
        anyhow::bail!("GROQ_API_KEY is not set; it is required for Groq models")
    });
    let state = AppState::with_client_factory(
        Arc::new(AppConfig::default()),
        Arc::new(StaticGraph),
        schema(),
        factory,
    );
    create_router(state)
}

#[tokio::test]
async fn test_empty_question_checked_before_clients() {
    let resp = app_without_clients()
        .oneshot(post_json("/api/ask", json!({"question": " \n "})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_text(resp).await;
    assert!(body.contains("empty"));
    assert!(!body.contains("GROQ_API_KEY"));

    let resp = app_without_clients()
        .oneshot(post_form("/ask", "question=+++"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!body_text(resp).await.contains("GROQ_API_KEY"));
}

#[tokio::test]
async fn test_client_errors_still_surface_for_real_questions() {
    let resp = app_without_clients()
        .oneshot(post_json("/api/ask", json!({"question": "List all classes"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(resp).await.contains("GROQ_API_KEY"));
}

#[tokio::test]
async fn test_api_ask_applies_model_overrides() {
    let (app, seen) = app();
    let resp = app
        .oneshot(post_json(
            "/api/ask",
            json!({
                "question": "What interfaces do not have an implementation",
                "cypher_model": "groq:gemma2-9b-it",
                "qa_model": "ollama:codegemma:instruct"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].cypher, ModelSelection::groq("gemma2-9b-it"));
    assert_eq!(seen[0].qa, ModelSelection::ollama("codegemma:instruct"));
    assert_eq!(seen[0].router, ModelSelection::default());
}

#[tokio::test]
async fn test_index_page() {
    let (app, _) = app();
    let resp = app.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("Ask the Java code graph"));
    assert!(html.contains("Groq: mixtral-8x7b-32768"));
    assert!(html.contains(r#"value="groq:llama3-70b-8192" selected"#));
}

#[tokio::test]
async fn test_form_ask_renders_result() {
    let (app, _) = app();
    let resp = app
        .oneshot(post_form(
            "/ask",
            "question=What+interfaces+do+not+have+an+implementation&cypher_model=groq%3Agemma2-9b-it&qa_model=groq%3Allama3-70b-8192",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("Refined question"));
    assert!(html.contains("Cypher query"));
    assert!(html.contains("<td>Repository</td>"));
    assert!(html.contains("Repository has no implementation."));
    assert!(html.contains(r#"value="groq:gemma2-9b-it" selected"#));
}

#[tokio::test]
async fn test_form_ask_rejects_unknown_provider() {
    let (app, seen) = app();
    let resp = app
        .oneshot(post_form("/ask", "question=anything&cypher_model=openai%3Agpt-4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Unknown provider"));
    assert!(seen.lock().unwrap().is_empty());
}
