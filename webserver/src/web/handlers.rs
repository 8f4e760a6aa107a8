//! Request handlers
//!
//! GET lists the selected tests and renders a link to execute them; POST
//! runs them. Both parse the subpath into a selector and pick the renderer
//! from the extension. An empty selection answers 404 so scripted callers
//! can tell "no such tests" from a failed run.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use tracing::{debug, info};

use bridge::BridgeError;

use crate::state::AppState;
use crate::traits::Renderer;
use crate::types::RequestParser;

const PAGE_TITLE: &str = "Test bridge";

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ready": state.coordinator.readiness().is_ready(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_root(State(state): State<AppState>) -> Response {
    list(state, "").await
}

pub async fn list_tests(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    list(state, &path).await
}

pub async fn run_root(State(state): State<AppState>) -> Response {
    run(state, "").await
}

pub async fn run_tests(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    run(state, &path).await
}

async fn list(state: AppState, path: &str) -> Response {
    let request = RequestParser::parse(path);
    let Some(renderer) = state.renderers.renderer_for(&request) else {
        return no_renderer(&request);
    };
    debug!("GET request: {}", request);

    let names = state.coordinator.get_test_names(Some(&request));
    if names.is_empty() {
        let msg = format!(
            "WARNING: no test classes found for {}, check the requirements \
             of the active tests providers for how to supply tests.",
            request
        );
        return (StatusCode::NOT_FOUND, msg).into_response();
    }

    renderer.setup(PAGE_TITLE);
    renderer.info("info", &format!("Test selector: {}", request));
    state.coordinator.list_tests(&names, renderer.as_reporter());
    renderer.link("Execute these tests", &request.execution_path(), "POST");
    rendered(renderer.as_ref())
}

async fn run(state: AppState, path: &str) -> Response {
    let request = RequestParser::parse(path);
    let Some(renderer) = state.renderers.renderer_for(&request) else {
        return no_renderer(&request);
    };
    info!("POST request, executing tests: {}", request);

    renderer.setup(PAGE_TITLE);
    let outcome = state
        .coordinator
        .execute_tests(renderer.as_reporter(), Some(&request))
        .await;
    match outcome {
        Ok(()) => rendered(renderer.as_ref()),
        Err(BridgeError::NoTestCasesFound) => {
            (StatusCode::NOT_FOUND, format!("No tests found for {}", request)).into_response()
        }
        Err(e @ BridgeError::MethodSelectorAmbiguous { .. }) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

fn rendered(renderer: &dyn Renderer) -> Response {
    (
        [(header::CONTENT_TYPE, renderer.content_type())],
        renderer.finish(),
    )
        .into_response()
}

fn no_renderer(request: &RequestParser) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("No renderer found for {}", request),
    )
        .into_response()
}
