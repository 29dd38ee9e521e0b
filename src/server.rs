//! HTTP transport: a single route dispatching on method and an `action`
//! query parameter, mirroring the single-handler-function shape of the
//! system this crate ports rather than a REST-style per-resource router.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query as AxumQuery, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::engine::{Document, Field, Query as EngineQuery};
use crate::error::HttpError;
use crate::manager::CollectionManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<CollectionManager>,
    pub auth_token: Arc<String>,
}

/// Builds the router: one route, CORS and gzip compression as layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handle))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct Params {
    collection: Option<String>,
    query: Option<String>,
    partial: Option<String>,
    count: Option<String>,
    page: Option<String>,
    fields: Option<String>,
    action: Option<String>,
    docid: Option<String>,
    authtoken: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    id: String,
    #[serde(default)]
    fields: HashMap<String, String>,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    msg: String,
}

#[derive(Serialize)]
struct SuccessBody {
    success: bool,
    msg: String,
}

async fn handle(
    State(state): State<AppState>,
    method: Method,
    AxumQuery(params): AxumQuery<Params>,
    body: Bytes,
) -> Response {
    if method == Method::GET {
        return query_handler(&state, &params).await;
    }

    if method != Method::POST {
        return error_response(HttpError::UnsupportedMethod);
    }

    if !state.auth_token.is_empty() {
        let provided = params.authtoken.as_deref().unwrap_or("");
        if provided != state.auth_token.as_str() {
            return error_response(HttpError::InvalidAuthToken);
        }
    }

    match params.action.as_deref() {
        Some("create") => create_handler(&state, &params).await,
        Some("destroy") => destroy_handler(&state, &params).await,
        Some("index") => index_handler(&state, &params, body).await,
        Some("remove") => remove_handler(&state, &params).await,
        _ => error_response(HttpError::UnknownAction),
    }
}

async fn create_handler(state: &AppState, params: &Params) -> Response {
    let Some(collection) = non_empty(&params.collection) else {
        return error_response(HttpError::MissingCollection);
    };

    if state.manager.exists(collection).await {
        return error_response(HttpError::CollectionExists);
    }

    match state.manager.create(collection).await {
        Ok(_) => success_response("collection created"),
        Err(e) => internal_error_response(e),
    }
}

async fn destroy_handler(state: &AppState, params: &Params) -> Response {
    let Some(collection) = non_empty(&params.collection) else {
        return error_response(HttpError::MissingCollection);
    };

    if !state.manager.exists(collection).await {
        return error_response(HttpError::CollectionMissing);
    }

    match state.manager.destroy(collection).await {
        Ok(()) => success_response("collection destroyed"),
        Err(e) => internal_error_response(e),
    }
}

async fn index_handler(state: &AppState, params: &Params, body: Bytes) -> Response {
    let Some(collection) = non_empty(&params.collection) else {
        return error_response(HttpError::MissingCollection);
    };

    if !state.manager.exists(collection).await {
        return error_response(HttpError::CollectionMissing);
    }

    if body.is_empty() {
        return error_response(HttpError::EmptyBody);
    }

    let wire: WireDocument = match serde_json::from_slice(&body) {
        Ok(w) => w,
        Err(_) => return error_response(HttpError::InvalidJson),
    };

    if wire.id.is_empty() {
        let body = String::from_utf8_lossy(&body).into_owned();
        return error_response(HttpError::MissingId { body });
    }
    if wire.fields.is_empty() {
        return error_response(HttpError::EmptyFields);
    }

    let mut doc = Document::new(wire.id);
    for (name, value) in wire.fields {
        doc.fields.insert(name, Field::new(value));
    }

    match state.manager.index(collection, doc).await {
        Ok(()) => success_response("Success, document indexed"),
        Err(e) => internal_error_response(e),
    }
}

async fn remove_handler(state: &AppState, params: &Params) -> Response {
    let Some(collection) = non_empty(&params.collection) else {
        return error_response(HttpError::MissingCollection);
    };

    if !state.manager.exists(collection).await {
        return error_response(HttpError::CollectionMissing);
    }

    let Some(docid) = non_empty(&params.docid) else {
        return error_response(HttpError::MissingDocId);
    };

    match state.manager.remove(collection, docid).await {
        Ok(()) => success_response("Document removed"),
        Err(e) => internal_error_response(e),
    }
}

async fn query_handler(state: &AppState, params: &Params) -> Response {
    let Some(collection) = non_empty(&params.collection) else {
        return error_response(HttpError::MissingCollection);
    };

    if !state.manager.exists(collection).await {
        return error_response(HttpError::CollectionMissingForQuery);
    }

    let terms = params.query.clone().unwrap_or_default();
    let partial_match = params.partial.as_deref() == Some("1");
    let page_size = params
        .count
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(crate::engine::DEFAULT_PAGE_SIZE);
    let page = params
        .page
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let return_fields = params.fields.clone().unwrap_or_default();

    let query = EngineQuery {
        terms,
        return_fields,
        page_size,
        page,
        partial_match,
    };

    let result = state.manager.query(collection, query).await;
    with_expires((StatusCode::OK, Json(result)).into_response())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn error_response(err: HttpError) -> Response {
    let body = ErrorBody {
        success: false,
        msg: err.to_string(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn internal_error_response(err: anyhow::Error) -> Response {
    error!(error = %err, "request failed");
    let body = ErrorBody {
        success: false,
        msg: err.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn success_response(msg: &str) -> Response {
    info!(msg, "request succeeded");
    let body = SuccessBody {
        success: true,
        msg: msg.to_string(),
    };
    with_expires((StatusCode::OK, Json(body)).into_response())
}

fn with_expires(mut response: Response) -> Response {
    let expires = (Utc::now() + Duration::minutes(30)).to_rfc2822();
    if let Ok(value) = HeaderValue::from_str(&expires) {
        response.headers_mut().insert(header::EXPIRES, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            manager: Arc::new(CollectionManager::new()),
            auth_token: Arc::new(String::new()),
        }
    }

    #[tokio::test]
    async fn post_without_action_is_bad_request() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/?collection=docs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        check!(response.status() == StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_on_unknown_collection_is_bad_request() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/?collection=nope&query=dog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        check!(response.status() == StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_then_index_then_query_round_trips() {
        let state = test_state();
        let app = router(state.clone());

        let create = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/?action=create&collection=docs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        check!(create.status() == StatusCode::OK);

        let index = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/?action=index&collection=docs")
                    .body(Body::from(r#"{"id":"1","fields":{"title":"dog fish cat"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        check!(index.status() == StatusCode::OK);

        let query = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/?collection=docs&query=dog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        check!(query.status() == StatusCode::OK);
    }

    #[tokio::test]
    async fn mismatched_auth_token_is_bad_request() {
        let state = AppState {
            manager: Arc::new(CollectionManager::new()),
            auth_token: Arc::new("secret".to_string()),
        };
        let app = router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/?action=create&collection=docs&authtoken=wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        check!(response.status() == StatusCode::BAD_REQUEST);
    }
}
