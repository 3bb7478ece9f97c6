use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::debug;

use super::model::{Todo, TodoInput};
use super::store::TodoStore;
use crate::error::{ApiError, ApiResult};

fn not_found() -> ApiError {
    ApiError::NotFound("Todo not found".into())
}

pub fn router<S>() -> Router<S>
where
    TodoStore: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(welcome))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route("/todos/:id", get(get_todo).put(update_todo).delete(delete_todo))
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Todo List API" }))
}

async fn list_todos(State(store): State<TodoStore>) -> Json<Vec<Todo>> {
    Json(store.list().await)
}

async fn create_todo(
    State(store): State<TodoStore>,
    Json(input): Json<TodoInput>,
) -> (StatusCode, Json<Todo>) {
    let todo = store.create(input).await;
    debug!("todo created id={}", todo.id);
    (StatusCode::CREATED, Json(todo))
}

async fn get_todo(State(store): State<TodoStore>, Path(id): Path<String>) -> ApiResult<Json<Todo>> {
    store.get(&id).await.map(Json).ok_or_else(not_found)
}

async fn update_todo(
    State(store): State<TodoStore>,
    Path(id): Path<String>,
    Json(input): Json<TodoInput>,
) -> ApiResult<Json<Todo>> {
    store.update(&id, input).await.map(Json).ok_or_else(not_found)
}

async fn delete_todo(State(store): State<TodoStore>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    if store.delete(&id).await {
        debug!("todo deleted id={}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router().with_state(TodoStore::new())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_welcome() {
        let (status, body) = send(&app(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Welcome to the Todo List API" }));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let app = app();
        let (status, created) = send(
            &app,
            "POST",
            "/todos/",
            Some(json!({ "title": "Buy groceries", "description": "Milk, eggs, bread" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Buy groceries");
        assert_eq!(created["completed"], false);

        let id = created["id"].as_str().unwrap();
        let (status, fetched) = send(&app, "GET", &format!("/todos/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_list_both_forms_in_order() {
        let app = app();
        send(&app, "POST", "/todos", Some(json!({ "title": "first" }))).await;
        send(&app, "POST", "/todos/", Some(json!({ "title": "second", "completed": true }))).await;

        for uri in ["/todos", "/todos/"] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::OK);
            let titles: Vec<&str> = body
                .as_array()
                .unwrap()
                .iter()
                .map(|t| t["title"].as_str().unwrap())
                .collect();
            assert_eq!(titles, vec!["first", "second"]);
        }
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let app = app();
        let (_, created) = send(
            &app,
            "POST",
            "/todos/",
            Some(json!({ "title": "Walk", "description": "30 min" })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/todos/{id}"),
            Some(json!({ "title": "Walk the dog", "completed": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["title"], "Walk the dog");
        assert_eq!(updated["description"], Value::Null);
        assert_eq!(updated["completed"], true);
    }

    #[tokio::test]
    async fn test_delete_then_404() {
        let app = app();
        let (_, created) = send(&app, "POST", "/todos/", Some(json!({ "title": "tmp" }))).await;
        let uri = format!("/todos/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Todo not found");

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PUT", &uri, Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let app = app();
        let (status, _) = send(&app, "POST", "/todos/", Some(json!({ "description": "no title" }))).await;
        assert!(status.is_client_error());

        let req = Request::post("/todos/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
    }
}
