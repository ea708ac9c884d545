use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::net::TcpListener;
use crate::core::{DataResponse, ListResponse, MessageResponse, NewTodo, Todo, TodoError};
use crate::storage::TodoStorage;

#[cfg(feature = "tracing")]
use tracing::{info, instrument, warn};
#[cfg(feature = "tracing")]
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub database_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3333".to_string(),
            database_path: "database.db".to_string(),
        }
    }
}

pub struct HttpServer<S: TodoStorage + 'static> {
    storage: Arc<S>,
}

impl<S: TodoStorage + 'static> HttpServer<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn router(&self) -> Router {
        let router = routes::<S>().with_state(self.storage.clone());
        #[cfg(feature = "tracing")]
        let router = router.layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        ));
        router
    }

    pub async fn serve(&self, addr: &str) -> Result<(), TodoError> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_listener(listener).await
    }

    pub async fn serve_with_listener(&self, listener: TcpListener) -> Result<(), TodoError> {
        #[cfg(feature = "tracing")]
        info!(addr = ?listener.local_addr().ok(), "HTTP server started");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// The route table. Every handler shares the storage handle through state.
pub fn routes<S: TodoStorage + 'static>() -> Router<Arc<S>> {
    Router::new()
        .route("/todos", post(create_todo::<S>).get(list_todos::<S>))
        .route(
            "/todos/{id}",
            get(get_todo::<S>)
                .put(toggle_todo::<S>)
                .delete(delete_todo::<S>),
        )
}

/// Reads a todo id from its path segment. Anything that is not a plain run of
/// ASCII digits fitting in an `i64` cannot name a row.
pub fn parse_todo_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg_attr(feature = "tracing", instrument(skip_all))]
async fn create_todo<S: TodoStorage + 'static>(
    State(storage): State<Arc<S>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<DataResponse<Todo>>), TodoError> {
    // Content-Type is not checked; any body that parses is accepted.
    let body = body.map_err(|rejection| TodoError::InvalidBody(rejection.body_text()))?;
    let new_todo: NewTodo =
        serde_json::from_slice(&body).map_err(|e| TodoError::InvalidBody(e.to_string()))?;
    let todo = storage
        .insert_todo(&new_todo)
        .await
        .map_err(TodoError::CreateFailed)?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(todo, "Todo item added successfully")),
    ))
}

#[cfg_attr(feature = "tracing", instrument(skip_all))]
async fn list_todos<S: TodoStorage + 'static>(
    State(storage): State<Arc<S>>,
) -> Result<Json<ListResponse<Todo>>, TodoError> {
    let todos = storage.list_todos().await.map_err(TodoError::ListFailed)?;
    Ok(Json(ListResponse::from(todos)))
}

#[cfg_attr(feature = "tracing", instrument(skip_all))]
async fn get_todo<S: TodoStorage + 'static>(
    State(storage): State<Arc<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DataResponse<Todo>>, TodoError> {
    let todo = find_todo(storage.as_ref(), path_id(id)).await?;
    Ok(Json(DataResponse::new(todo)))
}

/// `PUT /todos/{id}` flips `done` and nothing else. The request body is never read.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
async fn toggle_todo<S: TodoStorage + 'static>(
    State(storage): State<Arc<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DataResponse<Todo>>, TodoError> {
    let mut todo = find_todo(storage.as_ref(), path_id(id)).await?;
    todo.toggle();
    let todo = storage
        .update_todo(&todo)
        .await
        .map_err(TodoError::UpdateFailed)?;
    Ok(Json(DataResponse::with_message(
        todo,
        "Todo item updated successfully",
    )))
}

#[cfg_attr(feature = "tracing", instrument(skip_all))]
async fn delete_todo<S: TodoStorage + 'static>(
    State(storage): State<Arc<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, TodoError> {
    // An id that cannot name a row deletes nothing, which is still a success.
    if let Some(id) = path_id(id) {
        storage
            .delete_todo(id)
            .await
            .map_err(TodoError::DeleteFailed)?;
    }
    Ok(Json(MessageResponse::new("Todo item deleted successfully")))
}

/// A segment axum cannot decode (invalid UTF-8, say) names no row, same as
/// one that is not a number.
fn path_id(id: Result<Path<String>, PathRejection>) -> Option<i64> {
    id.ok().and_then(|Path(raw)| parse_todo_id(&raw))
}

/// Lookup shared by get and toggle. Any failure, storage errors included,
/// answers as not found.
async fn find_todo<S: TodoStorage>(storage: &S, id: Option<i64>) -> Result<Todo, TodoError> {
    let id = id.ok_or(TodoError::NotFound)?;
    match storage.get_todo(id).await {
        Ok(Some(todo)) => Ok(todo),
        Ok(None) => Err(TodoError::NotFound),
        Err(_e) => {
            #[cfg(feature = "tracing")]
            warn!(id = id, error = %_e, "Todo lookup failed");
            Err(TodoError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_digits() {
        assert_eq!(parse_todo_id("1"), Some(1));
        assert_eq!(parse_todo_id("000042"), Some(42));
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["", "abc", "-1", "+1", " 1", "1.0", "1; DROP TABLE todos", "99999999999999999999"] {
            assert_eq!(parse_todo_id(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn default_config_listens_on_fixed_address() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "0.0.0.0:3333");
        assert_eq!(config.database_path, "database.db");
    }
}
