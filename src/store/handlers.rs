use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{NewNotification, NewTask, TaskUpdate};
use super::repo_types::{CompletedPayment, Notification, Task};
use crate::{
    auth::extractors::Authorized,
    error::AppError,
    guard::{AnyUser, Authors},
    state::AppState,
    validation::Validator,
};

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications).post(create_notification))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/:id/read", post(mark_read))
}

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", patch(update_task).delete(delete_task))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/payments/completed", get(completed_payments))
}

#[instrument(skip(state, auth))]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
) -> Result<Json<Value>, AppError> {
    let items = state.store.notifications(&auth.user.id).await?;
    let unread = items.iter().filter(|n| !n.is_read).count();
    Ok(Json(json!({ "unread": unread, "items": items })))
}

#[instrument(skip(state, auth, payload))]
pub async fn create_notification(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
    Json(payload): Json<NewNotification>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    Validator::new().required("message", &payload.message).finish()?;
    let notification = state.store.push_notification(&auth.user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[instrument(skip(state, auth))]
pub async fn mark_read(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.mark_notification_read(&auth.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[instrument(skip(state, auth))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
) -> Result<Json<Value>, AppError> {
    let updated = state.store.mark_all_notifications_read(&auth.user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

#[instrument(skip(state, auth))]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.store.tasks(&auth.user.id).await?))
}

#[instrument(skip(state, auth, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
    Json(payload): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    Validator::new()
        .required("description", &payload.description)
        .finish()?;
    let task = state.store.add_task(&auth.user.id, payload).await?;
    info!(user_id = %auth.user.id, task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, auth, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    if let Some(description) = &payload.description {
        Validator::new().required("description", description).finish()?;
    }
    state
        .store
        .update_task(&auth.user.id, id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

#[instrument(skip(state, auth))]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_task(&auth.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[instrument(skip(state, auth))]
pub async fn completed_payments(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
) -> Result<Json<Vec<CompletedPayment>>, AppError> {
    Ok(Json(state.store.completed_payments(&auth.user.id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::backend::dto::Role;
    use crate::testing::{logged_in, request, send, user_with_role};

    #[tokio::test]
    async fn task_lifecycle_for_author() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), user_with_role(Role::Client)).await;
        let app = super::super::router().with_state(state);

        let (status, created) = send(
            app.clone(),
            request(
                Method::POST,
                "/tasks",
                Some(&token),
                Some(json!({ "description": "Send final PDF", "dueDate": "2026-11-02" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["dueDate"], "2026-11-02");
        assert_eq!(created["isCompleted"], false);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            app.clone(),
            request(
                Method::PATCH,
                &format!("/tasks/{id}"),
                Some(&token),
                Some(json!({ "isCompleted": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["isCompleted"], true);

        let (status, _) = send(app.clone(), request(Method::DELETE, &format!("/tasks/{id}"), Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(app, request(Method::DELETE, &format!("/tasks/{id}"), Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tasks_are_author_only() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), user_with_role(Role::Accountant)).await;
        let app = super::super::router().with_state(state);

        let (status, body) = send(app, request(Method::GET, "/tasks", Some(&token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["redirect"], "/dashboard");
    }

    #[tokio::test]
    async fn notifications_report_unread_count() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), user_with_role(Role::Admin)).await;
        let app = super::super::router().with_state(state);

        let (status, _) = send(
            app.clone(),
            request(
                Method::POST,
                "/notifications",
                Some(&token),
                Some(json!({ "type": "success", "message": "Article accepted", "link": "/my-articles/3" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(app.clone(), request(Method::GET, "/notifications", Some(&token), None)).await;
        assert_eq!(body["unread"], 1);
        assert_eq!(body["items"][0]["type"], "success");

        let (_, body) = send(app.clone(), request(Method::POST, "/notifications/read-all", Some(&token), None)).await;
        assert_eq!(body["updated"], 1);
        let (_, body) = send(app, request(Method::GET, "/notifications", Some(&token), None)).await;
        assert_eq!(body["unread"], 0);
    }
}
