use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ReorderInput, Task, TaskInput, TaskPatch},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, done, position, user_id, created_at, updated_at";

/// Retrieves the authenticated user's tasks, ordered ascending by position.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY position"
    ))
    .bind(user.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// `done` defaults to false. When `position` is omitted, the task is appended
/// after the owner's current highest position (0 for an empty list).
///
/// ## Request Body:
/// - `title`: The title of the task (required, 1-200 chars).
/// - `description` (optional): A description of the task.
/// - `done` (optional): Completion flag.
/// - `position` (optional): Rank within the owner's list.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `400 Bad Request`: If input validation fails.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let position = match task_data.position {
        Some(position) => position,
        None => {
            sqlx::query_scalar::<_, i32>(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE user_id = $1",
            )
            .bind(user.0)
            .fetch_one(&**pool)
            .await?
        }
    };

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, done, position, user_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_data.done.unwrap_or(false))
    .bind(position)
    .bind(user.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Applies a partial update to a task owned by the authenticated user.
///
/// Only fields present in the body change; absent fields keep their stored
/// values, and empty-string title/description are treated as absent.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If no task matches the id for this user.
/// - `500 Internal Server Error`: For database errors.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    let task_id = task_id.into_inner();

    let mut task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
    ))
    .bind(task_id)
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    task.apply_patch(&patch);

    let updated = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = $1, description = $2, done = $3, position = $4, updated_at = now()
         WHERE id = $5 AND user_id = $6
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.done)
    .bind(task.position)
    .bind(task_id)
    .bind(user.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted"}` on success.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If no task matches the id for this user.
/// - `500 Internal Server Error`: For database errors.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted"
    })))
}

/// Atomically rewrites the positions of the authenticated user's tasks to
/// match the submitted id order (0-based).
///
/// The list must be the owner's complete task set: duplicates or a length
/// mismatch are rejected before any write. All position updates happen inside
/// one transaction; if any id does not resolve to a task owned by the caller,
/// the whole transaction rolls back and nothing changes. The row locks taken
/// by the updates keep concurrent reorders for the same owner from
/// interleaving.
///
/// ## Request Body:
/// - `taskIds`: every task id owned by the caller, in the desired order.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Tasks reordered successfully"}`.
/// - `400 Bad Request`: Duplicate ids, or the list does not cover all tasks.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If any id is not a task owned by the caller.
/// - `500 Internal Server Error`: For database or transaction errors.
#[post("/reorder")]
pub async fn reorder_tasks(
    pool: web::Data<PgPool>,
    input: web::Json<ReorderInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_ids = &input.task_ids;

    let mut seen = HashSet::with_capacity(task_ids.len());
    if !task_ids.iter().all(|id| seen.insert(id)) {
        return Err(AppError::ValidationError(
            "Duplicate task id in reorder list".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let owned_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
        .bind(user.0)
        .fetch_one(&mut *tx)
        .await?;

    if owned_count != task_ids.len() as i64 {
        return Err(AppError::ValidationError(
            "Reorder list must include every task".into(),
        ));
    }

    // Update positions for each task; any miss aborts the whole batch.
    for (position, task_id) in task_ids.iter().enumerate() {
        let result =
            sqlx::query("UPDATE tasks SET position = $1, updated_at = now() WHERE id = $2 AND user_id = $3")
                .bind(position as i32)
                .bind(task_id)
                .bind(user.0)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound("Task not found".into()));
        }
    }

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tasks reordered successfully"
    })))
}
