// src/routes/users.rs
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::{
    error::AppError,
    services::users::{User, UserInput},
    state::SharedState,
};

pub async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list().await?))
}

pub async fn create_user(
    State(state): State<SharedState>,
    input: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(input) = input?;
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<SharedState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.users.get(id).await?))
}

pub async fn update_user(
    State(state): State<SharedState>,
    id: Result<Path<u64>, PathRejection>,
    input: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    let Json(input) = input?;
    Ok(Json(state.users.update(id, input).await?))
}

pub async fn delete_user(
    State(state): State<SharedState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
