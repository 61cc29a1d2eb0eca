use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{field, instrument, Span};

use crate::{
    error::ServiceResult,
    state::AppState,
    users::{
        dto::{CreateUser, UpdateUser},
        repo_types::SafeUser,
        services::UserAccountService,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(users, payload), fields(username = field::Empty))]
pub async fn create_user(
    State(users): State<UserAccountService>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<SafeUser>)> {
    let Json(payload) = payload?;
    Span::current().record("username", payload.username.as_str());
    payload.validate()?;
    let user = users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(users))]
pub async fn list_users(
    State(users): State<UserAccountService>,
) -> ServiceResult<Json<Vec<SafeUser>>> {
    Ok(Json(users.find_all().await?))
}

#[instrument(skip(users))]
pub async fn get_user(
    State(users): State<UserAccountService>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<SafeUser>> {
    Ok(Json(users.find_one(id).await?))
}

#[instrument(skip(users, payload))]
pub async fn update_user(
    State(users): State<UserAccountService>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ServiceResult<Json<SafeUser>> {
    let Json(payload) = payload?;
    payload.validate()?;
    Ok(Json(users.update(id, payload).await?))
}

#[instrument(skip(users))]
pub async fn delete_user(
    State(users): State<UserAccountService>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<SafeUser>> {
    Ok(Json(users.remove(id).await?))
}
