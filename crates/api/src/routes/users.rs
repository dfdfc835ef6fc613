//! User administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Role, UserId};
use domain::UserInput;
use serde::{Deserialize, Serialize};
use storage::{Store, User};

use super::AppState;
use super::extract::{AdminUser, Payload, parse_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub is_admin: bool,
}

#[derive(Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            is_admin: user.role.is_admin(),
            user,
        }
    }
}

#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub user: UserResponse,
    pub api_token: String,
}

fn role_for(is_admin: bool) -> Role {
    if is_admin { Role::Admin } else { Role::User }
}

/// GET /api/users — admin only.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list(&actor).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users — admin only; the response carries the new user's token.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Payload(req): Payload<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), ApiError> {
    let issued = state
        .users
        .create(
            &actor,
            UserInput {
                name: req.name,
                email: req.email,
                role: role_for(req.is_admin),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            user: issued.user.into(),
            api_token: issued.api_token,
        }),
    ))
}

/// PUT /api/users/{id} — admin only; toggles the admin role.
#[tracing::instrument(skip(state))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Path(id): Path<String>,
    Payload(req): Payload<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id: UserId = parse_id(&id, "User")?;
    let user = state
        .users
        .set_role(&actor, id, role_for(req.is_admin))
        .await?;
    Ok(Json(user.into()))
}
