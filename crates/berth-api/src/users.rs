use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

use berth_types::api::{CreateUserForm, MessageResponse, UpdateUserForm, non_empty};
use berth_types::models::NewUser;
use berth_validate::{hash_password, validate_password, validate_username};

use crate::ApiError;
use crate::error::parse_int;
use crate::extract::FormBody;
use crate::state::{AppState, db_call, run_blocking};

/// POST /api/user
pub async fn create_user(
    State(state): State<AppState>,
    FormBody(form): FormBody<CreateUserForm>,
) -> Result<impl IntoResponse, ApiError> {
    validate_username(&form.username)?;
    validate_password(&form.password)?;

    // Advisory only: the UNIQUE constraint still decides under a race.
    let username = form.username.clone();
    if db_call(&state, move |db| db.username_exists(&username)).await? {
        return Err(ApiError::bad_request("username already exists"));
    }

    let password_hash = run_blocking(move || Ok(hash_password(&form.password)?)).await?;
    let new_user = NewUser {
        username: form.username,
        password_hash,
    };

    let user = db_call(&state, move |db| {
        let id = db.create_user(&new_user)?;
        db.get_user(id)
    })
    .await?
    .ok_or_else(|| ApiError::internal("user missing right after insert"))?;

    Ok(Json(user))
}

/// GET /api/user/{id}. An unknown id answers `{}`.
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_int("id", &raw_id)?;

    Ok(match db_call(&state, move |db| db.get_user(id)).await? {
        Some(user) => Json(user).into_response(),
        None => Json(json!({})).into_response(),
    })
}

/// PUT /api/user/{id}. Blank fields leave the stored value alone.
pub async fn update_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    FormBody(form): FormBody<UpdateUserForm>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_int("id", &raw_id)?;

    let Some(mut user) = db_call(&state, move |db| db.get_user(id)).await? else {
        return Err(ApiError::bad_request("user wasn't found"));
    };

    if let Some(username) = non_empty(form.username.as_deref()) {
        validate_username(username)?;
        if username != user.username {
            let candidate = username.to_string();
            if db_call(&state, move |db| db.username_exists(&candidate)).await? {
                return Err(ApiError::bad_request("username already exists"));
            }
        }
        user.username = username.to_string();
    }

    if let Some(password) = non_empty(form.password.as_deref()) {
        validate_password(password)?;
        let password = password.to_string();
        user.password = run_blocking(move || Ok(hash_password(&password)?)).await?;
    }

    let user = db_call(&state, move |db| db.update_user(&user)).await?;
    info!("Updated user {}", user.id);
    Ok(Json(user))
}

/// DELETE /api/user/{id}. Also removes the user's bookings.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_int("id", &raw_id)?;
    db_call(&state, move |db| db.delete_user(id)).await?;

    Ok(Json(MessageResponse {
        message: "user was successfully deleted".to_string(),
    }))
}
