use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

use berth_types::api::{
    CreateBookingForm, ListBookingsQuery, MessageResponse, UpdateBookingForm, non_empty,
};
use berth_types::models::NewBooking;
use berth_types::timestamp;
use berth_validate::{check_time_order, validate_comment};

use crate::ApiError;
use crate::error::parse_int;
use crate::extract::FormBody;
use crate::state::{AppState, db_call};

/// POST /api/booking
pub async fn create_booking(
    State(state): State<AppState>,
    FormBody(form): FormBody<CreateBookingForm>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_user_id = non_empty(form.user_id.as_deref())
        .ok_or_else(|| ApiError::bad_request("user_id isn`t set"))?;
    let user_id = parse_int("user_id", raw_user_id)?;

    let (start_time, end_time) = check_time_order(&form.start_time, &form.end_time)?;
    validate_comment(&form.comment)?;

    if !db_call(&state, move |db| db.user_exists(user_id)).await? {
        return Err(ApiError::bad_request("user with this user_id doesn't exist"));
    }

    let new_booking = NewBooking {
        user_id,
        start_time,
        end_time,
        comment: form.comment,
    };
    let booking = db_call(&state, move |db| {
        let id = db.create_booking(&new_booking)?;
        db.get_booking(id)
    })
    .await?
    .ok_or_else(|| ApiError::internal("booking missing right after insert"))?;

    Ok(Json(booking))
}

/// GET /api/booking?limit=&page=&offset=
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = db_call(&state, move |db| {
        db.list_bookings(
            query.limit.as_deref(),
            query.page.as_deref(),
            query.offset.as_deref(),
        )
    })
    .await?;

    Ok(Json(page))
}

/// GET /api/booking/{id}. An unknown id answers `{}`.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_int("id", &raw_id)?;

    Ok(match db_call(&state, move |db| db.get_booking(id)).await? {
        Some(booking) => Json(booking).into_response(),
        None => Json(json!({})).into_response(),
    })
}

/// PUT /api/booking/{id}
///
/// Blank `start_time`/`end_time` keep the stored values; the resulting window
/// is checked as a whole. `comment` always replaces the stored one.
pub async fn update_booking(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    FormBody(form): FormBody<UpdateBookingForm>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_int("id", &raw_id)?;

    let Some(mut booking) = db_call(&state, move |db| db.get_booking(id)).await? else {
        return Err(ApiError::bad_request("booking wasn't found"));
    };

    let start = non_empty(form.start_time.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| timestamp::format(&booking.start_time));
    let end = non_empty(form.end_time.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| timestamp::format(&booking.end_time));
    let (start_time, end_time) = check_time_order(&start, &end)?;
    validate_comment(&form.comment)?;

    booking.start_time = start_time;
    booking.end_time = end_time;
    booking.comment = form.comment;

    let booking = db_call(&state, move |db| db.update_booking(&booking)).await?;
    info!("Updated booking {}", booking.id);
    Ok(Json(booking))
}

/// DELETE /api/booking/{id}
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_int("id", &raw_id)?;
    db_call(&state, move |db| db.delete_booking(id)).await?;

    Ok(Json(MessageResponse {
        message: "booking was successfully deleted".to_string(),
    }))
}
