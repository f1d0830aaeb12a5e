use serde::{Deserialize, Serialize};

// Request bodies arrive as HTML forms. Fields are kept as raw strings so the
// handlers can tell "absent" from "empty" the same way for every field and
// report parse failures with their own messages. Unknown fields are ignored.

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Both fields optional; an empty value means "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

// -- Bookings --

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingForm {
    pub user_id: Option<String>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub comment: String,
}

/// `start_time`/`end_time` override the stored values when non-empty.
/// `comment` always replaces the stored comment.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingForm {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub offset: Option<String>,
}

// -- Responses --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Treat `Some("")` like `None`; forms send empty strings for blank inputs.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
