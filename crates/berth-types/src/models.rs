use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timestamp::serde_format;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
    #[serde(with = "serde_format")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serde_format")]
    pub updated_at: NaiveDateTime,
}

/// A user that has not been stored yet. The repository stamps both
/// timestamps when it inserts the row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "serde_format")]
    pub start_time: NaiveDateTime,
    #[serde(with = "serde_format")]
    pub end_time: NaiveDateTime,
    /// Empty when the booking has no comment.
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub comment: String,
}

impl Booking {
    /// End strictly after start.
    pub fn has_valid_window(&self) -> bool {
        self.end_time > self.start_time
    }
}

impl NewBooking {
    pub fn has_valid_window(&self) -> bool {
        self.end_time > self.start_time
    }
}

/// One page of bookings. `count` is the size of the whole table, not of `rows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingsPage {
    pub count: i64,
    pub rows: Vec<Booking>,
}
