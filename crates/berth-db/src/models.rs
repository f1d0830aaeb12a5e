//! Database row types. These map directly to SQLite rows, with timestamps
//! still in their stored text form; conversion into `berth-types` entities
//! parses them.

use berth_types::models::{Booking, User};
use berth_types::timestamp;
use chrono::NaiveDateTime;
use rusqlite::Row;

use crate::RepoError;

pub const USER_COLUMNS: &str = "id, username, password, created_at, updated_at";
pub const BOOKING_COLUMNS: &str = "id, user_id, start_time, end_time, comment";

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct BookingRow {
    pub id: i64,
    pub user_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub comment: Option<String>,
}

impl UserRow {
    /// Expects the column order of [`USER_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl BookingRow {
    /// Expects the column order of [`BOOKING_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            comment: row.get(4)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: parse_column("created_at", &row.created_at)?,
            updated_at: parse_column("updated_at", &row.updated_at)?,
            id: row.id,
            username: row.username,
            password: row.password,
        })
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            start_time: parse_column("start_time", &row.start_time)?,
            end_time: parse_column("end_time", &row.end_time)?,
            id: row.id,
            user_id: row.user_id,
            comment: row.comment.unwrap_or_default(),
        })
    }
}

fn parse_column(column: &'static str, value: &str) -> Result<NaiveDateTime, RepoError> {
    timestamp::parse(value).map_err(|_| RepoError::CorruptRow {
        column,
        value: value.to_string(),
    })
}
