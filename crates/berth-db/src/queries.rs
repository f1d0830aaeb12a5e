use berth_types::models::{Booking, BookingsPage, NewBooking, NewUser, User};
use berth_types::timestamp;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

use crate::error::is_unique_violation;
use crate::models::{BOOKING_COLUMNS, BookingRow, USER_COLUMNS, UserRow};
use crate::{Database, Pagination, RepoError};

impl Database {
    // -- Users --

    /// Insert a user and return its id. Both timestamps get the same value.
    ///
    /// No uniqueness pre-check happens here; a duplicate username fails at
    /// the UNIQUE constraint and is reported as a storage error.
    pub fn create_user(&self, user: &NewUser) -> Result<i64, RepoError> {
        let now = timestamp::format(&self.now());
        let id = self.in_transaction(|tx| {
            let id: i64 = tx.query_row(
                "INSERT INTO users (username, password, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3) RETURNING id",
                params![user.username, user.password_hash, now],
                |row| row.get(0),
            )?;
            Ok(id)
        })?;

        info!("Created user {} ({})", id, user.username);
        Ok(id)
    }

    /// `None` when no user has this id.
    pub fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        self.in_transaction(|tx| query_user_by_id(tx, id))
    }

    pub fn user_exists(&self, id: i64) -> Result<bool, RepoError> {
        self.in_transaction(|tx| user_id_taken(tx, id))
    }

    pub fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        self.in_transaction(|tx| {
            let found = tx
                .query_row("SELECT 1 FROM users WHERE username = ?1", [username], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Write `username` and `password`, refresh `updated_at`, and return the
    /// stored row. `created_at` is never touched.
    pub fn update_user(&self, user: &User) -> Result<User, RepoError> {
        let now = timestamp::format(&self.now());
        self.in_transaction(|tx| {
            let changed = tx
                .execute(
                    "UPDATE users SET username = ?1, password = ?2, updated_at = ?3 WHERE id = ?4",
                    params![user.username, user.password, now, user.id],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        RepoError::UsernameTaken
                    } else {
                        RepoError::Storage(e)
                    }
                })?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "user" });
            }

            query_user_by_id(tx, user.id)?.ok_or(RepoError::NotFound { entity: "user" })
        })
    }

    /// Remove a user and every booking it owns, in one transaction.
    ///
    /// Returns how many bookings went with it.
    pub fn delete_user(&self, id: i64) -> Result<usize, RepoError> {
        let removed = self.in_transaction(|tx| {
            if !user_id_taken(tx, id)? {
                return Err(RepoError::NotFound { entity: "user" });
            }

            tx.execute("DELETE FROM users WHERE id = ?1", [id])
                .map_err(RepoError::Rejected)?;

            // Zero rows here just means the user had no bookings.
            let removed = tx.execute("DELETE FROM bookings WHERE user_id = ?1", [id])?;
            Ok(removed)
        });

        match &removed {
            Ok(n) => info!("Deleted user {} and {} booking(s)", id, n),
            Err(e) if e.is_client_error() => warn!("Delete of user {} refused: {}", id, e),
            Err(_) => {}
        }
        removed
    }

    // -- Bookings --

    /// Insert a booking and return its id.
    ///
    /// The insert only happens when the owning user exists at that moment,
    /// so no orphan row is ever written. A missing owner is reported as
    /// [`RepoError::MissingOwner`].
    pub fn create_booking(&self, booking: &NewBooking) -> Result<i64, RepoError> {
        if !booking.has_valid_window() {
            return Err(RepoError::InvalidWindow);
        }

        let start = timestamp::format(&booking.start_time);
        let end = timestamp::format(&booking.end_time);
        let id = self.in_transaction(|tx| {
            let id: Option<i64> = tx
                .query_row(
                    "INSERT INTO bookings (user_id, start_time, end_time, comment)
                     SELECT ?1, ?2, ?3, ?4
                     WHERE EXISTS (SELECT 1 FROM users WHERE id = ?1)
                     RETURNING id",
                    params![booking.user_id, start, end, booking.comment],
                    |row| row.get(0),
                )
                .optional()?;
            id.ok_or(RepoError::MissingOwner(booking.user_id))
        })?;

        info!("Created booking {} for user {}", id, booking.user_id);
        Ok(id)
    }

    pub fn get_booking(&self, id: i64) -> Result<Option<Booking>, RepoError> {
        self.in_transaction(|tx| query_booking_by_id(tx, id))
    }

    /// Write the window and comment and return the stored row. The owner
    /// never changes.
    pub fn update_booking(&self, booking: &Booking) -> Result<Booking, RepoError> {
        if !booking.has_valid_window() {
            return Err(RepoError::InvalidWindow);
        }

        let start = timestamp::format(&booking.start_time);
        let end = timestamp::format(&booking.end_time);
        self.in_transaction(|tx| {
            let changed = tx.execute(
                "UPDATE bookings SET start_time = ?1, end_time = ?2, comment = ?3 WHERE id = ?4",
                params![start, end, booking.comment, booking.id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "booking" });
            }

            query_booking_by_id(tx, booking.id)?.ok_or(RepoError::NotFound { entity: "booking" })
        })
    }

    /// Delete one booking. Zero affected rows is reported as not found.
    pub fn delete_booking(&self, id: i64) -> Result<(), RepoError> {
        self.in_transaction(|tx| {
            let changed = tx
                .execute("DELETE FROM bookings WHERE id = ?1", [id])
                .map_err(RepoError::Rejected)?;
            if changed == 0 {
                warn!("Delete of booking {} matched no row", id);
                return Err(RepoError::NotFound { entity: "booking" });
            }
            Ok(())
        })?;

        info!("Deleted booking {}", id);
        Ok(())
    }

    /// Total booking count plus one page of rows ordered by id.
    ///
    /// Raw query parameters go straight in; see [`Pagination::from_params`]
    /// for how the mode is chosen. Bad parameters fail before any query runs.
    pub fn list_bookings(
        &self,
        limit: Option<&str>,
        page: Option<&str>,
        offset: Option<&str>,
    ) -> Result<BookingsPage, RepoError> {
        let pagination = Pagination::from_params(limit, page, offset)?;
        debug!("Listing bookings with {:?}", pagination);

        self.in_transaction(|tx| {
            let count: i64 = tx.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?;
            let rows = query_bookings(tx, pagination)?;
            Ok(BookingsPage { count, rows })
        })
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, RepoError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let row = conn
        .query_row(&sql, [id], UserRow::from_row)
        .optional()?;

    row.map(User::try_from).transpose()
}

fn user_id_taken(conn: &Connection, id: i64) -> Result<bool, RepoError> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn query_booking_by_id(conn: &Connection, id: i64) -> Result<Option<Booking>, RepoError> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let row = conn
        .query_row(&sql, [id], BookingRow::from_row)
        .optional()?;

    row.map(Booking::try_from).transpose()
}

fn query_bookings(conn: &Connection, pagination: Pagination) -> Result<Vec<Booking>, RepoError> {
    let rows = match pagination.limit_offset() {
        Some((limit, offset)) => {
            let sql =
                format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id LIMIT ?1 OFFSET ?2");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([limit, offset], BookingRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], BookingRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    rows.into_iter().map(Booking::try_from).collect()
}
