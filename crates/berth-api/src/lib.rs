pub mod bookings;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use extract::FormBody;
pub use routes::router;
pub use state::{AppState, AppStateInner};
