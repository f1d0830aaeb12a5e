//! Types shared between the Berth storage layer and the HTTP surface.

pub mod api;
pub mod models;
pub mod timestamp;
