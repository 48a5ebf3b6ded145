//! HTTP client for the Cadence API gateway.
//!
//! Every request reads the bearer token from the session snapshot at send
//! time. Account flows that change the session live in [`auth`].

pub mod auth;
pub mod client;
pub mod content;
pub mod error;
pub mod notifications;
pub mod ratings;
pub mod subscriptions;
pub mod users;

pub use client::ApiClient;
pub use error::ApiError;
