//! Client session: who is signed in, and how that survives a restart.
//!
//! [`SessionStore`] owns the current user and bearer token, keeps them in
//! durable storage (token verbatim, user record through the obfuscation
//! codec), and publishes every change as a [`SessionSnapshot`] on a
//! `tokio::sync::watch` channel. HTTP clients read the token from that
//! channel at send time; screens gate on `is_loading` before trusting
//! `is_authenticated`.

pub mod error;
pub mod state;
pub mod store;

pub use error::SessionError;
pub use state::{SessionSnapshot, SessionState};
pub use store::{SessionStore, TOKEN_KEY, USER_CHECKSUM_KEY, USER_KEY};
