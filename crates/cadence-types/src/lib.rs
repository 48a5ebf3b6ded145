//! Shared types for the Cadence client.
//!
//! `models` mirrors the JSON the gateway returns, `api` holds request and
//! response bodies, `catalog` holds the small display helpers every screen
//! uses.

pub mod api;
pub mod catalog;
pub mod models;
