//! Bridgia site library.
//!
//! Contact intake and admin inbox API behind the Bridgia marketing website.
//! The binary in `main.rs` wires configuration, storage and notification into
//! [`routes::app`]; integration tests and the CLI reuse the same pieces.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
