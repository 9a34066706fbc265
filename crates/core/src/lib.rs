//! Bridgia Core - Shared domain types.
//!
//! This crate provides the types used across all Bridgia components:
//! - `site` - Public contact intake and the admin inbox API
//! - `cli` - Command-line tools for migrations and admin password setup
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, password hashes and contact
//!   submissions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
