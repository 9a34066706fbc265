//! Core types for Bridgia.
//!
//! This module provides type-safe wrappers for the site's domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod submission;

pub use credential::{AdminCredential, PasswordHash};
pub use email::{Email, EmailError};
pub use id::*;
pub use submission::{ContactSubmission, NewSubmission, SubmissionInput, ValidationErrors};
