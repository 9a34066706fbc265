//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Admin secret lifecycle (initialize, change, verify)
//! - `intake` - Contact form validation, persistence and owner notification
//! - `notify` - Owner notification adapters (webhook, SMTP, log)

pub mod auth;
pub mod intake;
pub mod notify;
