//! Contact form submission types and input validation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::SubmissionId;

/// Maximum length of the sender name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;
/// Maximum length of the company name, in characters.
pub const MAX_COMPANY_LENGTH: usize = 200;
/// Maximum length of the message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// A stored contact form entry.
///
/// Immutable once created. Serialized with camelCase keys and `company: null`
/// when the visitor left it blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: SubmissionId,
    pub name: String,
    pub email: Email,
    pub company: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A validated submission that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub name: String,
    pub email: Email,
    pub company: Option<String>,
    pub message: String,
}

impl NewSubmission {
    /// Stamp the submission with an ID and creation time.
    #[must_use]
    pub fn into_submission(self, id: SubmissionId, created_at: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            id,
            name: self.name,
            email: self.email,
            company: self.company,
            message: self.message,
            created_at,
        }
    }
}

/// Raw contact form input as sent by the website.
///
/// Missing string fields deserialize as empty so that they are reported by
/// [`SubmissionInput::validate`] with field context instead of failing the
/// whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionInput {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}

impl SubmissionInput {
    /// Validate every field, collecting all failures.
    ///
    /// An empty `company` becomes `None`. Other values are kept as sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each failing field.
    pub fn validate(self) -> Result<NewSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        check_required(&mut errors, "name", &self.name, "Name is required", MAX_NAME_LENGTH);
        check_required(
            &mut errors,
            "message",
            &self.message,
            "Message is required",
            MAX_MESSAGE_LENGTH,
        );

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.add("email", "Invalid email");
                None
            }
        };

        let company = self.company.filter(|c| !c.is_empty());
        if let Some(company) = &company
            && company.chars().count() > MAX_COMPANY_LENGTH
        {
            errors.add(
                "company",
                format!("Company must be at most {MAX_COMPANY_LENGTH} characters"),
            );
        }

        match email {
            Some(email) if errors.is_empty() => Ok(NewSubmission {
                name: self.name,
                email,
                company,
                message: self.message,
            }),
            _ => Err(errors),
        }
    }
}

fn check_required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    empty_message: &str,
    max: usize,
) {
    if value.trim().is_empty() {
        errors.add(field, empty_message);
    } else if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
}

/// Field-level validation failures, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// An error set with a single failing field.
    #[must_use]
    pub fn single(field: &'static str, reason: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, reason);
        errors
    }

    /// Record a failure for `field`. The first reason per field wins.
    pub fn add(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| reason.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The reason recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterate over `(field, reason)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, reason)| (*field, reason.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, reason) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {reason}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
