//! Contact form route handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use bridgia_core::SubmissionInput;

use super::Success;
use crate::error::Result;
use crate::services::intake::ContactIntakeService;
use crate::state::AppState;

/// Submit the contact form.
///
/// POST /api/contact.submit
///
/// Stores the submission and notifies the owner. A notification failure is
/// reported as an internal error even though the submission was kept.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubmissionInput>, JsonRejection>,
) -> Result<Json<Success>> {
    let Json(input) = payload?;

    let intake = ContactIntakeService::new(
        state.store(),
        state.notifier(),
        state.config().notify.timeout,
    );
    intake.submit(input).await?;

    Ok(Json(Success::new()))
}
