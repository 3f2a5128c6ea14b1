//! Time recording handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::TicketId;
use domain_invoice::TimeRecordService;

use crate::dto::time_record::{RecordTimeRequest, TimeRecordResponse};
use crate::{error::ApiError, AppState};

/// Logs time against a ticket
pub async fn record_time(
    State(state): State<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<RecordTimeRequest>,
) -> Result<(StatusCode, Json<TimeRecordResponse>), ApiError> {
    request.validate()?;
    let record = TimeRecordService::new(state.port.clone())
        .record_time(request.into_new_record(TicketId::new(ticket_id)))
        .await?;
    Ok((StatusCode::CREATED, Json(TimeRecordResponse::from(&record))))
}
