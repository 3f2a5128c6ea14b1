//! Invoice handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, instrument};
use validator::Validate;

use core_kernel::{ContactId, InvoiceId, UserId, VatRate};
use domain_invoice::{
    InvoiceCreate, InvoiceCreateBatch, InvoiceEditor, InvoiceError, InvoicePort, InvoicePortExt,
    InvoiceSettings, NewInvoiceLine,
};

use crate::dto::invoice::*;
use crate::{error::ApiError, AppState};

async fn settings(state: &AppState) -> Result<InvoiceSettings, ApiError> {
    Ok(state
        .port
        .get_settings()
        .await?
        .ok_or(InvoiceError::MissingSettings)?)
}

fn invoice_create(
    state: &AppState,
    settings: &InvoiceSettings,
    request: &CreateInvoicesRequest,
) -> InvoiceCreate {
    InvoiceCreate::from_settings(state.port.clone(), settings, request.until)
        .with_invoice_date(request.invoice_date.unwrap_or_else(|| Utc::now().date_naive()))
}

/// Bills a contact's outstanding time
///
/// 201 with the invoice, or 204 when there was nothing to bill.
#[instrument(skip(state, request), fields(contact_id = id))]
pub async fn create_contact_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateInvoicesRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let contact = state.port.get_contact(ContactId::new(id)).await?;
    let settings = settings(&state).await?;

    let created = invoice_create(&state, &settings, &request)
        .create(UserId::new(request.user_id), &contact)
        .await?;

    Ok(match created {
        Some(invoice) => {
            (StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Bills every contact's outstanding time
///
/// Contacts that fail are reported in the body; the rest are still invoiced.
#[instrument(skip(state, request))]
pub async fn create_invoice_batch(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoicesRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    request.validate()?;
    let settings = settings(&state).await?;

    let outcome = InvoiceCreateBatch::new(invoice_create(&state, &settings, &request))
        .create(UserId::new(request.user_id))
        .await?;

    Ok(Json(BatchResponse::from(&outcome)))
}

/// Creates an empty invoice for lines entered by hand
pub async fn create_draft(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    request.validate()?;
    let invoice = InvoiceEditor::new(state.port.clone())
        .create_draft(
            UserId::new(request.user_id),
            ContactId::new(id),
            request.invoice_date.unwrap_or_else(|| Utc::now().date_naive()),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))))
}

/// Adds a line to an invoice
#[instrument(skip(state, request), fields(invoice_id = id))]
pub async fn add_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<InvoiceLineResponse>), ApiError> {
    request.validate()?;
    let invoice_id = InvoiceId::new(id);
    let editor = InvoiceEditor::new(state.port.clone());

    let vat_rate = match request.vat_percentage {
        Some(percentage) => VatRate::from_percentage(percentage).map_err(InvoiceError::from)?,
        None => settings(&state).await?.vat_rate,
    };
    let line_number = match request.line_number {
        Some(n) => n,
        None => editor.next_line_number(invoice_id).await?,
    };

    let mut line = NewInvoiceLine::new(
        line_number,
        request.quantity,
        request.units,
        request.price,
        vat_rate,
    );
    if let Some(description) = request.description {
        line = line.with_description(description);
    }

    let stored = editor.add_line(invoice_id, line).await?;
    info!(line_number = stored.line_number, net = %stored.net, "Invoice line added");
    Ok((StatusCode::CREATED, Json(InvoiceLineResponse::from(&stored))))
}

/// An invoice with its contact and the records billed on each line
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let detail = state.port.get_invoice_detail(InvoiceId::new(id)).await?;
    Ok(Json(InvoiceResponse::from(&detail)))
}

/// The invoice as a PDF attachment
#[instrument(skip(state), fields(invoice_id = id))]
pub async fn get_invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let rendered =
        invoice_pdf::render_invoice(&state.print, state.port.as_ref(), InvoiceId::new(id)).await?;

    let disposition = format!("attachment; filename=\"{}\"", rendered.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    )
        .into_response())
}
