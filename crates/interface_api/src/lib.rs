//! HTTP API Layer
//!
//! This crate provides the REST API for the time-billing system using Axum,
//! plus the configuration and logging setup shared with the `invoice-admin`
//! command line tool.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers calling the invoicing services
//! - **Middleware**: Request ids and request logging
//! - **DTOs**: Request/Response data transfer objects, validated on entry
//! - **Error Handling**: Consistent error responses
//!
//! Authentication is expected to happen in front of this service.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(Arc::new(PostgresInvoiceAdapter::new(pool)), config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod telemetry;
pub mod admin;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_invoice::InvoicePort;
use invoice_pdf::{InvoicePrint, RenderError};

use crate::config::AppConfig;
use crate::handlers::{health, invoice, time_record};
use crate::middleware::{request_log, MakeRequestUuidV7};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub port: Arc<dyn InvoicePort>,
    pub print: Arc<InvoicePrint>,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state, loading the configured logo
    pub fn new(port: Arc<dyn InvoicePort>, config: AppConfig) -> Result<Self, RenderError> {
        let print = config.invoice_print()?;
        Ok(Self {
            port,
            print: Arc::new(print),
            config,
        })
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Ports, invoice layout and configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let contact_routes = Router::new()
        .route("/:id/invoices", post(invoice::create_contact_invoice))
        .route("/:id/invoices/draft", post(invoice::create_draft));

    let invoice_routes = Router::new()
        .route("/batch", post(invoice::create_invoice_batch))
        .route("/:id", get(invoice::get_invoice))
        .route("/:id/lines", post(invoice::add_line))
        .route("/:id/pdf", get(invoice::get_invoice_pdf));

    let ticket_routes = Router::new().route("/:id/time", post(time_record::record_time));

    let api_routes = Router::new()
        .nest("/contacts", contact_routes)
        .nest("/invoices", invoice_routes)
        .nest("/tickets", ticket_routes);

    // Layers run bottom-up: the id is set before logging sees the request
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(request_log))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
