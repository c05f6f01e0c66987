//! Loan application disbursement routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::routes::transactions::{batch_too_large, BatchResponse};
use crate::{extractors::ActorId, AppState};
use harambee_core::disbursement::{
    DisbursementError, DisbursementOutcome, LoanApplication, LoanStatus,
};
use harambee_db::repositories::LoanRepository;

/// Creates the loan application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loan-applications/{id}", get(get_application))
        .route("/loan-applications/{id}/disburse", put(disburse))
        .route("/loan-applications/bulk-disburse", post(bulk_disburse))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a disbursement.
#[derive(Debug, Deserialize)]
pub struct DisburseRequest {
    /// Target status; the only accepted value is "disbursed".
    pub status: String,
}

/// Request body for bulk disbursement.
#[derive(Debug, Deserialize)]
pub struct BulkDisburseRequest {
    /// Applications to disburse.
    pub application_ids: Vec<Uuid>,
}

/// Response for a loan application.
#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    /// Application ID.
    pub id: Uuid,
    /// Human-facing application number.
    pub application_number: String,
    /// Borrowing member.
    pub member_id: Uuid,
    /// Product applied for.
    pub product_id: Uuid,
    /// Principal requested.
    pub loan_amount: Decimal,
    /// Current lifecycle status.
    pub status: String,
}

impl From<LoanApplication> for ApplicationResponse {
    fn from(application: LoanApplication) -> Self {
        Self {
            id: application.id.into_inner(),
            application_number: application.application_number,
            member_id: application.member_id.into_inner(),
            product_id: application.product_id.into_inner(),
            loan_amount: application.loan_amount,
            status: application.status.to_string(),
        }
    }
}

/// Response for a completed disbursement.
#[derive(Debug, Serialize)]
pub struct DisbursementResponse {
    /// The disbursed application.
    pub application_id: Uuid,
    /// The loan account created to receive the funds.
    pub created_account_id: Uuid,
    /// Reference number linking the funding legs.
    pub reference_number: String,
    /// Principal released.
    pub amount: Decimal,
}

impl From<DisbursementOutcome> for DisbursementResponse {
    fn from(outcome: DisbursementOutcome) -> Self {
        Self {
            application_id: outcome.application_id,
            created_account_id: outcome.created_account_id,
            reference_number: outcome.reference_number,
            amount: outcome.amount,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_application(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = LoanRepository::new((*state.db).clone());
    match repo.get_application(id).await {
        Ok(application) => {
            (StatusCode::OK, Json(ApplicationResponse::from(application))).into_response()
        }
        Err(err) => disbursement_error_response(&err),
    }
}

async fn disburse(
    State(state): State<AppState>,
    actor: ActorId,
    Path(id): Path<Uuid>,
    Json(payload): Json<DisburseRequest>,
) -> Response {
    if LoanStatus::parse(&payload.status) != Some(LoanStatus::Disbursed) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": "Disbursement only accepts status 'disbursed'"
            })),
        )
            .into_response();
    }

    let repo = LoanRepository::new((*state.db).clone());
    match repo.disburse(id, actor.0).await {
        Ok(outcome) => {
            info!(
                application_id = %outcome.application_id,
                reference = %outcome.reference_number,
                amount = %outcome.amount,
                "loan disbursed"
            );
            (StatusCode::OK, Json(DisbursementResponse::from(outcome))).into_response()
        }
        Err(err) => disbursement_error_response(&err),
    }
}

async fn bulk_disburse(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<BulkDisburseRequest>,
) -> Response {
    let max_items = state.config.batch.max_items;
    if payload.application_ids.len() > max_items {
        return batch_too_large(payload.application_ids.len(), max_items);
    }

    let repo = LoanRepository::new((*state.db).clone());
    let outcome = repo.bulk_disburse(&payload.application_ids, actor.0).await;
    info!(summary = %outcome.summary(), "bulk disbursement finished");
    (
        StatusCode::OK,
        Json(BatchResponse {
            summary: outcome.summary(),
            outcome,
        }),
    )
        .into_response()
}

// ============================================================================
// Helpers
// ============================================================================

fn disbursement_error_response(err: &DisbursementError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code().to_ascii_lowercase(),
            "message": err.to_string()
        })),
    )
        .into_response()
}
