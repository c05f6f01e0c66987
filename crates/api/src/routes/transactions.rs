//! Ledger transaction routes.
//!
//! Exposes reference-grouped ledger operations: recording a pending
//! group, inspecting it, and transitioning it through the approval
//! workflow singly or in bulk.

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

use crate::{extractors::ActorId, AppState};
use harambee_core::batch::BatchOutcome;
use harambee_core::posting::{
    AccountRef, EntryStatus, EntryType, LedgerEntry, PostingError, TransactionGroup,
};
use harambee_db::repositories::{CreateGroupInput, CreateLegInput, PostingRepository};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/reference/{reference}", get(get_group))
        .route(
            "/transactions/reference/{reference}/approve",
            post(approve_reference),
        )
        .route("/transactions/{entry_id}", put(update_entry_status))
        .route("/transactions/bulk-approve", post(bulk_approve))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for one leg of a new transaction.
#[derive(Debug, Deserialize)]
pub struct CreateLegRequest {
    /// Account the leg posts against.
    pub account: AccountRef,
    /// Entry type: "debit" or "credit".
    pub entry_type: String,
    /// Positive amount with at most two decimal places.
    pub amount: Decimal,
}

/// Request body for creating a pending transaction group.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Reference number shared by the legs.
    pub reference_number: String,
    /// The legs; must balance debit against credit.
    pub legs: Vec<CreateLegRequest>,
}

/// Request body for a status transition.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target status: "returned" or "rejected".
    pub status: String,
    /// Optional verifier remarks.
    pub verifier_remarks: Option<String>,
}

/// Request body for an approval.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Optional verifier remarks.
    pub verifier_remarks: Option<String>,
}

/// Request body for bulk approval.
#[derive(Debug, Deserialize)]
pub struct BulkApproveRequest {
    /// Selected entry ids; expanded to whole reference groups.
    pub entry_ids: Vec<Uuid>,
}

/// Response for a transaction group.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    /// Reference number of the group.
    pub reference_number: String,
    /// Shared status of every leg.
    pub status: String,
    /// Sum of the debit side (equals the credit side).
    pub total: Decimal,
    /// The legs.
    pub entries: Vec<LedgerEntry>,
}

impl From<TransactionGroup> for GroupResponse {
    fn from(group: TransactionGroup) -> Self {
        Self {
            reference_number: group.reference().to_owned(),
            status: group.status().to_string(),
            total: group.total(),
            entries: group.entries().to_vec(),
        }
    }
}

/// Response for a bulk operation.
#[derive(Debug, Serialize)]
pub struct BatchResponse<Id: Serialize> {
    /// "N of M succeeded".
    pub summary: String,
    /// Per-item outcome.
    #[serde(flatten)]
    pub outcome: BatchOutcome<Id>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_transaction(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<CreateTransactionRequest>,
) -> Response {
    let mut legs = Vec::with_capacity(payload.legs.len());
    for leg in &payload.legs {
        let Some(entry_type) = EntryType::parse(&leg.entry_type) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_entry_type",
                    "message": "Entry type must be 'debit' or 'credit'"
                })),
            )
                .into_response();
        };
        legs.push(CreateLegInput {
            account: leg.account,
            entry_type,
            amount: leg.amount,
        });
    }

    let repo = PostingRepository::new((*state.db).clone());
    match repo
        .create_group(CreateGroupInput {
            reference_number: payload.reference_number,
            legs,
            created_by: actor.0,
        })
        .await
    {
        Ok(group) => {
            info!(reference = %group.reference(), "transaction group recorded");
            (StatusCode::CREATED, Json(GroupResponse::from(group))).into_response()
        }
        Err(err) => posting_error_response(&err),
    }
}

async fn get_group(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Response {
    let repo = PostingRepository::new((*state.db).clone());
    match repo.load_group(&reference).await {
        Ok(group) => (StatusCode::OK, Json(GroupResponse::from(group))).into_response(),
        Err(err) => posting_error_response(&err),
    }
}

async fn approve_reference(
    State(state): State<AppState>,
    actor: ActorId,
    Path(reference): Path<String>,
    Json(payload): Json<ApproveRequest>,
) -> Response {
    let repo = PostingRepository::new((*state.db).clone());
    match repo
        .transition_reference(
            &reference,
            EntryStatus::Approved,
            payload.verifier_remarks,
            actor.0,
        )
        .await
    {
        Ok(group) => {
            info!(reference = %reference, actor = %actor.0, "transaction group approved");
            (StatusCode::OK, Json(GroupResponse::from(group))).into_response()
        }
        Err(err) => posting_error_response(&err),
    }
}

async fn update_entry_status(
    State(state): State<AppState>,
    actor: ActorId,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Response {
    let Some(target) = EntryStatus::parse(&payload.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": "Unknown target status"
            })),
        )
            .into_response();
    };

    let repo = PostingRepository::new((*state.db).clone());
    match repo
        .transition_entry(entry_id, target, payload.verifier_remarks, actor.0)
        .await
    {
        Ok(group) => {
            info!(
                entry_id = %entry_id,
                reference = %group.reference(),
                status = %group.status(),
                "transaction group transitioned"
            );
            (StatusCode::OK, Json(GroupResponse::from(group))).into_response()
        }
        Err(err) => posting_error_response(&err),
    }
}

async fn bulk_approve(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<BulkApproveRequest>,
) -> Response {
    let max_items = state.config.batch.max_items;
    if payload.entry_ids.len() > max_items {
        return batch_too_large(payload.entry_ids.len(), max_items);
    }

    let repo = PostingRepository::new((*state.db).clone());
    match repo
        .bulk_transition(&payload.entry_ids, EntryStatus::Approved, None, actor.0)
        .await
    {
        Ok(outcome) => {
            info!(summary = %outcome.summary(), "bulk approval finished");
            (
                StatusCode::OK,
                Json(BatchResponse {
                    summary: outcome.summary(),
                    outcome,
                }),
            )
                .into_response()
        }
        Err(err) => posting_error_response(&err),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps a posting error onto the JSON error envelope.
pub(crate) fn posting_error_response(err: &PostingError) -> Response {
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

/// Refusal for oversized bulk requests.
pub(crate) fn batch_too_large(requested: usize, max_items: usize) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "batch_too_large",
            "message": format!("Batch of {requested} exceeds the limit of {max_items} items")
        })),
    )
        .into_response()
}
