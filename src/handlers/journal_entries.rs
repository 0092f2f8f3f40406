use crate::handlers::{compute_error_response, db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::journal_entry::{self, EntrySide};
use model::entities::account;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for recording a journal entry. Entries are immutable once
/// stored; there is no update or delete.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateJournalEntryRequest {
    /// Entry date
    pub date: NaiveDate,
    /// Account the entry posts to
    pub account_id: i32,
    /// Ledger side (debit/credit)
    #[schema(value_type = String, example = "debit")]
    pub side: EntrySide,
    /// Amount (strictly positive; the side carries the sign)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub amount: Decimal,
    /// Entry narration
    #[validate(length(min = 1))]
    pub description: String,
    /// Source document reference
    #[validate(length(min = 1, max = 50))]
    pub reference: String,
}

/// Query parameters for listing journal entries
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct JournalEntryListQuery {
    /// Restrict to one account
    pub account_id: Option<i32>,
}

/// Journal entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JournalEntryResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub account_id: i32,
    #[schema(value_type = String)]
    pub side: EntrySide,
    pub amount: Decimal,
    pub description: String,
    pub reference: String,
}

impl From<journal_entry::Model> for JournalEntryResponse {
    fn from(model: journal_entry::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            account_id: model.account_id,
            side: model.side,
            amount: model.amount,
            description: model.description,
            reference: model.reference,
        }
    }
}

/// Record a journal entry and recompute the account balance in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/api/v1/journal-entries",
    tag = "accounts",
    request_body = CreateJournalEntryRequest,
    responses(
        (status = 201, description = "Journal entry recorded", body = ApiResponse<JournalEntryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_journal_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateJournalEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JournalEntryResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_journal_entry function");
    debug!(
        "Recording journal entry for account {} ({:?} {})",
        request.account_id, request.side, request.amount
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting journal entry: {}", errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;

    // The account must exist before anything is written.
    match account::Entity::find_by_id(request.account_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Account {} not found for journal entry", request.account_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Account {} not found", request.account_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let new_entry = journal_entry::ActiveModel {
        date: Set(request.date),
        account_id: Set(request.account_id),
        side: Set(request.side),
        amount: Set(request.amount),
        description: Set(request.description.clone()),
        reference: Set(request.reference.clone()),
        ..Default::default()
    };

    let entry = new_entry.insert(&txn).await.map_err(|db_error| {
        error!("Failed to insert journal entry: {}", db_error);
        db_error_response(db_error)
    })?;

    // Persist first, then recompute: the derived balance is a distinct,
    // idempotent step inside the same transaction.
    let account = compute::ledger::recompute_account_balance(&txn, request.account_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Journal entry {} recorded; account {} balance is now {}",
        entry.id, account.id, account.balance
    );
    let response = ApiResponse {
        data: JournalEntryResponse::from(entry),
        message: "Journal entry recorded successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all journal entries, optionally filtered by account
#[utoipa::path(
    get,
    path = "/api/v1/journal-entries",
    tag = "accounts",
    params(JournalEntryListQuery),
    responses(
        (status = 200, description = "Journal entries retrieved", body = ApiResponse<Vec<JournalEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_journal_entries(
    Query(query): Query<JournalEntryListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JournalEntryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_journal_entries function");

    let mut select = journal_entry::Entity::find()
        .order_by_desc(journal_entry::Column::Date)
        .order_by_desc(journal_entry::Column::Id);
    if let Some(account_id) = query.account_id {
        select = select.filter(journal_entry::Column::AccountId.eq(account_id));
    }

    match select.all(&state.db).await {
        Ok(entries) => {
            debug!("Retrieved {} journal entries", entries.len());
            let response = ApiResponse {
                data: entries.into_iter().map(JournalEntryResponse::from).collect(),
                message: "Journal entries retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve journal entries: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific journal entry by ID
#[utoipa::path(
    get,
    path = "/api/v1/journal-entries/{entry_id}",
    tag = "accounts",
    params(
        ("entry_id" = i32, Path, description = "Journal entry ID"),
    ),
    responses(
        (status = 200, description = "Journal entry retrieved", body = ApiResponse<JournalEntryResponse>),
        (status = 404, description = "Journal entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_journal_entry(
    Path(entry_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<JournalEntryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_journal_entry for entry_id: {}", entry_id);

    match journal_entry::Entity::find_by_id(entry_id).one(&state.db).await {
        Ok(Some(entry)) => {
            let response = ApiResponse {
                data: JournalEntryResponse::from(entry),
                message: "Journal entry retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Journal entry with ID {} not found", entry_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Journal entry {} not found", entry_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve journal entry {}: {}", entry_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get the journal entries of one account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/journal-entries",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Journal entries retrieved", body = ApiResponse<Vec<JournalEntryResponse>>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account_journal_entries(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JournalEntryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering get_account_journal_entries for account_id: {}",
        account_id
    );

    match account::Entity::find_by_id(account_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Account with ID {} not found", account_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Account {} not found", account_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    match journal_entry::Entity::find()
        .filter(journal_entry::Column::AccountId.eq(account_id))
        .order_by_desc(journal_entry::Column::Date)
        .order_by_desc(journal_entry::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(entries) => {
            debug!(
                "Retrieved {} journal entries for account {}",
                entries.len(),
                account_id
            );
            let response = ApiResponse {
                data: entries.into_iter().map(JournalEntryResponse::from).collect(),
                message: "Journal entries retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve journal entries for account {}: {}",
                account_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}
