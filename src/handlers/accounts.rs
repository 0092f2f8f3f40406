use crate::handlers::{db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::account::{self, AccountKind, NormalBalance};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateAccountRequest {
    /// Account code (unique)
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    /// Account name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Account classification (asset/liability/equity/revenue/expense)
    #[schema(value_type = String, example = "asset")]
    pub kind: AccountKind,
    /// Optional parent account ID
    pub parent_id: Option<i32>,
    /// Account description
    pub description: Option<String>,
    /// Which side increases the balance (debit/credit)
    #[schema(value_type = String, example = "debit")]
    pub normal_balance: NormalBalance,
    /// Whether the account is active (default: true)
    pub is_active: Option<bool>,
}

/// Request body for updating an account. The code, kind and normal side are
/// fixed at creation; the derived balance is never writable.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAccountRequest {
    /// Account name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Account description
    pub description: Option<String>,
    /// Optional parent account ID
    pub parent_id: Option<i32>,
    /// Whether the account is active
    pub is_active: Option<bool>,
}

/// Account response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    #[schema(value_type = String)]
    pub kind: AccountKind,
    pub parent_id: Option<i32>,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub normal_balance: NormalBalance,
    /// Derived balance, maintained by the ledger rule
    pub balance: Decimal,
    pub is_active: bool,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            kind: model.kind,
            parent_id: model.parent_id,
            description: model.description,
            normal_balance: model.normal_balance,
            balance: model.balance,
            is_active: model.is_active,
        }
    }
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Account code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_account function");
    debug!(
        "Creating account with code: {}, name: {}",
        request.code, request.name
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting account '{}': {}", request.code, errors);
        return Err(validation_error_response(errors));
    }

    let new_account = account::ActiveModel {
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        kind: Set(request.kind),
        parent_id: Set(request.parent_id),
        description: Set(request.description.clone()),
        normal_balance: Set(request.normal_balance),
        balance: Set(Decimal::ZERO),
        is_active: Set(request.is_active.unwrap_or(true)),
        ..Default::default()
    };

    match new_account.insert(&state.db).await {
        Ok(account_model) => {
            info!(
                "Account created successfully with ID: {}, code: {}",
                account_model.id, account_model.code
            );
            let response = ApiResponse {
                data: AccountResponse::from(account_model),
                message: "Account created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create account '{}': {}", request.code, db_error);
            if db_error.to_string().to_lowercase().contains("unique") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "CODE_ALREADY_EXISTS",
                        format!("Account code '{}' already exists", request.code),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}

/// Get all accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Vec<AccountResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_accounts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AccountResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_accounts function");

    match account::Entity::find().all(&state.db).await {
        Ok(accounts) => {
            debug!("Retrieved {} accounts from database", accounts.len());
            let response = ApiResponse {
                data: accounts.into_iter().map(AccountResponse::from).collect(),
                message: "Accounts retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve accounts from database: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Account retrieved successfully", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AccountResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_account function for account_id: {}", account_id);

    match account::Entity::find_by_id(account_id).one(&state.db).await {
        Ok(Some(account_model)) => {
            debug!(
                "Retrieved account {} ({})",
                account_model.code, account_model.id
            );
            let response = ApiResponse {
                data: AccountResponse::from(account_model),
                message: "Account retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Account with ID {} not found", account_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Account {} not found", account_id),
                )),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve account with ID {}: {}",
                account_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Update an account
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated successfully", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering update_account function for account_id: {}",
        account_id
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting account update {}: {}", account_id, errors);
        return Err(validation_error_response(errors));
    }

    let existing_account = match account::Entity::find_by_id(account_id).one(&state.db).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            warn!("Account with ID {} not found for update", account_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Account {} not found", account_id),
                )),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup account with ID {} for update: {}",
                account_id, db_error
            );
            return Err(db_error_response(db_error));
        }
    };

    let mut account_active: account::ActiveModel = existing_account.into();
    let mut updated_fields = Vec::new();

    if let Some(name) = request.name {
        account_active.name = Set(name.clone());
        updated_fields.push(format!("name: {}", name));
    }
    if let Some(description) = request.description {
        account_active.description = Set(Some(description.clone()));
        updated_fields.push("description".to_string());
    }
    if let Some(parent_id) = request.parent_id {
        account_active.parent_id = Set(Some(parent_id));
        updated_fields.push(format!("parent_id: {}", parent_id));
    }
    if let Some(is_active) = request.is_active {
        account_active.is_active = Set(is_active);
        updated_fields.push(format!("is_active: {}", is_active));
    }

    match account_active.update(&state.db).await {
        Ok(updated_account) => {
            info!(
                "Account with ID {} updated successfully. Updated fields: {}",
                account_id,
                if updated_fields.is_empty() {
                    "none".to_string()
                } else {
                    updated_fields.join(", ")
                }
            );
            let response = ApiResponse {
                data: AccountResponse::from(updated_account),
                message: "Account updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update account with ID {}: {}",
                account_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Delete an account. Blocked while journal entries or parties still
/// reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Account deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 409, description = "Account is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering delete_account function for account_id: {}",
        account_id
    );

    match account::Entity::delete_by_id(account_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Account with ID {} deleted successfully", account_id);
                let response = ApiResponse {
                    data: format!("Account {} deleted", account_id),
                    message: "Account deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Account with ID {} not found for deletion", account_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new(
                        "NOT_FOUND",
                        format!("Account {} not found", account_id),
                    )),
                ))
            }
        }
        Err(db_error) => {
            error!(
                "Failed to delete account with ID {}: {}",
                account_id, db_error
            );
            if db_error.to_string().to_lowercase().contains("foreign key") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "REFERENCE_EXISTS",
                        format!(
                            "Account {} is still referenced by entries or parties",
                            account_id
                        ),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}
