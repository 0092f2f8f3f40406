use crate::handlers::{
    compute_error_response, conflict_response, db_error_response, not_found_response,
    validation_error_response,
};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::document_status::DocumentStatus;
use model::entities::payment_method::PaymentMethod;
use model::entities::{supplier, supplier_payment};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for recording a supplier payment (always created as draft)
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateSupplierPaymentRequest {
    /// Payment number (unique)
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    /// Payment date
    pub date: NaiveDate,
    /// Supplier ID
    pub supplier_id: i32,
    /// Amount paid (strictly positive)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub amount: Decimal,
    /// Payment method (cash/bank/cheque; card is not offered to suppliers)
    #[schema(value_type = String, example = "bank")]
    pub method: PaymentMethod,
    /// External reference (cheque number, transfer id)
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for updating a draft supplier payment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSupplierPaymentRequest {
    /// Payment date
    pub date: Option<NaiveDate>,
    /// Amount paid (strictly positive)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub amount: Option<Decimal>,
    /// Payment method
    #[schema(value_type = String)]
    pub method: Option<PaymentMethod>,
    /// External reference
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Supplier payment response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierPaymentResponse {
    pub id: i32,
    pub number: String,
    pub date: NaiveDate,
    pub supplier_id: i32,
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub method: PaymentMethod,
    pub reference: Option<String>,
    #[schema(value_type = String)]
    pub status: DocumentStatus,
    pub notes: Option<String>,
}

impl From<supplier_payment::Model> for SupplierPaymentResponse {
    fn from(model: supplier_payment::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            date: model.date,
            supplier_id: model.supplier_id,
            amount: model.amount,
            method: model.method,
            reference: model.reference,
            status: model.status,
            notes: model.notes,
        }
    }
}

/// Record a supplier payment in draft status. Draft payments do not touch
/// the supplier's balance; posting does.
#[utoipa::path(
    post,
    path = "/api/v1/supplier-payments",
    tag = "purchases",
    request_body = CreateSupplierPaymentRequest,
    responses(
        (status = 201, description = "Supplier payment created", body = ApiResponse<SupplierPaymentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 409, description = "Payment number already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_supplier_payment(
    State(state): State<AppState>,
    Json(request): Json<CreateSupplierPaymentRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<SupplierPaymentResponse>>),
    (StatusCode, Json<ErrorResponse>),
> {
    trace!("Entering create_supplier_payment function");
    debug!(
        "Creating supplier payment {} for supplier {} ({})",
        request.number, request.supplier_id, request.amount
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting supplier payment '{}': {}", request.number, errors);
        return Err(validation_error_response(errors));
    }

    if request.method == PaymentMethod::Card {
        warn!(
            "Rejecting supplier payment '{}': card payments are not offered to suppliers",
            request.number
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "VALIDATION_ERROR",
                "Card payments are not offered to suppliers",
            )),
        ));
    }

    match supplier::Entity::find_by_id(request.supplier_id)
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Supplier {} not found for payment", request.supplier_id);
            return Err(not_found_response("Supplier", request.supplier_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let new_payment = supplier_payment::ActiveModel {
        number: Set(request.number.clone()),
        date: Set(request.date),
        supplier_id: Set(request.supplier_id),
        amount: Set(request.amount),
        method: Set(request.method),
        reference: Set(request.reference.clone()),
        status: Set(DocumentStatus::Draft),
        notes: Set(request.notes.clone()),
        ..Default::default()
    };

    match new_payment.insert(&state.db).await {
        Ok(model) => {
            info!(
                "Supplier payment created successfully with ID: {}, number: {}",
                model.id, model.number
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: SupplierPaymentResponse::from(model),
                    message: "Supplier payment created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to create supplier payment '{}': {}",
                request.number, db_error
            );
            if db_error.to_string().to_lowercase().contains("unique") {
                Err(conflict_response(
                    "NUMBER_ALREADY_EXISTS",
                    format!("Payment number '{}' already exists", request.number),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}

/// Get all supplier payments
#[utoipa::path(
    get,
    path = "/api/v1/supplier-payments",
    tag = "purchases",
    responses(
        (status = 200, description = "Supplier payments retrieved", body = ApiResponse<Vec<SupplierPaymentResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_supplier_payments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SupplierPaymentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match supplier_payment::Entity::find()
        .order_by_desc(supplier_payment::Column::Date)
        .order_by_desc(supplier_payment::Column::Number)
        .all(&state.db)
        .await
    {
        Ok(payments) => {
            debug!("Retrieved {} supplier payments", payments.len());
            Ok(Json(ApiResponse {
                data: payments
                    .into_iter()
                    .map(SupplierPaymentResponse::from)
                    .collect(),
                message: "Supplier payments retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve supplier payments: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific supplier payment by ID
#[utoipa::path(
    get,
    path = "/api/v1/supplier-payments/{payment_id}",
    tag = "purchases",
    params(("payment_id" = i32, Path, description = "Supplier payment ID")),
    responses(
        (status = 200, description = "Supplier payment retrieved", body = ApiResponse<SupplierPaymentResponse>),
        (status = 404, description = "Supplier payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_supplier_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SupplierPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match supplier_payment::Entity::find_by_id(payment_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: SupplierPaymentResponse::from(model),
            message: "Supplier payment retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Supplier payment with ID {} not found", payment_id);
            Err(not_found_response("Supplier payment", payment_id))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve supplier payment {}: {}",
                payment_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Update a draft supplier payment
#[utoipa::path(
    put,
    path = "/api/v1/supplier-payments/{payment_id}",
    tag = "purchases",
    params(("payment_id" = i32, Path, description = "Supplier payment ID")),
    request_body = UpdateSupplierPaymentRequest,
    responses(
        (status = 200, description = "Supplier payment updated", body = ApiResponse<SupplierPaymentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Supplier payment not found", body = ErrorResponse),
        (status = 409, description = "Payment is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_supplier_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateSupplierPaymentRequest>,
) -> Result<Json<ApiResponse<SupplierPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting supplier payment update {}: {}", payment_id, errors);
        return Err(validation_error_response(errors));
    }

    if let Some(PaymentMethod::Card) = request.method {
        warn!(
            "Rejecting supplier payment {} update: card payments are not offered to suppliers",
            payment_id
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "VALIDATION_ERROR",
                "Card payments are not offered to suppliers",
            )),
        ));
    }

    let payment = match supplier_payment::Entity::find_by_id(payment_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Supplier payment with ID {} not found for update", payment_id);
            return Err(not_found_response("Supplier payment", payment_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    if !payment.status.is_draft() {
        warn!(
            "Supplier payment {} is {} and cannot be edited",
            payment_id,
            payment.status.as_str()
        );
        return Err(conflict_response(
            "DOCUMENT_NOT_DRAFT",
            format!(
                "Supplier payment {} is {} and cannot be edited",
                payment_id,
                payment.status.as_str()
            ),
        ));
    }

    let mut active: supplier_payment::ActiveModel = payment.into();
    if let Some(date) = request.date {
        active.date = Set(date);
    }
    if let Some(amount) = request.amount {
        active.amount = Set(amount);
    }
    if let Some(method) = request.method {
        active.method = Set(method);
    }
    if let Some(reference) = request.reference {
        active.reference = Set(Some(reference));
    }
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Supplier payment {} updated successfully", payment_id);
            Ok(Json(ApiResponse {
                data: SupplierPaymentResponse::from(updated),
                message: "Supplier payment updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!(
                "Failed to update supplier payment {}: {}",
                payment_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Post a supplier payment, reducing the supplier's balance in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/api/v1/supplier-payments/{payment_id}/post",
    tag = "purchases",
    params(("payment_id" = i32, Path, description = "Supplier payment ID")),
    responses(
        (status = 200, description = "Supplier payment posted", body = ApiResponse<SupplierPaymentResponse>),
        (status = 404, description = "Supplier payment not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn post_supplier_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SupplierPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_supplier_payment_status(state, payment_id, DocumentStatus::Posted).await
}

/// Cancel a supplier payment. Cancelling a posted payment restores the
/// supplier's balance by that amount.
#[utoipa::path(
    post,
    path = "/api/v1/supplier-payments/{payment_id}/cancel",
    tag = "purchases",
    params(("payment_id" = i32, Path, description = "Supplier payment ID")),
    responses(
        (status = 200, description = "Supplier payment cancelled", body = ApiResponse<SupplierPaymentResponse>),
        (status = 404, description = "Supplier payment not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_supplier_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SupplierPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_supplier_payment_status(state, payment_id, DocumentStatus::Cancelled).await
}

async fn change_supplier_payment_status(
    state: AppState,
    payment_id: i32,
    next: DocumentStatus,
) -> Result<Json<ApiResponse<SupplierPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;

    let payment = match supplier_payment::Entity::find_by_id(payment_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Supplier payment with ID {} not found", payment_id);
            return Err(not_found_response("Supplier payment", payment_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let current = payment.status;
    if !current.can_transition_to(next) {
        warn!(
            "Rejecting supplier payment {} transition {} -> {}",
            payment_id,
            current.as_str(),
            next.as_str()
        );
        return Err(conflict_response(
            "INVALID_STATUS_TRANSITION",
            format!(
                "Cannot move supplier payment {} from {} to {}",
                payment_id,
                current.as_str(),
                next.as_str()
            ),
        ));
    }

    let supplier_id = payment.supplier_id;
    let mut active: supplier_payment::ActiveModel = payment.into();
    active.status = Set(next);
    let payment = active.update(&txn).await.map_err(|db_error| {
        error!(
            "Failed to update supplier payment {} status: {}",
            payment_id, db_error
        );
        db_error_response(db_error)
    })?;

    if next.is_posted() || current.is_posted() {
        let supplier = compute::party::recompute_supplier_balance(&txn, supplier_id)
            .await
            .map_err(compute_error_response)?;
        debug!(
            "Supplier {} balance recomputed to {}",
            supplier.id, supplier.current_balance
        );
    }

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Supplier payment {} moved from {} to {}",
        payment_id,
        current.as_str(),
        next.as_str()
    );
    Ok(Json(ApiResponse {
        data: SupplierPaymentResponse::from(payment),
        message: format!("Supplier payment {} successfully", next.as_str()),
        success: true,
    }))
}
