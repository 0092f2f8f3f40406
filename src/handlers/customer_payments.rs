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
use model::entities::{customer, customer_payment};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for recording a customer payment (always created as draft)
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCustomerPaymentRequest {
    /// Payment number (unique)
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    /// Payment date
    pub date: NaiveDate,
    /// Customer ID
    pub customer_id: i32,
    /// Amount received (strictly positive)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub amount: Decimal,
    /// Payment method (cash/bank/cheque/card)
    #[schema(value_type = String, example = "cash")]
    pub method: PaymentMethod,
    /// External reference (cheque number, transfer id)
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for updating a draft customer payment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCustomerPaymentRequest {
    /// Payment date
    pub date: Option<NaiveDate>,
    /// Amount received (strictly positive)
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

/// Customer payment response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerPaymentResponse {
    pub id: i32,
    pub number: String,
    pub date: NaiveDate,
    pub customer_id: i32,
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub method: PaymentMethod,
    pub reference: Option<String>,
    #[schema(value_type = String)]
    pub status: DocumentStatus,
    pub notes: Option<String>,
}

impl From<customer_payment::Model> for CustomerPaymentResponse {
    fn from(model: customer_payment::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            date: model.date,
            customer_id: model.customer_id,
            amount: model.amount,
            method: model.method,
            reference: model.reference,
            status: model.status,
            notes: model.notes,
        }
    }
}

/// Record a customer payment in draft status. Draft payments do not touch
/// the customer's balance; posting does.
#[utoipa::path(
    post,
    path = "/api/v1/customer-payments",
    tag = "sales",
    request_body = CreateCustomerPaymentRequest,
    responses(
        (status = 201, description = "Customer payment created", body = ApiResponse<CustomerPaymentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Payment number already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_customer_payment(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerPaymentRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<CustomerPaymentResponse>>),
    (StatusCode, Json<ErrorResponse>),
> {
    trace!("Entering create_customer_payment function");
    debug!(
        "Creating customer payment {} for customer {} ({})",
        request.number, request.customer_id, request.amount
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting customer payment '{}': {}", request.number, errors);
        return Err(validation_error_response(errors));
    }

    match customer::Entity::find_by_id(request.customer_id)
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Customer {} not found for payment", request.customer_id);
            return Err(not_found_response("Customer", request.customer_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let new_payment = customer_payment::ActiveModel {
        number: Set(request.number.clone()),
        date: Set(request.date),
        customer_id: Set(request.customer_id),
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
                "Customer payment created successfully with ID: {}, number: {}",
                model.id, model.number
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: CustomerPaymentResponse::from(model),
                    message: "Customer payment created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to create customer payment '{}': {}",
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

/// Get all customer payments
#[utoipa::path(
    get,
    path = "/api/v1/customer-payments",
    tag = "sales",
    responses(
        (status = 200, description = "Customer payments retrieved", body = ApiResponse<Vec<CustomerPaymentResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_customer_payments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CustomerPaymentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match customer_payment::Entity::find()
        .order_by_desc(customer_payment::Column::Date)
        .order_by_desc(customer_payment::Column::Number)
        .all(&state.db)
        .await
    {
        Ok(payments) => {
            debug!("Retrieved {} customer payments", payments.len());
            Ok(Json(ApiResponse {
                data: payments
                    .into_iter()
                    .map(CustomerPaymentResponse::from)
                    .collect(),
                message: "Customer payments retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve customer payments: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific customer payment by ID
#[utoipa::path(
    get,
    path = "/api/v1/customer-payments/{payment_id}",
    tag = "sales",
    params(("payment_id" = i32, Path, description = "Customer payment ID")),
    responses(
        (status = 200, description = "Customer payment retrieved", body = ApiResponse<CustomerPaymentResponse>),
        (status = 404, description = "Customer payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_customer_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CustomerPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match customer_payment::Entity::find_by_id(payment_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: CustomerPaymentResponse::from(model),
            message: "Customer payment retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Customer payment with ID {} not found", payment_id);
            Err(not_found_response("Customer payment", payment_id))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve customer payment {}: {}",
                payment_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Update a draft customer payment
#[utoipa::path(
    put,
    path = "/api/v1/customer-payments/{payment_id}",
    tag = "sales",
    params(("payment_id" = i32, Path, description = "Customer payment ID")),
    request_body = UpdateCustomerPaymentRequest,
    responses(
        (status = 200, description = "Customer payment updated", body = ApiResponse<CustomerPaymentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Customer payment not found", body = ErrorResponse),
        (status = 409, description = "Payment is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_customer_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCustomerPaymentRequest>,
) -> Result<Json<ApiResponse<CustomerPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting customer payment update {}: {}", payment_id, errors);
        return Err(validation_error_response(errors));
    }

    let payment = match customer_payment::Entity::find_by_id(payment_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Customer payment with ID {} not found for update", payment_id);
            return Err(not_found_response("Customer payment", payment_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    if !payment.status.is_draft() {
        warn!(
            "Customer payment {} is {} and cannot be edited",
            payment_id,
            payment.status.as_str()
        );
        return Err(conflict_response(
            "DOCUMENT_NOT_DRAFT",
            format!(
                "Customer payment {} is {} and cannot be edited",
                payment_id,
                payment.status.as_str()
            ),
        ));
    }

    let mut active: customer_payment::ActiveModel = payment.into();
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
            info!("Customer payment {} updated successfully", payment_id);
            Ok(Json(ApiResponse {
                data: CustomerPaymentResponse::from(updated),
                message: "Customer payment updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!(
                "Failed to update customer payment {}: {}",
                payment_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Post a customer payment, reducing the customer's balance in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/api/v1/customer-payments/{payment_id}/post",
    tag = "sales",
    params(("payment_id" = i32, Path, description = "Customer payment ID")),
    responses(
        (status = 200, description = "Customer payment posted", body = ApiResponse<CustomerPaymentResponse>),
        (status = 404, description = "Customer payment not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn post_customer_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CustomerPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_customer_payment_status(state, payment_id, DocumentStatus::Posted).await
}

/// Cancel a customer payment. Cancelling a posted payment restores the
/// customer's balance by that amount.
#[utoipa::path(
    post,
    path = "/api/v1/customer-payments/{payment_id}/cancel",
    tag = "sales",
    params(("payment_id" = i32, Path, description = "Customer payment ID")),
    responses(
        (status = 200, description = "Customer payment cancelled", body = ApiResponse<CustomerPaymentResponse>),
        (status = 404, description = "Customer payment not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_customer_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CustomerPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_customer_payment_status(state, payment_id, DocumentStatus::Cancelled).await
}

async fn change_customer_payment_status(
    state: AppState,
    payment_id: i32,
    next: DocumentStatus,
) -> Result<Json<ApiResponse<CustomerPaymentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;

    let payment = match customer_payment::Entity::find_by_id(payment_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Customer payment with ID {} not found", payment_id);
            return Err(not_found_response("Customer payment", payment_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let current = payment.status;
    if !current.can_transition_to(next) {
        warn!(
            "Rejecting customer payment {} transition {} -> {}",
            payment_id,
            current.as_str(),
            next.as_str()
        );
        return Err(conflict_response(
            "INVALID_STATUS_TRANSITION",
            format!(
                "Cannot move customer payment {} from {} to {}",
                payment_id,
                current.as_str(),
                next.as_str()
            ),
        ));
    }

    let customer_id = payment.customer_id;
    let mut active: customer_payment::ActiveModel = payment.into();
    active.status = Set(next);
    let payment = active.update(&txn).await.map_err(|db_error| {
        error!(
            "Failed to update customer payment {} status: {}",
            payment_id, db_error
        );
        db_error_response(db_error)
    })?;

    if next.is_posted() || current.is_posted() {
        let customer = compute::party::recompute_customer_balance(&txn, customer_id)
            .await
            .map_err(compute_error_response)?;
        debug!(
            "Customer {} balance recomputed to {}",
            customer.id, customer.current_balance
        );
    }

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Customer payment {} moved from {} to {}",
        payment_id,
        current.as_str(),
        next.as_str()
    );
    Ok(Json(ApiResponse {
        data: CustomerPaymentResponse::from(payment),
        message: format!("Customer payment {} successfully", next.as_str()),
        success: true,
    }))
}
