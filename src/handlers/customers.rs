use crate::handlers::{db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::customer;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a customer
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCustomerRequest {
    /// Customer code (unique)
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Customer name
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Contact person
    pub contact_person: Option<String>,
    /// Phone number
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    /// Email address
    #[validate(email)]
    pub email: Option<String>,
    /// Postal address
    #[validate(length(min = 1))]
    pub address: String,
    /// Tax registration number
    pub tax_number: Option<String>,
    /// Receivable control account ID
    pub account_id: i32,
    /// Credit limit (default: 0)
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub credit_limit: Option<Decimal>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for updating a customer. The derived balance is never
/// writable.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCustomerRequest {
    /// Customer name
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Contact person
    pub contact_person: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    #[validate(email)]
    pub email: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Tax registration number
    pub tax_number: Option<String>,
    /// Credit limit
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub credit_limit: Option<Decimal>,
    /// Whether the customer is active
    pub is_active: Option<bool>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Customer response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub tax_number: Option<String>,
    pub account_id: i32,
    pub credit_limit: Decimal,
    /// Derived balance: posted invoices minus posted payments
    pub current_balance: Decimal,
    pub is_active: bool,
    pub notes: Option<String>,
}

impl From<customer::Model> for CustomerResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            contact_person: model.contact_person,
            phone: model.phone,
            email: model.email,
            address: model.address,
            tax_number: model.tax_number,
            account_id: model.account_id,
            credit_limit: model.credit_limit,
            current_balance: model.current_balance,
            is_active: model.is_active,
            notes: model.notes,
        }
    }
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "sales",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created successfully", body = ApiResponse<CustomerResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Customer code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating customer with code: {}", request.code);

    if let Err(errors) = request.validate() {
        warn!("Rejecting customer '{}': {}", request.code, errors);
        return Err(validation_error_response(errors));
    }

    let new_customer = customer::ActiveModel {
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        contact_person: Set(request.contact_person.clone()),
        phone: Set(request.phone.clone()),
        email: Set(request.email.clone()),
        address: Set(request.address.clone()),
        tax_number: Set(request.tax_number.clone()),
        account_id: Set(request.account_id),
        credit_limit: Set(request.credit_limit.unwrap_or(Decimal::ZERO)),
        current_balance: Set(Decimal::ZERO),
        is_active: Set(true),
        notes: Set(request.notes.clone()),
        ..Default::default()
    };

    match new_customer.insert(&state.db).await {
        Ok(model) => {
            info!(
                "Customer created successfully with ID: {}, code: {}",
                model.id, model.code
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: CustomerResponse::from(model),
                    message: "Customer created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create customer '{}': {}", request.code, db_error);
            let message = db_error.to_string().to_lowercase();
            if message.contains("unique") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "CODE_ALREADY_EXISTS",
                        format!("Customer code '{}' already exists", request.code),
                    )),
                ))
            } else if message.contains("foreign key") {
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new(
                        "NOT_FOUND",
                        format!("Account {} not found", request.account_id),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}

/// Get all customers
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "sales",
    responses(
        (status = 200, description = "Customers retrieved successfully", body = ApiResponse<Vec<CustomerResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_customers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CustomerResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match customer::Entity::find().all(&state.db).await {
        Ok(customers) => {
            debug!("Retrieved {} customers", customers.len());
            Ok(Json(ApiResponse {
                data: customers.into_iter().map(CustomerResponse::from).collect(),
                message: "Customers retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve customers: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific customer by ID
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}",
    tag = "sales",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer retrieved successfully", body = ApiResponse<CustomerResponse>),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_customer(
    Path(customer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CustomerResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match customer::Entity::find_by_id(customer_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: CustomerResponse::from(model),
            message: "Customer retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Customer with ID {} not found", customer_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Customer {} not found", customer_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve customer {}: {}", customer_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Update a customer
#[utoipa::path(
    put,
    path = "/api/v1/customers/{customer_id}",
    tag = "sales",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated successfully", body = ApiResponse<CustomerResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_customer(
    Path(customer_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting customer update {}: {}", customer_id, errors);
        return Err(validation_error_response(errors));
    }

    let existing = match customer::Entity::find_by_id(customer_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Customer with ID {} not found for update", customer_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Customer {} not found", customer_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: customer::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(contact_person) = request.contact_person {
        active.contact_person = Set(Some(contact_person));
    }
    if let Some(phone) = request.phone {
        active.phone = Set(phone);
    }
    if let Some(email) = request.email {
        active.email = Set(Some(email));
    }
    if let Some(address) = request.address {
        active.address = Set(address);
    }
    if let Some(tax_number) = request.tax_number {
        active.tax_number = Set(Some(tax_number));
    }
    if let Some(credit_limit) = request.credit_limit {
        active.credit_limit = Set(credit_limit);
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Customer with ID {} updated successfully", customer_id);
            Ok(Json(ApiResponse {
                data: CustomerResponse::from(updated),
                message: "Customer updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update customer {}: {}", customer_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Delete a customer. Blocked while invoices or payments still reference
/// them.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{customer_id}",
    tag = "sales",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Customer is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_customer(
    Path(customer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    match customer::Entity::delete_by_id(customer_id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Customer with ID {} deleted successfully", customer_id);
            Ok(Json(ApiResponse {
                data: format!("Customer {} deleted", customer_id),
                message: "Customer deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => {
            warn!("Customer with ID {} not found for deletion", customer_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Customer {} not found", customer_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to delete customer {}: {}", customer_id, db_error);
            if db_error.to_string().to_lowercase().contains("foreign key") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "REFERENCE_EXISTS",
                        format!(
                            "Customer {} is still referenced by invoices or payments",
                            customer_id
                        ),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}
