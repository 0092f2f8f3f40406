use crate::handlers::{db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::supplier;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a supplier
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateSupplierRequest {
    /// Supplier code (unique)
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Supplier name
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
    /// Payable control account ID
    pub account_id: i32,
    /// Credit limit (default: 0)
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub credit_limit: Option<Decimal>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for updating a supplier. The derived balance is never
/// writable.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSupplierRequest {
    /// Supplier name
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
    /// Whether the supplier is active
    pub is_active: Option<bool>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Supplier response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierResponse {
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

impl From<supplier::Model> for SupplierResponse {
    fn from(model: supplier::Model) -> Self {
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

/// Create a new supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    tag = "purchases",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created successfully", body = ApiResponse<SupplierResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Supplier code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(request): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SupplierResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating supplier with code: {}", request.code);

    if let Err(errors) = request.validate() {
        warn!("Rejecting supplier '{}': {}", request.code, errors);
        return Err(validation_error_response(errors));
    }

    let new_supplier = supplier::ActiveModel {
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

    match new_supplier.insert(&state.db).await {
        Ok(model) => {
            info!(
                "Supplier created successfully with ID: {}, code: {}",
                model.id, model.code
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: SupplierResponse::from(model),
                    message: "Supplier created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create supplier '{}': {}", request.code, db_error);
            let message = db_error.to_string().to_lowercase();
            if message.contains("unique") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "CODE_ALREADY_EXISTS",
                        format!("Supplier code '{}' already exists", request.code),
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

/// Get all suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    tag = "purchases",
    responses(
        (status = 200, description = "Suppliers retrieved successfully", body = ApiResponse<Vec<SupplierResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_suppliers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SupplierResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match supplier::Entity::find().all(&state.db).await {
        Ok(suppliers) => {
            debug!("Retrieved {} suppliers", suppliers.len());
            Ok(Json(ApiResponse {
                data: suppliers.into_iter().map(SupplierResponse::from).collect(),
                message: "Suppliers retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve suppliers: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific supplier by ID
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{supplier_id}",
    tag = "purchases",
    params(("supplier_id" = i32, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier retrieved successfully", body = ApiResponse<SupplierResponse>),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_supplier(
    Path(supplier_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SupplierResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match supplier::Entity::find_by_id(supplier_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: SupplierResponse::from(model),
            message: "Supplier retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Supplier with ID {} not found", supplier_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Supplier {} not found", supplier_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve supplier {}: {}", supplier_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Update a supplier
#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{supplier_id}",
    tag = "purchases",
    params(("supplier_id" = i32, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated successfully", body = ApiResponse<SupplierResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_supplier(
    Path(supplier_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateSupplierRequest>,
) -> Result<Json<ApiResponse<SupplierResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting supplier update {}: {}", supplier_id, errors);
        return Err(validation_error_response(errors));
    }

    let existing = match supplier::Entity::find_by_id(supplier_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Supplier with ID {} not found for update", supplier_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Supplier {} not found", supplier_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: supplier::ActiveModel = existing.into();
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
            info!("Supplier with ID {} updated successfully", supplier_id);
            Ok(Json(ApiResponse {
                data: SupplierResponse::from(updated),
                message: "Supplier updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update supplier {}: {}", supplier_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Delete a supplier. Blocked while invoices or payments still reference
/// them.
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{supplier_id}",
    tag = "purchases",
    params(("supplier_id" = i32, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 409, description = "Supplier is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_supplier(
    Path(supplier_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    match supplier::Entity::delete_by_id(supplier_id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Supplier with ID {} deleted successfully", supplier_id);
            Ok(Json(ApiResponse {
                data: format!("Supplier {} deleted", supplier_id),
                message: "Supplier deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => {
            warn!("Supplier with ID {} not found for deletion", supplier_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Supplier {} not found", supplier_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to delete supplier {}: {}", supplier_id, db_error);
            if db_error.to_string().to_lowercase().contains("foreign key") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "REFERENCE_EXISTS",
                        format!(
                            "Supplier {} is still referenced by invoices or payments",
                            supplier_id
                        ),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}
