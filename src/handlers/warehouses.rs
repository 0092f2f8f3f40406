use crate::handlers::{db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::warehouse;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a warehouse
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateWarehouseRequest {
    /// Warehouse code (unique)
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    /// Warehouse name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Physical location
    #[validate(length(min = 1))]
    pub location: String,
}

/// Request body for updating a warehouse
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateWarehouseRequest {
    /// Warehouse name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Physical location
    pub location: Option<String>,
    /// Whether the warehouse is active
    pub is_active: Option<bool>,
}

/// Warehouse response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WarehouseResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub location: String,
    pub is_active: bool,
}

impl From<warehouse::Model> for WarehouseResponse {
    fn from(model: warehouse::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            location: model.location,
            is_active: model.is_active,
        }
    }
}

/// Create a new warehouse
#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    tag = "inventory",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created successfully", body = ApiResponse<WarehouseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Warehouse code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(request): Json<CreateWarehouseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WarehouseResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating warehouse with code: {}", request.code);

    if let Err(errors) = request.validate() {
        warn!("Rejecting warehouse '{}': {}", request.code, errors);
        return Err(validation_error_response(errors));
    }

    let new_warehouse = warehouse::ActiveModel {
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        location: Set(request.location.clone()),
        is_active: Set(true),
        ..Default::default()
    };

    match new_warehouse.insert(&state.db).await {
        Ok(model) => {
            info!("Warehouse created successfully with ID: {}", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: WarehouseResponse::from(model),
                    message: "Warehouse created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create warehouse '{}': {}", request.code, db_error);
            if db_error.to_string().to_lowercase().contains("unique") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "CODE_ALREADY_EXISTS",
                        format!("Warehouse code '{}' already exists", request.code),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}

/// Get all warehouses
#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    tag = "inventory",
    responses(
        (status = 200, description = "Warehouses retrieved successfully", body = ApiResponse<Vec<WarehouseResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_warehouses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WarehouseResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match warehouse::Entity::find().all(&state.db).await {
        Ok(warehouses) => {
            debug!("Retrieved {} warehouses", warehouses.len());
            Ok(Json(ApiResponse {
                data: warehouses.into_iter().map(WarehouseResponse::from).collect(),
                message: "Warehouses retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve warehouses: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific warehouse by ID
#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{warehouse_id}",
    tag = "inventory",
    params(("warehouse_id" = i32, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse retrieved successfully", body = ApiResponse<WarehouseResponse>),
        (status = 404, description = "Warehouse not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_warehouse(
    Path(warehouse_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WarehouseResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match warehouse::Entity::find_by_id(warehouse_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: WarehouseResponse::from(model),
            message: "Warehouse retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Warehouse with ID {} not found", warehouse_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Warehouse {} not found", warehouse_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve warehouse {}: {}", warehouse_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Update a warehouse
#[utoipa::path(
    put,
    path = "/api/v1/warehouses/{warehouse_id}",
    tag = "inventory",
    params(("warehouse_id" = i32, Path, description = "Warehouse ID")),
    request_body = UpdateWarehouseRequest,
    responses(
        (status = 200, description = "Warehouse updated successfully", body = ApiResponse<WarehouseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Warehouse not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_warehouse(
    Path(warehouse_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateWarehouseRequest>,
) -> Result<Json<ApiResponse<WarehouseResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting warehouse update {}: {}", warehouse_id, errors);
        return Err(validation_error_response(errors));
    }

    let existing = match warehouse::Entity::find_by_id(warehouse_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Warehouse with ID {} not found for update", warehouse_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Warehouse {} not found", warehouse_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: warehouse::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(location) = request.location {
        active.location = Set(location);
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Warehouse with ID {} updated successfully", warehouse_id);
            Ok(Json(ApiResponse {
                data: WarehouseResponse::from(updated),
                message: "Warehouse updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update warehouse {}: {}", warehouse_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Delete a warehouse. Blocked while stock movements still reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/warehouses/{warehouse_id}",
    tag = "inventory",
    params(("warehouse_id" = i32, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Warehouse not found", body = ErrorResponse),
        (status = 409, description = "Warehouse is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_warehouse(
    Path(warehouse_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    match warehouse::Entity::delete_by_id(warehouse_id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Warehouse with ID {} deleted successfully", warehouse_id);
            Ok(Json(ApiResponse {
                data: format!("Warehouse {} deleted", warehouse_id),
                message: "Warehouse deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => {
            warn!("Warehouse with ID {} not found for deletion", warehouse_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Warehouse {} not found", warehouse_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to delete warehouse {}: {}", warehouse_id, db_error);
            if db_error.to_string().to_lowercase().contains("foreign key") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "REFERENCE_EXISTS",
                        format!(
                            "Warehouse {} is still referenced by stock movements",
                            warehouse_id
                        ),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}
