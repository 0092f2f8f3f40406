use crate::handlers::{db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::product::{self, Unit};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a product
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    /// Product code (unique)
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Barcode
    pub barcode: Option<String>,
    /// Product name
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Product description
    pub description: Option<String>,
    /// Category ID
    pub category_id: i32,
    /// Unit of measure (piece/kg/meter/liter)
    #[schema(value_type = String, example = "piece")]
    pub unit: Unit,
    /// Purchase price
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub purchase_price: Decimal,
    /// Sale price
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub sale_price: Decimal,
    /// Minimum stock threshold (default: 0)
    pub min_stock: Option<Decimal>,
}

/// Request body for updating a product. The derived stock level is never
/// writable.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    /// Barcode
    pub barcode: Option<String>,
    /// Product name
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Product description
    pub description: Option<String>,
    /// Category ID
    pub category_id: Option<i32>,
    /// Purchase price
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub purchase_price: Option<Decimal>,
    /// Sale price
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub sale_price: Option<Decimal>,
    /// Minimum stock threshold
    pub min_stock: Option<Decimal>,
    /// Whether the product is active
    pub is_active: Option<bool>,
}

/// Product response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub code: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i32,
    #[schema(value_type = String)]
    pub unit: Unit,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub min_stock: Decimal,
    /// Derived stock level, maintained by the stock rule
    pub current_stock: Decimal,
    pub is_active: bool,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            barcode: model.barcode,
            name: model.name,
            description: model.description,
            category_id: model.category_id,
            unit: model.unit,
            purchase_price: model.purchase_price,
            sale_price: model.sale_price,
            min_stock: model.min_stock,
            current_stock: model.current_stock,
            is_active: model.is_active,
        }
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "inventory",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created successfully", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Product code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!(
        "Creating product with code: {}, category: {}",
        request.code, request.category_id
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting product '{}': {}", request.code, errors);
        return Err(validation_error_response(errors));
    }

    let new_product = product::ActiveModel {
        code: Set(request.code.clone()),
        barcode: Set(request.barcode.clone()),
        name: Set(request.name.clone()),
        description: Set(request.description.clone()),
        category_id: Set(request.category_id),
        unit: Set(request.unit),
        purchase_price: Set(request.purchase_price),
        sale_price: Set(request.sale_price),
        min_stock: Set(request.min_stock.unwrap_or(Decimal::ZERO)),
        current_stock: Set(Decimal::ZERO),
        is_active: Set(true),
        ..Default::default()
    };

    match new_product.insert(&state.db).await {
        Ok(model) => {
            info!(
                "Product created successfully with ID: {}, code: {}",
                model.id, model.code
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: ProductResponse::from(model),
                    message: "Product created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create product '{}': {}", request.code, db_error);
            let message = db_error.to_string().to_lowercase();
            if message.contains("unique") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "CODE_ALREADY_EXISTS",
                        format!("Product code '{}' already exists", request.code),
                    )),
                ))
            } else if message.contains("foreign key") {
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new(
                        "NOT_FOUND",
                        format!("Category {} not found", request.category_id),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}

/// Get all products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "inventory",
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match product::Entity::find().all(&state.db).await {
        Ok(products) => {
            debug!("Retrieved {} products", products.len());
            Ok(Json(ApiResponse {
                data: products.into_iter().map(ProductResponse::from).collect(),
                message: "Products retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve products: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    tag = "inventory",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match product::Entity::find_by_id(product_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: ProductResponse::from(model),
            message: "Product retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Product with ID {} not found", product_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Product {} not found", product_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve product {}: {}", product_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{product_id}",
    tag = "inventory",
    params(("product_id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting product update {}: {}", product_id, errors);
        return Err(validation_error_response(errors));
    }

    let existing = match product::Entity::find_by_id(product_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Product with ID {} not found for update", product_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Product {} not found", product_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: product::ActiveModel = existing.into();
    if let Some(barcode) = request.barcode {
        active.barcode = Set(Some(barcode));
    }
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(category_id) = request.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(purchase_price) = request.purchase_price {
        active.purchase_price = Set(purchase_price);
    }
    if let Some(sale_price) = request.sale_price {
        active.sale_price = Set(sale_price);
    }
    if let Some(min_stock) = request.min_stock {
        active.min_stock = Set(min_stock);
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Product with ID {} updated successfully", product_id);
            Ok(Json(ApiResponse {
                data: ProductResponse::from(updated),
                message: "Product updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update product {}: {}", product_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Delete a product. Blocked while movements or invoice lines still
/// reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "inventory",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    match product::Entity::delete_by_id(product_id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Product with ID {} deleted successfully", product_id);
            Ok(Json(ApiResponse {
                data: format!("Product {} deleted", product_id),
                message: "Product deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => {
            warn!("Product with ID {} not found for deletion", product_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Product {} not found", product_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to delete product {}: {}", product_id, db_error);
            if db_error.to_string().to_lowercase().contains("foreign key") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "REFERENCE_EXISTS",
                        format!(
                            "Product {} is still referenced by movements or invoice lines",
                            product_id
                        ),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}
