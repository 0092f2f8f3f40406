use crate::handlers::{compute_error_response, db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::stock_movement::{self, MovementDirection, MovementReason};
use model::entities::{product, warehouse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for recording a stock movement
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateStockMovementRequest {
    /// Movement date
    pub date: NaiveDate,
    /// Product ID
    pub product_id: i32,
    /// Warehouse ID
    pub warehouse_id: i32,
    /// Movement direction (in/out)
    #[schema(value_type = String, example = "in")]
    pub direction: MovementDirection,
    /// Movement reason (purchase/sale/return_in/return_out/adjustment/transfer)
    #[schema(value_type = String, example = "purchase")]
    pub reason: MovementReason,
    /// Quantity (strictly positive)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub quantity: Decimal,
    /// Unit price at movement time
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub unit_price: Decimal,
    /// Source document reference
    #[validate(length(min = 1, max = 50))]
    pub reference: String,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Query parameters for listing stock movements
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct StockMovementListQuery {
    /// Restrict to one product
    pub product_id: Option<i32>,
}

/// Stock movement response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockMovementResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub product_id: i32,
    pub warehouse_id: i32,
    #[schema(value_type = String)]
    pub direction: MovementDirection,
    #[schema(value_type = String)]
    pub reason: MovementReason,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub reference: String,
    pub notes: Option<String>,
}

impl From<stock_movement::Model> for StockMovementResponse {
    fn from(model: stock_movement::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            product_id: model.product_id,
            warehouse_id: model.warehouse_id,
            direction: model.direction,
            reason: model.reason,
            quantity: model.quantity,
            unit_price: model.unit_price,
            reference: model.reference,
            notes: model.notes,
        }
    }
}

/// Record a stock movement and recompute the product's stock level in the
/// same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/stock-movements",
    tag = "inventory",
    request_body = CreateStockMovementRequest,
    responses(
        (status = 201, description = "Stock movement recorded", body = ApiResponse<StockMovementResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Product or warehouse not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_stock_movement(
    State(state): State<AppState>,
    Json(request): Json<CreateStockMovementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StockMovementResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_stock_movement function");
    debug!(
        "Recording {:?} movement of {} for product {}",
        request.direction, request.quantity, request.product_id
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting stock movement: {}", errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;

    match product::Entity::find_by_id(request.product_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Product {} not found for stock movement", request.product_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Product {} not found", request.product_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }
    match warehouse::Entity::find_by_id(request.warehouse_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(
                "Warehouse {} not found for stock movement",
                request.warehouse_id
            );
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Warehouse {} not found", request.warehouse_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let new_movement = stock_movement::ActiveModel {
        date: Set(request.date),
        product_id: Set(request.product_id),
        warehouse_id: Set(request.warehouse_id),
        direction: Set(request.direction),
        reason: Set(request.reason),
        quantity: Set(request.quantity),
        unit_price: Set(request.unit_price),
        reference: Set(request.reference.clone()),
        notes: Set(request.notes.clone()),
        ..Default::default()
    };

    let movement = new_movement.insert(&txn).await.map_err(|db_error| {
        error!("Failed to insert stock movement: {}", db_error);
        db_error_response(db_error)
    })?;

    let product = compute::stock::recompute_product_stock(&txn, request.product_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Stock movement {} recorded; product {} stock is now {}",
        movement.id, product.id, product.current_stock
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: StockMovementResponse::from(movement),
            message: "Stock movement recorded successfully".to_string(),
            success: true,
        }),
    ))
}

/// Get all stock movements, optionally filtered by product
#[utoipa::path(
    get,
    path = "/api/v1/stock-movements",
    tag = "inventory",
    params(StockMovementListQuery),
    responses(
        (status = 200, description = "Stock movements retrieved", body = ApiResponse<Vec<StockMovementResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_stock_movements(
    Query(query): Query<StockMovementListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StockMovementResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let mut select = stock_movement::Entity::find()
        .order_by_desc(stock_movement::Column::Date)
        .order_by_desc(stock_movement::Column::Id);
    if let Some(product_id) = query.product_id {
        select = select.filter(stock_movement::Column::ProductId.eq(product_id));
    }

    match select.all(&state.db).await {
        Ok(movements) => {
            debug!("Retrieved {} stock movements", movements.len());
            Ok(Json(ApiResponse {
                data: movements
                    .into_iter()
                    .map(StockMovementResponse::from)
                    .collect(),
                message: "Stock movements retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve stock movements: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific stock movement by ID
#[utoipa::path(
    get,
    path = "/api/v1/stock-movements/{movement_id}",
    tag = "inventory",
    params(("movement_id" = i32, Path, description = "Stock movement ID")),
    responses(
        (status = 200, description = "Stock movement retrieved", body = ApiResponse<StockMovementResponse>),
        (status = 404, description = "Stock movement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_stock_movement(
    Path(movement_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StockMovementResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match stock_movement::Entity::find_by_id(movement_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: StockMovementResponse::from(model),
            message: "Stock movement retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Stock movement with ID {} not found", movement_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Stock movement {} not found", movement_id),
                )),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve stock movement {}: {}",
                movement_id, db_error
            );
            Err(db_error_response(db_error))
        }
    }
}

/// Delete a stock movement and recompute the product's stock level in the
/// same transaction.
#[utoipa::path(
    delete,
    path = "/api/v1/stock-movements/{movement_id}",
    tag = "inventory",
    params(("movement_id" = i32, Path, description = "Stock movement ID")),
    responses(
        (status = 200, description = "Stock movement deleted", body = ApiResponse<String>),
        (status = 404, description = "Stock movement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_stock_movement(
    Path(movement_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering delete_stock_movement for movement_id: {}",
        movement_id
    );

    let txn = state.db.begin().await.map_err(db_error_response)?;

    let movement = match stock_movement::Entity::find_by_id(movement_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Stock movement with ID {} not found for deletion", movement_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Stock movement {} not found", movement_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let product_id = movement.product_id;
    movement.delete(&txn).await.map_err(|db_error| {
        error!("Failed to delete stock movement {}: {}", movement_id, db_error);
        db_error_response(db_error)
    })?;

    let product = compute::stock::recompute_product_stock(&txn, product_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Stock movement {} deleted; product {} stock is now {}",
        movement_id, product.id, product.current_stock
    );
    Ok(Json(ApiResponse {
        data: format!("Stock movement {} deleted", movement_id),
        message: "Stock movement deleted successfully".to_string(),
        success: true,
    }))
}
