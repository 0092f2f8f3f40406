use crate::handlers::{db_error_response, validation_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::category;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a product category
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    /// Category code (unique)
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    /// Category name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Optional parent category ID
    pub parent_id: Option<i32>,
    /// Category description
    pub description: Option<String>,
}

/// Request body for updating a category
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCategoryRequest {
    /// Category name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Optional parent category ID
    pub parent_id: Option<i32>,
    /// Category description
    pub description: Option<String>,
    /// Whether the category is active
    pub is_active: Option<bool>,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub parent_id: Option<i32>,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            parent_id: model.parent_id,
            description: model.description,
            is_active: model.is_active,
        }
    }
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "inventory",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Category code already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating category with code: {}", request.code);

    if let Err(errors) = request.validate() {
        warn!("Rejecting category '{}': {}", request.code, errors);
        return Err(validation_error_response(errors));
    }

    let new_category = category::ActiveModel {
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        parent_id: Set(request.parent_id),
        description: Set(request.description.clone()),
        is_active: Set(true),
        ..Default::default()
    };

    match new_category.insert(&state.db).await {
        Ok(model) => {
            info!("Category created successfully with ID: {}", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: CategoryResponse::from(model),
                    message: "Category created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create category '{}': {}", request.code, db_error);
            if db_error.to_string().to_lowercase().contains("unique") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "CODE_ALREADY_EXISTS",
                        format!("Category code '{}' already exists", request.code),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}

/// Get all categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "inventory",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match category::Entity::find().all(&state.db).await {
        Ok(categories) => {
            debug!("Retrieved {} categories", categories.len());
            Ok(Json(ApiResponse {
                data: categories.into_iter().map(CategoryResponse::from).collect(),
                message: "Categories retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve categories: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a specific category by ID
#[utoipa::path(
    get,
    path = "/api/v1/categories/{category_id}",
    tag = "inventory",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category retrieved successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CategoryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: CategoryResponse::from(model),
            message: "Category retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Category with ID {} not found", category_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Category {} not found", category_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to retrieve category {}: {}", category_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "inventory",
    params(("category_id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting category update {}: {}", category_id, errors);
        return Err(validation_error_response(errors));
    }

    let existing = match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Category with ID {} not found for update", category_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Category {} not found", category_id),
                )),
            ));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: category::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(parent_id) = request.parent_id {
        active.parent_id = Set(Some(parent_id));
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Category with ID {} updated successfully", category_id);
            Ok(Json(ApiResponse {
                data: CategoryResponse::from(updated),
                message: "Category updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update category {}: {}", category_id, db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Delete a category. Blocked while products still reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "inventory",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    match category::Entity::delete_by_id(category_id).exec(&state.db).await {
        Ok(result) if result.rows_affected > 0 => {
            info!("Category with ID {} deleted successfully", category_id);
            Ok(Json(ApiResponse {
                data: format!("Category {} deleted", category_id),
                message: "Category deleted successfully".to_string(),
                success: true,
            }))
        }
        Ok(_) => {
            warn!("Category with ID {} not found for deletion", category_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "NOT_FOUND",
                    format!("Category {} not found", category_id),
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to delete category {}: {}", category_id, db_error);
            if db_error.to_string().to_lowercase().contains("foreign key") {
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        "REFERENCE_EXISTS",
                        format!("Category {} is still referenced by products", category_id),
                    )),
                ))
            } else {
                Err(db_error_response(db_error))
            }
        }
    }
}
