use crate::handlers::compute_error_response;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use common::{DashboardSummary, LowStockRow, TrialBalance};
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the dashboard report
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct DashboardQuery {
    /// Day to report on (YYYY-MM-DD, default: today)
    pub date: Option<NaiveDate>,
}

/// Get the trial balance over all active accounts
#[utoipa::path(
    get,
    path = "/api/v1/reports/trial-balance",
    tag = "reports",
    responses(
        (status = 200, description = "Trial balance retrieved", body = ApiResponse<TrialBalance>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_trial_balance(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TrialBalance>>, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = "trial_balance".to_string();

    if let Some(CachedData::TrialBalance(report)) = state.cache.get(&cache_key).await {
        debug!("Serving trial balance from cache");
        return Ok(Json(ApiResponse {
            data: report,
            message: "Trial balance retrieved from cache".to_string(),
            success: true,
        }));
    }

    let report = compute::reports::trial_balance(&state.db)
        .await
        .map_err(compute_error_response)?;

    state
        .cache
        .insert(cache_key, CachedData::TrialBalance(report.clone()))
        .await;

    Ok(Json(ApiResponse {
        data: report,
        message: "Trial balance retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get the active products at or below their minimum stock
#[utoipa::path(
    get,
    path = "/api/v1/reports/low-stock",
    tag = "reports",
    responses(
        (status = 200, description = "Low stock report retrieved", body = ApiResponse<Vec<LowStockRow>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_low_stock(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LowStockRow>>>, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = "low_stock".to_string();

    if let Some(CachedData::LowStock(rows)) = state.cache.get(&cache_key).await {
        debug!("Serving low stock report from cache");
        return Ok(Json(ApiResponse {
            data: rows,
            message: "Low stock report retrieved from cache".to_string(),
            success: true,
        }));
    }

    let rows = compute::reports::low_stock(&state.db)
        .await
        .map_err(compute_error_response)?;

    state
        .cache
        .insert(cache_key, CachedData::LowStock(rows.clone()))
        .await;

    Ok(Json(ApiResponse {
        data: rows,
        message: "Low stock report retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get the dashboard summary: the day's posted sales, product counts and
/// recent invoices
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    tag = "reports",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard summary retrieved", body = ApiResponse<DashboardSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dashboard(
    Query(query): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let today = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let cache_key = format!("dashboard_{}", today);

    if let Some(CachedData::Dashboard(summary)) = state.cache.get(&cache_key).await {
        debug!("Serving dashboard summary from cache");
        return Ok(Json(ApiResponse {
            data: summary,
            message: "Dashboard summary retrieved from cache".to_string(),
            success: true,
        }));
    }

    let summary = compute::reports::dashboard(&state.db, today)
        .await
        .map_err(compute_error_response)?;

    state
        .cache
        .insert(cache_key, CachedData::Dashboard(summary.clone()))
        .await;

    Ok(Json(ApiResponse {
        data: summary,
        message: "Dashboard summary retrieved successfully".to_string(),
        success: true,
    }))
}
