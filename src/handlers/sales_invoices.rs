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
use model::entities::{customer, product, sales_invoice, sales_invoice_line};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a sales invoice (always created as draft)
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateSalesInvoiceRequest {
    /// Invoice number (unique)
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    /// Invoice date
    pub date: NaiveDate,
    /// Customer ID
    pub customer_id: i32,
    /// Invoice-level tax amount (distinct from per-line tax)
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub tax_amount: Option<Decimal>,
    /// Invoice-level discount amount (distinct from per-line discounts)
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub discount_amount: Option<Decimal>,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for updating a draft sales invoice header
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSalesInvoiceRequest {
    /// Invoice date
    pub date: Option<NaiveDate>,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// Invoice-level tax amount
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub tax_amount: Option<Decimal>,
    /// Invoice-level discount amount
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub discount_amount: Option<Decimal>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for adding a line to a draft sales invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct SalesInvoiceLineRequest {
    /// Product ID
    pub product_id: i32,
    /// Quantity (strictly positive)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub quantity: Decimal,
    /// Unit price
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub unit_price: Decimal,
    /// Tax rate percentage, e.g. 14.00 for 14% (default: 0)
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub tax_rate: Option<Decimal>,
    /// Line discount amount, applied after tax (default: 0)
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub discount_amount: Option<Decimal>,
}

/// Request body for updating a line on a draft sales invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSalesInvoiceLineRequest {
    /// Quantity (strictly positive)
    #[validate(custom(function = "crate::handlers::positive_decimal"))]
    pub quantity: Option<Decimal>,
    /// Unit price
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub unit_price: Option<Decimal>,
    /// Tax rate percentage
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub tax_rate: Option<Decimal>,
    /// Line discount amount
    #[validate(custom(function = "crate::handlers::non_negative_decimal"))]
    pub discount_amount: Option<Decimal>,
}

/// Sales invoice line response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesInvoiceLineResponse {
    pub id: i32,
    pub invoice_id: i32,
    pub product_id: i32,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub discount_amount: Decimal,
    /// Derived line total, maintained by the totals rule
    pub total: Decimal,
}

impl From<sales_invoice_line::Model> for SalesInvoiceLineResponse {
    fn from(model: sales_invoice_line::Model) -> Self {
        Self {
            id: model.id,
            invoice_id: model.invoice_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            tax_rate: model.tax_rate,
            discount_amount: model.discount_amount,
            total: model.total,
        }
    }
}

/// Sales invoice response model (header only)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesInvoiceResponse {
    pub id: i32,
    pub number: String,
    pub date: NaiveDate,
    pub customer_id: i32,
    #[schema(value_type = String)]
    pub status: DocumentStatus,
    /// Derived: sum of line totals
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    /// Derived: subtotal + tax_amount - discount_amount
    pub total_amount: Decimal,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

impl From<sales_invoice::Model> for SalesInvoiceResponse {
    fn from(model: sales_invoice::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            date: model.date,
            customer_id: model.customer_id,
            status: model.status,
            subtotal: model.subtotal,
            tax_amount: model.tax_amount,
            discount_amount: model.discount_amount,
            total_amount: model.total_amount,
            due_date: model.due_date,
            notes: model.notes,
        }
    }
}

/// Sales invoice with its lines
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesInvoiceDetailResponse {
    #[serde(flatten)]
    pub invoice: SalesInvoiceResponse,
    pub lines: Vec<SalesInvoiceLineResponse>,
}

/// Loads a draft invoice inside a transaction, rejecting missing or
/// non-draft documents.
async fn load_draft_invoice<C: sea_orm::ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<sales_invoice::Model, (StatusCode, Json<ErrorResponse>)> {
    let invoice = match sales_invoice::Entity::find_by_id(invoice_id).one(conn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Sales invoice with ID {} not found", invoice_id);
            return Err(not_found_response("Sales invoice", invoice_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    if !invoice.status.is_draft() {
        warn!(
            "Sales invoice {} is {} and cannot be edited",
            invoice_id,
            invoice.status.as_str()
        );
        return Err(conflict_response(
            "DOCUMENT_NOT_DRAFT",
            format!(
                "Sales invoice {} is {} and cannot be edited",
                invoice_id,
                invoice.status.as_str()
            ),
        ));
    }

    Ok(invoice)
}

/// Create a new sales invoice in draft status
#[utoipa::path(
    post,
    path = "/api/v1/sales-invoices",
    tag = "sales",
    request_body = CreateSalesInvoiceRequest,
    responses(
        (status = 201, description = "Sales invoice created", body = ApiResponse<SalesInvoiceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Invoice number already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_sales_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateSalesInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SalesInvoiceResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_sales_invoice function");
    debug!(
        "Creating sales invoice {} for customer {}",
        request.number, request.customer_id
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting sales invoice '{}': {}", request.number, errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;

    match customer::Entity::find_by_id(request.customer_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Customer {} not found for sales invoice", request.customer_id);
            return Err(not_found_response("Customer", request.customer_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let new_invoice = sales_invoice::ActiveModel {
        number: Set(request.number.clone()),
        date: Set(request.date),
        customer_id: Set(request.customer_id),
        status: Set(DocumentStatus::Draft),
        subtotal: Set(Decimal::ZERO),
        tax_amount: Set(request.tax_amount.unwrap_or(Decimal::ZERO)),
        discount_amount: Set(request.discount_amount.unwrap_or(Decimal::ZERO)),
        total_amount: Set(Decimal::ZERO),
        due_date: Set(request.due_date),
        notes: Set(request.notes.clone()),
        ..Default::default()
    };

    let invoice = match new_invoice.insert(&txn).await {
        Ok(model) => model,
        Err(db_error) => {
            error!(
                "Failed to create sales invoice '{}': {}",
                request.number, db_error
            );
            if db_error.to_string().to_lowercase().contains("unique") {
                return Err(conflict_response(
                    "NUMBER_ALREADY_EXISTS",
                    format!("Invoice number '{}' already exists", request.number),
                ));
            }
            return Err(db_error_response(db_error));
        }
    };

    // An empty invoice still gets totals: 0 + tax - discount.
    let invoice = compute::invoice::recompute_sales_invoice_totals(&txn, invoice.id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Sales invoice created successfully with ID: {}, number: {}",
        invoice.id, invoice.number
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SalesInvoiceResponse::from(invoice),
            message: "Sales invoice created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Get all sales invoices
#[utoipa::path(
    get,
    path = "/api/v1/sales-invoices",
    tag = "sales",
    responses(
        (status = 200, description = "Sales invoices retrieved", body = ApiResponse<Vec<SalesInvoiceResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sales_invoices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SalesInvoiceResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match sales_invoice::Entity::find()
        .order_by_desc(sales_invoice::Column::Date)
        .order_by_desc(sales_invoice::Column::Number)
        .all(&state.db)
        .await
    {
        Ok(invoices) => {
            debug!("Retrieved {} sales invoices", invoices.len());
            Ok(Json(ApiResponse {
                data: invoices
                    .into_iter()
                    .map(SalesInvoiceResponse::from)
                    .collect(),
                message: "Sales invoices retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve sales invoices: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a sales invoice with its lines
#[utoipa::path(
    get,
    path = "/api/v1/sales-invoices/{invoice_id}",
    tag = "sales",
    params(("invoice_id" = i32, Path, description = "Sales invoice ID")),
    responses(
        (status = 200, description = "Sales invoice retrieved", body = ApiResponse<SalesInvoiceDetailResponse>),
        (status = 404, description = "Sales invoice not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sales_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SalesInvoiceDetailResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let invoice = match sales_invoice::Entity::find_by_id(invoice_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Sales invoice with ID {} not found", invoice_id);
            return Err(not_found_response("Sales invoice", invoice_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let lines = match invoice
        .find_related(sales_invoice_line::Entity)
        .all(&state.db)
        .await
    {
        Ok(lines) => lines,
        Err(db_error) => {
            error!(
                "Failed to retrieve lines for sales invoice {}: {}",
                invoice_id, db_error
            );
            return Err(db_error_response(db_error));
        }
    };

    Ok(Json(ApiResponse {
        data: SalesInvoiceDetailResponse {
            invoice: SalesInvoiceResponse::from(invoice),
            lines: lines
                .into_iter()
                .map(SalesInvoiceLineResponse::from)
                .collect(),
        },
        message: "Sales invoice retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a draft sales invoice header. Changing the invoice-level tax or
/// discount recomputes the totals in the same transaction.
#[utoipa::path(
    put,
    path = "/api/v1/sales-invoices/{invoice_id}",
    tag = "sales",
    params(("invoice_id" = i32, Path, description = "Sales invoice ID")),
    request_body = UpdateSalesInvoiceRequest,
    responses(
        (status = 200, description = "Sales invoice updated", body = ApiResponse<SalesInvoiceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Sales invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_sales_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateSalesInvoiceRequest>,
) -> Result<Json<ApiResponse<SalesInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting sales invoice update {}: {}", invoice_id, errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;
    let invoice = load_draft_invoice(&txn, invoice_id).await?;

    let mut active: sales_invoice::ActiveModel = invoice.into();
    if let Some(date) = request.date {
        active.date = Set(date);
    }
    if let Some(due_date) = request.due_date {
        active.due_date = Set(due_date);
    }
    if let Some(tax_amount) = request.tax_amount {
        active.tax_amount = Set(tax_amount);
    }
    if let Some(discount_amount) = request.discount_amount {
        active.discount_amount = Set(discount_amount);
    }
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }

    active.update(&txn).await.map_err(|db_error| {
        error!("Failed to update sales invoice {}: {}", invoice_id, db_error);
        db_error_response(db_error)
    })?;

    let invoice = compute::invoice::recompute_sales_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!("Sales invoice {} updated successfully", invoice_id);
    Ok(Json(ApiResponse {
        data: SalesInvoiceResponse::from(invoice),
        message: "Sales invoice updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a draft sales invoice; its lines are cascade-deleted with it
#[utoipa::path(
    delete,
    path = "/api/v1/sales-invoices/{invoice_id}",
    tag = "sales",
    params(("invoice_id" = i32, Path, description = "Sales invoice ID")),
    responses(
        (status = 200, description = "Sales invoice deleted", body = ApiResponse<String>),
        (status = 404, description = "Sales invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_sales_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;
    let invoice = load_draft_invoice(&txn, invoice_id).await?;

    invoice.delete(&txn).await.map_err(|db_error| {
        error!("Failed to delete sales invoice {}: {}", invoice_id, db_error);
        db_error_response(db_error)
    })?;

    txn.commit().await.map_err(db_error_response)?;

    info!("Sales invoice {} deleted successfully", invoice_id);
    Ok(Json(ApiResponse {
        data: format!("Sales invoice {} deleted", invoice_id),
        message: "Sales invoice deleted successfully".to_string(),
        success: true,
    }))
}

/// Post a sales invoice, making it contribute to the customer's balance.
/// The balance is recomputed in the same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/sales-invoices/{invoice_id}/post",
    tag = "sales",
    params(("invoice_id" = i32, Path, description = "Sales invoice ID")),
    responses(
        (status = 200, description = "Sales invoice posted", body = ApiResponse<SalesInvoiceResponse>),
        (status = 404, description = "Sales invoice not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn post_sales_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SalesInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_sales_invoice_status(state, invoice_id, DocumentStatus::Posted).await
}

/// Cancel a sales invoice. Cancelling a posted invoice removes it from the
/// customer's balance.
#[utoipa::path(
    post,
    path = "/api/v1/sales-invoices/{invoice_id}/cancel",
    tag = "sales",
    params(("invoice_id" = i32, Path, description = "Sales invoice ID")),
    responses(
        (status = 200, description = "Sales invoice cancelled", body = ApiResponse<SalesInvoiceResponse>),
        (status = 404, description = "Sales invoice not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_sales_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SalesInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_sales_invoice_status(state, invoice_id, DocumentStatus::Cancelled).await
}

async fn change_sales_invoice_status(
    state: AppState,
    invoice_id: i32,
    next: DocumentStatus,
) -> Result<Json<ApiResponse<SalesInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;

    let invoice = match sales_invoice::Entity::find_by_id(invoice_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Sales invoice with ID {} not found", invoice_id);
            return Err(not_found_response("Sales invoice", invoice_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let current = invoice.status;
    if !current.can_transition_to(next) {
        warn!(
            "Rejecting sales invoice {} transition {} -> {}",
            invoice_id,
            current.as_str(),
            next.as_str()
        );
        return Err(conflict_response(
            "INVALID_STATUS_TRANSITION",
            format!(
                "Cannot move sales invoice {} from {} to {}",
                invoice_id,
                current.as_str(),
                next.as_str()
            ),
        ));
    }

    let customer_id = invoice.customer_id;
    let mut active: sales_invoice::ActiveModel = invoice.into();
    active.status = Set(next);
    let invoice = active.update(&txn).await.map_err(|db_error| {
        error!(
            "Failed to update sales invoice {} status: {}",
            invoice_id, db_error
        );
        db_error_response(db_error)
    })?;

    // The posted set changed whenever the document enters or leaves
    // posted, so the counterparty balance follows in the same transaction.
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
        "Sales invoice {} moved from {} to {}",
        invoice_id,
        current.as_str(),
        next.as_str()
    );
    Ok(Json(ApiResponse {
        data: SalesInvoiceResponse::from(invoice),
        message: format!("Sales invoice {} successfully", next.as_str()),
        success: true,
    }))
}

/// Add a line to a draft sales invoice. The line is persisted first, then
/// the invoice totals are recomputed as a distinct step in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/api/v1/sales-invoices/{invoice_id}/lines",
    tag = "sales",
    params(("invoice_id" = i32, Path, description = "Sales invoice ID")),
    request_body = SalesInvoiceLineRequest,
    responses(
        (status = 201, description = "Line added", body = ApiResponse<SalesInvoiceLineResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Invoice or product not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_sales_invoice_line(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<SalesInvoiceLineRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SalesInvoiceLineResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering add_sales_invoice_line for invoice {}", invoice_id);

    if let Err(errors) = request.validate() {
        warn!("Rejecting sales invoice line: {}", errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;
    load_draft_invoice(&txn, invoice_id).await?;

    match product::Entity::find_by_id(request.product_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Product {} not found for invoice line", request.product_id);
            return Err(not_found_response("Product", request.product_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let tax_rate = request.tax_rate.unwrap_or(Decimal::ZERO);
    let discount_amount = request.discount_amount.unwrap_or(Decimal::ZERO);
    let total =
        compute::invoice::line_total(request.quantity, request.unit_price, tax_rate, discount_amount);

    let new_line = sales_invoice_line::ActiveModel {
        invoice_id: Set(invoice_id),
        product_id: Set(request.product_id),
        quantity: Set(request.quantity),
        unit_price: Set(request.unit_price),
        tax_rate: Set(tax_rate),
        discount_amount: Set(discount_amount),
        total: Set(total),
        ..Default::default()
    };

    let line = new_line.insert(&txn).await.map_err(|db_error| {
        error!("Failed to insert sales invoice line: {}", db_error);
        db_error_response(db_error)
    })?;

    let invoice = compute::invoice::recompute_sales_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Line {} added to sales invoice {}; subtotal is now {}",
        line.id, invoice_id, invoice.subtotal
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SalesInvoiceLineResponse::from(line),
            message: "Invoice line added successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a line on a draft sales invoice and recompute the totals
#[utoipa::path(
    put,
    path = "/api/v1/sales-invoices/{invoice_id}/lines/{line_id}",
    tag = "sales",
    params(
        ("invoice_id" = i32, Path, description = "Sales invoice ID"),
        ("line_id" = i32, Path, description = "Invoice line ID"),
    ),
    request_body = UpdateSalesInvoiceLineRequest,
    responses(
        (status = 200, description = "Line updated", body = ApiResponse<SalesInvoiceLineResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Invoice or line not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_sales_invoice_line(
    Path((invoice_id, line_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Json(request): Json<UpdateSalesInvoiceLineRequest>,
) -> Result<Json<ApiResponse<SalesInvoiceLineResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting sales invoice line update: {}", errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;
    load_draft_invoice(&txn, invoice_id).await?;

    let line = match sales_invoice_line::Entity::find_by_id(line_id).one(&txn).await {
        Ok(Some(model)) if model.invoice_id == invoice_id => model,
        Ok(_) => {
            warn!(
                "Line {} not found on sales invoice {}",
                line_id, invoice_id
            );
            return Err(not_found_response("Invoice line", line_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: sales_invoice_line::ActiveModel = line.into();
    if let Some(quantity) = request.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(unit_price) = request.unit_price {
        active.unit_price = Set(unit_price);
    }
    if let Some(tax_rate) = request.tax_rate {
        active.tax_rate = Set(tax_rate);
    }
    if let Some(discount_amount) = request.discount_amount {
        active.discount_amount = Set(discount_amount);
    }

    active.update(&txn).await.map_err(|db_error| {
        error!("Failed to update sales invoice line {}: {}", line_id, db_error);
        db_error_response(db_error)
    })?;

    // The totals rule repairs the stored line total from the new fields.
    compute::invoice::recompute_sales_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    let line = match sales_invoice_line::Entity::find_by_id(line_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => return Err(not_found_response("Invoice line", line_id)),
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    txn.commit().await.map_err(db_error_response)?;

    info!("Line {} on sales invoice {} updated", line_id, invoice_id);
    Ok(Json(ApiResponse {
        data: SalesInvoiceLineResponse::from(line),
        message: "Invoice line updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a line from a draft sales invoice and recompute the totals
#[utoipa::path(
    delete,
    path = "/api/v1/sales-invoices/{invoice_id}/lines/{line_id}",
    tag = "sales",
    params(
        ("invoice_id" = i32, Path, description = "Sales invoice ID"),
        ("line_id" = i32, Path, description = "Invoice line ID"),
    ),
    responses(
        (status = 200, description = "Line deleted", body = ApiResponse<String>),
        (status = 404, description = "Invoice or line not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_sales_invoice_line(
    Path((invoice_id, line_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;
    load_draft_invoice(&txn, invoice_id).await?;

    let line = match sales_invoice_line::Entity::find_by_id(line_id).one(&txn).await {
        Ok(Some(model)) if model.invoice_id == invoice_id => model,
        Ok(_) => {
            warn!(
                "Line {} not found on sales invoice {}",
                line_id, invoice_id
            );
            return Err(not_found_response("Invoice line", line_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    line.delete(&txn).await.map_err(|db_error| {
        error!("Failed to delete sales invoice line {}: {}", line_id, db_error);
        db_error_response(db_error)
    })?;

    let invoice = compute::invoice::recompute_sales_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Line {} deleted from sales invoice {}; subtotal is now {}",
        line_id, invoice_id, invoice.subtotal
    );
    Ok(Json(ApiResponse {
        data: format!("Invoice line {} deleted", line_id),
        message: "Invoice line deleted successfully".to_string(),
        success: true,
    }))
}
