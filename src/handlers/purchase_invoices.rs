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
use model::entities::{product, purchase_invoice, purchase_invoice_line, supplier};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a purchase invoice (always created as draft)
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreatePurchaseInvoiceRequest {
    /// Invoice number (unique)
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    /// Invoice date
    pub date: NaiveDate,
    /// Supplier ID
    pub supplier_id: i32,
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

/// Request body for updating a draft purchase invoice header
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdatePurchaseInvoiceRequest {
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

/// Request body for adding a line to a draft purchase invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct PurchaseInvoiceLineRequest {
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

/// Request body for updating a line on a draft purchase invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdatePurchaseInvoiceLineRequest {
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

/// Purchase invoice line response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseInvoiceLineResponse {
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

impl From<purchase_invoice_line::Model> for PurchaseInvoiceLineResponse {
    fn from(model: purchase_invoice_line::Model) -> Self {
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

/// Purchase invoice response model (header only)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseInvoiceResponse {
    pub id: i32,
    pub number: String,
    pub date: NaiveDate,
    pub supplier_id: i32,
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

impl From<purchase_invoice::Model> for PurchaseInvoiceResponse {
    fn from(model: purchase_invoice::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            date: model.date,
            supplier_id: model.supplier_id,
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

/// Purchase invoice with its lines
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseInvoiceDetailResponse {
    #[serde(flatten)]
    pub invoice: PurchaseInvoiceResponse,
    pub lines: Vec<PurchaseInvoiceLineResponse>,
}

/// Loads a draft invoice inside a transaction, rejecting missing or
/// non-draft documents.
async fn load_draft_invoice<C: sea_orm::ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<purchase_invoice::Model, (StatusCode, Json<ErrorResponse>)> {
    let invoice = match purchase_invoice::Entity::find_by_id(invoice_id).one(conn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Purchase invoice with ID {} not found", invoice_id);
            return Err(not_found_response("Purchase invoice", invoice_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    if !invoice.status.is_draft() {
        warn!(
            "Purchase invoice {} is {} and cannot be edited",
            invoice_id,
            invoice.status.as_str()
        );
        return Err(conflict_response(
            "DOCUMENT_NOT_DRAFT",
            format!(
                "Purchase invoice {} is {} and cannot be edited",
                invoice_id,
                invoice.status.as_str()
            ),
        ));
    }

    Ok(invoice)
}

/// Create a new purchase invoice in draft status
#[utoipa::path(
    post,
    path = "/api/v1/purchase-invoices",
    tag = "purchases",
    request_body = CreatePurchaseInvoiceRequest,
    responses(
        (status = 201, description = "Purchase invoice created", body = ApiResponse<PurchaseInvoiceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 409, description = "Invoice number already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_purchase_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseInvoiceRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<PurchaseInvoiceResponse>>),
    (StatusCode, Json<ErrorResponse>),
> {
    trace!("Entering create_purchase_invoice function");
    debug!(
        "Creating purchase invoice {} for supplier {}",
        request.number, request.supplier_id
    );

    if let Err(errors) = request.validate() {
        warn!("Rejecting purchase invoice '{}': {}", request.number, errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;

    match supplier::Entity::find_by_id(request.supplier_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(
                "Supplier {} not found for purchase invoice",
                request.supplier_id
            );
            return Err(not_found_response("Supplier", request.supplier_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    }

    let new_invoice = purchase_invoice::ActiveModel {
        number: Set(request.number.clone()),
        date: Set(request.date),
        supplier_id: Set(request.supplier_id),
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
                "Failed to create purchase invoice '{}': {}",
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

    let invoice = compute::invoice::recompute_purchase_invoice_totals(&txn, invoice.id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Purchase invoice created successfully with ID: {}, number: {}",
        invoice.id, invoice.number
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: PurchaseInvoiceResponse::from(invoice),
            message: "Purchase invoice created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Get all purchase invoices
#[utoipa::path(
    get,
    path = "/api/v1/purchase-invoices",
    tag = "purchases",
    responses(
        (status = 200, description = "Purchase invoices retrieved", body = ApiResponse<Vec<PurchaseInvoiceResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_purchase_invoices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PurchaseInvoiceResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match purchase_invoice::Entity::find()
        .order_by_desc(purchase_invoice::Column::Date)
        .order_by_desc(purchase_invoice::Column::Number)
        .all(&state.db)
        .await
    {
        Ok(invoices) => {
            debug!("Retrieved {} purchase invoices", invoices.len());
            Ok(Json(ApiResponse {
                data: invoices
                    .into_iter()
                    .map(PurchaseInvoiceResponse::from)
                    .collect(),
                message: "Purchase invoices retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve purchase invoices: {}", db_error);
            Err(db_error_response(db_error))
        }
    }
}

/// Get a purchase invoice with its lines
#[utoipa::path(
    get,
    path = "/api/v1/purchase-invoices/{invoice_id}",
    tag = "purchases",
    params(("invoice_id" = i32, Path, description = "Purchase invoice ID")),
    responses(
        (status = 200, description = "Purchase invoice retrieved", body = ApiResponse<PurchaseInvoiceDetailResponse>),
        (status = 404, description = "Purchase invoice not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_purchase_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PurchaseInvoiceDetailResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let invoice = match purchase_invoice::Entity::find_by_id(invoice_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Purchase invoice with ID {} not found", invoice_id);
            return Err(not_found_response("Purchase invoice", invoice_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let lines = match invoice
        .find_related(purchase_invoice_line::Entity)
        .all(&state.db)
        .await
    {
        Ok(lines) => lines,
        Err(db_error) => {
            error!(
                "Failed to retrieve lines for purchase invoice {}: {}",
                invoice_id, db_error
            );
            return Err(db_error_response(db_error));
        }
    };

    Ok(Json(ApiResponse {
        data: PurchaseInvoiceDetailResponse {
            invoice: PurchaseInvoiceResponse::from(invoice),
            lines: lines
                .into_iter()
                .map(PurchaseInvoiceLineResponse::from)
                .collect(),
        },
        message: "Purchase invoice retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a draft purchase invoice header. Changing the invoice-level tax
/// or discount recomputes the totals in the same transaction.
#[utoipa::path(
    put,
    path = "/api/v1/purchase-invoices/{invoice_id}",
    tag = "purchases",
    params(("invoice_id" = i32, Path, description = "Purchase invoice ID")),
    request_body = UpdatePurchaseInvoiceRequest,
    responses(
        (status = 200, description = "Purchase invoice updated", body = ApiResponse<PurchaseInvoiceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Purchase invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_purchase_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePurchaseInvoiceRequest>,
) -> Result<Json<ApiResponse<PurchaseInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting purchase invoice update {}: {}", invoice_id, errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;
    let invoice = load_draft_invoice(&txn, invoice_id).await?;

    let mut active: purchase_invoice::ActiveModel = invoice.into();
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
        error!(
            "Failed to update purchase invoice {}: {}",
            invoice_id, db_error
        );
        db_error_response(db_error)
    })?;

    let invoice = compute::invoice::recompute_purchase_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!("Purchase invoice {} updated successfully", invoice_id);
    Ok(Json(ApiResponse {
        data: PurchaseInvoiceResponse::from(invoice),
        message: "Purchase invoice updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a draft purchase invoice; its lines are cascade-deleted with it
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-invoices/{invoice_id}",
    tag = "purchases",
    params(("invoice_id" = i32, Path, description = "Purchase invoice ID")),
    responses(
        (status = 200, description = "Purchase invoice deleted", body = ApiResponse<String>),
        (status = 404, description = "Purchase invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_purchase_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;
    let invoice = load_draft_invoice(&txn, invoice_id).await?;

    invoice.delete(&txn).await.map_err(|db_error| {
        error!(
            "Failed to delete purchase invoice {}: {}",
            invoice_id, db_error
        );
        db_error_response(db_error)
    })?;

    txn.commit().await.map_err(db_error_response)?;

    info!("Purchase invoice {} deleted successfully", invoice_id);
    Ok(Json(ApiResponse {
        data: format!("Purchase invoice {} deleted", invoice_id),
        message: "Purchase invoice deleted successfully".to_string(),
        success: true,
    }))
}

/// Post a purchase invoice, making it contribute to the supplier's balance.
/// The balance is recomputed in the same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/purchase-invoices/{invoice_id}/post",
    tag = "purchases",
    params(("invoice_id" = i32, Path, description = "Purchase invoice ID")),
    responses(
        (status = 200, description = "Purchase invoice posted", body = ApiResponse<PurchaseInvoiceResponse>),
        (status = 404, description = "Purchase invoice not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn post_purchase_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PurchaseInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_purchase_invoice_status(state, invoice_id, DocumentStatus::Posted).await
}

/// Cancel a purchase invoice. Cancelling a posted invoice removes it from
/// the supplier's balance.
#[utoipa::path(
    post,
    path = "/api/v1/purchase-invoices/{invoice_id}/cancel",
    tag = "purchases",
    params(("invoice_id" = i32, Path, description = "Purchase invoice ID")),
    responses(
        (status = 200, description = "Purchase invoice cancelled", body = ApiResponse<PurchaseInvoiceResponse>),
        (status = 404, description = "Purchase invoice not found", body = ErrorResponse),
        (status = 409, description = "Illegal status transition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_purchase_invoice(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PurchaseInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    change_purchase_invoice_status(state, invoice_id, DocumentStatus::Cancelled).await
}

async fn change_purchase_invoice_status(
    state: AppState,
    invoice_id: i32,
    next: DocumentStatus,
) -> Result<Json<ApiResponse<PurchaseInvoiceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;

    let invoice = match purchase_invoice::Entity::find_by_id(invoice_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Purchase invoice with ID {} not found", invoice_id);
            return Err(not_found_response("Purchase invoice", invoice_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let current = invoice.status;
    if !current.can_transition_to(next) {
        warn!(
            "Rejecting purchase invoice {} transition {} -> {}",
            invoice_id,
            current.as_str(),
            next.as_str()
        );
        return Err(conflict_response(
            "INVALID_STATUS_TRANSITION",
            format!(
                "Cannot move purchase invoice {} from {} to {}",
                invoice_id,
                current.as_str(),
                next.as_str()
            ),
        ));
    }

    let supplier_id = invoice.supplier_id;
    let mut active: purchase_invoice::ActiveModel = invoice.into();
    active.status = Set(next);
    let invoice = active.update(&txn).await.map_err(|db_error| {
        error!(
            "Failed to update purchase invoice {} status: {}",
            invoice_id, db_error
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
        "Purchase invoice {} moved from {} to {}",
        invoice_id,
        current.as_str(),
        next.as_str()
    );
    Ok(Json(ApiResponse {
        data: PurchaseInvoiceResponse::from(invoice),
        message: format!("Purchase invoice {} successfully", next.as_str()),
        success: true,
    }))
}

/// Add a line to a draft purchase invoice
#[utoipa::path(
    post,
    path = "/api/v1/purchase-invoices/{invoice_id}/lines",
    tag = "purchases",
    params(("invoice_id" = i32, Path, description = "Purchase invoice ID")),
    request_body = PurchaseInvoiceLineRequest,
    responses(
        (status = 201, description = "Line added", body = ApiResponse<PurchaseInvoiceLineResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Invoice or product not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_purchase_invoice_line(
    Path(invoice_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<PurchaseInvoiceLineRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<PurchaseInvoiceLineResponse>>),
    (StatusCode, Json<ErrorResponse>),
> {
    trace!("Entering add_purchase_invoice_line for invoice {}", invoice_id);

    if let Err(errors) = request.validate() {
        warn!("Rejecting purchase invoice line: {}", errors);
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

    let new_line = purchase_invoice_line::ActiveModel {
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
        error!("Failed to insert purchase invoice line: {}", db_error);
        db_error_response(db_error)
    })?;

    let invoice = compute::invoice::recompute_purchase_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Line {} added to purchase invoice {}; subtotal is now {}",
        line.id, invoice_id, invoice.subtotal
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: PurchaseInvoiceLineResponse::from(line),
            message: "Invoice line added successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a line on a draft purchase invoice and recompute the totals
#[utoipa::path(
    put,
    path = "/api/v1/purchase-invoices/{invoice_id}/lines/{line_id}",
    tag = "purchases",
    params(
        ("invoice_id" = i32, Path, description = "Purchase invoice ID"),
        ("line_id" = i32, Path, description = "Invoice line ID"),
    ),
    request_body = UpdatePurchaseInvoiceLineRequest,
    responses(
        (status = 200, description = "Line updated", body = ApiResponse<PurchaseInvoiceLineResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Invoice or line not found", body = ErrorResponse),
        (status = 409, description = "Invoice is not a draft", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_purchase_invoice_line(
    Path((invoice_id, line_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePurchaseInvoiceLineRequest>,
) -> Result<Json<ApiResponse<PurchaseInvoiceLineResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejecting purchase invoice line update: {}", errors);
        return Err(validation_error_response(errors));
    }

    let txn = state.db.begin().await.map_err(db_error_response)?;
    load_draft_invoice(&txn, invoice_id).await?;

    let line = match purchase_invoice_line::Entity::find_by_id(line_id).one(&txn).await {
        Ok(Some(model)) if model.invoice_id == invoice_id => model,
        Ok(_) => {
            warn!(
                "Line {} not found on purchase invoice {}",
                line_id, invoice_id
            );
            return Err(not_found_response("Invoice line", line_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    let mut active: purchase_invoice_line::ActiveModel = line.into();
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
        error!(
            "Failed to update purchase invoice line {}: {}",
            line_id, db_error
        );
        db_error_response(db_error)
    })?;

    compute::invoice::recompute_purchase_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    let line = match purchase_invoice_line::Entity::find_by_id(line_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => return Err(not_found_response("Invoice line", line_id)),
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    txn.commit().await.map_err(db_error_response)?;

    info!("Line {} on purchase invoice {} updated", line_id, invoice_id);
    Ok(Json(ApiResponse {
        data: PurchaseInvoiceLineResponse::from(line),
        message: "Invoice line updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a line from a draft purchase invoice and recompute the totals
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-invoices/{invoice_id}/lines/{line_id}",
    tag = "purchases",
    params(
        ("invoice_id" = i32, Path, description = "Purchase invoice ID"),
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
pub async fn delete_purchase_invoice_line(
    Path((invoice_id, line_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let txn = state.db.begin().await.map_err(db_error_response)?;
    load_draft_invoice(&txn, invoice_id).await?;

    let line = match purchase_invoice_line::Entity::find_by_id(line_id).one(&txn).await {
        Ok(Some(model)) if model.invoice_id == invoice_id => model,
        Ok(_) => {
            warn!(
                "Line {} not found on purchase invoice {}",
                line_id, invoice_id
            );
            return Err(not_found_response("Invoice line", line_id));
        }
        Err(db_error) => return Err(db_error_response(db_error)),
    };

    line.delete(&txn).await.map_err(|db_error| {
        error!(
            "Failed to delete purchase invoice line {}: {}",
            line_id, db_error
        );
        db_error_response(db_error)
    })?;

    let invoice = compute::invoice::recompute_purchase_invoice_totals(&txn, invoice_id)
        .await
        .map_err(compute_error_response)?;

    txn.commit().await.map_err(db_error_response)?;

    info!(
        "Line {} deleted from purchase invoice {}; subtotal is now {}",
        line_id, invoice_id, invoice.subtotal
    );
    Ok(Json(ApiResponse {
        data: format!("Invoice line {} deleted", line_id),
        message: "Invoice line deleted successfully".to_string(),
        success: true,
    }))
}
