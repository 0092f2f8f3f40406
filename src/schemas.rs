use common::{DashboardSummary, LowStockRow, TrialBalance};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for report responses
    pub cache: Cache<String, CachedData>,
}

/// Cached report payloads
#[derive(Clone, Debug)]
pub enum CachedData {
    TrialBalance(TrialBalance),
    LowStock(Vec<LowStockRow>),
    Dashboard(DashboardSummary),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::accounts::create_account,
        crate::handlers::accounts::get_accounts,
        crate::handlers::accounts::get_account,
        crate::handlers::accounts::update_account,
        crate::handlers::accounts::delete_account,
        crate::handlers::journal_entries::create_journal_entry,
        crate::handlers::journal_entries::get_journal_entries,
        crate::handlers::journal_entries::get_journal_entry,
        crate::handlers::journal_entries::get_account_journal_entries,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::products::create_product,
        crate::handlers::products::get_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::warehouses::create_warehouse,
        crate::handlers::warehouses::get_warehouses,
        crate::handlers::warehouses::get_warehouse,
        crate::handlers::warehouses::update_warehouse,
        crate::handlers::warehouses::delete_warehouse,
        crate::handlers::stock_movements::create_stock_movement,
        crate::handlers::stock_movements::get_stock_movements,
        crate::handlers::stock_movements::get_stock_movement,
        crate::handlers::stock_movements::delete_stock_movement,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::get_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,
        crate::handlers::sales_invoices::create_sales_invoice,
        crate::handlers::sales_invoices::get_sales_invoices,
        crate::handlers::sales_invoices::get_sales_invoice,
        crate::handlers::sales_invoices::update_sales_invoice,
        crate::handlers::sales_invoices::delete_sales_invoice,
        crate::handlers::sales_invoices::post_sales_invoice,
        crate::handlers::sales_invoices::cancel_sales_invoice,
        crate::handlers::sales_invoices::add_sales_invoice_line,
        crate::handlers::sales_invoices::update_sales_invoice_line,
        crate::handlers::sales_invoices::delete_sales_invoice_line,
        crate::handlers::purchase_invoices::create_purchase_invoice,
        crate::handlers::purchase_invoices::get_purchase_invoices,
        crate::handlers::purchase_invoices::get_purchase_invoice,
        crate::handlers::purchase_invoices::update_purchase_invoice,
        crate::handlers::purchase_invoices::delete_purchase_invoice,
        crate::handlers::purchase_invoices::post_purchase_invoice,
        crate::handlers::purchase_invoices::cancel_purchase_invoice,
        crate::handlers::purchase_invoices::add_purchase_invoice_line,
        crate::handlers::purchase_invoices::update_purchase_invoice_line,
        crate::handlers::purchase_invoices::delete_purchase_invoice_line,
        crate::handlers::customer_payments::create_customer_payment,
        crate::handlers::customer_payments::get_customer_payments,
        crate::handlers::customer_payments::get_customer_payment,
        crate::handlers::customer_payments::update_customer_payment,
        crate::handlers::customer_payments::post_customer_payment,
        crate::handlers::customer_payments::cancel_customer_payment,
        crate::handlers::supplier_payments::create_supplier_payment,
        crate::handlers::supplier_payments::get_supplier_payments,
        crate::handlers::supplier_payments::get_supplier_payment,
        crate::handlers::supplier_payments::update_supplier_payment,
        crate::handlers::supplier_payments::post_supplier_payment,
        crate::handlers::supplier_payments::cancel_supplier_payment,
        crate::handlers::reports::get_trial_balance,
        crate::handlers::reports::get_low_stock,
        crate::handlers::reports::get_dashboard,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::accounts::CreateAccountRequest,
            crate::handlers::accounts::UpdateAccountRequest,
            crate::handlers::accounts::AccountResponse,
            crate::handlers::journal_entries::CreateJournalEntryRequest,
            crate::handlers::journal_entries::JournalEntryResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::handlers::products::ProductResponse,
            crate::handlers::warehouses::CreateWarehouseRequest,
            crate::handlers::warehouses::UpdateWarehouseRequest,
            crate::handlers::warehouses::WarehouseResponse,
            crate::handlers::stock_movements::CreateStockMovementRequest,
            crate::handlers::stock_movements::StockMovementResponse,
            crate::handlers::customers::CreateCustomerRequest,
            crate::handlers::customers::UpdateCustomerRequest,
            crate::handlers::customers::CustomerResponse,
            crate::handlers::suppliers::CreateSupplierRequest,
            crate::handlers::suppliers::UpdateSupplierRequest,
            crate::handlers::suppliers::SupplierResponse,
            crate::handlers::sales_invoices::CreateSalesInvoiceRequest,
            crate::handlers::sales_invoices::UpdateSalesInvoiceRequest,
            crate::handlers::sales_invoices::SalesInvoiceResponse,
            crate::handlers::sales_invoices::SalesInvoiceDetailResponse,
            crate::handlers::sales_invoices::SalesInvoiceLineRequest,
            crate::handlers::sales_invoices::UpdateSalesInvoiceLineRequest,
            crate::handlers::sales_invoices::SalesInvoiceLineResponse,
            crate::handlers::purchase_invoices::CreatePurchaseInvoiceRequest,
            crate::handlers::purchase_invoices::UpdatePurchaseInvoiceRequest,
            crate::handlers::purchase_invoices::PurchaseInvoiceResponse,
            crate::handlers::purchase_invoices::PurchaseInvoiceDetailResponse,
            crate::handlers::purchase_invoices::PurchaseInvoiceLineRequest,
            crate::handlers::purchase_invoices::UpdatePurchaseInvoiceLineRequest,
            crate::handlers::purchase_invoices::PurchaseInvoiceLineResponse,
            crate::handlers::customer_payments::CreateCustomerPaymentRequest,
            crate::handlers::customer_payments::UpdateCustomerPaymentRequest,
            crate::handlers::customer_payments::CustomerPaymentResponse,
            crate::handlers::supplier_payments::CreateSupplierPaymentRequest,
            crate::handlers::supplier_payments::UpdateSupplierPaymentRequest,
            crate::handlers::supplier_payments::SupplierPaymentResponse,
            common::TrialBalance,
            common::TrialBalanceRow,
            common::LowStockRow,
            common::DashboardSummary,
            common::InvoiceSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Chart of accounts and journal entries"),
        (name = "inventory", description = "Categories, products, warehouses and stock movements"),
        (name = "sales", description = "Customers, sales invoices and customer payments"),
        (name = "purchases", description = "Suppliers, purchase invoices and supplier payments"),
        (name = "reports", description = "Trial balance, low stock and dashboard reports"),
    ),
    info(
        title = "BizBooks API",
        description = "Small-business accounting API: chart of accounts, inventory, invoicing and party balances",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
