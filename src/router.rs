use crate::handlers::{
    accounts::{create_account, delete_account, get_account, get_accounts, update_account},
    categories::{
        create_category, delete_category, get_categories, get_category, update_category,
    },
    customer_payments::{
        cancel_customer_payment, create_customer_payment, get_customer_payment,
        get_customer_payments, post_customer_payment, update_customer_payment,
    },
    customers::{
        create_customer, delete_customer, get_customer, get_customers, update_customer,
    },
    health::health_check,
    journal_entries::{
        create_journal_entry, get_account_journal_entries, get_journal_entries,
        get_journal_entry,
    },
    products::{create_product, delete_product, get_product, get_products, update_product},
    purchase_invoices::{
        add_purchase_invoice_line, cancel_purchase_invoice, create_purchase_invoice,
        delete_purchase_invoice, delete_purchase_invoice_line, get_purchase_invoice,
        get_purchase_invoices, post_purchase_invoice, update_purchase_invoice,
        update_purchase_invoice_line,
    },
    reports::{get_dashboard, get_low_stock, get_trial_balance},
    sales_invoices::{
        add_sales_invoice_line, cancel_sales_invoice, create_sales_invoice,
        delete_sales_invoice, delete_sales_invoice_line, get_sales_invoice,
        get_sales_invoices, post_sales_invoice, update_sales_invoice,
        update_sales_invoice_line,
    },
    stock_movements::{
        create_stock_movement, delete_stock_movement, get_stock_movement, get_stock_movements,
    },
    supplier_payments::{
        cancel_supplier_payment, create_supplier_payment, get_supplier_payment,
        get_supplier_payments, post_supplier_payment, update_supplier_payment,
    },
    suppliers::{
        create_supplier, delete_supplier, get_supplier, get_suppliers, update_supplier,
    },
    warehouses::{
        create_warehouse, delete_warehouse, get_warehouse, get_warehouses, update_warehouse,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use axum_prometheus::{metrics_exporter_prometheus::PrometheusHandle, PrometheusMetricLayer};
use std::sync::OnceLock;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// The prometheus recorder is process-global and can only be installed once,
// so the layer/handle pair is shared across router instances (tests build
// several).
static METRICS: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();

fn metrics_pair() -> (PrometheusMetricLayer<'static>, PrometheusHandle) {
    METRICS.get_or_init(PrometheusMetricLayer::pair).clone()
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let (prometheus_layer, metric_handle) = metrics_pair();

    Router::new()
        // Health check and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        // Chart of accounts
        .route("/api/v1/accounts", post(create_account))
        .route("/api/v1/accounts", get(get_accounts))
        .route("/api/v1/accounts/:account_id", get(get_account))
        .route("/api/v1/accounts/:account_id", put(update_account))
        .route("/api/v1/accounts/:account_id", delete(delete_account))
        .route(
            "/api/v1/accounts/:account_id/journal-entries",
            get(get_account_journal_entries),
        )
        // Journal entries (immutable: no update or delete)
        .route("/api/v1/journal-entries", post(create_journal_entry))
        .route("/api/v1/journal-entries", get(get_journal_entries))
        .route("/api/v1/journal-entries/:entry_id", get(get_journal_entry))
        // Inventory
        .route("/api/v1/categories", post(create_category))
        .route("/api/v1/categories", get(get_categories))
        .route("/api/v1/categories/:category_id", get(get_category))
        .route("/api/v1/categories/:category_id", put(update_category))
        .route("/api/v1/categories/:category_id", delete(delete_category))
        .route("/api/v1/products", post(create_product))
        .route("/api/v1/products", get(get_products))
        .route("/api/v1/products/:product_id", get(get_product))
        .route("/api/v1/products/:product_id", put(update_product))
        .route("/api/v1/products/:product_id", delete(delete_product))
        .route("/api/v1/warehouses", post(create_warehouse))
        .route("/api/v1/warehouses", get(get_warehouses))
        .route("/api/v1/warehouses/:warehouse_id", get(get_warehouse))
        .route("/api/v1/warehouses/:warehouse_id", put(update_warehouse))
        .route("/api/v1/warehouses/:warehouse_id", delete(delete_warehouse))
        .route("/api/v1/stock-movements", post(create_stock_movement))
        .route("/api/v1/stock-movements", get(get_stock_movements))
        .route("/api/v1/stock-movements/:movement_id", get(get_stock_movement))
        .route(
            "/api/v1/stock-movements/:movement_id",
            delete(delete_stock_movement),
        )
        // Sales
        .route("/api/v1/customers", post(create_customer))
        .route("/api/v1/customers", get(get_customers))
        .route("/api/v1/customers/:customer_id", get(get_customer))
        .route("/api/v1/customers/:customer_id", put(update_customer))
        .route("/api/v1/customers/:customer_id", delete(delete_customer))
        .route("/api/v1/sales-invoices", post(create_sales_invoice))
        .route("/api/v1/sales-invoices", get(get_sales_invoices))
        .route("/api/v1/sales-invoices/:invoice_id", get(get_sales_invoice))
        .route("/api/v1/sales-invoices/:invoice_id", put(update_sales_invoice))
        .route(
            "/api/v1/sales-invoices/:invoice_id",
            delete(delete_sales_invoice),
        )
        .route(
            "/api/v1/sales-invoices/:invoice_id/post",
            post(post_sales_invoice),
        )
        .route(
            "/api/v1/sales-invoices/:invoice_id/cancel",
            post(cancel_sales_invoice),
        )
        .route(
            "/api/v1/sales-invoices/:invoice_id/lines",
            post(add_sales_invoice_line),
        )
        .route(
            "/api/v1/sales-invoices/:invoice_id/lines/:line_id",
            put(update_sales_invoice_line),
        )
        .route(
            "/api/v1/sales-invoices/:invoice_id/lines/:line_id",
            delete(delete_sales_invoice_line),
        )
        .route("/api/v1/customer-payments", post(create_customer_payment))
        .route("/api/v1/customer-payments", get(get_customer_payments))
        .route(
            "/api/v1/customer-payments/:payment_id",
            get(get_customer_payment),
        )
        .route(
            "/api/v1/customer-payments/:payment_id",
            put(update_customer_payment),
        )
        .route(
            "/api/v1/customer-payments/:payment_id/post",
            post(post_customer_payment),
        )
        .route(
            "/api/v1/customer-payments/:payment_id/cancel",
            post(cancel_customer_payment),
        )
        // Purchases
        .route("/api/v1/suppliers", post(create_supplier))
        .route("/api/v1/suppliers", get(get_suppliers))
        .route("/api/v1/suppliers/:supplier_id", get(get_supplier))
        .route("/api/v1/suppliers/:supplier_id", put(update_supplier))
        .route("/api/v1/suppliers/:supplier_id", delete(delete_supplier))
        .route("/api/v1/purchase-invoices", post(create_purchase_invoice))
        .route("/api/v1/purchase-invoices", get(get_purchase_invoices))
        .route(
            "/api/v1/purchase-invoices/:invoice_id",
            get(get_purchase_invoice),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id",
            put(update_purchase_invoice),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id",
            delete(delete_purchase_invoice),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id/post",
            post(post_purchase_invoice),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id/cancel",
            post(cancel_purchase_invoice),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id/lines",
            post(add_purchase_invoice_line),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id/lines/:line_id",
            put(update_purchase_invoice_line),
        )
        .route(
            "/api/v1/purchase-invoices/:invoice_id/lines/:line_id",
            delete(delete_purchase_invoice_line),
        )
        .route("/api/v1/supplier-payments", post(create_supplier_payment))
        .route("/api/v1/supplier-payments", get(get_supplier_payments))
        .route(
            "/api/v1/supplier-payments/:payment_id",
            get(get_supplier_payment),
        )
        .route(
            "/api/v1/supplier-payments/:payment_id",
            put(update_supplier_payment),
        )
        .route(
            "/api/v1/supplier-payments/:payment_id/post",
            post(post_supplier_payment),
        )
        .route(
            "/api/v1/supplier-payments/:payment_id/cancel",
            post(cancel_supplier_payment),
        )
        // Reports
        .route("/api/v1/reports/trial-balance", get(get_trial_balance))
        .route("/api/v1/reports/low-stock", get(get_low_stock))
        .route("/api/v1/reports/dashboard", get(get_dashboard))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .layer(prometheus_layer)
        .with_state(state)
}
