use std::str::FromStr;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::handlers::accounts::CreateAccountRequest;
use crate::handlers::categories::CreateCategoryRequest;
use crate::handlers::customer_payments::CreateCustomerPaymentRequest;
use crate::handlers::customers::CreateCustomerRequest;
use crate::handlers::journal_entries::CreateJournalEntryRequest;
use crate::handlers::products::CreateProductRequest;
use crate::handlers::purchase_invoices::{CreatePurchaseInvoiceRequest, PurchaseInvoiceLineRequest};
use crate::handlers::sales_invoices::{
    CreateSalesInvoiceRequest, SalesInvoiceLineRequest, UpdateSalesInvoiceRequest,
};
use crate::handlers::stock_movements::CreateStockMovementRequest;
use crate::handlers::supplier_payments::CreateSupplierPaymentRequest;
use crate::handlers::suppliers::CreateSupplierRequest;
use crate::handlers::warehouses::CreateWarehouseRequest;
use crate::schemas::ApiResponse;
use crate::test_utils::setup_test_app;
use model::entities::account::{AccountKind, NormalBalance};
use model::entities::journal_entry::EntrySide;
use model::entities::payment_method::PaymentMethod;
use model::entities::product::Unit;
use model::entities::stock_movement::{MovementDirection, MovementReason};

fn d(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Decimals serialize as strings; parse them back for comparison.
fn dec_field(value: &Value, key: &str) -> Decimal {
    Decimal::from_str(value[key].as_str().unwrap_or_else(|| panic!("missing field {key}")))
        .unwrap()
}

async fn create_account(
    server: &TestServer,
    code: &str,
    kind: AccountKind,
    normal_balance: NormalBalance,
) -> i64 {
    let request = CreateAccountRequest {
        code: code.to_string(),
        name: format!("Account {code}"),
        kind,
        parent_id: None,
        description: None,
        normal_balance,
        is_active: None,
    };
    let response = server.post("/api/v1/accounts").json(&request).await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    body.data["id"].as_i64().unwrap()
}

async fn create_journal_entry(
    server: &TestServer,
    account_id: i64,
    side: EntrySide,
    amount: Decimal,
) {
    let request = CreateJournalEntryRequest {
        date: date(2026, 3, 1),
        account_id: account_id as i32,
        side,
        amount,
        description: "test entry".to_string(),
        reference: "JE".to_string(),
    };
    let response = server.post("/api/v1/journal-entries").json(&request).await;
    response.assert_status(StatusCode::CREATED);
}

/// Creates a category, a product in it, and a warehouse; returns
/// (product_id, warehouse_id).
async fn create_catalog(server: &TestServer) -> (i64, i64) {
    let response = server
        .post("/api/v1/categories")
        .json(&CreateCategoryRequest {
            code: "CAT1".to_string(),
            name: "Beverages".to_string(),
            parent_id: None,
            description: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let category: ApiResponse<Value> = response.json();

    let response = server
        .post("/api/v1/products")
        .json(&CreateProductRequest {
            code: "P-100".to_string(),
            barcode: None,
            name: "Coffee beans 1kg".to_string(),
            description: None,
            category_id: category.data["id"].as_i64().unwrap() as i32,
            unit: Unit::Kg,
            purchase_price: d(4_000),
            sale_price: d(6_500),
            min_stock: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let product: ApiResponse<Value> = response.json();

    let response = server
        .post("/api/v1/warehouses")
        .json(&CreateWarehouseRequest {
            code: "WH1".to_string(),
            name: "Main warehouse".to_string(),
            location: "Back of the shop".to_string(),
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let warehouse: ApiResponse<Value> = response.json();

    (
        product.data["id"].as_i64().unwrap(),
        warehouse.data["id"].as_i64().unwrap(),
    )
}

async fn create_movement(
    server: &TestServer,
    product_id: i64,
    warehouse_id: i64,
    direction: MovementDirection,
    quantity: Decimal,
) -> i64 {
    let request = CreateStockMovementRequest {
        date: date(2026, 3, 2),
        product_id: product_id as i32,
        warehouse_id: warehouse_id as i32,
        direction,
        reason: MovementReason::Adjustment,
        quantity,
        unit_price: d(500),
        reference: "SM".to_string(),
        notes: None,
    };
    let response = server.post("/api/v1/stock-movements").json(&request).await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    body.data["id"].as_i64().unwrap()
}

async fn create_customer(server: &TestServer, account_id: i64) -> i64 {
    let response = server
        .post("/api/v1/customers")
        .json(&CreateCustomerRequest {
            code: "C-1".to_string(),
            name: "Corner Cafe".to_string(),
            contact_person: None,
            phone: "555-0100".to_string(),
            email: None,
            address: "1 Main St".to_string(),
            tax_number: None,
            account_id: account_id as i32,
            credit_limit: None,
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    body.data["id"].as_i64().unwrap()
}

async fn create_supplier(server: &TestServer, account_id: i64) -> i64 {
    let response = server
        .post("/api/v1/suppliers")
        .json(&CreateSupplierRequest {
            code: "S-1".to_string(),
            name: "Bean Importers".to_string(),
            contact_person: None,
            phone: "555-0200".to_string(),
            email: None,
            address: "7 Dock Rd".to_string(),
            tax_number: None,
            account_id: account_id as i32,
            credit_limit: None,
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    body.data["id"].as_i64().unwrap()
}

async fn create_sales_invoice(
    server: &TestServer,
    customer_id: i64,
    number: &str,
    invoice_date: NaiveDate,
) -> i64 {
    let response = server
        .post("/api/v1/sales-invoices")
        .json(&CreateSalesInvoiceRequest {
            number: number.to_string(),
            date: invoice_date,
            customer_id: customer_id as i32,
            tax_amount: None,
            discount_amount: None,
            due_date: date(2026, 6, 1),
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    body.data["id"].as_i64().unwrap()
}

/// The standard example line: qty 2 @ 100.00, 14% tax, 10.00 discount.
async fn add_example_line(server: &TestServer, invoice_id: i64, product_id: i64) {
    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice_id}/lines"))
        .json(&SalesInvoiceLineRequest {
            product_id: product_id as i32,
            quantity: d(200),
            unit_price: d(10_000),
            tax_rate: Some(d(1_400)),
            discount_amount: Some(d(1_000)),
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "total"), d(21_800));
}

async fn customer_balance(server: &TestServer, customer_id: i64) -> Decimal {
    let response = server.get(&format!("/api/v1/customers/{customer_id}")).await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    dec_field(&body.data, "current_balance")
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_get_account() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let account_id =
        create_account(&server, "1000", AccountKind::Asset, NormalBalance::Debit).await;

    let response = server.get(&format!("/api/v1/accounts/{account_id}")).await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert!(body.success);
    assert_eq!(body.data["code"], "1000");
    assert_eq!(body.data["kind"], "asset");
    assert_eq!(body.data["normal_balance"], "debit");
    assert_eq!(dec_field(&body.data, "balance"), Decimal::ZERO);
}

#[tokio::test]
async fn test_duplicate_account_code_is_conflict() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    create_account(&server, "1000", AccountKind::Asset, NormalBalance::Debit).await;

    let request = CreateAccountRequest {
        code: "1000".to_string(),
        name: "Duplicate".to_string(),
        kind: AccountKind::Asset,
        parent_id: None,
        description: None,
        normal_balance: NormalBalance::Debit,
        is_active: None,
    };
    let response = server.post("/api/v1/accounts").json(&request).await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_journal_entries_update_account_balance() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let cash = create_account(&server, "1000", AccountKind::Asset, NormalBalance::Debit).await;
    create_journal_entry(&server, cash, EntrySide::Debit, d(30_000)).await;
    create_journal_entry(&server, cash, EntrySide::Debit, d(20_000)).await;
    create_journal_entry(&server, cash, EntrySide::Credit, d(12_500)).await;

    let response = server.get(&format!("/api/v1/accounts/{cash}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "balance"), d(37_500));

    // Credit-normal accounts carry the negation
    let revenue =
        create_account(&server, "4000", AccountKind::Revenue, NormalBalance::Credit).await;
    create_journal_entry(&server, revenue, EntrySide::Credit, d(50_000)).await;
    create_journal_entry(&server, revenue, EntrySide::Debit, d(10_000)).await;

    let response = server.get(&format!("/api/v1/accounts/{revenue}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "balance"), d(40_000));
}

#[tokio::test]
async fn test_journal_entry_validation() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let cash = create_account(&server, "1000", AccountKind::Asset, NormalBalance::Debit).await;

    // Zero amount is rejected before anything is written
    let request = CreateJournalEntryRequest {
        date: date(2026, 3, 1),
        account_id: cash as i32,
        side: EntrySide::Debit,
        amount: Decimal::ZERO,
        description: "bad".to_string(),
        reference: "JE".to_string(),
    };
    let response = server.post("/api/v1/journal-entries").json(&request).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Unknown account is a 404
    let request = CreateJournalEntryRequest {
        date: date(2026, 3, 1),
        account_id: 9999,
        side: EntrySide::Debit,
        amount: d(100),
        description: "orphan".to_string(),
        reference: "JE".to_string(),
    };
    let response = server.post("/api/v1/journal-entries").json(&request).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_movements_update_current_stock() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let (product, warehouse) = create_catalog(&server).await;
    create_movement(&server, product, warehouse, MovementDirection::In, d(1_000)).await;
    let out_movement =
        create_movement(&server, product, warehouse, MovementDirection::Out, d(300)).await;

    let response = server.get(&format!("/api/v1/products/{product}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "current_stock"), d(700));

    // Deleting a movement recomputes the stock level
    let response = server
        .delete(&format!("/api/v1/stock-movements/{out_movement}"))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server.get(&format!("/api/v1/products/{product}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "current_stock"), d(1_000));
}

#[tokio::test]
async fn test_stock_movement_rejects_nonpositive_quantity() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let (product, warehouse) = create_catalog(&server).await;
    let request = CreateStockMovementRequest {
        date: date(2026, 3, 2),
        product_id: product as i32,
        warehouse_id: warehouse as i32,
        direction: MovementDirection::In,
        reason: MovementReason::Purchase,
        quantity: d(-100),
        unit_price: d(500),
        reference: "SM".to_string(),
        notes: None,
    };
    let response = server.post("/api/v1/stock-movements").json(&request).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invoice_totals_follow_lines_and_header() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let receivables =
        create_account(&server, "1200", AccountKind::Asset, NormalBalance::Debit).await;
    let customer = create_customer(&server, receivables).await;
    let (product, _) = create_catalog(&server).await;
    let invoice = create_sales_invoice(&server, customer, "SI-1", date(2026, 5, 10)).await;

    // 2 * 100.00 * 1.14 - 10.00 = 218.00
    add_example_line(&server, invoice, product).await;

    let response = server.get(&format!("/api/v1/sales-invoices/{invoice}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "subtotal"), d(21_800));
    assert_eq!(dec_field(&body.data, "total_amount"), d(21_800));
    assert_eq!(body.data["lines"].as_array().unwrap().len(), 1);

    // Header tax/discount feed the grand total: 218.00 + 5.00 - 3.00
    let response = server
        .put(&format!("/api/v1/sales-invoices/{invoice}"))
        .json(&UpdateSalesInvoiceRequest {
            date: None,
            due_date: None,
            tax_amount: Some(d(500)),
            discount_amount: Some(d(300)),
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "total_amount"), d(22_000));

    // Removing the line leaves only the header tax/discount
    let response = server.get(&format!("/api/v1/sales-invoices/{invoice}")).await;
    let body: ApiResponse<Value> = response.json();
    let line_id = body.data["lines"][0]["id"].as_i64().unwrap();

    let response = server
        .delete(&format!("/api/v1/sales-invoices/{invoice}/lines/{line_id}"))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server.get(&format!("/api/v1/sales-invoices/{invoice}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "subtotal"), Decimal::ZERO);
    assert_eq!(dec_field(&body.data, "total_amount"), d(200));
}

#[tokio::test]
async fn test_posting_flow_updates_customer_balance() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let receivables =
        create_account(&server, "1200", AccountKind::Asset, NormalBalance::Debit).await;
    let customer = create_customer(&server, receivables).await;
    let (product, _) = create_catalog(&server).await;
    let invoice = create_sales_invoice(&server, customer, "SI-1", date(2026, 5, 10)).await;
    add_example_line(&server, invoice, product).await;

    // Draft invoices do not contribute
    assert_eq!(customer_balance(&server, customer).await, Decimal::ZERO);

    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(customer_balance(&server, customer).await, d(21_800));

    // A posted payment reduces the balance
    let response = server
        .post("/api/v1/customer-payments")
        .json(&CreateCustomerPaymentRequest {
            number: "CP-1".to_string(),
            date: date(2026, 5, 12),
            customer_id: customer as i32,
            amount: d(20_000),
            method: PaymentMethod::Cash,
            reference: None,
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let payment: ApiResponse<Value> = response.json();
    let payment_id = payment.data["id"].as_i64().unwrap();

    // Still a draft, so nothing changes yet
    assert_eq!(customer_balance(&server, customer).await, d(21_800));

    let response = server
        .post(&format!("/api/v1/customer-payments/{payment_id}/post"))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(customer_balance(&server, customer).await, d(1_800));

    // Cancelling the posted payment restores the balance
    let response = server
        .post(&format!("/api/v1/customer-payments/{payment_id}/cancel"))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(customer_balance(&server, customer).await, d(21_800));
}

#[tokio::test]
async fn test_status_transitions_are_guarded() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let receivables =
        create_account(&server, "1200", AccountKind::Asset, NormalBalance::Debit).await;
    let customer = create_customer(&server, receivables).await;
    let invoice = create_sales_invoice(&server, customer, "SI-1", date(2026, 5, 10)).await;

    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await;
    response.assert_status(StatusCode::OK);

    // Posting twice is an illegal transition
    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Posted invoices are frozen
    let response = server
        .put(&format!("/api/v1/sales-invoices/{invoice}"))
        .json(&UpdateSalesInvoiceRequest {
            date: None,
            due_date: None,
            tax_amount: Some(d(100)),
            discount_amount: None,
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Cancelled documents stay cancelled
    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice}/cancel"))
        .await;
    response.assert_status(StatusCode::OK);
    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancelling_posted_invoice_restores_customer_balance() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let receivables =
        create_account(&server, "1200", AccountKind::Asset, NormalBalance::Debit).await;
    let customer = create_customer(&server, receivables).await;
    let (product, _) = create_catalog(&server).await;
    let invoice = create_sales_invoice(&server, customer, "SI-1", date(2026, 5, 10)).await;
    add_example_line(&server, invoice, product).await;

    server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(customer_balance(&server, customer).await, d(21_800));

    server
        .post(&format!("/api/v1/sales-invoices/{invoice}/cancel"))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(customer_balance(&server, customer).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_purchase_flow_updates_supplier_balance() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let payables =
        create_account(&server, "2100", AccountKind::Liability, NormalBalance::Credit).await;
    let supplier = create_supplier(&server, payables).await;
    let (product, _) = create_catalog(&server).await;

    let response = server
        .post("/api/v1/purchase-invoices")
        .json(&CreatePurchaseInvoiceRequest {
            number: "PI-1".to_string(),
            date: date(2026, 5, 11),
            supplier_id: supplier as i32,
            tax_amount: None,
            discount_amount: None,
            due_date: date(2026, 6, 11),
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let invoice: ApiResponse<Value> = response.json();
    let invoice_id = invoice.data["id"].as_i64().unwrap();

    let response = server
        .post(&format!("/api/v1/purchase-invoices/{invoice_id}/lines"))
        .json(&PurchaseInvoiceLineRequest {
            product_id: product as i32,
            quantity: d(400),
            unit_price: d(10_000),
            tax_rate: None,
            discount_amount: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);

    server
        .post(&format!("/api/v1/purchase-invoices/{invoice_id}/post"))
        .await
        .assert_status(StatusCode::OK);

    let response = server.get(&format!("/api/v1/suppliers/{supplier}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "current_balance"), d(40_000));

    // Card payments are not offered to suppliers
    let response = server
        .post("/api/v1/supplier-payments")
        .json(&CreateSupplierPaymentRequest {
            number: "SP-1".to_string(),
            date: date(2026, 5, 12),
            supplier_id: supplier as i32,
            amount: d(10_000),
            method: PaymentMethod::Card,
            reference: None,
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/supplier-payments")
        .json(&CreateSupplierPaymentRequest {
            number: "SP-1".to_string(),
            date: date(2026, 5, 12),
            supplier_id: supplier as i32,
            amount: d(10_000),
            method: PaymentMethod::Bank,
            reference: None,
            notes: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let payment: ApiResponse<Value> = response.json();
    let payment_id = payment.data["id"].as_i64().unwrap();

    server
        .post(&format!("/api/v1/supplier-payments/{payment_id}/post"))
        .await
        .assert_status(StatusCode::OK);

    let response = server.get(&format!("/api/v1/suppliers/{supplier}")).await;
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "current_balance"), d(30_000));
}

#[tokio::test]
async fn test_referenced_account_cannot_be_deleted() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let cash = create_account(&server, "1000", AccountKind::Asset, NormalBalance::Debit).await;
    create_journal_entry(&server, cash, EntrySide::Debit, d(100)).await;

    let response = server.delete(&format!("/api/v1/accounts/{cash}")).await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_posted_invoice_lines_are_frozen() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let receivables =
        create_account(&server, "1200", AccountKind::Asset, NormalBalance::Debit).await;
    let customer = create_customer(&server, receivables).await;
    let (product, _) = create_catalog(&server).await;
    let invoice = create_sales_invoice(&server, customer, "SI-1", date(2026, 5, 10)).await;

    server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post(&format!("/api/v1/sales-invoices/{invoice}/lines"))
        .json(&SalesInvoiceLineRequest {
            product_id: product as i32,
            quantity: d(100),
            unit_price: d(1_000),
            tax_rate: None,
            discount_amount: None,
        })
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_trial_balance_report() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let cash = create_account(&server, "1000", AccountKind::Asset, NormalBalance::Debit).await;
    let revenue =
        create_account(&server, "4000", AccountKind::Revenue, NormalBalance::Credit).await;
    create_journal_entry(&server, cash, EntrySide::Debit, d(50_000)).await;
    create_journal_entry(&server, revenue, EntrySide::Credit, d(50_000)).await;

    let response = server.get("/api/v1/reports/trial-balance").await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(body.data["rows"].as_array().unwrap().len(), 2);
    assert_eq!(dec_field(&body.data, "total_debit"), d(50_000));
    assert_eq!(dec_field(&body.data, "total_credit"), d(50_000));
}

#[tokio::test]
async fn test_dashboard_report() {
    let app = setup_test_app().await;
    let server = TestServer::new(app).unwrap();

    let receivables =
        create_account(&server, "1200", AccountKind::Asset, NormalBalance::Debit).await;
    let customer = create_customer(&server, receivables).await;
    let (product, _) = create_catalog(&server).await;
    let invoice = create_sales_invoice(&server, customer, "SI-1", date(2026, 5, 10)).await;
    add_example_line(&server, invoice, product).await;
    server
        .post(&format!("/api/v1/sales-invoices/{invoice}/post"))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .get("/api/v1/reports/dashboard?date=2026-05-10")
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Value> = response.json();
    assert_eq!(dec_field(&body.data, "daily_sales_total"), d(21_800));
    assert_eq!(body.data["active_products"], 1);
    assert_eq!(body.data["recent_sales"].as_array().unwrap().len(), 1);
}
