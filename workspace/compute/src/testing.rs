//! Shared fixtures for the rule tests. Each test gets its own in-memory
//! SQLite database with the full schema applied.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::account::{AccountKind, NormalBalance};
use model::entities::document_status::DocumentStatus;
use model::entities::journal_entry::EntrySide;
use model::entities::payment_method::PaymentMethod;
use model::entities::stock_movement::{MovementDirection, MovementReason};
use model::entities::{
    account, category, customer, customer_payment, journal_entry, product, purchase_invoice,
    sales_invoice, sales_invoice_line, stock_movement, supplier, supplier_payment, warehouse,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Set};

static SEQ: AtomicU32 = AtomicU32::new(1);

fn next_seq() -> u32 {
    SEQ.fetch_add(1, Ordering::Relaxed)
}

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None).await.expect("Migrations failed");
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn insert_account(
    db: &DatabaseConnection,
    code: &str,
    normal_balance: NormalBalance,
) -> account::Model {
    let kind = match normal_balance {
        NormalBalance::Debit => AccountKind::Asset,
        NormalBalance::Credit => AccountKind::Revenue,
    };
    account::ActiveModel {
        code: Set(code.to_string()),
        name: Set(format!("Account {code}")),
        kind: Set(kind),
        parent_id: Set(None),
        description: Set(None),
        normal_balance: Set(normal_balance),
        balance: Set(Decimal::ZERO),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert account")
}

pub async fn insert_entry(
    db: &DatabaseConnection,
    account_id: i32,
    side: EntrySide,
    amount: Decimal,
) -> journal_entry::Model {
    journal_entry::ActiveModel {
        date: Set(date(2026, 3, 1)),
        account_id: Set(account_id),
        side: Set(side),
        amount: Set(amount),
        description: Set("test entry".to_string()),
        reference: Set(format!("JE-{}", next_seq())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert journal entry")
}

/// Inserts a category, warehouse, and product; returns the product and the
/// warehouse id for movement fixtures.
pub async fn insert_product(db: &DatabaseConnection, code: &str) -> (product::Model, i32) {
    let seq = next_seq();
    let category = category::ActiveModel {
        code: Set(format!("CAT-{seq}")),
        name: Set("Test category".to_string()),
        parent_id: Set(None),
        description: Set(None),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert category");

    let warehouse = warehouse::ActiveModel {
        code: Set(format!("WH-{seq}")),
        name: Set("Test warehouse".to_string()),
        location: Set("Unit 1".to_string()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert warehouse");

    let product = product::ActiveModel {
        code: Set(code.to_string()),
        barcode: Set(None),
        name: Set(format!("Product {code}")),
        description: Set(None),
        category_id: Set(category.id),
        unit: Set(product::Unit::Piece),
        purchase_price: Set(Decimal::new(500, 2)),
        sale_price: Set(Decimal::new(800, 2)),
        min_stock: Set(Decimal::ZERO),
        current_stock: Set(Decimal::ZERO),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert product");

    (product, warehouse.id)
}

pub async fn insert_movement(
    db: &DatabaseConnection,
    product_id: i32,
    warehouse_id: i32,
    direction: MovementDirection,
    quantity: Decimal,
) -> stock_movement::Model {
    stock_movement::ActiveModel {
        date: Set(date(2026, 3, 2)),
        product_id: Set(product_id),
        warehouse_id: Set(warehouse_id),
        direction: Set(direction),
        reason: Set(MovementReason::Adjustment),
        quantity: Set(quantity),
        unit_price: Set(Decimal::new(500, 2)),
        reference: Set(format!("SM-{}", next_seq())),
        notes: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert stock movement")
}

/// A customer with a draft sales invoice and a product to put on its lines.
pub struct SalesScenario {
    pub customer: customer::Model,
    pub invoice: sales_invoice::Model,
    pub product: product::Model,
}

impl SalesScenario {
    pub async fn seed(db: &DatabaseConnection) -> Self {
        let receivables = insert_account(db, &format!("1200-{}", next_seq()), NormalBalance::Debit).await;
        let (product, _) = insert_product(db, &format!("P-{}", next_seq())).await;

        let customer = customer::ActiveModel {
            code: Set(format!("C-{}", next_seq())),
            name: Set("Test customer".to_string()),
            contact_person: Set(None),
            phone: Set("555-0100".to_string()),
            email: Set(None),
            address: Set("1 Main St".to_string()),
            tax_number: Set(None),
            account_id: Set(receivables.id),
            credit_limit: Set(Decimal::ZERO),
            current_balance: Set(Decimal::ZERO),
            is_active: Set(true),
            notes: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert customer");

        let invoice = sales_invoice::ActiveModel {
            number: Set(format!("SI-{}", next_seq())),
            date: Set(date(2026, 3, 3)),
            customer_id: Set(customer.id),
            status: Set(DocumentStatus::Draft),
            subtotal: Set(Decimal::ZERO),
            tax_amount: Set(Decimal::ZERO),
            discount_amount: Set(Decimal::ZERO),
            total_amount: Set(Decimal::ZERO),
            due_date: Set(date(2026, 4, 3)),
            notes: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert sales invoice");

        Self {
            customer,
            invoice,
            product,
        }
    }
}

/// A supplier with a draft purchase invoice.
pub struct PurchaseScenario {
    pub supplier: supplier::Model,
    pub invoice: purchase_invoice::Model,
}

impl PurchaseScenario {
    pub async fn seed(db: &DatabaseConnection) -> Self {
        let payables = insert_account(db, &format!("2100-{}", next_seq()), NormalBalance::Credit).await;

        let supplier = supplier::ActiveModel {
            code: Set(format!("S-{}", next_seq())),
            name: Set("Test supplier".to_string()),
            contact_person: Set(None),
            phone: Set("555-0200".to_string()),
            email: Set(None),
            address: Set("7 Dock Rd".to_string()),
            tax_number: Set(None),
            account_id: Set(payables.id),
            credit_limit: Set(Decimal::ZERO),
            current_balance: Set(Decimal::ZERO),
            is_active: Set(true),
            notes: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert supplier");

        let invoice = purchase_invoice::ActiveModel {
            number: Set(format!("PI-{}", next_seq())),
            date: Set(date(2026, 3, 4)),
            supplier_id: Set(supplier.id),
            status: Set(DocumentStatus::Draft),
            subtotal: Set(Decimal::ZERO),
            tax_amount: Set(Decimal::ZERO),
            discount_amount: Set(Decimal::ZERO),
            total_amount: Set(Decimal::ZERO),
            due_date: Set(date(2026, 4, 4)),
            notes: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert purchase invoice");

        Self { supplier, invoice }
    }
}

/// Stores a line with a zero total; recomputation is expected to fill it in.
pub async fn insert_sales_line(
    db: &DatabaseConnection,
    invoice_id: i32,
    product_id: i32,
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
    discount_amount: Decimal,
) -> sales_invoice_line::Model {
    sales_invoice_line::ActiveModel {
        invoice_id: Set(invoice_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        tax_rate: Set(tax_rate),
        discount_amount: Set(discount_amount),
        total: Set(Decimal::ZERO),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert sales line")
}

pub async fn set_invoice_status_and_total(
    db: &DatabaseConnection,
    invoice_id: i32,
    status: DocumentStatus,
    total_amount: Decimal,
) {
    let invoice = sales_invoice::Entity::find_by_id(invoice_id)
        .one(db)
        .await
        .expect("find invoice")
        .expect("invoice exists");
    let mut active: sales_invoice::ActiveModel = invoice.into();
    active.status = Set(status);
    active.total_amount = Set(total_amount);
    active.update(db).await.expect("update invoice");
}

pub async fn set_purchase_invoice_status_and_total(
    db: &DatabaseConnection,
    invoice_id: i32,
    status: DocumentStatus,
    total_amount: Decimal,
) {
    let invoice = purchase_invoice::Entity::find_by_id(invoice_id)
        .one(db)
        .await
        .expect("find invoice")
        .expect("invoice exists");
    let mut active: purchase_invoice::ActiveModel = invoice.into();
    active.status = Set(status);
    active.total_amount = Set(total_amount);
    active.update(db).await.expect("update invoice");
}

pub async fn insert_customer_payment(
    db: &DatabaseConnection,
    customer_id: i32,
    amount: Decimal,
    status: DocumentStatus,
) -> customer_payment::Model {
    customer_payment::ActiveModel {
        number: Set(format!("CP-{}", next_seq())),
        date: Set(date(2026, 3, 5)),
        customer_id: Set(customer_id),
        amount: Set(amount),
        method: Set(PaymentMethod::Cash),
        reference: Set(None),
        status: Set(status),
        notes: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert customer payment")
}

pub async fn set_customer_payment_status(
    db: &DatabaseConnection,
    payment_id: i32,
    status: DocumentStatus,
) {
    let payment = customer_payment::Entity::find_by_id(payment_id)
        .one(db)
        .await
        .expect("find payment")
        .expect("payment exists");
    let mut active: customer_payment::ActiveModel = payment.into();
    active.status = Set(status);
    active.update(db).await.expect("update payment");
}

pub async fn insert_supplier_payment(
    db: &DatabaseConnection,
    supplier_id: i32,
    amount: Decimal,
    status: DocumentStatus,
) -> supplier_payment::Model {
    supplier_payment::ActiveModel {
        number: Set(format!("SP-{}", next_seq())),
        date: Set(date(2026, 3, 6)),
        supplier_id: Set(supplier_id),
        amount: Set(amount),
        method: Set(PaymentMethod::Bank),
        reference: Set(None),
        status: Set(status),
        notes: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert supplier payment")
}
