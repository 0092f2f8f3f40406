//! Root for all SeaORM entity modules of the accounting domain: chart of
//! accounts, inventory, sales, purchases, and payments. Derived columns
//! (`balance`, `current_stock`, invoice totals, party balances) are caches
//! owned by the compute crate's recomputation rules.

pub mod account;
pub mod category;
pub mod customer;
pub mod customer_payment;
pub mod document_status;
pub mod journal_entry;
pub mod payment_method;
pub mod product;
pub mod purchase_invoice;
pub mod purchase_invoice_line;
pub mod sales_invoice;
pub mod sales_invoice_line;
pub mod stock_movement;
pub mod supplier;
pub mod supplier_payment;
pub mod warehouse;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::category::Entity as Category;
    pub use super::customer::Entity as Customer;
    pub use super::customer_payment::Entity as CustomerPayment;
    pub use super::journal_entry::Entity as JournalEntry;
    pub use super::product::Entity as Product;
    pub use super::purchase_invoice::Entity as PurchaseInvoice;
    pub use super::purchase_invoice_line::Entity as PurchaseInvoiceLine;
    pub use super::sales_invoice::Entity as SalesInvoice;
    pub use super::sales_invoice_line::Entity as SalesInvoiceLine;
    pub use super::stock_movement::Entity as StockMovement;
    pub use super::supplier::Entity as Supplier;
    pub use super::supplier_payment::Entity as SupplierPayment;
    pub use super::warehouse::Entity as Warehouse;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use document_status::DocumentStatus;
    use payment_method::PaymentMethod;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        // Chart of accounts
        let receivables = account::ActiveModel {
            code: Set("1200".to_string()),
            name: Set("Accounts receivable".to_string()),
            kind: Set(account::AccountKind::Asset),
            parent_id: Set(None),
            description: Set(None),
            normal_balance: Set(account::NormalBalance::Debit),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let payables = account::ActiveModel {
            code: Set("2100".to_string()),
            name: Set("Accounts payable".to_string()),
            kind: Set(account::AccountKind::Liability),
            parent_id: Set(None),
            description: Set(None),
            normal_balance: Set(account::NormalBalance::Credit),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let entry = journal_entry::ActiveModel {
            date: Set(date(2026, 1, 15)),
            account_id: Set(receivables.id),
            side: Set(journal_entry::EntrySide::Debit),
            amount: Set(Decimal::new(50_000, 2)),
            description: Set("Opening receivable".to_string()),
            reference: Set("JE-1".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Inventory
        let category = category::ActiveModel {
            code: Set("CAT1".to_string()),
            name: Set("Beverages".to_string()),
            parent_id: Set(None),
            description: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let product = product::ActiveModel {
            code: Set("P-100".to_string()),
            barcode: Set(None),
            name: Set("Coffee beans 1kg".to_string()),
            description: Set(None),
            category_id: Set(category.id),
            unit: Set(product::Unit::Kg),
            purchase_price: Set(Decimal::new(4_000, 2)),
            sale_price: Set(Decimal::new(6_500, 2)),
            min_stock: Set(Decimal::new(500, 2)),
            current_stock: Set(Decimal::ZERO),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let warehouse = warehouse::ActiveModel {
            code: Set("WH1".to_string()),
            name: Set("Main warehouse".to_string()),
            location: Set("Back of the shop".to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        stock_movement::ActiveModel {
            date: Set(date(2026, 1, 16)),
            product_id: Set(product.id),
            warehouse_id: Set(warehouse.id),
            direction: Set(stock_movement::MovementDirection::In),
            reason: Set(stock_movement::MovementReason::Purchase),
            quantity: Set(Decimal::new(1_000, 2)),
            unit_price: Set(Decimal::new(4_000, 2)),
            reference: Set("GRN-1".to_string()),
            notes: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Parties
        let customer = customer::ActiveModel {
            code: Set("C-1".to_string()),
            name: Set("Corner Cafe".to_string()),
            contact_person: Set(None),
            phone: Set("555-0100".to_string()),
            email: Set(Some("orders@cornercafe.test".to_string())),
            address: Set("1 Main St".to_string()),
            tax_number: Set(None),
            account_id: Set(receivables.id),
            credit_limit: Set(Decimal::new(100_000, 2)),
            current_balance: Set(Decimal::ZERO),
            is_active: Set(true),
            notes: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let supplier = supplier::ActiveModel {
            code: Set("S-1".to_string()),
            name: Set("Bean Importers".to_string()),
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
        .insert(&db)
        .await?;

        // Sales invoice with one line
        let invoice = sales_invoice::ActiveModel {
            number: Set("SI-1".to_string()),
            date: Set(date(2026, 1, 17)),
            customer_id: Set(customer.id),
            status: Set(DocumentStatus::Draft),
            subtotal: Set(Decimal::ZERO),
            tax_amount: Set(Decimal::ZERO),
            discount_amount: Set(Decimal::ZERO),
            total_amount: Set(Decimal::ZERO),
            due_date: Set(date(2026, 2, 17)),
            notes: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let line = sales_invoice_line::ActiveModel {
            invoice_id: Set(invoice.id),
            product_id: Set(product.id),
            quantity: Set(Decimal::new(200, 2)),
            unit_price: Set(Decimal::new(6_500, 2)),
            tax_rate: Set(Decimal::new(1_400, 2)),
            discount_amount: Set(Decimal::ZERO),
            total: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        customer_payment::ActiveModel {
            number: Set("CP-1".to_string()),
            date: Set(date(2026, 1, 20)),
            customer_id: Set(customer.id),
            amount: Set(Decimal::new(10_000, 2)),
            method: Set(PaymentMethod::Cash),
            reference: Set(None),
            status: Set(DocumentStatus::Draft),
            notes: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back through relations
        let entries = receivables.find_related(JournalEntry).all(&db).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry.id);

        let lines = invoice.find_related(SalesInvoiceLine).all(&db).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, line.id);

        let movements = StockMovement::find()
            .filter(stock_movement::Column::ProductId.eq(product.id))
            .all(&db)
            .await?;
        assert_eq!(movements.len(), 1);
        assert_eq!(
            movements[0].direction,
            stock_movement::MovementDirection::In
        );

        let supplier_invoices = supplier.find_related(PurchaseInvoice).all(&db).await?;
        assert!(supplier_invoices.is_empty());

        // Deleting a referenced product must be blocked by the FK
        let res = Product::delete_by_id(product.id).exec(&db).await;
        assert!(res.is_err(), "restrict FK should block product deletion");

        // Deleting the invoice cascades to its lines
        SalesInvoice::delete_by_id(invoice.id).exec(&db).await?;
        let orphan_lines = SalesInvoiceLine::find()
            .filter(sales_invoice_line::Column::InvoiceId.eq(invoice.id))
            .all(&db)
            .await?;
        assert!(orphan_lines.is_empty());

        Ok(())
    }
}
