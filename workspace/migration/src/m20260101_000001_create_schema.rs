use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Chart of accounts
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string(Accounts::Code).unique_key())
                    .col(string(Accounts::Name))
                    .col(string_len(Accounts::Kind, 10))
                    .col(integer_null(Accounts::ParentId))
                    .col(string_null(Accounts::Description))
                    .col(string_len(Accounts::NormalBalance, 6))
                    .col(decimal_len(Accounts::Balance, 15, 2).default(0))
                    .col(boolean(Accounts::IsActive).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_parent")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(pk_auto(JournalEntries::Id))
                    .col(date(JournalEntries::Date))
                    .col(integer(JournalEntries::AccountId))
                    .col(string_len(JournalEntries::Side, 6))
                    .col(decimal_len(JournalEntries::Amount, 15, 2))
                    .col(string(JournalEntries::Description))
                    .col(string(JournalEntries::Reference))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_entry_account")
                            .from(JournalEntries::Table, JournalEntries::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Inventory
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Code).unique_key())
                    .col(string(Categories::Name))
                    .col(integer_null(Categories::ParentId))
                    .col(string_null(Categories::Description))
                    .col(boolean(Categories::IsActive).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_parent")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string(Products::Code).unique_key())
                    .col(string_null(Products::Barcode))
                    .col(string(Products::Name))
                    .col(string_null(Products::Description))
                    .col(integer(Products::CategoryId))
                    .col(string_len(Products::Unit, 10))
                    .col(decimal_len(Products::PurchasePrice, 10, 2))
                    .col(decimal_len(Products::SalePrice, 10, 2))
                    .col(decimal_len(Products::MinStock, 10, 2).default(0))
                    .col(decimal_len(Products::CurrentStock, 10, 2).default(0))
                    .col(boolean(Products::IsActive).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(pk_auto(Warehouses::Id))
                    .col(string(Warehouses::Code).unique_key())
                    .col(string(Warehouses::Name))
                    .col(string(Warehouses::Location))
                    .col(boolean(Warehouses::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(pk_auto(StockMovements::Id))
                    .col(date(StockMovements::Date))
                    .col(integer(StockMovements::ProductId))
                    .col(integer(StockMovements::WarehouseId))
                    .col(string_len(StockMovements::Direction, 3))
                    .col(string_len(StockMovements::Reason, 20))
                    .col(decimal_len(StockMovements::Quantity, 10, 2))
                    .col(decimal_len(StockMovements::UnitPrice, 10, 2))
                    .col(string(StockMovements::Reference))
                    .col(string_null(StockMovements::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movement_product")
                            .from(StockMovements::Table, StockMovements::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movement_warehouse")
                            .from(StockMovements::Table, StockMovements::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Parties
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(pk_auto(Customers::Id))
                    .col(string(Customers::Code).unique_key())
                    .col(string(Customers::Name))
                    .col(string_null(Customers::ContactPerson))
                    .col(string(Customers::Phone))
                    .col(string_null(Customers::Email))
                    .col(string(Customers::Address))
                    .col(string_null(Customers::TaxNumber))
                    .col(integer(Customers::AccountId))
                    .col(decimal_len(Customers::CreditLimit, 10, 2).default(0))
                    .col(decimal_len(Customers::CurrentBalance, 10, 2).default(0))
                    .col(boolean(Customers::IsActive).default(true))
                    .col(string_null(Customers::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_account")
                            .from(Customers::Table, Customers::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(pk_auto(Suppliers::Id))
                    .col(string(Suppliers::Code).unique_key())
                    .col(string(Suppliers::Name))
                    .col(string_null(Suppliers::ContactPerson))
                    .col(string(Suppliers::Phone))
                    .col(string_null(Suppliers::Email))
                    .col(string(Suppliers::Address))
                    .col(string_null(Suppliers::TaxNumber))
                    .col(integer(Suppliers::AccountId))
                    .col(decimal_len(Suppliers::CreditLimit, 10, 2).default(0))
                    .col(decimal_len(Suppliers::CurrentBalance, 10, 2).default(0))
                    .col(boolean(Suppliers::IsActive).default(true))
                    .col(string_null(Suppliers::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_account")
                            .from(Suppliers::Table, Suppliers::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sales
        manager
            .create_table(
                Table::create()
                    .table(SalesInvoices::Table)
                    .if_not_exists()
                    .col(pk_auto(SalesInvoices::Id))
                    .col(string(SalesInvoices::Number).unique_key())
                    .col(date(SalesInvoices::Date))
                    .col(integer(SalesInvoices::CustomerId))
                    .col(string_len(SalesInvoices::Status, 10))
                    .col(decimal_len(SalesInvoices::Subtotal, 10, 2).default(0))
                    .col(decimal_len(SalesInvoices::TaxAmount, 10, 2).default(0))
                    .col(decimal_len(SalesInvoices::DiscountAmount, 10, 2).default(0))
                    .col(decimal_len(SalesInvoices::TotalAmount, 10, 2).default(0))
                    .col(date(SalesInvoices::DueDate))
                    .col(string_null(SalesInvoices::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_invoice_customer")
                            .from(SalesInvoices::Table, SalesInvoices::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SalesInvoiceLines::Table)
                    .if_not_exists()
                    .col(pk_auto(SalesInvoiceLines::Id))
                    .col(integer(SalesInvoiceLines::InvoiceId))
                    .col(integer(SalesInvoiceLines::ProductId))
                    .col(decimal_len(SalesInvoiceLines::Quantity, 10, 2))
                    .col(decimal_len(SalesInvoiceLines::UnitPrice, 10, 2))
                    .col(decimal_len(SalesInvoiceLines::TaxRate, 5, 2).default(0))
                    .col(decimal_len(SalesInvoiceLines::DiscountAmount, 10, 2).default(0))
                    .col(decimal_len(SalesInvoiceLines::Total, 10, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_invoice_line_invoice")
                            .from(SalesInvoiceLines::Table, SalesInvoiceLines::InvoiceId)
                            .to(SalesInvoices::Table, SalesInvoices::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_invoice_line_product")
                            .from(SalesInvoiceLines::Table, SalesInvoiceLines::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Purchases
        manager
            .create_table(
                Table::create()
                    .table(PurchaseInvoices::Table)
                    .if_not_exists()
                    .col(pk_auto(PurchaseInvoices::Id))
                    .col(string(PurchaseInvoices::Number).unique_key())
                    .col(date(PurchaseInvoices::Date))
                    .col(integer(PurchaseInvoices::SupplierId))
                    .col(string_len(PurchaseInvoices::Status, 10))
                    .col(decimal_len(PurchaseInvoices::Subtotal, 10, 2).default(0))
                    .col(decimal_len(PurchaseInvoices::TaxAmount, 10, 2).default(0))
                    .col(decimal_len(PurchaseInvoices::DiscountAmount, 10, 2).default(0))
                    .col(decimal_len(PurchaseInvoices::TotalAmount, 10, 2).default(0))
                    .col(date(PurchaseInvoices::DueDate))
                    .col(string_null(PurchaseInvoices::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_invoice_supplier")
                            .from(PurchaseInvoices::Table, PurchaseInvoices::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseInvoiceLines::Table)
                    .if_not_exists()
                    .col(pk_auto(PurchaseInvoiceLines::Id))
                    .col(integer(PurchaseInvoiceLines::InvoiceId))
                    .col(integer(PurchaseInvoiceLines::ProductId))
                    .col(decimal_len(PurchaseInvoiceLines::Quantity, 10, 2))
                    .col(decimal_len(PurchaseInvoiceLines::UnitPrice, 10, 2))
                    .col(decimal_len(PurchaseInvoiceLines::TaxRate, 5, 2).default(0))
                    .col(decimal_len(PurchaseInvoiceLines::DiscountAmount, 10, 2).default(0))
                    .col(decimal_len(PurchaseInvoiceLines::Total, 10, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_invoice_line_invoice")
                            .from(
                                PurchaseInvoiceLines::Table,
                                PurchaseInvoiceLines::InvoiceId,
                            )
                            .to(PurchaseInvoices::Table, PurchaseInvoices::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_invoice_line_product")
                            .from(
                                PurchaseInvoiceLines::Table,
                                PurchaseInvoiceLines::ProductId,
                            )
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Payments
        manager
            .create_table(
                Table::create()
                    .table(CustomerPayments::Table)
                    .if_not_exists()
                    .col(pk_auto(CustomerPayments::Id))
                    .col(string(CustomerPayments::Number).unique_key())
                    .col(date(CustomerPayments::Date))
                    .col(integer(CustomerPayments::CustomerId))
                    .col(decimal_len(CustomerPayments::Amount, 10, 2))
                    .col(string_len(CustomerPayments::Method, 10))
                    .col(string_null(CustomerPayments::Reference))
                    .col(string_len(CustomerPayments::Status, 10))
                    .col(string_null(CustomerPayments::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_payment_customer")
                            .from(CustomerPayments::Table, CustomerPayments::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupplierPayments::Table)
                    .if_not_exists()
                    .col(pk_auto(SupplierPayments::Id))
                    .col(string(SupplierPayments::Number).unique_key())
                    .col(date(SupplierPayments::Date))
                    .col(integer(SupplierPayments::SupplierId))
                    .col(decimal_len(SupplierPayments::Amount, 10, 2))
                    .col(string_len(SupplierPayments::Method, 10))
                    .col(string_null(SupplierPayments::Reference))
                    .col(string_len(SupplierPayments::Status, 10))
                    .col(string_null(SupplierPayments::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_payment_supplier")
                            .from(SupplierPayments::Table, SupplierPayments::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupplierPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseInvoiceLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseInvoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesInvoiceLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesInvoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    Kind,
    ParentId,
    Description,
    NormalBalance,
    Balance,
    IsActive,
}

#[derive(DeriveIden)]
enum JournalEntries {
    Table,
    Id,
    Date,
    AccountId,
    Side,
    Amount,
    Description,
    Reference,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Code,
    Name,
    ParentId,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Code,
    Barcode,
    Name,
    Description,
    CategoryId,
    Unit,
    PurchasePrice,
    SalePrice,
    MinStock,
    CurrentStock,
    IsActive,
}

#[derive(DeriveIden)]
enum Warehouses {
    Table,
    Id,
    Code,
    Name,
    Location,
    IsActive,
}

#[derive(DeriveIden)]
enum StockMovements {
    Table,
    Id,
    Date,
    ProductId,
    WarehouseId,
    Direction,
    Reason,
    Quantity,
    UnitPrice,
    Reference,
    Notes,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Code,
    Name,
    ContactPerson,
    Phone,
    Email,
    Address,
    TaxNumber,
    AccountId,
    CreditLimit,
    CurrentBalance,
    IsActive,
    Notes,
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
    Code,
    Name,
    ContactPerson,
    Phone,
    Email,
    Address,
    TaxNumber,
    AccountId,
    CreditLimit,
    CurrentBalance,
    IsActive,
    Notes,
}

#[derive(DeriveIden)]
enum SalesInvoices {
    Table,
    Id,
    Number,
    Date,
    CustomerId,
    Status,
    Subtotal,
    TaxAmount,
    DiscountAmount,
    TotalAmount,
    DueDate,
    Notes,
}

#[derive(DeriveIden)]
enum SalesInvoiceLines {
    Table,
    Id,
    InvoiceId,
    ProductId,
    Quantity,
    UnitPrice,
    TaxRate,
    DiscountAmount,
    Total,
}

#[derive(DeriveIden)]
enum PurchaseInvoices {
    Table,
    Id,
    Number,
    Date,
    SupplierId,
    Status,
    Subtotal,
    TaxAmount,
    DiscountAmount,
    TotalAmount,
    DueDate,
    Notes,
}

#[derive(DeriveIden)]
enum PurchaseInvoiceLines {
    Table,
    Id,
    InvoiceId,
    ProductId,
    Quantity,
    UnitPrice,
    TaxRate,
    DiscountAmount,
    Total,
}

#[derive(DeriveIden)]
enum CustomerPayments {
    Table,
    Id,
    Number,
    Date,
    CustomerId,
    Amount,
    Method,
    Reference,
    Status,
    Notes,
}

#[derive(DeriveIden)]
enum SupplierPayments {
    Table,
    Id,
    Number,
    Date,
    SupplierId,
    Amount,
    Method,
    Reference,
    Status,
    Notes,
}
