//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the trading post:
//!
//! - `goods`: tradeable items with stock and unit value
//! - `hunters`: buying counterparties
//! - `merchants`: selling counterparties
//! - `transactions`: completed exchanges with a derived total
//! - `transaction_lines`: per-good quantities of a transaction

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Goods {
    Table,
    Id,
    Name,
    Description,
    Material,
    Weight,
    Stock,
    Value,
}

#[derive(Iden)]
enum Hunters {
    Table,
    Id,
    Name,
    Race,
    Location,
}

#[derive(Iden)]
enum Merchants {
    Table,
    Id,
    Name,
    Kind,
    Location,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    CounterpartyRole,
    CounterpartyId,
    Direction,
    OccurredAt,
    TotalValue,
}

#[derive(Iden)]
enum TransactionLines {
    Table,
    Id,
    TransactionId,
    GoodId,
    Quantity,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Goods
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Goods::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goods::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Goods::Name).string().not_null())
                    .col(ColumnDef::new(Goods::Description).string().not_null())
                    .col(
                        ColumnDef::new(Goods::Material)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(ColumnDef::new(Goods::Weight).double().not_null())
                    .col(ColumnDef::new(Goods::Stock).big_integer().not_null())
                    .col(ColumnDef::new(Goods::Value).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goods-name-unique")
                    .table(Goods::Table)
                    .col(Goods::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Hunters
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Hunters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hunters::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hunters::Name).string().not_null())
                    .col(
                        ColumnDef::new(Hunters::Race)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(ColumnDef::new(Hunters::Location).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-hunters-name-unique")
                    .table(Hunters::Table)
                    .col(Hunters::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Merchants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Merchants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Merchants::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Merchants::Name).string().not_null())
                    .col(
                        ColumnDef::new(Merchants::Kind)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(ColumnDef::new(Merchants::Location).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-merchants-name-unique")
                    .table(Merchants::Table)
                    .col(Merchants::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CounterpartyRole)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CounterpartyId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Direction).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::TotalValue)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-counterparty")
                    .table(Transactions::Table)
                    .col(Transactions::CounterpartyRole)
                    .col(Transactions::CounterpartyId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transaction lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransactionLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionLines::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::GoodId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_lines-transaction_id")
                            .from(TransactionLines::Table, TransactionLines::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_lines-good_id")
                            .from(TransactionLines::Table, TransactionLines::GoodId)
                            .to(Goods::Table, Goods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_lines-transaction_id")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::TransactionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Merchants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hunters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goods::Table).to_owned())
            .await?;
        Ok(())
    }
}
