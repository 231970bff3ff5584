//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Mecenate:
//!
//! - `users`: authentication and the root-operator flag
//! - `accounts`: the parties that send or receive funds (hosts included)
//! - `account_memberships`: multi-user account access
//! - `payment_methods`: funding instruments owned by accounts
//! - `orders`: fund-movement intents
//! - `entries`: the append-only double-entry ledger

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Email,
    Name,
    Password,
    IsRoot,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    Slug,
    Kind,
    Currency,
    Website,
    HostAccountId,
    CanHost,
    HostFeePercent,
    CreatedBy,
    Archived,
}

#[derive(Iden)]
enum AccountMemberships {
    Table,
    AccountId,
    UserEmail,
    Role,
}

#[derive(Iden)]
enum PaymentMethods {
    Table,
    Id,
    AccountId,
    Service,
    Currency,
    Token,
    Name,
    Archived,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    FromAccountId,
    ToAccountId,
    PaymentMethodId,
    AmountMinor,
    Currency,
    Description,
    HostFeePercent,
    PlatformFeePercent,
    Status,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    Kind,
    OrderId,
    AccountId,
    CounterpartyAccountId,
    HostAccountId,
    PaymentMethodId,
    CreatedBy,
    AmountMinor,
    Currency,
    HostCurrency,
    HostCurrencyFxRate,
    AmountInHostMinor,
    HostFeeMinor,
    PlatformFeeMinor,
    PaymentProcessorFeeMinor,
    NetAmountMinor,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsRoot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Slug).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Accounts::Website).string())
                    .col(ColumnDef::new(Accounts::HostAccountId).string())
                    .col(
                        ColumnDef::new(Accounts::CanHost)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::HostFeePercent).double())
                    .col(ColumnDef::new(Accounts::CreatedBy).string())
                    .col(ColumnDef::new(Accounts::Archived).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-host_account_id")
                            .from(Accounts::Table, Accounts::HostAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-created_by")
                            .from(Accounts::Table, Accounts::CreatedBy)
                            .to(Users::Table, Users::Email),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-slug-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-host_account_id")
                    .table(Accounts::Table)
                    .col(Accounts::HostAccountId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Account Memberships
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountMemberships::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountMemberships::UserEmail)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountMemberships::Role).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(AccountMemberships::AccountId)
                            .col(AccountMemberships::UserEmail),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_memberships-account_id")
                            .from(AccountMemberships::Table, AccountMemberships::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_memberships-user_email")
                            .from(AccountMemberships::Table, AccountMemberships::UserEmail)
                            .to(Users::Table, Users::Email)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-account_memberships-user_email")
                    .table(AccountMemberships::Table)
                    .col(AccountMemberships::UserEmail)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payment Methods
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentMethods::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentMethods::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentMethods::Service).string().not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(PaymentMethods::Token).string().not_null())
                    .col(ColumnDef::new(PaymentMethods::Name).string())
                    .col(
                        ColumnDef::new(PaymentMethods::Archived)
                            .boolean()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payment_methods-account_id")
                            .from(PaymentMethods::Table, PaymentMethods::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_methods-token-unique")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_methods-account_id")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::AccountId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::FromAccountId).string().not_null())
                    .col(ColumnDef::new(Orders::ToAccountId).string().not_null())
                    .col(
                        ColumnDef::new(Orders::PaymentMethodId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Currency).string().not_null())
                    .col(ColumnDef::new(Orders::Description).string())
                    .col(ColumnDef::new(Orders::HostFeePercent).double())
                    .col(ColumnDef::new(Orders::PlatformFeePercent).double())
                    .col(ColumnDef::new(Orders::Status).string().not_null())
                    .col(ColumnDef::new(Orders::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-from_account_id")
                            .from(Orders::Table, Orders::FromAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-to_account_id")
                            .from(Orders::Table, Orders::ToAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-payment_method_id")
                            .from(Orders::Table, Orders::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-created_by")
                    .table(Orders::Table)
                    .col(Orders::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::Kind).string().not_null())
                    .col(ColumnDef::new(Entries::OrderId).string().not_null())
                    .col(ColumnDef::new(Entries::AccountId).string().not_null())
                    .col(
                        ColumnDef::new(Entries::CounterpartyAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::HostAccountId).string().not_null())
                    .col(
                        ColumnDef::new(Entries::PaymentMethodId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Entries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::Currency).string().not_null())
                    .col(ColumnDef::new(Entries::HostCurrency).string().not_null())
                    .col(
                        ColumnDef::new(Entries::HostCurrencyFxRate)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::AmountInHostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::HostFeeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::PlatformFeeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::PaymentProcessorFeeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::NetAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-order_id")
                            .from(Entries::Table, Entries::OrderId)
                            .to(Orders::Table, Orders::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-account_id")
                            .from(Entries::Table, Entries::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-host_account_id")
                            .from(Entries::Table, Entries::HostAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-order_id")
                    .table(Entries::Table)
                    .col(Entries::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-account_id-created_at")
                    .table(Entries::Table)
                    .col(Entries::AccountId)
                    .col(Entries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-payment_method_id")
                    .table(Entries::Table)
                    .col(Entries::PaymentMethodId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountMemberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
