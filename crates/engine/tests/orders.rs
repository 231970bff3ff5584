use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountKind, Currency, Engine, EngineError, FixedRateProvider, NewAccountCmd,
    NewOrganization, NewPaymentMethodCmd, OrderCmd, OrderStatus, PaymentMethodService,
    RemoteUser,
};
use migration::MigratorTrait;

const EUR_USD: f64 = 1.1654;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (email, is_root) in [
        ("alice@example.com", false),
        ("bob@example.com", false),
        ("root@example.com", true),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (email, name, password, is_root) VALUES (?, ?, ?, ?)",
            vec![email.into(), email.into(), "password".into(), is_root.into()],
        ))
        .await
        .unwrap();
    }
    let rates = FixedRateProvider::default().with_rate(Currency::Eur, Currency::Usd, EUR_USD);
    let engine = Engine::builder()
        .database(db.clone())
        .rates(Arc::new(rates))
        .build()
        .await
        .unwrap();
    (engine, db)
}

struct Fixture {
    host_id: String,
    collective_id: String,
    host_pm_token: String,
    backer_org_id: String,
    backer_pm_token: String,
}

/// One host (USD, admin alice), one hosted collective (EUR), a host-owned
/// internal payment method and a backer organization owned by bob with its
/// own external payment method.
async fn fixture(engine: &Engine) -> Fixture {
    let host = engine
        .new_account(
            NewAccountCmd::new("Open Host", AccountKind::Host, Currency::Usd, "alice@example.com")
                .can_host(true),
        )
        .await
        .unwrap();
    let collective = engine
        .new_account(
            NewAccountCmd::new(
                "Science Fund",
                AccountKind::Collective,
                Currency::Eur,
                "alice@example.com",
            )
            .host(host.id.clone()),
        )
        .await
        .unwrap();
    let host_pm = engine
        .new_payment_method(NewPaymentMethodCmd::new(
            host.id.clone(),
            PaymentMethodService::Collective,
            Currency::Usd,
            "alice@example.com",
        ))
        .await
        .unwrap();
    let backer_org = engine
        .new_account(NewAccountCmd::new(
            "Backer Org",
            AccountKind::Organization,
            Currency::Eur,
            "bob@example.com",
        ))
        .await
        .unwrap();
    let backer_pm = engine
        .new_payment_method(NewPaymentMethodCmd::new(
            backer_org.id.clone(),
            PaymentMethodService::Stripe,
            Currency::Eur,
            "bob@example.com",
        ))
        .await
        .unwrap();

    Fixture {
        host_id: host.id,
        collective_id: collective.id,
        host_pm_token: host_pm.token,
        backer_org_id: backer_org.id,
        backer_pm_token: backer_pm.token,
    }
}

#[tokio::test]
async fn order_realizes_a_balanced_entry_pair() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let created = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();

    let order = engine.order(&created.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.currency, Currency::Eur);

    let entries = engine.order_entries(&created.order_id).await.unwrap();
    assert_eq!(entries.len(), 2);
    let credit = &entries[0];
    let debit = &entries[1];

    assert_eq!(credit.amount_minor, 1000);
    assert_eq!(credit.amount_in_host_minor, 1165);
    assert_eq!(credit.host_fee_minor, 0);
    assert_eq!(credit.net_amount_minor, 1000);
    assert_eq!(credit.account_id, fx.collective_id);
    assert_eq!(credit.counterparty_account_id, fx.backer_org_id);
    assert_eq!(credit.host_account_id, fx.host_id);

    assert_eq!(debit.amount_minor, -1000);
    assert_eq!(debit.amount_in_host_minor, -credit.amount_in_host_minor);
    assert_eq!(debit.host_fee_minor, -credit.host_fee_minor);
    assert_eq!(debit.platform_fee_minor, -credit.platform_fee_minor);
    assert_eq!(
        debit.payment_processor_fee_minor,
        -credit.payment_processor_fee_minor
    );
    assert_eq!(debit.account_id, fx.backer_org_id);
    assert_eq!(debit.counterparty_account_id, fx.collective_id);
}

#[tokio::test]
async fn stored_rate_is_the_inverse_rounded_to_fifteen_decimals() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let created = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();

    let entries = engine.order_entries(&created.order_id).await.unwrap();
    let expected = (1.0 / EUR_USD * 1e15).round() / 1e15;
    assert_eq!(entries[0].host_currency_fx_rate, expected);
    assert_eq!(entries[1].host_currency_fx_rate, expected);
}

#[tokio::test]
async fn host_fee_is_taken_in_host_currency() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let created = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .host_fee_percent(4.0)
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();

    let entries = engine.order_entries(&created.order_id).await.unwrap();
    let credit = &entries[0];
    // 4% of 1000 at 1.1654 is 46.616, rounded away from zero.
    assert_eq!(credit.host_fee_minor, -47);
    assert_eq!(credit.net_amount_minor, 960);
    assert_eq!(entries[1].host_fee_minor, 47);
}

#[tokio::test]
async fn destination_default_host_fee_applies() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let funded = engine
        .new_account(
            NewAccountCmd::new(
                "Funded Project",
                AccountKind::Collective,
                Currency::Eur,
                "alice@example.com",
            )
            .host(fx.host_id.clone())
            .host_fee_percent(4.0),
        )
        .await
        .unwrap();

    let created = engine
        .create_order(
            OrderCmd::new(funded.id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();

    let entries = engine.order_entries(&created.order_id).await.unwrap();
    assert_eq!(entries[0].host_fee_minor, -47);
    assert_eq!(entries[0].net_amount_minor, 960);
}

#[tokio::test]
async fn unauthenticated_order_is_denied() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let err = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Unauthorized("you need to be logged in to create an order".to_string())
    );
}

#[tokio::test]
async fn host_source_requires_host_adminship() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let err = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.host_pm_token.clone(), 1000)
                .from_account(fx.host_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Unauthorized(
            "insufficient permissions to create an order on behalf of the host Open Host"
                .to_string()
        )
    );
    // Nothing reached the ledger.
    let (balance, _) = engine.balance_of_account(&fx.collective_id).await.unwrap();
    assert_eq!(balance, 0);
}

#[tokio::test]
async fn platform_fee_override_is_root_only() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let err = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .platform_fee_percent(5.0)
                .created_by("bob@example.com"),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Unauthorized("only a root operator can change the platform fee".to_string())
    );
    let (balance, _) = engine.balance_of_account(&fx.collective_id).await.unwrap();
    assert_eq!(balance, 0);

    // The root operator may override it, through a payment method they admin.
    let root_org = engine
        .new_account(NewAccountCmd::new(
            "Root Org",
            AccountKind::Organization,
            Currency::Eur,
            "root@example.com",
        ))
        .await
        .unwrap();
    let root_pm = engine
        .new_payment_method(NewPaymentMethodCmd::new(
            root_org.id.clone(),
            PaymentMethodService::Stripe,
            Currency::Eur,
            "root@example.com",
        ))
        .await
        .unwrap();
    let created = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), root_pm.token.clone(), 1000)
                .from_account(root_org.id.clone())
                .platform_fee_percent(5.0)
                .created_by("root@example.com"),
        )
        .await
        .unwrap();

    let entries = engine.order_entries(&created.order_id).await.unwrap();
    // 5% of 1000 at 1.1654 is 58.27, rounded away from zero.
    assert_eq!(entries[0].platform_fee_minor, -58);
    assert_eq!(entries[1].platform_fee_minor, 58);
}

#[tokio::test]
async fn foreign_payment_method_is_denied() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let err = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("alice@example.com"),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Unauthorized(
            "insufficient permissions to access this payment method".to_string()
        )
    );
}

#[tokio::test]
async fn host_payment_method_must_match_destination_host() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    // A second host with its own internal payment method, also run by alice.
    let other_host = engine
        .new_account(
            NewAccountCmd::new(
                "Other Host",
                AccountKind::Host,
                Currency::Usd,
                "alice@example.com",
            )
            .can_host(true),
        )
        .await
        .unwrap();
    let other_pm = engine
        .new_payment_method(NewPaymentMethodCmd::new(
            other_host.id.clone(),
            PaymentMethodService::Collective,
            Currency::Usd,
            "alice@example.com",
        ))
        .await
        .unwrap();

    let err = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), other_pm.token.clone(), 1000)
                .from_account(other_host.id.clone())
                .created_by("alice@example.com"),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation(format!(
            "you must use the payment method of host {} to add funds to this destination",
            fx.host_id
        ))
    );
}

#[tokio::test]
async fn add_funds_as_host_credits_the_collective() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let created = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.host_pm_token.clone(), 50_000)
                .from_account(fx.host_id.clone())
                .currency(Currency::Usd)
                .created_by("alice@example.com"),
        )
        .await
        .unwrap();

    let entries = engine.order_entries(&created.order_id).await.unwrap();
    assert_eq!(entries[0].amount_in_host_minor, 50_000);
    assert_eq!(entries[0].host_currency_fx_rate, 1.0);

    // The host's internal reserve was debited by the same amount.
    let (pm_balance, pm_currency) = engine
        .balance_of_payment_method(&fx.host_pm_token)
        .await
        .unwrap();
    assert_eq!(pm_balance, -50_000);
    assert_eq!(pm_currency, Currency::Usd);
}

#[tokio::test]
async fn balance_subtracts_fee_magnitudes() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.host_pm_token.clone(), 198_850)
                .from_account(fx.host_id.clone())
                .currency(Currency::Usd)
                .payment_processor_fee_minor(100)
                .created_by("alice@example.com"),
        )
        .await
        .unwrap();

    let (balance, currency) = engine.balance_of_account(&fx.collective_id).await.unwrap();
    assert_eq!(balance, 198_750);
    assert_eq!(currency, Currency::Eur);

    // Re-reading with no intervening entries returns the same figure.
    let (again, _) = engine.balance_of_account(&fx.collective_id).await.unwrap();
    assert_eq!(again, balance);
}

#[tokio::test]
async fn cross_currency_balance_converts_through_the_stored_rate() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();

    // The backer's EUR payment method saw a USD-denominated debit of -1165;
    // converting back through the stored inverse rate lands on -1000.
    let (pm_balance, pm_currency) = engine
        .balance_of_payment_method(&fx.backer_pm_token)
        .await
        .unwrap();
    assert_eq!(pm_balance, -1000);
    assert_eq!(pm_currency, Currency::Eur);
}

#[tokio::test]
async fn order_provisions_a_new_organization() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let created = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 2500)
                .on_behalf_of(NewOrganization::new("Acme Corp").website("https://acme.test"))
                .remote_user(RemoteUser::new("carol@example.com").name("Carol"))
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();

    assert_eq!(created.from_account.slug, "acme-corp");
    let organization = engine.account_snapshot("acme-corp").await.unwrap();
    assert_eq!(organization.kind, AccountKind::Organization);
    assert_eq!(organization.created_by.as_deref(), Some("bob@example.com"));

    // The contact identity was provisioned and attached as admin.
    let members = engine
        .list_account_members("acme-corp", "carol@example.com")
        .await
        .unwrap();
    assert_eq!(
        members,
        vec![("carol@example.com".to_string(), "admin".to_string())]
    );

    // Same name again: a second account under a suffixed slug, by design.
    let repeat = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 2500)
                .on_behalf_of(NewOrganization::new("Acme Corp"))
                .created_by("bob@example.com"),
        )
        .await
        .unwrap();
    assert_eq!(repeat.from_account.slug, "acme-corp-1");
}

#[tokio::test]
async fn entries_paginate_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    for amount in [1000, 2000, 3000] {
        engine
            .create_order(
                OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), amount)
                    .from_account(fx.backer_org_id.clone())
                    .created_by("bob@example.com"),
            )
            .await
            .unwrap();
    }

    let (page, cursor) = engine
        .list_entries_for_account_page(&fx.collective_id, "alice@example.com", 2, None)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    let cursor = cursor.expect("a third entry remains");

    let (rest, end) = engine
        .list_entries_for_account_page(&fx.collective_id, "alice@example.com", 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert!(end.is_none());

    let mut amounts: Vec<i64> = page
        .iter()
        .chain(rest.iter())
        .map(|entry| entry.amount_minor)
        .collect();
    amounts.sort_unstable();
    assert_eq!(amounts, vec![1000, 2000, 3000]);
}

#[tokio::test]
async fn entries_listing_requires_a_membership() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let err = engine
        .list_entries_for_account_page(&fx.collective_id, "bob@example.com", 10, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));

    // Root sees every ledger.
    engine
        .list_entries_for_account_page(&fx.collective_id, "root@example.com", 10, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn retired_destination_rejects_orders() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    engine
        .retire_account(&fx.collective_id, "alice@example.com")
        .await
        .unwrap();

    let err = engine
        .create_order(
            OrderCmd::new(fx.collective_id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("destination account is retired".to_string())
    );
}

#[tokio::test]
async fn unhosted_destination_cannot_settle() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;

    let orphan = engine
        .new_account(NewAccountCmd::new(
            "Orphan Project",
            AccountKind::Collective,
            Currency::Eur,
            "alice@example.com",
        ))
        .await
        .unwrap();

    let err = engine
        .create_order(
            OrderCmd::new(orphan.id.clone(), fx.backer_pm_token.clone(), 1000)
                .from_account(fx.backer_org_id.clone())
                .created_by("bob@example.com"),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("destination account has no host".to_string())
    );
}
