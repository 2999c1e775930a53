use chrono::Utc;
use sea_orm::Database;

use engine::{
    AUTO_CREATED_DESCRIPTION, AUTO_CREATED_VALUE, AUTO_CREATED_WEIGHT, CounterpartyRole,
    Direction, Engine, EngineError, LineRequest, Material, Race, TransactionFilter,
    UNKNOWN_LOCATION,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build()
}

async fn guarded_engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).guarded_stock(true).build()
}

fn line(name: &str, quantity: i64) -> LineRequest {
    LineRequest {
        name: name.to_string(),
        quantity,
    }
}

async fn seed_silver_sword(engine: &Engine) {
    engine
        .new_good(
            "Silver Sword",
            "A fine blade of meteorite silver",
            Material::Silver,
            3.5,
            10,
            500,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn sell_creates_unknown_good_with_placeholders() {
    let engine = engine_with_db().await;

    let tx = engine
        .create_transaction(
            &[line("Mahakaman Ale", 5)],
            "Hattori",
            CounterpartyRole::Merchant,
            Direction::Sell,
            Utc::now(),
        )
        .await
        .unwrap();

    let good = engine.good_by_name("Mahakaman Ale").await.unwrap();
    assert_eq!(good.stock, 5);
    assert_eq!(good.value, AUTO_CREATED_VALUE);
    assert_eq!(good.weight, AUTO_CREATED_WEIGHT);
    assert_eq!(good.description, AUTO_CREATED_DESCRIPTION);

    assert_eq!(tx.total_value, 5 * AUTO_CREATED_VALUE);
    assert_eq!(tx.lines.len(), 1);
}

#[tokio::test]
async fn buy_skips_missing_and_understocked_lines() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let err = engine
        .create_transaction(
            &[line("Ghost Oil", 1), line("Silver Sword", 20)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoProcessableGoods);

    // Nothing was recorded and no stock moved.
    let good = engine.good_by_name("Silver Sword").await.unwrap();
    assert_eq!(good.stock, 10);
    let txs = engine
        .list_transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn buy_then_delete_restores_stock() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 1)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(tx.total_value, 500);
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 9);

    engine.delete_transaction(tx.id).await.unwrap();

    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 10);
    let err = engine.transaction(tx.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn sell_delete_refused_when_stock_already_spent() {
    let engine = engine_with_db().await;

    // A merchant supplies 5 units of a new good...
    let sell = engine
        .create_transaction(
            &[line("Mahakaman Ale", 5)],
            "Hattori",
            CounterpartyRole::Merchant,
            Direction::Sell,
            Utc::now(),
        )
        .await
        .unwrap();

    // ...and a hunter buys 3 of them before the sell is deleted.
    engine
        .create_transaction(
            &[line("Mahakaman Ale", 3)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();

    let err = engine.delete_transaction(sell.id).await.unwrap_err();
    assert!(matches!(err, EngineError::IrreversibleDelete(_)));

    // The refused delete changed nothing.
    assert_eq!(engine.good_by_name("Mahakaman Ale").await.unwrap().stock, 2);
    assert!(engine.transaction(sell.id).await.is_ok());
}

#[tokio::test]
async fn sell_then_delete_removes_added_stock() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 5)],
            "Hattori",
            CounterpartyRole::Merchant,
            Direction::Sell,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 15);

    engine.delete_transaction(tx.id).await.unwrap();
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 10);
}

#[tokio::test]
async fn counterparty_resolution_is_idempotent() {
    let engine = engine_with_db().await;

    let first = engine
        .resolve_counterparty("Geralt", CounterpartyRole::Hunter, Direction::Buy)
        .await
        .unwrap();
    let second = engine
        .resolve_counterparty("Geralt", CounterpartyRole::Hunter, Direction::Buy)
        .await
        .unwrap();
    assert_eq!(first, second);

    let hunters = engine.list_hunters(Some("Geralt")).await.unwrap();
    assert_eq!(hunters.len(), 1);
    assert_eq!(hunters[0].race, Race::Unknown);
    assert_eq!(hunters[0].location, UNKNOWN_LOCATION);
}

#[tokio::test]
async fn role_direction_mismatch_rejected() {
    let engine = engine_with_db().await;

    let err = engine
        .resolve_counterparty("Geralt", CounterpartyRole::Hunter, Direction::Sell)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRoleDirection(_)));

    let err = engine
        .resolve_counterparty("Hattori", CounterpartyRole::Merchant, Direction::Buy)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRoleDirection(_)));

    // Nothing was created by the failed resolutions.
    assert!(engine.list_hunters(Some("Geralt")).await.unwrap().is_empty());
    assert!(
        engine
            .list_merchants(Some("Hattori"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn total_value_sums_unit_values() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;
    engine
        .new_good(
            "Dwarven Spirit",
            "Strong liquor from Mahakam stills",
            Material::Glass,
            0.5,
            30,
            50,
        )
        .await
        .unwrap();

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 1), line("Dwarven Spirit", 2)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(tx.total_value, 500 + 2 * 50);
    assert_eq!(tx.lines.len(), 2);
}

#[tokio::test]
async fn update_readjusts_stock_and_total() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 2)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 8);

    let updated = engine
        .update_transaction(tx.id, &[line("Silver Sword", 1)], Utc::now())
        .await
        .unwrap();

    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 9);
    assert_eq!(updated.total_value, 500);
    assert_eq!(updated.lines.len(), 1);
    assert_eq!(updated.lines[0].quantity, 1);
}

#[tokio::test]
async fn update_without_effect_fails_loudly() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 2)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();

    // A good not on the transaction is ignored.
    let err = engine
        .update_transaction(tx.id, &[line("Ghost Oil", 1)], Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoUpdateApplied);

    // The same quantity is no change.
    let err = engine
        .update_transaction(tx.id, &[line("Silver Sword", 2)], Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoUpdateApplied);
}

#[tokio::test]
async fn update_exceeding_stock_rejected() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 2)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();

    // Raising the quantity to 20 would need 18 more units; only 8 remain.
    let err = engine
        .update_transaction(tx.id, &[line("Silver Sword", 20)], Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));

    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 8);
}

#[tokio::test]
async fn update_unknown_transaction_not_found() {
    let engine = engine_with_db().await;

    let err = engine
        .update_transaction(uuid::Uuid::new_v4(), &[line("Silver Sword", 1)], Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn zero_quantity_line_rejected() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let err = engine
        .create_transaction(
            &[line("Silver Sword", 0)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn list_transactions_filters_by_involved_and_direction() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    engine
        .create_transaction(
            &[line("Silver Sword", 1)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            &[line("Silver Sword", 3)],
            "Hattori",
            CounterpartyRole::Merchant,
            Direction::Sell,
            Utc::now(),
        )
        .await
        .unwrap();

    let by_name = engine
        .list_transactions(&TransactionFilter {
            involved_name: Some("Geralt".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].direction(), Direction::Buy);

    let sells = engine
        .list_transactions(&TransactionFilter {
            direction: Some(Direction::Sell),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(sells.len(), 1);

    let err = engine
        .list_transactions(&TransactionFilter {
            involved_name: Some("Yennefer".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn total_value_overflow_rejected() {
    let engine = engine_with_db().await;
    engine
        .new_good(
            "Silver Sword",
            "A fine blade of meteorite silver",
            Material::Silver,
            3.5,
            i64::MAX,
            500,
        )
        .await
        .unwrap();

    let err = engine
        .create_transaction(
            &[line("Silver Sword", i64::MAX)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn sell_overflowing_stock_rejected() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    let err = engine
        .create_transaction(
            &[line("Silver Sword", i64::MAX)],
            "Hattori",
            CounterpartyRole::Merchant,
            Direction::Sell,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 10);
}

#[tokio::test]
async fn good_on_a_transaction_cannot_be_deleted() {
    let engine = engine_with_db().await;
    seed_silver_sword(&engine).await;

    engine
        .create_transaction(
            &[line("Silver Sword", 1)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();

    let good = engine.good_by_name("Silver Sword").await.unwrap();
    let err = engine.delete_good(good.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.good(good.id).await.is_ok());
}

#[tokio::test]
async fn guarded_engine_handles_the_same_ledger_flow() {
    let engine = guarded_engine_with_db().await;
    seed_silver_sword(&engine).await;

    let tx = engine
        .create_transaction(
            &[line("Silver Sword", 2)],
            "Geralt",
            CounterpartyRole::Hunter,
            Direction::Buy,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 8);

    engine
        .update_transaction(tx.id, &[line("Silver Sword", 1)], Utc::now())
        .await
        .unwrap();
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 9);

    engine.delete_transaction(tx.id).await.unwrap();
    assert_eq!(engine.good_by_name("Silver Sword").await.unwrap().stock, 10);
}
