pub mod models;
pub mod repository;

use std::str::FromStr;

use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Error as SqlxError;

pub use repository::SqliteLedgerStore;

/// SQLite 데이터베이스 초기화 및 연결
pub async fn init_database(database_url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    info!("🗄️  SQLite 데이터베이스 초기화 중: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // 메모리 DB는 연결마다 별도 DB가 생기므로 단일 연결을 유지
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?
    };

    // 테이블 생성
    create_tables(&pool).await?;

    info!("✅ 데이터베이스 초기화 완료");

    Ok(pool)
}

/// 필요한 테이블 생성
async fn create_tables(pool: &SqlitePool) -> Result<(), SqlxError> {
    // 고객 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS clients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            country TEXT NOT NULL,
            risk_level TEXT NOT NULL,
            kyc_status TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    // 거래 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(id),
            transaction_type TEXT NOT NULL,
            amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            counterparty_id TEXT REFERENCES clients(id),
            created_at INTEGER NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    // 알림 테이블
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(id),
            transaction_id TEXT NOT NULL REFERENCES transactions(id),
            rule TEXT NOT NULL,
            severity TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    // 인덱스 생성
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_client_currency_time
         ON transactions(client_id, currency, created_at)"
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_client_time ON alerts(client_id, created_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_transaction ON alerts(transaction_id)")
        .execute(pool)
        .await?;

    debug!("📋 테이블 생성 완료");

    Ok(())
}
