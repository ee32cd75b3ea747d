use std::sync::Arc;

use axum::Router;
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::compliance::{ComplianceConfig, RuleEngine};
use crate::compliance::config::env_or;
use crate::db::{init_database, SqliteLedgerStore};
use crate::ledger::store::LedgerStore;
use crate::workflow::{ReportAggregator, TransactionIntake};

/// 서버 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 6000,
            database_url: "sqlite://watchdog.db?mode=rwc".into(),
            max_connections: 5,
        }
    }
}

impl ServerConfig {
    /// `WATCHDOG_HOST`, `WATCHDOG_PORT`, `DATABASE_URL`, `DB_MAX_CONNECTIONS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("WATCHDOG_HOST", defaults.host),
            port: env_or("WATCHDOG_PORT", defaults.port),
            database_url: env_or("DATABASE_URL", defaults.database_url),
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
        }
    }
}

/// 서버 상태
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn LedgerStore>,
    pub intake: Arc<TransactionIntake>,
    pub reports: Arc<ReportAggregator>,
}

impl ServerState {
    pub fn new(store: Arc<dyn LedgerStore>, compliance: ComplianceConfig) -> Self {
        Self {
            intake: Arc::new(TransactionIntake::new(store.clone(), RuleEngine::new(compliance))),
            reports: Arc::new(ReportAggregator::new(store.clone())),
            store,
        }
    }
}

/// 미들웨어까지 적용된 라우터
pub fn build_router(state: ServerState) -> Router {
    create_api_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 서버 시작
pub async fn start_server(config: ServerConfig, compliance: ComplianceConfig) -> anyhow::Result<()> {
    info!("Watchdog 서버 시작 중...");
    info!(
        "규칙 임계값: 일일 한도 {}, 소액 기준 {} ({} 회), 고위험 국가 {:?}",
        compliance.daily_limit,
        compliance.low_amount,
        compliance.low_amount_occurrences,
        compliance.high_risk_countries
    );

    let pool = init_database(&config.database_url, config.max_connections).await?;
    let store: Arc<dyn LedgerStore> = Arc::new(SqliteLedgerStore::new(pool));

    let app = build_router(ServerState::new(store, compliance));

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("서버가 성공적으로 시작되었습니다!");
    info!("REST API: http://{}/api/v1", address);

    axum::serve(listener, app).await?;

    Ok(())
}
