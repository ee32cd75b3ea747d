use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::*;
use crate::server::ServerState;

/// API 라우터 생성
pub fn create_api_router() -> Router<ServerState> {
    Router::new()
        .route("/", get(health))
        // 고객
        .route("/api/v1/clients", post(create_client).get(list_clients))
        .route("/api/v1/clients/:client_id", get(get_client))
        // 거래
        .route("/api/v1/transactions", post(submit_transaction).get(query_transactions))
        .route("/api/v1/transactions/:transaction_id", get(get_transaction))
        .route("/api/v1/transactions/:transaction_id/alerts", get(get_transaction_alerts))
        // 알림
        .route("/api/v1/alerts", get(query_alerts))
        .route("/api/v1/alerts/:alert_id", get(get_alert))
        // 리포트
        .route("/api/v1/reports/:client_id", get(get_client_report))
}
