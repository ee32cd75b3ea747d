use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::api::models::*;
use crate::error::{WatchdogError, WatchdogResult};
use crate::ledger::model::{Alert, Client, TimeWindow, Transaction};
use crate::ledger::store::{AlertFilter, TransactionFilter};
use crate::server::ServerState;
use crate::workflow::{register_client, ClientReport, NewClient, NewTransaction};

// 추출기 거부는 모두 VALIDATION 으로 응답
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> WatchdogResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| WatchdogError::Validation(e.body_text()))
}

fn path_id(id: Result<Path<Uuid>, PathRejection>) -> WatchdogResult<Uuid> {
    id.map(|Path(id)| id)
        .map_err(|e| WatchdogError::Validation(e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> WatchdogResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|e| WatchdogError::Validation(e.body_text()))
}

/// 헬스 체크
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Watchdog is running".to_string(),
    })
}

/// 고객 등록
pub async fn create_client(
    State(state): State<ServerState>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> WatchdogResult<(StatusCode, Json<Client>)> {
    let request = json_body(payload)?;
    let client = register_client(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// 고객 목록
pub async fn list_clients(State(state): State<ServerState>) -> WatchdogResult<Json<Vec<Client>>> {
    Ok(Json(state.store.list_clients().await?))
}

/// 고객 조회
pub async fn get_client(
    State(state): State<ServerState>,
    client_id: Result<Path<Uuid>, PathRejection>,
) -> WatchdogResult<Json<Client>> {
    let client_id = path_id(client_id)?;
    Ok(Json(state.store.get_client(client_id).await?))
}

/// 거래 접수 (규칙 평가 및 알림 생성 포함)
pub async fn submit_transaction(
    State(state): State<ServerState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> WatchdogResult<(StatusCode, Json<Transaction>)> {
    let request = json_body(payload)?;
    let transaction = state.intake.submit(request).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// 거래 조회
pub async fn get_transaction(
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
) -> WatchdogResult<Json<Transaction>> {
    let transaction_id = path_id(transaction_id)?;
    Ok(Json(state.store.get_transaction(transaction_id).await?))
}

/// 거래 필터 조회
pub async fn query_transactions(
    State(state): State<ServerState>,
    params: Result<Query<TransactionQuery>, QueryRejection>,
) -> WatchdogResult<Json<Vec<Transaction>>> {
    let params = query(params)?;
    let filter = TransactionFilter {
        client_id: params.client_id,
        currency: params.currency,
        transaction_type: params.transaction_type,
        window: TimeWindow::new(params.start, params.end),
    };
    Ok(Json(state.store.query_transactions(&filter).await?))
}

/// 거래별 알림 조회
pub async fn get_transaction_alerts(
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
) -> WatchdogResult<Json<Vec<Alert>>> {
    let transaction_id = path_id(transaction_id)?;
    // 없는 거래와 알림 없는 거래를 구분
    state.store.get_transaction(transaction_id).await?;
    Ok(Json(state.store.alerts_by_transaction(transaction_id).await?))
}

/// 알림 조회
pub async fn get_alert(
    State(state): State<ServerState>,
    alert_id: Result<Path<Uuid>, PathRejection>,
) -> WatchdogResult<Json<Alert>> {
    let alert_id = path_id(alert_id)?;
    Ok(Json(state.store.get_alert(alert_id).await?))
}

/// 알림 필터 조회
pub async fn query_alerts(
    State(state): State<ServerState>,
    params: Result<Query<AlertQuery>, QueryRejection>,
) -> WatchdogResult<Json<Vec<Alert>>> {
    let params = query(params)?;
    let filter = AlertFilter {
        client_id: params.client_id,
        rule: params.rule,
        severity: params.severity,
        status: params.status,
        window: TimeWindow::new(params.start, params.end),
    };
    Ok(Json(state.store.query_alerts(&filter).await?))
}

/// 고객 리포트
pub async fn get_client_report(
    State(state): State<ServerState>,
    client_id: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<ReportQuery>, QueryRejection>,
) -> WatchdogResult<Json<ClientReport>> {
    let client_id = path_id(client_id)?;
    let params = query(params)?;
    Ok(Json(state.reports.client_report(client_id, params.window()).await?))
}
