//! 원장 저장소 인터페이스
//!
//! 워크플로는 이 트레이트만 바라보며 구체 저장소(SQLite)는 `db` 모듈에 있습니다.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::WatchdogResult;
use crate::ledger::model::{
    Alert, AlertStatus, Client, Currency, Rule, Severity, TimeWindow, Transaction, TransactionType,
};

/// 거래 조회 조건 (모든 필드 선택)
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub client_id: Option<Uuid>,
    pub currency: Option<Currency>,
    pub transaction_type: Option<TransactionType>,
    pub window: TimeWindow,
}

/// 알림 조회 조건 (모든 필드 선택)
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub client_id: Option<Uuid>,
    pub rule: Option<Rule>,
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
    pub window: TimeWindow,
}

/// 일괄 쓰기 항목
#[derive(Debug, Clone)]
pub enum WriteOp {
    InsertTransaction(Transaction),
    InsertAlert(Alert),
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// 이메일 중복 시 `Conflict`
    async fn insert_client(&self, client: &Client) -> WatchdogResult<Uuid>;
    /// 없으면 `NotFound`
    async fn get_client(&self, id: Uuid) -> WatchdogResult<Client>;
    async fn list_clients(&self) -> WatchdogResult<Vec<Client>>;

    async fn insert_transaction(&self, transaction: &Transaction) -> WatchdogResult<Uuid>;
    async fn get_transaction(&self, id: Uuid) -> WatchdogResult<Transaction>;
    async fn query_transactions(&self, filter: &TransactionFilter) -> WatchdogResult<Vec<Transaction>>;

    async fn insert_alert(&self, alert: &Alert) -> WatchdogResult<Uuid>;
    async fn get_alert(&self, id: Uuid) -> WatchdogResult<Alert>;
    async fn query_alerts(&self, filter: &AlertFilter) -> WatchdogResult<Vec<Alert>>;
    async fn alerts_by_transaction(&self, transaction_id: Uuid) -> WatchdogResult<Vec<Alert>>;

    /// 전부 성공하거나 전부 반영되지 않음
    async fn execute_batch(&self, ops: Vec<WriteOp>) -> WatchdogResult<()>;
}
