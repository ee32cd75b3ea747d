//! 거래 접수 워크플로
//!
//! 거래 ID/시각 부여 -> 당일 동일 통화 이력 조회 -> 규칙 평가 -> 알림 생성 -> 일괄 커밋.
//! 거래와 알림은 하나의 DB 트랜잭션으로 저장되어 부분 반영이 남지 않습니다.
//!
//! 이력 조회와 커밋 사이에 잠금을 잡지 않으므로, 같은 고객의 동시 거래는 서로를 보지 못한
//! 이력으로 평가될 수 있습니다.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::{AlertGenerator, Candidate, RuleEngine};
use crate::error::{WatchdogError, WatchdogResult};
use crate::ledger::model::{local_to_utc, timestamp_now, Currency, TimeWindow, Transaction, TransactionType};
use crate::ledger::store::{LedgerStore, TransactionFilter, WriteOp};

/// 거래 접수 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub client_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub counterparty_id: Option<Uuid>,
}

/// 서버 로컬 시계 기준 당일 자정 (UTC 로 환산)
///
/// 자정이 없는 날(서머타임 시작)은 자정 이후 첫 유효 시각부터.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    local_to_utc(now.with_timezone(&Local).date_naive().and_time(NaiveTime::MIN))
}

/// 거래 접수기
pub struct TransactionIntake {
    store: Arc<dyn LedgerStore>,
    engine: RuleEngine,
    alerts: AlertGenerator,
}

impl TransactionIntake {
    pub fn new(store: Arc<dyn LedgerStore>, engine: RuleEngine) -> Self {
        Self {
            store,
            engine,
            alerts: AlertGenerator::new(),
        }
    }

    /// 현재 시각으로 거래 접수
    pub async fn submit(&self, request: NewTransaction) -> WatchdogResult<Transaction> {
        self.submit_at(request, timestamp_now()).await
    }

    /// 지정한 접수 시각으로 거래 접수
    pub async fn submit_at(&self, request: NewTransaction, now: DateTime<Utc>) -> WatchdogResult<Transaction> {
        if request.amount.is_sign_negative() {
            return Err(WatchdogError::Validation(format!(
                "금액은 0 이상이어야 합니다: {}",
                request.amount
            )));
        }

        // 소유 고객과 상대방은 저장 전에 확인 (없으면 NotFound 로 전체 중단)
        self.store.get_client(request.client_id).await?;
        let counterparty = match request.counterparty_id {
            Some(id) => Some(self.store.get_client(id).await?),
            None => None,
        };

        let transaction = Transaction {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            transaction_type: request.transaction_type,
            amount: request.amount,
            currency: request.currency,
            counterparty_id: request.counterparty_id,
            created_at: now,
        };

        let history = self
            .store
            .query_transactions(&TransactionFilter {
                client_id: Some(transaction.client_id),
                currency: Some(transaction.currency),
                transaction_type: None,
                window: TimeWindow::since(start_of_day(now)),
            })
            .await?;
        debug!(
            "거래 {} 평가 이력: {} 건 ({})",
            transaction.id,
            history.len(),
            transaction.currency
        );

        let candidate = Candidate {
            amount: transaction.amount,
            counterparty_country: counterparty.as_ref().map(|c| c.country.as_str()),
        };
        let rules = self.engine.evaluate(&candidate, &history);
        for rule in &rules {
            warn!(
                "🚨 규칙 발동: {} (고객 {}, 거래 {}, 심각도 {})",
                rule,
                transaction.client_id,
                transaction.id,
                rule.severity().as_str()
            );
        }

        let alerts = self
            .alerts
            .generate(&rules, transaction.id, transaction.client_id, now);

        let mut ops = Vec::with_capacity(1 + alerts.len());
        ops.push(WriteOp::InsertTransaction(transaction.clone()));
        ops.extend(alerts.into_iter().map(WriteOp::InsertAlert));
        self.store.execute_batch(ops).await?;

        info!(
            "거래 접수 완료: {} ({} {}, 알림 {} 건)",
            transaction.id,
            transaction.amount,
            transaction.currency,
            rules.len()
        );

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, SqliteLedgerStore};
    use crate::ledger::model::{AlertStatus, Client, KycStatus, RiskLevel, Rule, Severity};
    use chrono::Duration;

    async fn setup() -> (Arc<SqliteLedgerStore>, TransactionIntake) {
        let pool = init_database("sqlite::memory:", 1).await.unwrap();
        let store = Arc::new(SqliteLedgerStore::new(pool));
        let intake = TransactionIntake::new(store.clone(), RuleEngine::default());
        (store, intake)
    }

    async fn add_client(store: &SqliteLedgerStore, email: &str, country: &str) -> Client {
        let client = Client {
            id: Uuid::new_v4(),
            name: email.to_string(),
            email: email.to_string(),
            country: country.to_string(),
            risk_level: RiskLevel::Medium,
            kyc_status: KycStatus::Approved,
            created_at: timestamp_now(),
        };
        store.insert_client(&client).await.unwrap();
        client
    }

    fn request(client_id: Uuid, amount: i64, currency: Currency, counterparty_id: Option<Uuid>) -> NewTransaction {
        NewTransaction {
            client_id,
            transaction_type: TransactionType::Transfer,
            amount: Decimal::from(amount),
            currency,
            counterparty_id,
        }
    }

    async fn seed(store: &SqliteLedgerStore, client_id: Uuid, amount: i64, currency: Currency, at: DateTime<Utc>) {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            client_id,
            transaction_type: TransactionType::Deposit,
            amount: Decimal::from(amount),
            currency,
            counterparty_id: None,
            created_at: at,
        };
        store.insert_transaction(&transaction).await.unwrap();
    }

    #[tokio::test]
    async fn test_high_risk_counterparty_produces_single_high_alert() {
        let (store, intake) = setup().await;
        let sender = add_client(&store, "sender@example.com", "Brasil").await;
        let receiver = add_client(&store, "receiver@example.com", "Iran").await;

        let transaction = intake
            .submit(request(sender.id, 100, Currency::USD, Some(receiver.id)))
            .await
            .unwrap();

        let alerts = store.alerts_by_transaction(transaction.id).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, Rule::HighRiskCountry);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].status, AlertStatus::New);
        assert_eq!(alerts[0].client_id, sender.id);

        assert_eq!(store.get_transaction(transaction.id).await.unwrap(), transaction);
    }

    #[tokio::test]
    async fn test_frequency_rule_counts_history_only() {
        let (store, intake) = setup().await;
        let owner = add_client(&store, "small@example.com", "Brasil").await;
        let now = timestamp_now();
        let midnight = start_of_day(now);

        // 오늘 10 USD 5건
        for _ in 0..5 {
            seed(&store, owner.id, 10, Currency::USD, midnight).await;
        }

        // 6번째 접수: 이력 5건이라 미발동
        let sixth = intake
            .submit_at(request(owner.id, 10, Currency::USD, None), now)
            .await
            .unwrap();
        assert!(store.alerts_by_transaction(sixth.id).await.unwrap().is_empty());

        // 7번째 접수: 이력 6건
        let seventh = intake
            .submit_at(request(owner.id, 10, Currency::USD, None), now)
            .await
            .unwrap();
        let alerts = store.alerts_by_transaction(seventh.id).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, Rule::FrequentTransactions);
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_sixth_incoming_fires_when_candidate_counted() {
        let pool = init_database("sqlite::memory:", 1).await.unwrap();
        let store = Arc::new(SqliteLedgerStore::new(pool));
        let engine = RuleEngine::new(crate::compliance::ComplianceConfig {
            count_candidate_as_small: true,
            ..Default::default()
        });
        let intake = TransactionIntake::new(store.clone(), engine);
        let owner = add_client(&store, "counted@example.com", "Brasil").await;
        let now = timestamp_now();

        for _ in 0..5 {
            seed(&store, owner.id, 10, Currency::USD, start_of_day(now)).await;
        }
        let sixth = intake
            .submit_at(request(owner.id, 10, Currency::USD, None), now)
            .await
            .unwrap();

        let rules: Vec<Rule> = store
            .alerts_by_transaction(sixth.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.rule)
            .collect();
        assert_eq!(rules, vec![Rule::FrequentTransactions]);
    }

    #[tokio::test]
    async fn test_history_is_same_day_and_same_currency() {
        let (store, intake) = setup().await;
        let owner = add_client(&store, "window@example.com", "Brasil").await;
        let now = timestamp_now();
        let midnight = start_of_day(now);

        // 어제 거래와 다른 통화 거래는 한도 계산에서 제외
        seed(&store, owner.id, 900, Currency::USD, midnight - Duration::seconds(1)).await;
        seed(&store, owner.id, 900, Currency::EUR, midnight).await;

        let transaction = intake
            .submit_at(request(owner.id, 500, Currency::USD, None), now)
            .await
            .unwrap();
        assert!(store.alerts_by_transaction(transaction.id).await.unwrap().is_empty());

        // 오늘 USD 500 + 501 > 1000
        let over = intake
            .submit_at(request(owner.id, 501, Currency::USD, None), now)
            .await
            .unwrap();
        let alerts = store.alerts_by_transaction(over.id).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, Rule::DailyLimit);
        assert_eq!(alerts[0].severity, Severity::Low);
    }

    #[tokio::test]
    async fn test_unknown_counterparty_aborts_without_writes() {
        let (store, intake) = setup().await;
        let owner = add_client(&store, "owner@example.com", "Brasil").await;
        let ghost = Uuid::new_v4();

        let result = intake
            .submit(request(owner.id, 100, Currency::BRL, Some(ghost)))
            .await;
        match result {
            Err(WatchdogError::NotFound { entity, id }) => {
                assert_eq!(entity, "client");
                assert_eq!(id, ghost);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        let filter = TransactionFilter {
            client_id: Some(owner.id),
            ..Default::default()
        };
        assert!(store.query_transactions(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_owner_is_not_found() {
        let (_store, intake) = setup().await;
        let result = intake.submit(request(Uuid::new_v4(), 10, Currency::USD, None)).await;
        assert!(matches!(result, Err(WatchdogError::NotFound { entity: "client", .. })));
    }

    #[tokio::test]
    async fn test_negative_amount_is_rejected() {
        let (store, intake) = setup().await;
        let owner = add_client(&store, "neg@example.com", "Brasil").await;
        let result = intake.submit(request(owner.id, -1, Currency::USD, None)).await;
        assert!(matches!(result, Err(WatchdogError::Validation(_))));
    }

    #[test]
    fn test_start_of_day_is_not_after_now() {
        let now = Utc::now();
        let midnight = start_of_day(now);
        assert!(midnight <= now);
        assert!(now - midnight < Duration::hours(25));
    }
}
