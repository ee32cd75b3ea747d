//! 고객 리포트 집계
//!
//! 고객 한 명의 기간 내 거래/알림을 읽어 통화별 합계와 규칙별 건수로 접습니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WatchdogError, WatchdogResult};
use crate::ledger::model::{
    Alert, AlertStatus, Client, Currency, KycStatus, RiskLevel, Rule, Severity, TimeWindow, Transaction,
    TransactionType,
};
use crate::ledger::store::{AlertFilter, LedgerStore, TransactionFilter};

/// 리포트용 거래 항목 (고객 ID 제외)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    pub counterparty_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionEntry {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            transaction_type: t.transaction_type,
            amount: t.amount,
            currency: t.currency,
            counterparty_id: t.counterparty_id,
            created_at: t.created_at,
        }
    }
}

/// 리포트용 알림 항목 (고객 ID 제외)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEntry {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub rule: Rule,
    pub severity: Severity,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Alert> for AlertEntry {
    fn from(a: Alert) -> Self {
        Self {
            id: a.id,
            transaction_id: a.transaction_id,
            rule: a.rule,
            severity: a.severity,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

/// 거래 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub count: usize,
    pub transactions: Vec<TransactionEntry>,
    /// 통화별 합계 (거래가 없는 통화도 0 으로 포함)
    pub totals: BTreeMap<Currency, Decimal>,
}

/// 알림 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub count: usize,
    pub alerts: Vec<AlertEntry>,
    /// 규칙별 건수 (발동이 없는 규칙도 0 으로 포함)
    pub by_rule: BTreeMap<Rule, usize>,
}

/// 고객 리포트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReport {
    pub client_id: Uuid,
    pub name: String,
    pub email: String,
    pub country: String,
    pub risk_level: RiskLevel,
    pub kyc_status: KycStatus,
    pub transactions: TransactionSummary,
    pub alerts: AlertSummary,
}

/// 통화별 합계가 `Decimal` 범위를 넘으면 `Validation`
pub fn summarize_transactions(transactions: Vec<Transaction>) -> WatchdogResult<TransactionSummary> {
    let mut totals: BTreeMap<Currency, Decimal> =
        Currency::ALL.iter().map(|c| (*c, Decimal::ZERO)).collect();

    for t in &transactions {
        let total = totals.entry(t.currency).or_insert(Decimal::ZERO);
        *total = total.checked_add(t.amount).ok_or_else(|| {
            WatchdogError::Validation(format!("{} 합계가 표현 가능한 범위를 넘습니다", t.currency))
        })?;
    }

    Ok(TransactionSummary {
        count: transactions.len(),
        transactions: transactions.into_iter().map(TransactionEntry::from).collect(),
        totals,
    })
}

pub fn summarize_alerts(alerts: Vec<Alert>) -> AlertSummary {
    let mut by_rule: BTreeMap<Rule, usize> = Rule::ALL.iter().map(|r| (*r, 0)).collect();

    for a in &alerts {
        *by_rule.entry(a.rule).or_insert(0) += 1;
    }

    AlertSummary {
        count: alerts.len(),
        alerts: alerts.into_iter().map(AlertEntry::from).collect(),
        by_rule,
    }
}

/// 리포트 집계기
pub struct ReportAggregator {
    store: Arc<dyn LedgerStore>,
}

impl ReportAggregator {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// 고객이 없으면 `NotFound`
    pub async fn client_report(&self, client_id: Uuid, window: TimeWindow) -> WatchdogResult<ClientReport> {
        let client: Client = self.store.get_client(client_id).await?;

        let transactions = self
            .store
            .query_transactions(&TransactionFilter {
                client_id: Some(client_id),
                window,
                ..Default::default()
            })
            .await?;
        let alerts = self
            .store
            .query_alerts(&AlertFilter {
                client_id: Some(client_id),
                window,
                ..Default::default()
            })
            .await?;

        debug!(
            "리포트 집계: 고객 {} (거래 {} 건, 알림 {} 건, 기간 {:?})",
            client_id,
            transactions.len(),
            alerts.len(),
            window.bounds()
        );

        Ok(ClientReport {
            client_id: client.id,
            name: client.name,
            email: client.email,
            country: client.country,
            risk_level: client.risk_level,
            kyc_status: client.kyc_status,
            transactions: summarize_transactions(transactions)?,
            alerts: summarize_alerts(alerts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, SqliteLedgerStore};
    use crate::ledger::model::timestamp_now;
    use crate::ledger::store::WriteOp;
    use chrono::TimeZone;

    fn transaction(client_id: Uuid, amount: &str, currency: Currency, at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            client_id,
            transaction_type: TransactionType::Deposit,
            amount: amount.parse().unwrap(),
            currency,
            counterparty_id: None,
            created_at: at,
        }
    }

    fn alert(t: &Transaction, rule: Rule) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            client_id: t.client_id,
            transaction_id: t.id,
            rule,
            severity: rule.severity(),
            status: AlertStatus::New,
            created_at: t.created_at,
        }
    }

    #[test]
    fn test_summaries_default_to_zero() {
        let transactions = summarize_transactions(vec![]).unwrap();
        assert_eq!(transactions.count, 0);
        assert_eq!(transactions.totals.len(), 3);
        assert!(transactions.totals.values().all(|v| v.is_zero()));

        let alerts = summarize_alerts(vec![]);
        assert_eq!(alerts.by_rule.len(), 3);
        assert!(alerts.by_rule.values().all(|v| *v == 0));
    }

    #[test]
    fn test_totals_grouped_by_currency() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let summary = summarize_transactions(vec![
            transaction(owner, "10.25", Currency::USD, now),
            transaction(owner, "0.75", Currency::USD, now),
            transaction(owner, "3", Currency::BRL, now),
        ])
        .unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.totals[&Currency::USD], Decimal::from(11));
        assert_eq!(summary.totals[&Currency::EUR], Decimal::ZERO);
        assert_eq!(summary.totals[&Currency::BRL], Decimal::from(3));
    }

    #[test]
    fn test_currency_total_beyond_decimal_range() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let max = Decimal::MAX.to_string();

        let result = summarize_transactions(vec![
            transaction(owner, &max, Currency::USD, now),
            transaction(owner, &max, Currency::USD, now),
        ]);
        assert!(matches!(result, Err(WatchdogError::Validation(_))));

        // 통화가 다르면 각자 합산
        let split = summarize_transactions(vec![
            transaction(owner, &max, Currency::USD, now),
            transaction(owner, &max, Currency::EUR, now),
        ])
        .unwrap();
        assert_eq!(split.totals[&Currency::USD], Decimal::MAX);
        assert_eq!(split.totals[&Currency::EUR], Decimal::MAX);
    }

    #[test]
    fn test_alert_counts_by_rule() {
        let t = transaction(Uuid::new_v4(), "1", Currency::EUR, Utc::now());
        let summary = summarize_alerts(vec![
            alert(&t, Rule::HighRiskCountry),
            alert(&t, Rule::HighRiskCountry),
            alert(&t, Rule::DailyLimit),
        ]);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.by_rule[&Rule::HighRiskCountry], 2);
        assert_eq!(summary.by_rule[&Rule::DailyLimit], 1);
        assert_eq!(summary.by_rule[&Rule::FrequentTransactions], 0);
    }

    #[tokio::test]
    async fn test_report_window_precedence() {
        let pool = init_database("sqlite::memory:", 1).await.unwrap();
        let store = Arc::new(SqliteLedgerStore::new(pool));
        let aggregator = ReportAggregator::new(store.clone());

        let owner = Client {
            id: Uuid::new_v4(),
            name: "Bia".to_string(),
            email: "bia@example.com".to_string(),
            country: "Brasil".to_string(),
            risk_level: RiskLevel::High,
            kyc_status: KycStatus::Pending,
            created_at: timestamp_now(),
        };
        store.insert_client(&owner).await.unwrap();

        let jan = transaction(owner.id, "100", Currency::USD, Utc.with_ymd_and_hms(2024, 1, 20, 10, 0, 0).unwrap());
        let feb = transaction(owner.id, "2000", Currency::EUR, Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap());
        store
            .execute_batch(vec![
                WriteOp::InsertTransaction(jan.clone()),
                WriteOp::InsertTransaction(feb.clone()),
                WriteOp::InsertAlert(alert(&feb, Rule::DailyLimit)),
            ])
            .await
            .unwrap();

        let feb_1 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let feb_10 = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();

        // 정상 기간
        let report = aggregator
            .client_report(owner.id, TimeWindow::new(Some(feb_1), Some(feb_10)))
            .await
            .unwrap();
        assert_eq!(report.transactions.count, 1);
        assert_eq!(report.transactions.totals[&Currency::EUR], Decimal::from(2000));
        assert_eq!(report.transactions.totals[&Currency::USD], Decimal::ZERO);
        assert_eq!(report.alerts.by_rule[&Rule::DailyLimit], 1);

        // 시작 > 종료 -> 전체 기간
        let inverted = aggregator
            .client_report(owner.id, TimeWindow::new(Some(feb_10), Some(feb_1)))
            .await
            .unwrap();
        assert_eq!(inverted.transactions.count, 2);
        assert_eq!(inverted.alerts.count, 1);

        // 종료만
        let until = aggregator
            .client_report(owner.id, TimeWindow::new(None, Some(feb_1)))
            .await
            .unwrap();
        assert_eq!(until.transactions.count, 1);
        assert_eq!(until.alerts.count, 0);

        // 같은 데이터, 같은 기간이면 같은 결과
        let again = aggregator
            .client_report(owner.id, TimeWindow::new(Some(feb_10), Some(feb_1)))
            .await
            .unwrap();
        assert_eq!(again, inverted);
        assert_eq!(again.name, "Bia");
        assert_eq!(again.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_report_unknown_client() {
        let pool = init_database("sqlite::memory:", 1).await.unwrap();
        let aggregator = ReportAggregator::new(Arc::new(SqliteLedgerStore::new(pool)));

        let result = aggregator.client_report(Uuid::new_v4(), TimeWindow::default()).await;
        assert!(matches!(result, Err(WatchdogError::NotFound { entity: "client", .. })));
    }
}
