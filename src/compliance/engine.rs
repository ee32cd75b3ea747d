//! 컴플라이언스 규칙 엔진
//!
//! 후보 거래 금액, 상대방 국가, 평가 기간 거래 이력만으로 발동 규칙을 결정하는 순수 로직입니다.
//! 이력은 호출자가 조회해서 넘기며 엔진은 어떤 I/O도 하지 않습니다.

use std::collections::BTreeSet;

use log::trace;
use rust_decimal::Decimal;

use crate::compliance::config::ComplianceConfig;
use crate::ledger::model::{Rule, Transaction};

/// 평가 대상 거래
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub amount: Decimal,
    /// 상대방이 있으면 조회된 국가명, 없으면 None
    pub counterparty_country: Option<&'a str>,
}

/// 규칙 엔진
#[derive(Debug, Clone)]
pub struct RuleEngine {
    config: ComplianceConfig,
}

impl RuleEngine {
    pub fn new(config: ComplianceConfig) -> Self {
        Self { config }
    }

    /// 모든 규칙을 독립적으로 평가 (단락 평가 없음)
    pub fn evaluate(&self, candidate: &Candidate<'_>, history: &[Transaction]) -> BTreeSet<Rule> {
        let mut triggered = BTreeSet::new();

        if self.exceeds_daily_limit(candidate.amount, history) {
            triggered.insert(Rule::DailyLimit);
        }
        if self.has_frequent_small_transactions(candidate.amount, history) {
            triggered.insert(Rule::FrequentTransactions);
        }
        if self.is_high_risk_counterparty(candidate.counterparty_country) {
            triggered.insert(Rule::HighRiskCountry);
        }

        trace!(
            "규칙 평가: 금액 {}, 이력 {} 건 -> {:?}",
            candidate.amount,
            history.len(),
            triggered
        );

        triggered
    }

    /// 이력 합계 + 후보 금액이 한도를 초과하는지 (같으면 미발동)
    ///
    /// 금액은 모두 0 이상이므로 합계가 `Decimal` 범위를 넘으면 어떤 한도보다도 크다.
    pub fn exceeds_daily_limit(&self, amount: Decimal, history: &[Transaction]) -> bool {
        let total = history
            .iter()
            .try_fold(amount, |sum, t| sum.checked_add(t.amount));
        match total {
            Some(total) => total > self.config.daily_limit,
            None => true,
        }
    }

    /// 이력 중 소액 거래 수가 기준 횟수 이상인지
    ///
    /// 기본 설정에서는 후보 거래를 세지 않습니다 (`count_candidate_as_small`).
    pub fn has_frequent_small_transactions(&self, amount: Decimal, history: &[Transaction]) -> bool {
        let mut small = history
            .iter()
            .filter(|t| t.amount < self.config.low_amount)
            .count();
        if self.config.count_candidate_as_small && amount < self.config.low_amount {
            small += 1;
        }
        small >= self.config.low_amount_occurrences
    }

    pub fn is_high_risk_counterparty(&self, counterparty_country: Option<&str>) -> bool {
        match counterparty_country {
            Some(country) => self.config.is_high_risk_country(country),
            None => false,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(ComplianceConfig::default())
    }
}
