//! 원장 도메인 모델
//!
//! 고객, 거래, 알림 레코드와 이를 구성하는 닫힌 열거형을 정의합니다.
//! 모든 열거형은 저장소 문자열 표현과 명시적으로 변환됩니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, SubsecRound, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 서버 기준 현재 시각 (저장 정밀도인 마이크로초로 절삭)
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// 서머타임 시작으로 건너뛰는 지역 시각 구간의 최대 길이 (분)
const MAX_LOCAL_GAP_MINUTES: i64 = 180;

/// 서버 지역 시각을 UTC 로 환산
///
/// 겹치는 시각은 이른 쪽, 존재하지 않는 시각은 그 이후 첫 유효 시각을 쓴다.
pub fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    resolve_local(naive, |n| Local.from_local_datetime(&n).map(|t| t.with_timezone(&Utc)))
}

fn resolve_local<F>(naive: NaiveDateTime, resolve: F) -> DateTime<Utc>
where
    F: Fn(NaiveDateTime) -> LocalResult<DateTime<Utc>>,
{
    (0..=MAX_LOCAL_GAP_MINUTES)
        .find_map(|minutes| resolve(naive + Duration::minutes(minutes)).earliest())
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// 열거형 문자열 파싱 실패
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("알 수 없는 {kind} 값: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

/// 고객 위험 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(UnknownVariant::new("risk level", other)),
        }
    }
}

/// KYC 심사 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "PENDING",
            KycStatus::Approved => "APPROVED",
            KycStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for KycStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(KycStatus::Pending),
            "APPROVED" => Ok(KycStatus::Approved),
            "REJECTED" => Ok(KycStatus::Rejected),
            other => Err(UnknownVariant::new("kyc status", other)),
        }
    }
}

/// 거래 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// 입금
    Deposit,
    /// 출금
    Withdrawal,
    /// 이체
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Transfer => "TRANSFER",
        }
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "TRANSFER" => Ok(TransactionType::Transfer),
            other => Err(UnknownVariant::new("transaction type", other)),
        }
    }
}

/// 거래 통화
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    BRL,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::USD, Currency::EUR, Currency::BRL];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::BRL => "BRL",
        }
    }
}

impl FromStr for Currency {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "BRL" => Ok(Currency::BRL),
            other => Err(UnknownVariant::new("currency", other)),
        }
    }
}

/// 컴플라이언스 규칙 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    /// 일일 누적 한도 초과
    DailyLimit,
    /// 소액 거래 반복 (분할 거래 탐지)
    FrequentTransactions,
    /// 고위험 국가 상대방
    HighRiskCountry,
}

impl Rule {
    pub const ALL: [Rule; 3] = [Rule::DailyLimit, Rule::FrequentTransactions, Rule::HighRiskCountry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::DailyLimit => "DAILY_LIMIT",
            Rule::FrequentTransactions => "FREQUENT_TRANSACTIONS",
            Rule::HighRiskCountry => "HIGH_RISK_COUNTRY",
        }
    }

    /// 규칙별 고정 심각도
    pub fn severity(&self) -> Severity {
        match self {
            Rule::DailyLimit => Severity::Low,
            Rule::FrequentTransactions => Severity::Medium,
            Rule::HighRiskCountry => Severity::High,
        }
    }
}

impl FromStr for Rule {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY_LIMIT" => Ok(Rule::DailyLimit),
            "FREQUENT_TRANSACTIONS" => Ok(Rule::FrequentTransactions),
            "HIGH_RISK_COUNTRY" => Ok(Rule::HighRiskCountry),
            other => Err(UnknownVariant::new("rule", other)),
        }
    }
}

/// 알림 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            other => Err(UnknownVariant::new("severity", other)),
        }
    }
}

/// 알림 처리 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    New,
    UnderReview,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::New => "NEW",
            AlertStatus::UnderReview => "UNDER_REVIEW",
            AlertStatus::Resolved => "RESOLVED",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(AlertStatus::New),
            "UNDER_REVIEW" => Ok(AlertStatus::UnderReview),
            "RESOLVED" => Ok(AlertStatus::Resolved),
            other => Err(UnknownVariant::new("alert status", other)),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 모니터링 대상 고객
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    /// 저장소에서 유일성 보장
    pub email: String,
    /// 자유 텍스트 국가명 (대소문자 구분)
    pub country: String,
    pub risk_level: RiskLevel,
    pub kyc_status: KycStatus,
    pub created_at: DateTime<Utc>,
}

/// 금융 거래 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    /// 상대방 고객 ID (이체 등)
    pub counterparty_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// 규칙 발동 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub client_id: Uuid,
    pub transaction_id: Uuid,
    pub rule: Rule,
    pub severity: Severity,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

/// 조회 기간
///
/// 시작/종료 모두 선택 사항이며 `bounds`가 실제 적용 범위를 결정합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// 실제로 적용되는 기간 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBounds {
    /// start <= t <= end
    Between(DateTime<Utc>, DateTime<Utc>),
    /// t >= start
    From(DateTime<Utc>),
    /// t <= end
    Until(DateTime<Utc>),
    Unbounded,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start: Some(start), end: None }
    }

    /// 기간 우선순위: 시작이 종료보다 늦으면 기간 조건을 버린다
    pub fn bounds(&self) -> WindowBounds {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => WindowBounds::Between(start, end),
            (Some(start), None) => WindowBounds::From(start),
            (None, Some(end)) => WindowBounds::Until(end),
            _ => WindowBounds::Unbounded,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match self.bounds() {
            WindowBounds::Between(start, end) => start <= at && at <= end,
            WindowBounds::From(start) => at >= start,
            WindowBounds::Until(end) => at <= end,
            WindowBounds::Unbounded => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_window_precedence() {
        assert_eq!(
            TimeWindow::new(Some(day(1)), Some(day(10))).bounds(),
            WindowBounds::Between(day(1), day(10))
        );
        assert_eq!(TimeWindow::new(Some(day(1)), None).bounds(), WindowBounds::From(day(1)));
        assert_eq!(TimeWindow::new(None, Some(day(10))).bounds(), WindowBounds::Until(day(10)));
        assert_eq!(TimeWindow::default().bounds(), WindowBounds::Unbounded);

        // 시작 > 종료 이면 전체 기간
        let inverted = TimeWindow::new(Some(day(10)), Some(day(1)));
        assert_eq!(inverted.bounds(), WindowBounds::Unbounded);
        assert!(inverted.contains(day(20)));
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = TimeWindow::new(Some(day(1)), Some(day(10)));
        assert!(window.contains(day(1)));
        assert!(window.contains(day(10)));
        assert!(!window.contains(day(11)));
    }

    // 00:00~01:00 이 존재하지 않는 날을 흉내 내는 UTC+1 지역 시계
    fn spring_forward(naive: NaiveDateTime) -> LocalResult<DateTime<Utc>> {
        if naive.hour() == 0 {
            LocalResult::None
        } else {
            LocalResult::Single(Utc.from_utc_datetime(&(naive - Duration::hours(1))))
        }
    }

    #[test]
    fn test_missing_local_midnight_moves_forward() {
        let midnight = chrono::NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let resolved = resolve_local(midnight, spring_forward);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap());

        // 정상 시각은 그대로 환산
        let noon = midnight + Duration::hours(12);
        assert_eq!(resolve_local(noon, spring_forward), Utc.with_ymd_and_hms(2024, 3, 31, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_local_to_utc_round_trips() {
        let noon = chrono::NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(local_to_utc(noon).with_timezone(&Local).naive_local(), noon);
    }

    #[test]
    fn test_rule_severity_table() {
        assert_eq!(Rule::DailyLimit.severity(), Severity::Low);
        assert_eq!(Rule::FrequentTransactions.severity(), Severity::Medium);
        assert_eq!(Rule::HighRiskCountry.severity(), Severity::High);
    }

    #[test]
    fn test_enum_tags_parse_back() {
        for rule in Rule::ALL {
            assert_eq!(rule.as_str().parse::<Rule>().unwrap(), rule);
        }
        assert_eq!("UNDER_REVIEW".parse::<AlertStatus>().unwrap(), AlertStatus::UnderReview);
        assert!("usd".parse::<Currency>().is_err());
    }

    #[test]
    fn test_serde_tags_match_store_tags() {
        let json = serde_json::to_string(&Rule::HighRiskCountry).unwrap();
        assert_eq!(json, "\"HIGH_RISK_COUNTRY\"");
        let json = serde_json::to_string(&TransactionType::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
    }
}
