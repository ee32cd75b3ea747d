//! DB 행 모델과 도메인 변환
//!
//! 저장소에서 읽은 행은 반드시 이 모듈의 `TryFrom` 구현을 거쳐 도메인 타입이 됩니다.
//! ID는 하이픈 포함 UUID 문자열, 금액은 십진수 문자열, 시각은 UTC 마이크로초 정수로 저장합니다.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::WatchdogError;
use crate::ledger::model::{Alert, Client, Transaction};

/// 고객 DB 모델
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub country: String,
    pub risk_level: String,
    pub kyc_status: String,
    pub created_at: i64,
}

/// 거래 DB 모델
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRecord {
    pub id: String,
    pub client_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub currency: String,
    pub counterparty_id: Option<String>,
    pub created_at: i64,
}

/// 알림 DB 모델
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRecord {
    pub id: String,
    pub client_id: String,
    pub transaction_id: String,
    pub rule: String,
    pub severity: String,
    pub status: String,
    pub created_at: i64,
}

pub fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, WatchdogError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| WatchdogError::Corrupt(format!("시각 범위 초과: {}", micros)))
}

fn parse_id(raw: &str) -> Result<Uuid, WatchdogError> {
    Uuid::parse_str(raw).map_err(|e| WatchdogError::Corrupt(format!("잘못된 ID {}: {}", raw, e)))
}

fn parse_tag<T>(raw: &str) -> Result<T, WatchdogError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| WatchdogError::Corrupt(e.to_string()))
}

impl From<&Client> for ClientRecord {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.to_string(),
            name: client.name.clone(),
            email: client.email.clone(),
            country: client.country.clone(),
            risk_level: client.risk_level.as_str().to_string(),
            kyc_status: client.kyc_status.as_str().to_string(),
            created_at: to_micros(client.created_at),
        }
    }
}

impl TryFrom<ClientRecord> for Client {
    type Error = WatchdogError;

    fn try_from(record: ClientRecord) -> Result<Self, Self::Error> {
        Ok(Client {
            id: parse_id(&record.id)?,
            name: record.name,
            email: record.email,
            country: record.country,
            risk_level: parse_tag(&record.risk_level)?,
            kyc_status: parse_tag(&record.kyc_status)?,
            created_at: from_micros(record.created_at)?,
        })
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.to_string(),
            client_id: transaction.client_id.to_string(),
            transaction_type: transaction.transaction_type.as_str().to_string(),
            amount: transaction.amount.to_string(),
            currency: transaction.currency.as_str().to_string(),
            counterparty_id: transaction.counterparty_id.map(|id| id.to_string()),
            created_at: to_micros(transaction.created_at),
        }
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = WatchdogError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&record.amount)
            .map_err(|e| WatchdogError::Corrupt(format!("잘못된 금액 {}: {}", record.amount, e)))?;

        Ok(Transaction {
            id: parse_id(&record.id)?,
            client_id: parse_id(&record.client_id)?,
            transaction_type: parse_tag(&record.transaction_type)?,
            amount,
            currency: parse_tag(&record.currency)?,
            counterparty_id: record.counterparty_id.as_deref().map(parse_id).transpose()?,
            created_at: from_micros(record.created_at)?,
        })
    }
}

impl From<&Alert> for AlertRecord {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.to_string(),
            client_id: alert.client_id.to_string(),
            transaction_id: alert.transaction_id.to_string(),
            rule: alert.rule.as_str().to_string(),
            severity: alert.severity.as_str().to_string(),
            status: alert.status.as_str().to_string(),
            created_at: to_micros(alert.created_at),
        }
    }
}

impl TryFrom<AlertRecord> for Alert {
    type Error = WatchdogError;

    fn try_from(record: AlertRecord) -> Result<Self, Self::Error> {
        Ok(Alert {
            id: parse_id(&record.id)?,
            client_id: parse_id(&record.client_id)?,
            transaction_id: parse_id(&record.transaction_id)?,
            rule: parse_tag(&record.rule)?,
            severity: parse_tag(&record.severity)?,
            status: parse_tag(&record.status)?,
            created_at: from_micros(record.created_at)?,
        })
    }
}
