use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::error;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::WatchdogError;
use crate::ledger::model::{local_to_utc, AlertStatus, Currency, Rule, Severity, TimeWindow, TransactionType};

/// 오류 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// 헬스 체크 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

/// 기간 경계 파싱
///
/// RFC3339 는 그대로, 오프셋 없는 일시와 날짜(자정)는 서버 지역 시각으로 읽는다.
pub fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    Some(local_to_utc(naive))
}

fn deserialize_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_bound(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("올바르지 않은 일시: {}", raw))),
    }
}

/// 거래 조회 조건
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub client_id: Option<Uuid>,
    pub currency: Option<Currency>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub end: Option<DateTime<Utc>>,
}

/// 알림 조회 조건
#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub client_id: Option<Uuid>,
    pub rule: Option<Rule>,
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub end: Option<DateTime<Utc>>,
}

/// 리포트 기간
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub end: Option<DateTime<Utc>>,
}

impl ReportQuery {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

impl IntoResponse for WatchdogError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WatchdogError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            WatchdogError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            WatchdogError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            WatchdogError::Store(_) | WatchdogError::Corrupt(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_FAILURE")
            }
        };

        if self.is_store_failure() {
            error!("저장소 실패: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
