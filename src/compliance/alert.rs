//! 알림 생성기
//!
//! 발동 규칙 집합을 알림 레코드로 바꿉니다. I/O 없이 값만 만듭니다.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ledger::model::{Alert, AlertStatus, Rule};

/// 알림 생성기
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertGenerator;

impl AlertGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 규칙마다 하나씩 NEW 상태 알림 생성
    pub fn generate(
        &self,
        rules: &BTreeSet<Rule>,
        transaction_id: Uuid,
        client_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Vec<Alert> {
        rules
            .iter()
            .map(|rule| Alert {
                id: Uuid::new_v4(),
                client_id,
                transaction_id,
                rule: *rule,
                severity: rule.severity(),
                status: AlertStatus::New,
                created_at,
            })
            .collect()
    }
}
