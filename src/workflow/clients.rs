//! 고객 등록

use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WatchdogError, WatchdogResult};
use crate::ledger::model::{timestamp_now, Client, KycStatus, RiskLevel};
use crate::ledger::store::LedgerStore;

/// 고객 등록 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub country: String,
    pub risk_level: RiskLevel,
    pub kyc_status: KycStatus,
}

impl NewClient {
    /// 이름/이메일/국가 공백 여부, 이메일 형식 검사
    pub fn validate(&self) -> WatchdogResult<()> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("country", &self.country)] {
            if value.trim().is_empty() {
                return Err(WatchdogError::Validation(format!("{} 은(는) 비어 있을 수 없습니다", field)));
            }
        }

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(WatchdogError::Validation(format!(
                "이메일 형식이 올바르지 않습니다: {}",
                self.email
            ))),
        }
    }
}

/// 검증 후 새 ID/생성 시각을 부여해 저장. 이메일 중복은 `Conflict`
pub async fn register_client(store: &dyn LedgerStore, request: NewClient) -> WatchdogResult<Client> {
    request.validate()?;

    let client = Client {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        country: request.country.trim().to_string(),
        risk_level: request.risk_level,
        kyc_status: request.kyc_status,
        created_at: timestamp_now(),
    };
    store.insert_client(&client).await?;

    info!("고객 등록: {} ({})", client.id, client.country);
    Ok(client)
}
