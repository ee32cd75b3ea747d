//! 서비스 전역 오류 타입
//!
//! 저장소, 워크플로, API 계층이 모두 같은 오류 분류를 공유합니다.

use uuid::Uuid;

/// 도메인 오류
#[derive(Debug, thiserror::Error)]
pub enum WatchdogError {
    /// 요청한 엔티티가 존재하지 않음
    #[error("{entity}을(를) 찾을 수 없음: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    /// 유일 필드 중복 (고객 이메일)
    #[error("이미 존재하는 값: {0}")]
    Conflict(String),
    /// 잘못된 입력
    #[error("잘못된 요청: {0}")]
    Validation(String),
    /// 저장소 오류
    #[error("저장소 오류: {0}")]
    Store(#[from] sqlx::Error),
    /// 저장된 행을 도메인 값으로 복원할 수 없음
    #[error("손상된 레코드: {0}")]
    Corrupt(String),
}

impl WatchdogError {
    pub fn client_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "client", id }
    }

    pub fn transaction_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "transaction", id }
    }

    pub fn alert_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "alert", id }
    }

    /// 저장소 계층 실패 여부 (서버 오류로 응답)
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Corrupt(_))
    }
}

pub type WatchdogResult<T> = Result<T, WatchdogError>;
