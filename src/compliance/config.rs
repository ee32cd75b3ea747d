//! 컴플라이언스 규칙 임계값 설정
//!
//! 엔진 생성 시 한 번 주입되는 불변 설정입니다. 프로세스 전역 상태를 두지 않으므로
//! 테스트마다 임계값을 자유롭게 바꿀 수 있습니다.

use std::env;
use std::str::FromStr;

use log::warn;
use rust_decimal::Decimal;

/// 규칙 임계값 및 고위험 국가 목록
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceConfig {
    /// 일일 누적 한도 (초과 시 발동)
    pub daily_limit: Decimal,
    /// 소액 기준 금액 (미만이면 소액)
    pub low_amount: Decimal,
    /// 소액 거래 발동 횟수 (이상이면 발동)
    pub low_amount_occurrences: usize,
    /// 소액 거래 횟수에 후보 거래 자신을 포함할지 여부
    ///
    /// 기본값 false 는 규칙 정의대로 이력만 센다. 켜면 "6번째 소액 거래"가 그 자리에서 발동한다.
    pub count_candidate_as_small: bool,
    /// 고위험 국가 (대소문자 구분)
    pub high_risk_countries: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            daily_limit: Decimal::from(1000),
            low_amount: Decimal::from(50),
            low_amount_occurrences: 6,
            count_candidate_as_small: false,
            high_risk_countries: vec![
                "North Korea".into(),
                "Iran".into(),
                "Syria".into(),
                "Cuba".into(),
            ],
        }
    }
}

/// 환경 변수 파싱, 실패 시 기본값 유지
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("환경 변수 {} 값이 올바르지 않음: {:?} (기본값 사용)", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl ComplianceConfig {
    /// 환경 변수에서 설정 로드
    ///
    /// `LIMIT_AMOUNT`, `MAX_LOW_AMOUNT`, `MAX_LOW_AMOUNT_TIMES`, `COUNT_CANDIDATE_AS_SMALL`,
    /// `HIGH_RISK_COUNTRIES`(쉼표 구분)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let high_risk_countries = match env::var("HIGH_RISK_COUNTRIES") {
            Ok(raw) => {
                let countries: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect();
                if countries.is_empty() {
                    warn!("HIGH_RISK_COUNTRIES 가 비어 있음 (기본 목록 사용)");
                    defaults.high_risk_countries.clone()
                } else {
                    countries
                }
            }
            Err(_) => defaults.high_risk_countries.clone(),
        };

        Self {
            daily_limit: env_or("LIMIT_AMOUNT", defaults.daily_limit),
            low_amount: env_or("MAX_LOW_AMOUNT", defaults.low_amount),
            low_amount_occurrences: env_or("MAX_LOW_AMOUNT_TIMES", defaults.low_amount_occurrences),
            count_candidate_as_small: env_or("COUNT_CANDIDATE_AS_SMALL", defaults.count_candidate_as_small),
            high_risk_countries,
        }
    }

    pub fn is_high_risk_country(&self, country: &str) -> bool {
        self.high_risk_countries.iter().any(|c| c == country)
    }
}
