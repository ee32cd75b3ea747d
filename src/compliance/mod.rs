/**
* filename : mod
* description: 컴플라이언스 규칙 엔진과 알림 생성
**/

pub mod alert;
pub mod config;
pub mod engine;

pub use alert::AlertGenerator;
pub use config::ComplianceConfig;
pub use engine::{Candidate, RuleEngine};
