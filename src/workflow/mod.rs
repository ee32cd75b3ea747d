/**
* filename : mod
* description: 고객 등록, 거래 접수, 리포트 집계 워크플로
**/

pub mod clients;
pub mod intake;
pub mod report;

pub use clients::{register_client, NewClient};
pub use intake::{NewTransaction, TransactionIntake};
pub use report::{ClientReport, ReportAggregator};
