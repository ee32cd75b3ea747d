pub mod model;
pub mod store;

pub use model::{
  local_to_utc,
  timestamp_now,
  Alert,
  AlertStatus,
  Client,
  Currency,
  KycStatus,
  RiskLevel,
  Rule,
  Severity,
  TimeWindow,
  Transaction,
  TransactionType,
  WindowBounds,
};

pub use store::{AlertFilter, LedgerStore, TransactionFilter, WriteOp};
