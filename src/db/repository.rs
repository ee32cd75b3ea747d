use async_trait::async_trait;
use log::{debug, error};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::models::{to_micros, AlertRecord, ClientRecord, TransactionRecord};
use crate::error::{WatchdogError, WatchdogResult};
use crate::ledger::model::{Alert, Client, TimeWindow, Transaction, WindowBounds};
use crate::ledger::store::{AlertFilter, LedgerStore, TransactionFilter, WriteOp};

const CLIENT_COLUMNS: &str = "id, name, email, country, risk_level, kyc_status, created_at";
const TRANSACTION_COLUMNS: &str =
    "id, client_id, transaction_type, amount, currency, counterparty_id, created_at";
const ALERT_COLUMNS: &str = "id, client_id, transaction_id, rule, severity, status, created_at";

/// SQLite 원장 저장소
#[derive(Clone)]
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// 기간 조건 추가
fn push_window(query: &mut QueryBuilder<'_, Sqlite>, window: &TimeWindow) {
    match window.bounds() {
        WindowBounds::Between(start, end) => {
            query
                .push(" AND created_at BETWEEN ")
                .push_bind(to_micros(start))
                .push(" AND ")
                .push_bind(to_micros(end));
        }
        WindowBounds::From(start) => {
            query.push(" AND created_at >= ").push_bind(to_micros(start));
        }
        WindowBounds::Until(end) => {
            query.push(" AND created_at <= ").push_bind(to_micros(end));
        }
        WindowBounds::Unbounded => {}
    }
}

async fn insert_transaction_row(
    conn: &mut SqliteConnection,
    record: &TransactionRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions
         (id, client_id, transaction_type, amount, currency, counterparty_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&record.id)
    .bind(&record.client_id)
    .bind(&record.transaction_type)
    .bind(&record.amount)
    .bind(&record.currency)
    .bind(&record.counterparty_id)
    .bind(record.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_alert_row(conn: &mut SqliteConnection, record: &AlertRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO alerts
         (id, client_id, transaction_id, rule, severity, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&record.id)
    .bind(&record.client_id)
    .bind(&record.transaction_id)
    .bind(&record.rule)
    .bind(&record.severity)
    .bind(&record.status)
    .bind(record.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn insert_client(&self, client: &Client) -> WatchdogResult<Uuid> {
        let record = ClientRecord::from(client);

        let result = sqlx::query(
            "INSERT INTO clients (id, name, email, country, risk_level, kyc_status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.country)
        .bind(&record.risk_level)
        .bind(&record.kyc_status)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(client.id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(WatchdogError::Conflict(format!("email {}", client.email)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_client(&self, id: Uuid) -> WatchdogResult<Client> {
        let sql = format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS);
        let record = sqlx::query_as::<_, ClientRecord>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Client::try_from(record),
            None => Err(WatchdogError::client_not_found(id)),
        }
    }

    async fn list_clients(&self) -> WatchdogResult<Vec<Client>> {
        let sql = format!("SELECT {} FROM clients ORDER BY created_at ASC, rowid ASC", CLIENT_COLUMNS);
        let records = sqlx::query_as::<_, ClientRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(Client::try_from).collect()
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> WatchdogResult<Uuid> {
        let mut conn = self.pool.acquire().await?;
        insert_transaction_row(&mut conn, &TransactionRecord::from(transaction)).await?;
        Ok(transaction.id)
    }

    async fn get_transaction(&self, id: Uuid) -> WatchdogResult<Transaction> {
        let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let record = sqlx::query_as::<_, TransactionRecord>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Transaction::try_from(record),
            None => Err(WatchdogError::transaction_not_found(id)),
        }
    }

    async fn query_transactions(&self, filter: &TransactionFilter) -> WatchdogResult<Vec<Transaction>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM transactions WHERE 1 = 1",
            TRANSACTION_COLUMNS
        ));

        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ").push_bind(client_id.to_string());
        }
        if let Some(currency) = filter.currency {
            query.push(" AND currency = ").push_bind(currency.as_str());
        }
        if let Some(transaction_type) = filter.transaction_type {
            query.push(" AND transaction_type = ").push_bind(transaction_type.as_str());
        }
        push_window(&mut query, &filter.window);
        query.push(" ORDER BY created_at ASC, rowid ASC");

        let records = query
            .build_query_as::<TransactionRecord>()
            .fetch_all(&self.pool)
            .await?;

        debug!("거래 조회: {} 건 ({:?})", records.len(), filter);
        records.into_iter().map(Transaction::try_from).collect()
    }

    async fn insert_alert(&self, alert: &Alert) -> WatchdogResult<Uuid> {
        let mut conn = self.pool.acquire().await?;
        insert_alert_row(&mut conn, &AlertRecord::from(alert)).await?;
        Ok(alert.id)
    }

    async fn get_alert(&self, id: Uuid) -> WatchdogResult<Alert> {
        let sql = format!("SELECT {} FROM alerts WHERE id = ?", ALERT_COLUMNS);
        let record = sqlx::query_as::<_, AlertRecord>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Alert::try_from(record),
            None => Err(WatchdogError::alert_not_found(id)),
        }
    }

    async fn query_alerts(&self, filter: &AlertFilter) -> WatchdogResult<Vec<Alert>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM alerts WHERE 1 = 1",
            ALERT_COLUMNS
        ));

        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ").push_bind(client_id.to_string());
        }
        if let Some(rule) = filter.rule {
            query.push(" AND rule = ").push_bind(rule.as_str());
        }
        if let Some(severity) = filter.severity {
            query.push(" AND severity = ").push_bind(severity.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        push_window(&mut query, &filter.window);
        query.push(" ORDER BY created_at ASC, rowid ASC");

        let records = query
            .build_query_as::<AlertRecord>()
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(Alert::try_from).collect()
    }

    async fn alerts_by_transaction(&self, transaction_id: Uuid) -> WatchdogResult<Vec<Alert>> {
        let sql = format!(
            "SELECT {} FROM alerts WHERE transaction_id = ? ORDER BY created_at ASC, rowid ASC",
            ALERT_COLUMNS
        );
        let records = sqlx::query_as::<_, AlertRecord>(&sql)
            .bind(transaction_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(Alert::try_from).collect()
    }

    async fn execute_batch(&self, ops: Vec<WriteOp>) -> WatchdogResult<()> {
        let batch_size = ops.len();
        debug!("배치 커밋 시작: {} 건", batch_size);

        // 단일 트랜잭션으로 전부 저장, 실패 시 drop 되면서 롤백
        let mut tx = self.pool.begin().await?;

        for op in &ops {
            let result = match op {
                WriteOp::InsertTransaction(transaction) => {
                    insert_transaction_row(&mut tx, &TransactionRecord::from(transaction)).await
                }
                WriteOp::InsertAlert(alert) => insert_alert_row(&mut tx, &AlertRecord::from(alert)).await,
            };

            if let Err(e) = result {
                error!("배치 쓰기 실패, 롤백: {}", e);
                tx.rollback().await?;
                return Err(e.into());
            }
        }

        tx.commit().await?;
        debug!("✅ 배치 커밋 완료: {} 건", batch_size);

        Ok(())
    }
}
