// ==========================================
// 任务导入服务 - 任务 Repository 实现
// ==========================================
// 职责: 实现任务写入 / 查询（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据读写
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::task::{ImportRecord, PersistedTask, TaskStatusEntry};
use crate::perf::PerfGuard;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::task_repo::{TaskCommandRepository, TaskQueryRepository};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row, Transaction};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const INSERT_TASK_SQL: &str = r#"
    INSERT INTO tasks (
        name, email, age, address, phone_number, department, position,
        salary, hire_date, is_active, created_at, updated_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?11
    )
"#;

// ==========================================
// TaskRepositoryImpl
// ==========================================
pub struct TaskRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl TaskRepositoryImpl {
    /// 创建新的 Repository 实例
    pub fn new(db_path: &str, busy_timeout_ms: u64) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path, busy_timeout_ms)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 在阻塞线程池中持锁执行数据库操作（rusqlite 为同步 API，不占用异步 worker）
    async fn run_blocking<T, F>(&self, op: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepositoryResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            op(&guard)
        })
        .await
        .map_err(|e| RepositoryError::DatabaseQueryError(format!("blocking task failed: {e}")))?
    }

    /// 在事务中逐条插入（语句只准备一次）
    fn bulk_insert_tx(tx: &Transaction, records: &[ImportRecord]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(INSERT_TASK_SQL)?;
        let now = Utc::now();

        for (idx, record) in records.iter().enumerate() {
            stmt.execute(params![
                record.name,
                record.email,
                record.age,
                record.address,
                record.phone_number,
                record.department,
                record.position,
                record.salary,
                record.hire_date,
                now,
                now,
            ])
            .map_err(|e| RepositoryError::RowInsertFailed {
                row: idx + 1,
                message: e.to_string(),
            })?;
        }

        Ok(records.len())
    }

    fn map_task_row(row: &Row) -> rusqlite::Result<PersistedTask> {
        Ok(PersistedTask {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            age: row.get(3)?,
            address: row.get(4)?,
            phone_number: row.get(5)?,
            department: row.get(6)?,
            position: row.get(7)?,
            salary: row.get(8)?,
            hire_date: row.get(9)?,
            is_active: row.get(10)?,
            client_name: row.get(11)?,
            client_id: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn map_status_row(row: &Row) -> rusqlite::Result<TaskStatusEntry> {
        Ok(TaskStatusEntry {
            task_id: row.get(0)?,
            client_name: row.get(1)?,
            client_id: row.get(2)?,
            status: row.get(3)?,
            status_description: row.get(4)?,
            updated_by: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[async_trait]
impl TaskCommandRepository for TaskRepositoryImpl {
    async fn bulk_insert_tasks(&self, records: &[ImportRecord]) -> RepositoryResult<usize> {
        let records = records.to_vec();
        self.run_blocking(move |conn| {
            let _perf = PerfGuard::new("bulk_insert_tasks").entries(records.len());
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

            // 出错时 tx 被 drop，自动回滚
            let count = match Self::bulk_insert_tx(&tx, &records) {
                Ok(count) => count,
                Err(e) => {
                    warn!(error = %e, entry_count = records.len(), "批量插入失败，事务回滚");
                    return Err(e);
                }
            };

            tx.commit()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

            info!(entry_count = count, "批量插入完成");
            Ok(count)
        })
        .await
    }
}

#[async_trait]
impl TaskQueryRepository for TaskRepositoryImpl {
    async fn get_active_tasks(
        &self,
        client_name: &str,
        client_id: &str,
    ) -> RepositoryResult<Vec<PersistedTask>> {
        let (client_name, client_id) = (client_name.to_string(), client_id.to_string());
        self.run_blocking(move |conn| {
            let _perf = PerfGuard::new("get_active_tasks");
            let mut stmt = conn.prepare(
                r#"
                SELECT id, name, email, age, address, phone_number, department, position,
                       salary, hire_date, is_active, client_name, client_id, created_at, updated_at
                FROM tasks
                WHERE client_name = ?1 AND client_id = ?2 AND is_active = 1
                ORDER BY id
                "#,
            )?;

            let tasks = stmt
                .query_map(params![client_name, client_id], Self::map_task_row)?
                .collect::<Result<Vec<_>, _>>()?;

            debug!(client_name = %client_name, count = tasks.len(), "查询在用任务");
            Ok(tasks)
        })
        .await
    }

    async fn get_task_status_history(
        &self,
        client_name: &str,
        client_id: &str,
    ) -> RepositoryResult<Vec<TaskStatusEntry>> {
        let (client_name, client_id) = (client_name.to_string(), client_id.to_string());
        self.run_blocking(move |conn| {
            let _perf = PerfGuard::new("get_task_status_history");
            let mut stmt = conn.prepare(
                r#"
                SELECT task_id, client_name, client_id, status, status_description,
                       updated_by, created_at
                FROM task_status
                WHERE client_name = ?1 AND client_id = ?2
                ORDER BY created_at DESC, id DESC
                "#,
            )?;

            let history = stmt
                .query_map(params![client_name, client_id], Self::map_status_row)?
                .collect::<Result<Vec<_>, _>>()?;

            debug!(client_name = %client_name, count = history.len(), "查询任务状态历史");
            Ok(history)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema, DEFAULT_BUSY_TIMEOUT_MS};
    use chrono::{Duration, NaiveDate};

    fn repo() -> (TaskRepositoryImpl, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn, DEFAULT_BUSY_TIMEOUT_MS).unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (TaskRepositoryImpl::from_connection(conn.clone()), conn)
    }

    fn record(email: &str) -> ImportRecord {
        ImportRecord {
            name: "Alice".to_string(),
            email: email.to_string(),
            age: 30,
            address: "1 Main St".to_string(),
            phone_number: "5551234567".to_string(),
            department: "Engineering".to_string(),
            position: "Developer".to_string(),
            salary: 5000.0,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn count_tasks(conn: &Arc<Mutex<Connection>>) -> i64 {
        conn.lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_bulk_insert_commits_all() {
        let (repo, conn) = repo();
        let records = vec![record("a@x.io"), record("b@x.io"), record("c@x.io")];

        let count = repo.bulk_insert_tasks(&records).await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(count_tasks(&conn), 3);
    }

    #[tokio::test]
    async fn test_bulk_insert_rolls_back_on_failure() {
        let (repo, conn) = repo();
        conn.lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON tasks
                 WHEN NEW.email = 'bad@x.io'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let records = vec![record("a@x.io"), record("bad@x.io"), record("c@x.io")];
        let err = repo.bulk_insert_tasks(&records).await.unwrap_err();

        assert!(matches!(err, RepositoryError::RowInsertFailed { row: 2, .. }));
        assert_eq!(count_tasks(&conn), 0);
    }

    #[tokio::test]
    async fn test_query_active_tasks_and_history() {
        let (repo, conn) = repo();
        let client_id = "7f0c6f8e-2d1e-4d7a-9a51-0c7e4f6b8a11";
        let now = Utc::now();
        {
            let c = conn.lock().unwrap();
            for (name, active) in [("Alice", 1), ("Bob", 0), ("Carol", 1)] {
                c.execute(
                    "INSERT INTO tasks (name, email, age, address, phone_number, department,
                        position, salary, hire_date, is_active, client_name, client_id,
                        created_at, updated_at)
                     VALUES (?1, 'x@x.io', 30, 'addr', '5551234567', 'Eng', 'Dev', 1.0,
                        '2024-01-15', ?2, 'acme', ?3, ?4, ?4)",
                    params![name, active, client_id, now],
                )
                .unwrap();
            }
            for (status, offset) in [("pending", 2), ("done", 0), ("running", 1)] {
                c.execute(
                    "INSERT INTO task_status (task_id, client_name, client_id, status,
                        status_description, updated_by, created_at)
                     VALUES (1, 'acme', ?1, ?2, '', 'system', ?3)",
                    params![client_id, status, now - Duration::minutes(offset)],
                )
                .unwrap();
            }
        }

        let tasks = repo.get_active_tasks("acme", client_id).await.unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Carol"]);
        assert_eq!(tasks[0].client_name.as_deref(), Some("acme"));

        let history = repo.get_task_status_history("acme", client_id).await.unwrap();
        let statuses: Vec<&str> = history.iter().map(|h| h.status.as_str()).collect();
        assert_eq!(statuses, vec!["done", "running", "pending"]);

        assert!(repo.get_active_tasks("other", client_id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_inserts_are_serialized() {
        let (repo, conn) = repo();
        let repo = Arc::new(repo);

        let first = vec![record("a@x.io"), record("b@x.io")];
        let second = vec![record("c@x.io"), record("d@x.io")];
        let (r1, r2) = tokio::join!(
            repo.bulk_insert_tasks(&first),
            repo.bulk_insert_tasks(&second)
        );

        assert_eq!(r1.unwrap(), 2);
        assert_eq!(r2.unwrap(), 2);
        assert_eq!(count_tasks(&conn), 4);
    }
}
