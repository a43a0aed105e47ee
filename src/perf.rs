// ==========================================
// 任务导入服务 - SQL 性能观测
// ==========================================
// 职责: 慢 SQL 日志 + 仓储操作耗时/语句数统计
// 阈值: database.slow_sql_ms（0 表示关闭）
// 说明: 计数为线程内统计，PerfGuard 不跨 await 持有
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const SQL_LOG_MAX_CHARS: usize = 400;

static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static OPEN_GUARDS: Cell<u32> = const { Cell::new(0) };
    static COUNTERS: Cell<SqlCounters> = const { Cell::new(SqlCounters::ZERO) };
}

/// 线程内 SQL 计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SqlCounters {
    statements: u64,
    slow: u64,
}

impl SqlCounters {
    const ZERO: Self = Self {
        statements: 0,
        slow: 0,
    };

    fn current() -> Self {
        COUNTERS.with(Cell::get)
    }

    fn since(self, start: SqlCounters) -> Self {
        Self {
            statements: self.statements.saturating_sub(start.statements),
            slow: self.slow.saturating_sub(start.slow),
        }
    }
}

fn bump(slow: bool) {
    if OPEN_GUARDS.with(Cell::get) == 0 {
        return;
    }
    COUNTERS.with(|c| {
        let mut v = c.get();
        v.statements = v.statements.saturating_add(1);
        if slow {
            v.slow = v.slow.saturating_add(1);
        }
        c.set(v);
    });
}

fn truncate_sql(sql: &str, max_chars: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let head: String = flat.chars().take(max_chars).collect();
    format!("{head}…")
}

/// 为连接安装语句 profile 回调
///
/// slow_sql_ms 为 0 时清除回调
pub fn install_sqlite_tracing(conn: &mut Connection, slow_sql_ms: u64) {
    SLOW_SQL_THRESHOLD_MS.store(slow_sql_ms, Ordering::Relaxed);

    if slow_sql_ms == 0 {
        conn.profile(None);
        return;
    }

    conn.profile(Some(on_statement_finished));
    tracing::debug!(slow_sql_ms, "已启用慢 SQL 观测");
}

fn on_statement_finished(sql: &str, duration: Duration) {
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    let ms = duration.as_millis() as u64;
    let slow = threshold > 0 && ms >= threshold;

    if slow {
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            threshold_ms = threshold,
            sql = %truncate_sql(sql, SQL_LOG_MAX_CHARS),
            "慢 SQL"
        );
    }
    bump(slow);
}

/// 仓储操作耗时 Guard，drop 时输出耗时、语句数与慢 SQL 数
///
/// ```ignore
/// let _perf = PerfGuard::new("bulk_insert_tasks").entries(records.len());
/// ```
pub struct PerfGuard {
    op: &'static str,
    entry_count: Option<usize>,
    start: Instant,
    counters_at_start: SqlCounters,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        OPEN_GUARDS.with(|g| g.set(g.get().saturating_add(1)));
        Self {
            op,
            entry_count: None,
            start: Instant::now(),
            counters_at_start: SqlCounters::current(),
        }
    }

    /// 记录本次操作涉及的记录数
    pub fn entries(mut self, entry_count: usize) -> Self {
        self.entry_count = Some(entry_count);
        self
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let counters = SqlCounters::current().since(self.counters_at_start);
        tracing::debug!(
            target: "perf",
            op = self.op,
            entry_count = self.entry_count,
            duration_ms = self.start.elapsed().as_millis() as u64,
            sql_count = counters.statements,
            slow_sql_count = counters.slow,
            "仓储操作完成"
        );
        OPEN_GUARDS.with(|g| g.set(g.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_sql_flattens_whitespace() {
        assert_eq!(
            truncate_sql("SELECT id\n    FROM tasks\n", 100),
            "SELECT id FROM tasks"
        );
        assert_eq!(truncate_sql("SELECT * FROM tasks", 6), "SELECT…");
    }

    #[test]
    fn test_statements_counted_only_inside_guard() {
        bump(false);
        assert_eq!(SqlCounters::current(), SqlCounters::ZERO);

        let guard = PerfGuard::new("test").entries(3);
        bump(false);
        bump(true);
        let counters = SqlCounters::current().since(guard.counters_at_start);
        assert_eq!(counters.statements, 2);
        assert_eq!(counters.slow, 1);
        drop(guard);

        assert_eq!(OPEN_GUARDS.with(Cell::get), 0);
    }
}
