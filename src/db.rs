// ==========================================
// 医生值班排班系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为,避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 集中建表语句,应用/种子工具/测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout (毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明: 版本号用于提示/告警 (不做自动迁移),
/// 避免静默在旧库上运行导致隐性错误
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version (若表不存在则返回 None)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema (幂等)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS doctor (
            doctor_id TEXT PRIMARY KEY,
            doctor_name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            max_total_days INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS period (
            period_id TEXT PRIMARY KEY,
            period_name TEXT NOT NULL,
            starts_on TEXT NOT NULL,
            ends_on TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS period_day_demand (
            period_id TEXT NOT NULL REFERENCES period(period_id) ON DELETE CASCADE,
            day TEXT NOT NULL,
            required_doctors INTEGER NOT NULL,
            PRIMARY KEY (period_id, day)
        );

        CREATE TABLE IF NOT EXISTS sprint (
            sprint_id TEXT PRIMARY KEY,
            sprint_name TEXT NOT NULL,
            period_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            required_doctors_per_shift INTEGER NOT NULL,
            max_days_per_doctor_default INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sprint_doctor (
            sprint_id TEXT NOT NULL REFERENCES sprint(sprint_id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            doctor_id TEXT NOT NULL,
            PRIMARY KEY (sprint_id, position),
            UNIQUE (sprint_id, doctor_id)
        );

        CREATE TABLE IF NOT EXISTS sprint_availability (
            sprint_id TEXT NOT NULL REFERENCES sprint(sprint_id) ON DELETE CASCADE,
            doctor_id TEXT NOT NULL,
            period_id TEXT NOT NULL,
            day TEXT NOT NULL,
            PRIMARY KEY (sprint_id, doctor_id, period_id, day)
        );

        CREATE TABLE IF NOT EXISTS sprint_run (
            run_id TEXT PRIMARY KEY,
            sprint_id TEXT NOT NULL REFERENCES sprint(sprint_id),
            executed_at TEXT NOT NULL,
            status TEXT NOT NULL,
            input_snapshot_json TEXT,
            output_snapshot_json TEXT,
            error_code TEXT,
            error_message TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_sprint_run_sprint_ts
            ON sprint_run (sprint_id, executed_at);

        CREATE TABLE IF NOT EXISTS planning_cycle (
            cycle_id TEXT PRIMARY KEY,
            cycle_name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS planning_cycle_sprint (
            cycle_id TEXT NOT NULL REFERENCES planning_cycle(cycle_id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            sprint_id TEXT NOT NULL,
            PRIMARY KEY (cycle_id, position),
            UNIQUE (cycle_id, sprint_id)
        );

        CREATE TABLE IF NOT EXISTS planning_cycle_run (
            run_id TEXT PRIMARY KEY,
            cycle_id TEXT NOT NULL REFERENCES planning_cycle(cycle_id),
            executed_at TEXT NOT NULL,
            status TEXT NOT NULL,
            items_json TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_planning_cycle_run_cycle_ts
            ON planning_cycle_run (cycle_id, executed_at);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}
