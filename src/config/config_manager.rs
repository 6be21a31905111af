// ==========================================
// 医生值班排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, 全局作用域)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::solver::client::DEFAULT_SOLVER_TIMEOUT_MS;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 求解器可执行文件路径
pub const KEY_SOLVER_BINARY_PATH: &str = "solver.binary_path";
/// 求解器超时 (毫秒)
pub const KEY_SOLVER_TIMEOUT_MS: &str = "solver.timeout_ms";

/// 默认求解器可执行文件名 (从 PATH 解析)
pub const DEFAULT_SOLVER_BINARY: &str = "oncall-solver";

// ==========================================
// SolverSettings - 求解器调用配置
// ==========================================
#[derive(Debug, Clone)]
pub struct SolverSettings {
    pub binary_path: String, // 可执行文件路径
    pub timeout_ms: u64,     // 墙钟超时 (毫秒)
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            binary_path: DEFAULT_SOLVER_BINARY.to_string(),
            timeout_ms: DEFAULT_SOLVER_TIMEOUT_MS,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致,会对传入连接再次应用统一 PRAGMA (幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    pub fn get_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值 (存在则覆盖)
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 加载求解器调用配置 (缺失项取默认值)
    pub fn solver_settings(&self) -> Result<SolverSettings, Box<dyn Error>> {
        let mut settings = SolverSettings::default();

        if let Some(path) = self.get_value(KEY_SOLVER_BINARY_PATH)? {
            settings.binary_path = path;
        }
        if let Some(raw) = self.get_value(KEY_SOLVER_TIMEOUT_MS)? {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => settings.timeout_ms = ms,
                _ => warn!(
                    key = KEY_SOLVER_TIMEOUT_MS,
                    value = %raw,
                    "超时配置无法解析,使用默认值"
                ),
            }
        }

        Ok(settings)
    }
}
