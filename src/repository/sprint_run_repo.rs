// ==========================================
// 医生值班排班系统 - 求解记录仓储
// ==========================================
// 红线: 只追加,不提供 UPDATE/DELETE
// 读取顺序: executed_at 升序 (与写入的真实时间顺序一致)
// ==========================================

use crate::domain::sprint::SprintRun;
use crate::domain::types::RunStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SprintRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SprintRunRepository {
    /// 创建新的求解记录仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加求解记录
    pub fn append(&self, run: &SprintRun) -> RepositoryResult<String> {
        let input_json = run
            .input_snapshot
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let output_json = run
            .output_snapshot
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sprint_run (
                run_id, sprint_id, executed_at, status,
                input_snapshot_json, output_snapshot_json,
                error_code, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                run.run_id,
                run.sprint_id,
                format_ts(run.executed_at),
                run.status.to_db_str(),
                input_json,
                output_json,
                run.error_code,
                run.error_message,
            ],
        )?;

        Ok(run.run_id.clone())
    }

    /// 查询某冲刺的全部求解记录 (executed_at 升序)
    pub fn list_by_sprint(&self, sprint_id: &str) -> RepositoryResult<Vec<SprintRun>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT run_id, sprint_id, executed_at, status,
                      input_snapshot_json, output_snapshot_json,
                      error_code, error_message
               FROM sprint_run
               WHERE sprint_id = ?
               ORDER BY executed_at ASC"#,
        )?;

        let runs = stmt
            .query_map(params![sprint_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<SprintRun>, _>>()?;

        Ok(runs)
    }

    /// 映射数据库行到 SprintRun 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<SprintRun> {
        let status_str: String = row.get(3)?;
        let input_json: Option<String> = row.get(4)?;
        let output_json: Option<String> = row.get(5)?;

        Ok(SprintRun {
            run_id: row.get(0)?,
            sprint_id: row.get(1)?,
            executed_at: parse_ts(2, &row.get::<_, String>(2)?)?,
            status: RunStatus::from_str(&status_str),
            input_snapshot: input_json
                .map(|s| {
                    serde_json::from_str(&s).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })
                })
                .transpose()?,
            output_snapshot: output_json
                .map(|s| {
                    serde_json::from_str(&s).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            5,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })
                })
                .transpose()?,
            error_code: row.get(6)?,
            error_message: row.get(7)?,
        })
    }
}
