// ==========================================
// 医生值班排班系统 - 规划批次仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: planning_cycle_run 只追加
// ==========================================
// 分页: 游标为不透明时间戳字符串 (RFC3339 定宽微秒,
//       字典序即时间序); 见 DESIGN.md 同时间戳告警
// ==========================================

use crate::domain::planning_cycle::{CycleRunItem, PlanningCycle, PlanningCycleRun};
use crate::domain::types::{CycleRunStatus, CycleStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// CycleRunPage - 运行记录分页结果
// ==========================================
#[derive(Debug, Clone)]
pub struct CycleRunPage {
    pub items: Vec<PlanningCycleRun>,  // 本页记录 (executed_at 升序)
    pub next_cursor: Option<String>,   // 存在更多记录时 = 末条记录的时间戳
}

pub struct PlanningCycleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanningCycleRepository {
    /// 创建新的批次仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入批次 (含有序冲刺列表,单事务)
    pub fn insert(&self, cycle: &PlanningCycle) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO planning_cycle (
                cycle_id, cycle_name, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                cycle.cycle_id,
                cycle.cycle_name,
                cycle.status.to_db_str(),
                format_ts(cycle.created_at),
                format_ts(cycle.updated_at),
            ],
        )?;

        for (position, sprint_id) in cycle.sprint_ids.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO planning_cycle_sprint (cycle_id, position, sprint_id)
                VALUES (?, ?, ?)
                "#,
                params![cycle.cycle_id, position as i64, sprint_id],
            )?;
        }

        tx.commit()?;
        Ok(cycle.cycle_id.clone())
    }

    /// 按ID查询批次 (冲刺列表按存储顺序)
    pub fn find_by_id(&self, cycle_id: &str) -> RepositoryResult<Option<PlanningCycle>> {
        let conn = self.get_conn()?;

        let mut cycle = match conn.query_row(
            r#"SELECT cycle_id, cycle_name, status, created_at, updated_at
               FROM planning_cycle
               WHERE cycle_id = ?"#,
            params![cycle_id],
            |row| Self::map_row(row),
        ) {
            Ok(c) => c,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"SELECT sprint_id
               FROM planning_cycle_sprint
               WHERE cycle_id = ?
               ORDER BY position"#,
        )?;
        cycle.sprint_ids = stmt
            .query_map(params![cycle_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(Some(cycle))
    }

    /// 追加批次运行记录
    pub fn append_run(&self, run: &PlanningCycleRun) -> RepositoryResult<String> {
        let items_json = serde_json::to_string(&run.items)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO planning_cycle_run (
                run_id, cycle_id, executed_at, status, items_json
            ) VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                run.run_id,
                run.cycle_id,
                format_ts(run.executed_at),
                run.status.to_db_str(),
                items_json,
            ],
        )?;

        Ok(run.run_id.clone())
    }

    /// 分页查询批次运行记录 (executed_at 升序)
    ///
    /// # 参数
    /// - limit: 每页最大条数
    /// - cursor: 上一页返回的 next_cursor; None 表示从头开始
    pub fn list_runs_page(
        &self,
        cycle_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> RepositoryResult<CycleRunPage> {
        let conn = self.get_conn()?;

        // 多取一条用于判断是否还有后续页
        let fetch = i64::from(limit) + 1;
        let mut stmt = conn.prepare(
            r#"SELECT run_id, cycle_id, executed_at, status, items_json
               FROM planning_cycle_run
               WHERE cycle_id = ? AND executed_at > ?
               ORDER BY executed_at ASC
               LIMIT ?"#,
        )?;
        let mut items = stmt
            .query_map(
                params![cycle_id, cursor.unwrap_or(""), fetch],
                |row| Self::map_run_row(row),
            )?
            .collect::<Result<Vec<PlanningCycleRun>, _>>()?;

        let next_cursor = if items.len() > limit as usize {
            items.truncate(limit as usize);
            items.last().map(|run| format_ts(run.executed_at))
        } else {
            None
        };

        Ok(CycleRunPage { items, next_cursor })
    }

    /// 映射数据库行到 PlanningCycle 对象 (冲刺列表由调用方补齐)
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<PlanningCycle> {
        let status_str: String = row.get(2)?;
        Ok(PlanningCycle {
            cycle_id: row.get(0)?,
            cycle_name: row.get(1)?,
            status: CycleStatus::from_str(&status_str),
            sprint_ids: Vec::new(),
            created_at: parse_ts(3, &row.get::<_, String>(3)?)?,
            updated_at: parse_ts(4, &row.get::<_, String>(4)?)?,
        })
    }

    /// 映射数据库行到 PlanningCycleRun 对象
    fn map_run_row(row: &rusqlite::Row) -> rusqlite::Result<PlanningCycleRun> {
        let status_str: String = row.get(3)?;
        let items_json: String = row.get(4)?;
        let items: Vec<CycleRunItem> = serde_json::from_str(&items_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(PlanningCycleRun {
            run_id: row.get(0)?,
            cycle_id: row.get(1)?,
            executed_at: parse_ts(2, &row.get::<_, String>(2)?)?,
            status: CycleRunStatus::from_str(&status_str),
            items,
        })
    }
}
