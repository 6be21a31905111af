// ==========================================
// 医生值班排班系统 - 排班冲刺仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 状态列只接受 RunRecorder 发起的更新
// ==========================================

use crate::domain::sprint::{AvailabilityEntry, Sprint, SprintConfig};
use crate::domain::types::SprintStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_date, parse_ts};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SprintRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SprintRepository {
    /// 创建新的冲刺仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入冲刺 (含名册与可值班登记,单事务)
    pub fn insert(&self, sprint: &Sprint) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO sprint (
                sprint_id, sprint_name, period_id, status,
                required_doctors_per_shift, max_days_per_doctor_default,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                sprint.sprint_id,
                sprint.sprint_name,
                sprint.period_id,
                sprint.status.to_db_str(),
                sprint.config.required_doctors_per_shift,
                sprint.config.max_days_per_doctor_default,
                format_ts(sprint.created_at),
                format_ts(sprint.updated_at),
            ],
        )?;

        for (position, doctor_id) in sprint.roster.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO sprint_doctor (sprint_id, position, doctor_id)
                VALUES (?, ?, ?)
                "#,
                params![sprint.sprint_id, position as i64, doctor_id],
            )?;
        }

        for entry in &sprint.availability {
            tx.execute(
                r#"
                INSERT INTO sprint_availability (sprint_id, doctor_id, period_id, day)
                VALUES (?, ?, ?, ?)
                "#,
                params![
                    sprint.sprint_id,
                    entry.doctor_id,
                    entry.period_id,
                    entry.day.format("%Y-%m-%d").to_string(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(sprint.sprint_id.clone())
    }

    /// 按ID查询冲刺 (含名册与可值班登记)
    pub fn find_by_id(&self, sprint_id: &str) -> RepositoryResult<Option<Sprint>> {
        let conn = self.get_conn()?;

        let mut sprint = match conn.query_row(
            r#"SELECT sprint_id, sprint_name, period_id, status,
                      required_doctors_per_shift, max_days_per_doctor_default,
                      created_at, updated_at
               FROM sprint
               WHERE sprint_id = ?"#,
            params![sprint_id],
            |row| Self::map_row(row),
        ) {
            Ok(s) => s,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"SELECT doctor_id
               FROM sprint_doctor
               WHERE sprint_id = ?
               ORDER BY position"#,
        )?;
        sprint.roster = stmt
            .query_map(params![sprint_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut stmt = conn.prepare(
            r#"SELECT doctor_id, period_id, day
               FROM sprint_availability
               WHERE sprint_id = ?
               ORDER BY day, doctor_id"#,
        )?;
        sprint.availability = stmt
            .query_map(params![sprint_id], |row| {
                Ok(AvailabilityEntry {
                    doctor_id: row.get(0)?,
                    period_id: row.get(1)?,
                    day: parse_date(2, &row.get::<_, String>(2)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(sprint))
    }

    /// 更新冲刺状态
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: sprint_id 不存在
    pub fn update_status(&self, sprint_id: &str, status: SprintStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE sprint SET status = ?, updated_at = ? WHERE sprint_id = ?",
            params![
                status.to_db_str(),
                format_ts(chrono::Utc::now()),
                sprint_id
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Sprint".to_string(),
                id: sprint_id.to_string(),
            });
        }
        Ok(())
    }

    /// 映射数据库行到 Sprint 对象 (名册/登记由调用方补齐)
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Sprint> {
        let status_str: String = row.get(3)?;
        Ok(Sprint {
            sprint_id: row.get(0)?,
            sprint_name: row.get(1)?,
            period_id: row.get(2)?,
            status: SprintStatus::from_str(&status_str),
            config: SprintConfig {
                required_doctors_per_shift: row.get(4)?,
                max_days_per_doctor_default: row.get(5)?,
            },
            roster: Vec::new(),
            availability: Vec::new(),
            created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
            updated_at: parse_ts(7, &row.get::<_, String>(7)?)?,
        })
    }
}
