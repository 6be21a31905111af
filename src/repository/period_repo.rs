// ==========================================
// 医生值班排班系统 - 排班周期仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::period::{Period, PeriodDayDemand};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_date, parse_ts};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct PeriodRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PeriodRepository {
    /// 创建新的周期仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入周期 (含按日需求覆盖,单事务)
    pub fn insert(&self, period: &Period) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO period (
                period_id, period_name, starts_on, ends_on, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                period.period_id,
                period.period_name,
                period.starts_on.format("%Y-%m-%d").to_string(),
                period.ends_on.format("%Y-%m-%d").to_string(),
                format_ts(period.created_at),
                format_ts(period.updated_at),
            ],
        )?;

        for demand in &period.day_demands {
            tx.execute(
                r#"
                INSERT INTO period_day_demand (period_id, day, required_doctors)
                VALUES (?, ?, ?)
                "#,
                params![
                    period.period_id,
                    demand.day.format("%Y-%m-%d").to_string(),
                    demand.required_doctors,
                ],
            )?;
        }

        tx.commit()?;
        Ok(period.period_id.clone())
    }

    /// 按ID查询周期 (含按日需求覆盖)
    pub fn find_by_id(&self, period_id: &str) -> RepositoryResult<Option<Period>> {
        let conn = self.get_conn()?;

        let mut period = match conn.query_row(
            r#"SELECT period_id, period_name, starts_on, ends_on, created_at, updated_at
               FROM period
               WHERE period_id = ?"#,
            params![period_id],
            |row| Self::map_row(row),
        ) {
            Ok(p) => p,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"SELECT day, required_doctors
               FROM period_day_demand
               WHERE period_id = ?
               ORDER BY day"#,
        )?;
        period.day_demands = stmt
            .query_map(params![period_id], |row| {
                Ok(PeriodDayDemand {
                    day: parse_date(0, &row.get::<_, String>(0)?)?,
                    required_doctors: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(period))
    }

    /// 映射数据库行到 Period 对象 (需求覆盖由调用方补齐)
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Period> {
        Ok(Period {
            period_id: row.get(0)?,
            period_name: row.get(1)?,
            starts_on: parse_date(2, &row.get::<_, String>(2)?)?,
            ends_on: parse_date(3, &row.get::<_, String>(3)?)?,
            day_demands: Vec::new(),
            created_at: parse_ts(4, &row.get::<_, String>(4)?)?,
            updated_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        })
    }
}
