// ==========================================
// 医生值班排班系统 - 医生仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::doctor::Doctor;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct DoctorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DoctorRepository {
    /// 创建新的医生仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入医生主数据
    pub fn insert(&self, doctor: &Doctor) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO doctor (
                doctor_id, doctor_name, active, max_total_days, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                doctor.doctor_id,
                doctor.doctor_name,
                doctor.active as i32,
                doctor.max_total_days,
                format_ts(doctor.created_at),
                format_ts(doctor.updated_at),
            ],
        )?;

        Ok(doctor.doctor_id.clone())
    }

    /// 按ID查询医生
    pub fn find_by_id(&self, doctor_id: &str) -> RepositoryResult<Option<Doctor>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT doctor_id, doctor_name, active, max_total_days, created_at, updated_at
               FROM doctor
               WHERE doctor_id = ?"#,
            params![doctor_id],
            |row| Self::map_row(row),
        ) {
            Ok(doctor) => Ok(Some(doctor)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部医生 (按ID升序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Doctor>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT doctor_id, doctor_name, active, max_total_days, created_at, updated_at
               FROM doctor
               ORDER BY doctor_id"#,
        )?;

        let doctors = stmt
            .query_map([], |row| Self::map_row(row))?
            .collect::<Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }

    /// 设置在职/停用标志
    pub fn set_active(&self, doctor_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE doctor SET active = ?, updated_at = ? WHERE doctor_id = ?",
            params![
                active as i32,
                format_ts(chrono::Utc::now()),
                doctor_id
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Doctor".to_string(),
                id: doctor_id.to_string(),
            });
        }
        Ok(())
    }

    /// 映射数据库行到 Doctor 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Doctor> {
        Ok(Doctor {
            doctor_id: row.get(0)?,
            doctor_name: row.get(1)?,
            active: row.get::<_, i32>(2)? != 0,
            max_total_days: row.get(3)?,
            created_at: parse_ts(4, &row.get::<_, String>(4)?)?,
            updated_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        })
    }
}
