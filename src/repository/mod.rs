// ==========================================
// 医生值班排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod doctor_repo;
pub mod error;
pub mod period_repo;
pub mod planning_cycle_repo;
pub mod sprint_repo;
pub mod sprint_run_repo;

// 重导出核心仓储
pub use doctor_repo::DoctorRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use period_repo::PeriodRepository;
pub use planning_cycle_repo::{CycleRunPage, PlanningCycleRepository};
pub use sprint_repo::SprintRepository;
pub use sprint_run_repo::SprintRunRepository;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

// ==========================================
// 时间列编解码
// ==========================================
// 统一定宽 RFC3339 (微秒, Z 后缀): 字典序 = 时间序,
// 运行记录分页的游标比较依赖该性质

/// 时间戳 -> 数据库文本列
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 数据库文本列 -> 时间戳
pub(crate) fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// 数据库文本列 -> 日期 (%Y-%m-%d)
pub(crate) fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
