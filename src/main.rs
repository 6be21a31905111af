// ==========================================
// 医生值班排班系统 - 命令行主入口
// ==========================================
// 用法:
//   oncall-aps <db_path> [cycle_id]
//
// cycle_id 缺省时取最近创建的 ACTIVE 批次
// ==========================================

use anyhow::{anyhow, Context};
use oncall_aps::config::ConfigManager;
use oncall_aps::db::{open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use oncall_aps::engine::{PlanningCycleOrchestrator, RunRecorder, SolveRequestBuilder};
use oncall_aps::repository::{
    DoctorRepository, PeriodRepository, PlanningCycleRepository, SprintRepository,
    SprintRunRepository,
};
use oncall_aps::solver::SolverClient;
use rusqlite::OptionalExtension;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    oncall_aps::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 求解编排层", oncall_aps::APP_NAME);
    tracing::info!("系统版本: {}", oncall_aps::VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| "oncall_aps.db".to_string());
    tracing::info!("使用数据库: {}", db_path);

    let conn = Arc::new(Mutex::new(
        open_sqlite_connection(&db_path).context("打开数据库失败")?,
    ));

    // schema 版本提示 (不做自动迁移)
    {
        let guard = conn
            .lock()
            .map_err(|e| anyhow!("锁获取失败: {}", e))?;
        match read_schema_version(&guard)? {
            Some(v) if v == CURRENT_SCHEMA_VERSION => {}
            Some(v) => tracing::warn!(
                "schema_version={} 与期望值 {} 不一致,请确认迁移状态",
                v,
                CURRENT_SCHEMA_VERSION
            ),
            None => tracing::warn!("未找到 schema_version 表,数据库可能未初始化"),
        }
    }

    let cycle_id = match args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        Some(id) => id,
        None => {
            let active_cycle_id: Option<String> = {
                let guard = conn
                    .lock()
                    .map_err(|e| anyhow!("锁获取失败: {}", e))?;
                guard
                    .query_row(
                        "SELECT cycle_id FROM planning_cycle WHERE status = 'ACTIVE' ORDER BY created_at DESC LIMIT 1",
                        [],
                        |row| row.get(0),
                    )
                    .optional()?
            };
            active_cycle_id.ok_or_else(|| anyhow!("没有 ACTIVE 规划批次 (请显式传入 cycle_id)"))?
        }
    };

    let settings = ConfigManager::from_connection(conn.clone())
        .map_err(|e| anyhow!("配置管理器初始化失败: {}", e))?
        .solver_settings()
        .map_err(|e| anyhow!("加载求解器配置失败: {}", e))?;
    tracing::info!(
        "求解器: {} (超时 {}ms)",
        settings.binary_path,
        settings.timeout_ms
    );

    let sprint_repo = Arc::new(SprintRepository::new(conn.clone()));
    let period_repo = Arc::new(PeriodRepository::new(conn.clone()));
    let doctor_repo = Arc::new(DoctorRepository::new(conn.clone()));
    let run_repo = Arc::new(SprintRunRepository::new(conn.clone()));
    let cycle_repo = Arc::new(PlanningCycleRepository::new(conn.clone()));

    let builder = SolveRequestBuilder::new(sprint_repo.clone(), period_repo, doctor_repo);
    let recorder = RunRecorder::new(sprint_repo.clone(), run_repo);
    let engine = Arc::new(SolverClient::with_timeout_ms(
        &settings.binary_path,
        settings.timeout_ms,
    ));

    let orchestrator =
        PlanningCycleOrchestrator::new(cycle_repo, sprint_repo, builder, recorder, engine);

    let run = orchestrator
        .run_cycle(&cycle_id)
        .await
        .map_err(|e| anyhow!("批次运行失败 [{}]: {}", e.code(), e))?;

    println!("run_id={} cycle_id={} status={}", run.run_id, run.cycle_id, run.status);
    for item in &run.items {
        match (&item.error_code, &item.error_message) {
            (Some(code), Some(message)) => {
                println!("  {} {} [{}] {}", item.sprint_id, item.status, code, message)
            }
            _ => println!("  {} {}", item.sprint_id, item.status),
        }
    }

    Ok(())
}
