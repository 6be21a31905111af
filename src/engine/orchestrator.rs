// ==========================================
// 医生值班排班系统 - 规划批次编排器
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART B4 批次编排
// ==========================================
// 约束: 单流程顺序执行,同一时刻至多一个求解器子进程;
//       冲刺顺序 = 批次存储顺序,单个冲刺失败不中断循环;
//       聚合状态在全部结果收齐后一次性计算
// ==========================================

use crate::domain::planning_cycle::{aggregate_status, CycleRunItem, PlanningCycleRun};
use crate::domain::sprint::Sprint;
use crate::domain::types::RunStatus;
use crate::engine::request_builder::{BuildError, SolveRequestBuilder};
use crate::engine::run_recorder::RunRecorder;
use crate::repository::error::RepositoryError;
use crate::repository::{PlanningCycleRepository, SprintRepository};
use crate::solver::client::SolverEngine;
use crate::solver::contract::SolveRequest;
use crate::solver::mapper::map_engine_error;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 冲刺状态不是 READY_TO_SOLVE
pub const CODE_SPRINT_NOT_READY: &str = "SPRINT_NOT_READY";
/// 求解器零退出但输出未过契约校验
pub const CODE_CONTRACT_MISMATCH: &str = "INTERNAL_CONTRACT_MISMATCH";
/// 存储层故障等无法归类的内部错误
pub const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";

// ==========================================
// CycleRunError - 批次运行失败
// ==========================================
// 只覆盖整体无法启动的情形; 单冲刺失败进入结果项
#[derive(Error, Debug)]
pub enum CycleRunError {
    #[error("规划批次不存在: cycle_id={0}")]
    CycleNotFound(String),

    #[error("规划批次不包含任何冲刺: cycle_id={0}")]
    NoSprints(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CycleRunError {
    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            CycleRunError::CycleNotFound(_) => "CYCLE_NOT_FOUND",
            CycleRunError::NoSprints(_) => "NO_SPRINTS",
            CycleRunError::Repository(_) => CODE_INTERNAL_ERROR,
        }
    }
}

// ==========================================
// PlanningCycleOrchestrator - 批次编排器
// ==========================================
pub struct PlanningCycleOrchestrator<E>
where
    E: SolverEngine,
{
    cycle_repo: Arc<PlanningCycleRepository>,
    sprint_repo: Arc<SprintRepository>,
    builder: SolveRequestBuilder,
    recorder: RunRecorder,
    engine: Arc<E>,
}

impl<E> PlanningCycleOrchestrator<E>
where
    E: SolverEngine,
{
    /// 创建新的编排器实例
    pub fn new(
        cycle_repo: Arc<PlanningCycleRepository>,
        sprint_repo: Arc<SprintRepository>,
        builder: SolveRequestBuilder,
        recorder: RunRecorder,
        engine: Arc<E>,
    ) -> Self {
        Self {
            cycle_repo,
            sprint_repo,
            builder,
            recorder,
            engine,
        }
    }

    /// 运行一个规划批次: 按存储顺序逐冲刺求解,聚合为一条运行记录
    pub async fn run_cycle(&self, cycle_id: &str) -> Result<PlanningCycleRun, CycleRunError> {
        let cycle = self
            .cycle_repo
            .find_by_id(cycle_id)?
            .ok_or_else(|| CycleRunError::CycleNotFound(cycle_id.to_string()))?;
        if cycle.sprint_ids.is_empty() {
            return Err(CycleRunError::NoSprints(cycle_id.to_string()));
        }

        info!(
            cycle_id = %cycle_id,
            sprint_count = cycle.sprint_ids.len(),
            "开始运行规划批次"
        );

        let mut items = Vec::with_capacity(cycle.sprint_ids.len());
        for sprint_id in &cycle.sprint_ids {
            items.push(self.solve_sprint(sprint_id).await);
        }

        let status = aggregate_status(&items);
        let run = PlanningCycleRun {
            run_id: Uuid::new_v4().to_string(),
            cycle_id: cycle_id.to_string(),
            executed_at: Utc::now(),
            status,
            items,
        };
        self.cycle_repo.append_run(&run)?;

        info!(
            cycle_id = %cycle_id,
            run_id = %run.run_id,
            status = %run.status,
            "规划批次运行完成"
        );
        Ok(run)
    }

    /// 求解单个冲刺,返回结果项 (永不向上传播单冲刺失败)
    pub async fn solve_sprint(&self, sprint_id: &str) -> CycleRunItem {
        match self.try_solve_sprint(sprint_id).await {
            Ok(item) => item,
            Err(e) => {
                // 存储层故障: 结果项仍要产出,运行记录尽力补登
                error!(sprint_id = %sprint_id, error = %e, "冲刺求解遭遇内部错误");
                let message = e.to_string();
                if let Err(append_err) =
                    self.recorder
                        .register_failed(sprint_id, None, CODE_INTERNAL_ERROR, &message)
                {
                    warn!(
                        sprint_id = %sprint_id,
                        error = %append_err,
                        "内部错误的运行记录补登失败"
                    );
                }
                Self::failed_item(sprint_id, None, CODE_INTERNAL_ERROR, &message)
            }
        }
    }

    async fn try_solve_sprint(&self, sprint_id: &str) -> Result<CycleRunItem, RepositoryError> {
        // 1. 冲刺存在性 (缺失时无处落运行记录,只产出结果项)
        let sprint = match self.sprint_repo.find_by_id(sprint_id)? {
            Some(s) => s,
            None => {
                warn!(sprint_id = %sprint_id, "批次引用的冲刺不存在");
                return Ok(Self::failed_item(
                    sprint_id,
                    None,
                    "SPRINT_NOT_FOUND",
                    &format!("排班冲刺不存在: sprint_id={}", sprint_id),
                ));
            }
        };

        // 2. 状态检查
        if !sprint.is_ready_to_solve() {
            let message = format!("冲刺状态为 {},需要 READY_TO_SOLVE", sprint.status);
            return self.record_failure(&sprint, None, CODE_SPRINT_NOT_READY, &message);
        }

        // 3. 构建求解请求
        let request = match self.builder.build_for_sprint(&sprint) {
            Ok(request) => request,
            Err(BuildError::Precondition(p)) => {
                return self.record_failure(&sprint, None, p.code(), &p.to_string());
            }
            Err(BuildError::Repository(e)) => return Err(e),
        };

        // 4. 调用求解器
        match self.engine.invoke(&request).await {
            Ok(response) => {
                // 5. 输出契约校验: 名义成功但不可信的输出按失败登记
                if let Err(reason) = response.validate(&request) {
                    warn!(sprint_id = %sprint_id, reason = %reason, "求解器输出未过契约校验");
                    return self.record_failure(
                        &sprint,
                        Some(&request),
                        CODE_CONTRACT_MISMATCH,
                        &reason,
                    );
                }
                let run = self
                    .recorder
                    .register_succeeded(&sprint.sprint_id, &request, &response)?;
                Ok(CycleRunItem::from(run))
            }
            Err(engine_err) => {
                let mapped = map_engine_error(&engine_err);
                let message = match &mapped.details {
                    Some(details) if !details.is_empty() => {
                        format!("{}: {}", mapped.message, details)
                    }
                    _ => mapped.message.clone(),
                };
                self.record_failure(&sprint, Some(&request), &mapped.code, &message)
            }
        }
    }

    /// 登记失败运行并转换为结果项
    fn record_failure(
        &self,
        sprint: &Sprint,
        input: Option<&SolveRequest>,
        code: &str,
        message: &str,
    ) -> Result<CycleRunItem, RepositoryError> {
        let run = self
            .recorder
            .register_failed(&sprint.sprint_id, input, code, message)?;
        Ok(CycleRunItem::from(run))
    }

    fn failed_item(
        sprint_id: &str,
        input: Option<SolveRequest>,
        code: &str,
        message: &str,
    ) -> CycleRunItem {
        CycleRunItem {
            sprint_id: sprint_id.to_string(),
            executed_at: Utc::now(),
            status: RunStatus::Failed,
            input_snapshot: input,
            output_snapshot: None,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
        }
    }
}
