// ==========================================
// 医生值班排班系统 - 求解记录登记器 / 冲刺状态机
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART B3 运行历史
// 红线: 记录只追加; run_id 永远新生成;
//       只有成功登记才推进冲刺到 SOLVED
// ==========================================
// 状态机: DRAFT --(mark_ready, 过前置条件链)--> READY_TO_SOLVE
//         READY_TO_SOLVE --(register_succeeded)--> SOLVED
//         失败登记不改状态,冲刺保持 READY_TO_SOLVE 可重试
// ==========================================

use crate::domain::sprint::{Sprint, SprintRun};
use crate::domain::types::{RunStatus, SprintStatus};
use crate::engine::request_builder::{BuildError, PreconditionError, SolveRequestBuilder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{SprintRepository, SprintRunRepository};
use crate::solver::contract::{SolveRequest, SolveResponse};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

// ==========================================
// RecorderError - 状态机操作失败
// ==========================================
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<BuildError> for RecorderError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Precondition(p) => RecorderError::Precondition(p),
            BuildError::Repository(e) => RecorderError::Repository(e),
        }
    }
}

// ==========================================
// RunRecorder - 求解记录登记器
// ==========================================
pub struct RunRecorder {
    sprint_repo: Arc<SprintRepository>,
    run_repo: Arc<SprintRunRepository>,
}

impl RunRecorder {
    /// 创建新的登记器实例
    pub fn new(sprint_repo: Arc<SprintRepository>, run_repo: Arc<SprintRunRepository>) -> Self {
        Self {
            sprint_repo,
            run_repo,
        }
    }

    /// 登记一次成功求解,并推进冲刺到 SOLVED
    pub fn register_succeeded(
        &self,
        sprint_id: &str,
        input: &SolveRequest,
        output: &SolveResponse,
    ) -> RepositoryResult<SprintRun> {
        self.require_sprint(sprint_id)?;

        let run = SprintRun {
            run_id: Uuid::new_v4().to_string(),
            sprint_id: sprint_id.to_string(),
            executed_at: Utc::now(),
            status: RunStatus::Succeeded,
            input_snapshot: Some(input.clone()),
            output_snapshot: Some(output.clone()),
            error_code: None,
            error_message: None,
        };
        self.run_repo.append(&run)?;
        self.sprint_repo
            .update_status(sprint_id, SprintStatus::Solved)?;

        info!(
            sprint_id = %sprint_id,
            run_id = %run.run_id,
            assigned_count = output.assigned_count,
            "求解成功,冲刺已推进到 SOLVED"
        );
        Ok(run)
    }

    /// 登记一次失败求解 (不改变冲刺状态)
    ///
    /// # 参数
    /// - input: 实际使用的求解请求; 构建阶段即失败时为 None
    pub fn register_failed(
        &self,
        sprint_id: &str,
        input: Option<&SolveRequest>,
        code: &str,
        message: &str,
    ) -> RepositoryResult<SprintRun> {
        self.require_sprint(sprint_id)?;

        let run = SprintRun {
            run_id: Uuid::new_v4().to_string(),
            sprint_id: sprint_id.to_string(),
            executed_at: Utc::now(),
            status: RunStatus::Failed,
            input_snapshot: input.cloned(),
            output_snapshot: None,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
        };
        self.run_repo.append(&run)?;

        info!(
            sprint_id = %sprint_id,
            run_id = %run.run_id,
            error_code = %code,
            "求解失败已登记,冲刺状态不变"
        );
        Ok(run)
    }

    /// 就绪转换: DRAFT -> READY_TO_SOLVE
    ///
    /// 复用构建器的前置条件链做守卫 (含可值班登记检查);
    /// 已处于 READY_TO_SOLVE 时重新校验后原地保持;
    /// SOLVED 冲刺需先 reset_to_draft
    pub fn mark_ready(
        &self,
        sprint_id: &str,
        builder: &SolveRequestBuilder,
    ) -> Result<Sprint, RecorderError> {
        let sprint = self
            .sprint_repo
            .find_by_id(sprint_id)?
            .ok_or_else(|| PreconditionError::SprintNotFound(sprint_id.to_string()))?;

        if sprint.is_solved() {
            return Err(RecorderError::InvalidTransition {
                from: SprintStatus::Solved.to_string(),
                to: SprintStatus::ReadyToSolve.to_string(),
            });
        }

        builder.build_for_sprint(&sprint)?;

        if !sprint.is_ready_to_solve() {
            self.sprint_repo
                .update_status(sprint_id, SprintStatus::ReadyToSolve)?;
            info!(sprint_id = %sprint_id, "冲刺已推进到 READY_TO_SOLVE");
        }

        let updated = self
            .sprint_repo
            .find_by_id(sprint_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Sprint".to_string(),
                id: sprint_id.to_string(),
            })?;
        Ok(updated)
    }

    /// 显式重置: 任意状态 -> DRAFT
    pub fn reset_to_draft(&self, sprint_id: &str) -> Result<Sprint, RecorderError> {
        let sprint = self
            .sprint_repo
            .find_by_id(sprint_id)?
            .ok_or_else(|| PreconditionError::SprintNotFound(sprint_id.to_string()))?;

        if !sprint.is_draft() {
            self.sprint_repo
                .update_status(sprint_id, SprintStatus::Draft)?;
            info!(sprint_id = %sprint_id, from = %sprint.status, "冲刺已重置到 DRAFT");
        }

        let updated = self
            .sprint_repo
            .find_by_id(sprint_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Sprint".to_string(),
                id: sprint_id.to_string(),
            })?;
        Ok(updated)
    }

    fn require_sprint(&self, sprint_id: &str) -> RepositoryResult<()> {
        match self.sprint_repo.find_by_id(sprint_id)? {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound {
                entity: "Sprint".to_string(),
                id: sprint_id.to_string(),
            }),
        }
    }
}
