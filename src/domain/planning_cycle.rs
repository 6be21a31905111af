// ==========================================
// 医生值班排班系统 - 规划批次领域模型
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART B 求解编排层
// 批次 = 按录入顺序依次求解的一组冲刺
// ==========================================

use crate::domain::sprint::SprintRun;
use crate::domain::types::{CycleRunStatus, CycleStatus, RunStatus};
use crate::solver::contract::{SolveRequest, SolveResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// PlanningCycle - 规划批次
// ==========================================
// 红线: sprint_ids 的存储顺序即执行顺序,同一冲刺至多出现一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningCycle {
    pub cycle_id: String,          // 批次ID
    pub cycle_name: String,        // 批次名称
    pub status: CycleStatus,       // 管理状态 (不受运行历史影响)
    pub sprint_ids: Vec<String>,   // 有序冲刺列表 (录入顺序 = 执行顺序)
    pub created_at: DateTime<Utc>, // 创建时间
    pub updated_at: DateTime<Utc>, // 更新时间
}

// ==========================================
// CycleRunItem - 批次运行的逐冲刺结果
// ==========================================
// 与 SprintRun 同构; 冲刺不存在时无法落 sprint_run,
// 此处仍保留一条失败项,保证批次结果完整
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRunItem {
    pub sprint_id: String,                    // 冲刺ID
    pub executed_at: DateTime<Utc>,           // 执行时间
    pub status: RunStatus,                    // 成功/失败
    pub input_snapshot: Option<SolveRequest>, // 求解请求快照
    pub output_snapshot: Option<SolveResponse>, // 求解器输出快照
    pub error_code: Option<String>,           // 错误码
    pub error_message: Option<String>,        // 错误信息
}

impl From<SprintRun> for CycleRunItem {
    fn from(run: SprintRun) -> Self {
        CycleRunItem {
            sprint_id: run.sprint_id,
            executed_at: run.executed_at,
            status: run.status,
            input_snapshot: run.input_snapshot,
            output_snapshot: run.output_snapshot,
            error_code: run.error_code,
            error_message: run.error_message,
        }
    }
}

// ==========================================
// PlanningCycleRun - 批次运行记录
// ==========================================
// 红线: 只追加; items 保持批次冲刺顺序,不是完成顺序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningCycleRun {
    pub run_id: String,             // 记录ID
    pub cycle_id: String,           // 关联批次
    pub executed_at: DateTime<Utc>, // 执行时间
    pub status: CycleRunStatus,     // 聚合状态
    pub items: Vec<CycleRunItem>,   // 逐冲刺结果
}

/// 由逐冲刺结果聚合批次状态
///
/// 规则: 全部成功 -> SUCCEEDED; 全部失败 -> FAILED; 混合 -> PARTIAL_FAILED。
/// 空列表视为 FAILED (批次至少包含一个冲刺,正常流程不会走到)。
pub fn aggregate_status(items: &[CycleRunItem]) -> CycleRunStatus {
    if items.is_empty() {
        return CycleRunStatus::Failed;
    }
    let succeeded = items
        .iter()
        .filter(|i| i.status == RunStatus::Succeeded)
        .count();
    if succeeded == items.len() {
        CycleRunStatus::Succeeded
    } else if succeeded == 0 {
        CycleRunStatus::Failed
    } else {
        CycleRunStatus::PartialFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: RunStatus) -> CycleRunItem {
        CycleRunItem {
            sprint_id: "S001".to_string(),
            executed_at: Utc::now(),
            status,
            input_snapshot: None,
            output_snapshot: None,
            error_code: None,
            error_message: None,
        }
    }

    #[test]
    fn test_aggregate_all_succeeded() {
        let items = vec![item(RunStatus::Succeeded), item(RunStatus::Succeeded)];
        assert_eq!(aggregate_status(&items), CycleRunStatus::Succeeded);
    }

    #[test]
    fn test_aggregate_all_failed() {
        let items = vec![item(RunStatus::Failed), item(RunStatus::Failed)];
        assert_eq!(aggregate_status(&items), CycleRunStatus::Failed);
    }

    #[test]
    fn test_aggregate_mixed() {
        let items = vec![item(RunStatus::Succeeded), item(RunStatus::Failed)];
        assert_eq!(aggregate_status(&items), CycleRunStatus::PartialFailed);
    }

    #[test]
    fn test_aggregate_single_failed_is_failed_not_partial() {
        let items = vec![item(RunStatus::Failed)];
        assert_eq!(aggregate_status(&items), CycleRunStatus::Failed);
    }

    #[test]
    fn test_aggregate_empty_is_failed() {
        assert_eq!(aggregate_status(&[]), CycleRunStatus::Failed);
    }
}
