// ==========================================
// 医生值班排班系统 - 排班冲刺领域模型
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART B 求解编排层
// 红线: sprint_run 只追加,落库后不可修改
// ==========================================

use crate::domain::types::{RunStatus, SprintStatus};
use crate::solver::contract::{SolveRequest, SolveResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// SprintConfig - 冲刺全局配置
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SprintConfig {
    pub required_doctors_per_shift: i32,  // 每班默认需求医生数
    pub max_days_per_doctor_default: i32, // 医生默认值班天数上限
}

// ==========================================
// AvailabilityEntry - 可值班登记
// ==========================================
// 医生自报或排班员代录的"某周期某日可值班"意愿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub doctor_id: String, // 医生ID
    pub period_id: String, // 周期ID
    pub day: NaiveDate,    // 日期
}

// ==========================================
// Sprint - 排班冲刺
// ==========================================
// 一次求解请求的业务载体: 一个周期 + 一份名册 + 全局需求配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub sprint_id: String,                  // 冲刺ID
    pub sprint_name: String,                // 冲刺名称
    pub period_id: String,                  // 关联周期
    pub status: SprintStatus,               // 状态 (类型安全的枚举)
    pub config: SprintConfig,               // 全局配置
    pub roster: Vec<String>,                // 医生名册 (doctor_id, 保持录入顺序)
    pub availability: Vec<AvailabilityEntry>, // 可值班登记
    pub created_at: DateTime<Utc>,          // 创建时间
    pub updated_at: DateTime<Utc>,          // 更新时间
}

impl Sprint {
    /// 判断是否为草稿状态
    pub fn is_draft(&self) -> bool {
        self.status == SprintStatus::Draft
    }

    /// 判断是否为待求解状态
    pub fn is_ready_to_solve(&self) -> bool {
        self.status == SprintStatus::ReadyToSolve
    }

    /// 判断是否已求解
    pub fn is_solved(&self) -> bool {
        self.status == SprintStatus::Solved
    }
}

// ==========================================
// SprintRun - 求解记录
// ==========================================
// 红线: 只追加,不回写; run_id 永远新生成
// 快照字段保证失败尝试同样可审计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintRun {
    pub run_id: String,                       // 记录ID
    pub sprint_id: String,                    // 关联冲刺
    pub executed_at: DateTime<Utc>,           // 执行时间
    pub status: RunStatus,                    // 成功/失败
    pub input_snapshot: Option<SolveRequest>, // 实际使用的求解请求 (未构建成功时为 None)
    pub output_snapshot: Option<SolveResponse>, // 求解器输出 (仅成功时存在)
    pub error_code: Option<String>,           // 错误码 (仅失败时存在)
    pub error_message: Option<String>,        // 错误信息 (仅失败时存在)
}

impl SprintRun {
    /// 判断是否成功
    pub fn is_succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}
