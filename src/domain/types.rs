// ==========================================
// 医生值班排班系统 - 领域类型定义
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART B 求解编排层
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 冲刺状态 (Sprint Status)
// ==========================================
// 状态机: DRAFT -> READY_TO_SOLVE -> SOLVED
// 红线: 状态只由 RunRecorder 和就绪检查驱动,禁止外部直接改写
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintStatus {
    Draft,        // 草稿
    ReadyToSolve, // 待求解
    Solved,       // 已求解
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SprintStatus::Draft => write!(f, "DRAFT"),
            SprintStatus::ReadyToSolve => write!(f, "READY_TO_SOLVE"),
            SprintStatus::Solved => write!(f, "SOLVED"),
        }
    }
}

impl SprintStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "DRAFT" => SprintStatus::Draft,
            "READY_TO_SOLVE" => SprintStatus::ReadyToSolve,
            "SOLVED" => SprintStatus::Solved,
            _ => SprintStatus::Draft, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SprintStatus::Draft => "DRAFT",
            SprintStatus::ReadyToSolve => "READY_TO_SOLVE",
            SprintStatus::Solved => "SOLVED",
        }
    }
}

// ==========================================
// 求解记录状态 (Run Status)
// ==========================================
// 记录一次求解尝试的最终结果,落库后不可变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Succeeded, // 成功
    Failed,    // 失败
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "SUCCEEDED"),
            RunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl RunStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUCCEEDED" => RunStatus::Succeeded,
            _ => RunStatus::Failed,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
        }
    }
}

// ==========================================
// 批次运行状态 (Cycle Run Status)
// ==========================================
// 由逐冲刺结果聚合得出,见 planning_cycle::aggregate_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleRunStatus {
    Succeeded,     // 全部冲刺成功
    Failed,        // 全部冲刺失败
    PartialFailed, // 成功与失败混合
}

impl fmt::Display for CycleRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleRunStatus::Succeeded => write!(f, "SUCCEEDED"),
            CycleRunStatus::Failed => write!(f, "FAILED"),
            CycleRunStatus::PartialFailed => write!(f, "PARTIAL_FAILED"),
        }
    }
}

impl CycleRunStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUCCEEDED" => CycleRunStatus::Succeeded,
            "PARTIAL_FAILED" => CycleRunStatus::PartialFailed,
            _ => CycleRunStatus::Failed,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CycleRunStatus::Succeeded => "SUCCEEDED",
            CycleRunStatus::Failed => "FAILED",
            CycleRunStatus::PartialFailed => "PARTIAL_FAILED",
        }
    }
}

// ==========================================
// 规划批次状态 (Cycle Status)
// ==========================================
// 批次本身的管理状态,与运行历史无关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    Active,   // 激活
    Archived, // 归档
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleStatus::Active => write!(f, "ACTIVE"),
            CycleStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl CycleStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ARCHIVED" => CycleStatus::Archived,
            _ => CycleStatus::Active,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CycleStatus::Active => "ACTIVE",
            CycleStatus::Archived => "ARCHIVED",
        }
    }
}
