// ==========================================
// 医生值班排班系统 - 求解器协议错误类型
// ==========================================
// 依据: Solver_Protocol_Spec_v1.md - 失败分类
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 求解器子进程边界的失败分类
///
/// 一次调用只会产生四类失败之一,与正常返回互斥
#[derive(Error, Debug)]
pub enum EngineError {
    /// 墙钟超时,子进程已被强制终止,不返回部分输出
    #[error("求解器执行超时 ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },

    /// 进程无法启动 (二进制缺失/权限不足) 或管道读取失败
    #[error("求解器进程启动失败: {0}")]
    SpawnFailed(String),

    /// 进程非零退出,携带捕获的标准错误文本
    #[error("求解器进程非零退出: exit_code={exit_code}")]
    ExitNonZero { exit_code: i32, stderr: String },

    /// 进程零退出但标准输出无法按协议解码
    #[error("求解器输出解码失败: {0}")]
    InvalidJson(String),
}

impl EngineError {
    /// 稳定的失败类别码 (对外错误码/日志字段用)
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Timeout { .. } => "TIMEOUT",
            EngineError::SpawnFailed(_) => "SPAWN_FAILED",
            EngineError::ExitNonZero { .. } => "EXIT_NON_ZERO",
            EngineError::InvalidJson(_) => "INVALID_JSON",
        }
    }

    /// 可用的底层诊断文本 (stderr / OS 错误 / 解码错误)
    pub fn details(&self) -> Option<&str> {
        match self {
            EngineError::Timeout { .. } => None,
            EngineError::SpawnFailed(msg) => Some(msg),
            EngineError::ExitNonZero { stderr, .. } => Some(stderr),
            EngineError::InvalidJson(msg) => Some(msg),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
