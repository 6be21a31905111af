// ==========================================
// 医生值班排班系统 - 求解器错误归类
// ==========================================
// 职责: 将协议层失败翻译为面向调用方的错误码/状态
// 说明: 子串启发式是结构化错误通道落地前的临时方案,
//       归类规则全部收敛在本文件,替换时不影响调用方
// ==========================================

use crate::solver::error::EngineError;
use serde::Serialize;

/// 非零退出时判定"输入数据问题"的子串集合 (不区分大小写)
///
/// 未命中任何子串的失败一律按基础设施故障处理:
/// 500 对调用方可重试,422 不可,宁可保守
const CLIENT_INPUT_HINTS: &[&str] = &["parse", "json", "out of range", "type error", "invalid"];

/// 输入数据被求解器拒绝时的错误码
pub const CODE_SOLVER_UNPROCESSABLE: &str = "SOLVER_UNPROCESSABLE";

// ==========================================
// MappedSolverError - 归类结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct MappedSolverError {
    pub http_status: u16,        // 422 输入问题 / 500 基础设施问题
    pub code: String,            // 稳定错误码
    pub message: String,         // 面向调用方的消息
    pub details: Option<String>, // 底层诊断文本 (stderr 等)
}

/// 归类一次求解器协议失败
pub fn map_engine_error(err: &EngineError) -> MappedSolverError {
    if let EngineError::ExitNonZero { stderr, .. } = err {
        let lowered = stderr.to_lowercase();
        if CLIENT_INPUT_HINTS.iter().any(|hint| lowered.contains(hint)) {
            return MappedSolverError {
                http_status: 422,
                code: CODE_SOLVER_UNPROCESSABLE.to_string(),
                message: "求解器拒绝了输入数据".to_string(),
                details: Some(stderr.clone()),
            };
        }
    }

    let message = match err {
        EngineError::Timeout { .. } => "求解器执行超时".to_string(),
        _ => "求解器执行失败".to_string(),
    };

    MappedSolverError {
        http_status: 500,
        code: err.kind().to_string(),
        message,
        details: err.details().map(|d| d.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_stderr_maps_to_unprocessable() {
        let err = EngineError::ExitNonZero {
            exit_code: 1,
            stderr: "JSON parse error at offset 4".to_string(),
        };
        let mapped = map_engine_error(&err);
        assert_eq!(mapped.http_status, 422);
        assert_eq!(mapped.code, CODE_SOLVER_UNPROCESSABLE);
        assert_eq!(mapped.details.as_deref(), Some("JSON parse error at offset 4"));
    }

    #[test]
    fn test_hints_are_case_insensitive() {
        let err = EngineError::ExitNonZero {
            exit_code: 1,
            stderr: "INVALID demand matrix".to_string(),
        };
        assert_eq!(map_engine_error(&err).http_status, 422);
    }

    #[test]
    fn test_unmatched_stderr_maps_to_infrastructure() {
        let err = EngineError::ExitNonZero {
            exit_code: 139,
            stderr: "segmentation fault".to_string(),
        };
        let mapped = map_engine_error(&err);
        assert_eq!(mapped.http_status, 500);
        assert_eq!(mapped.code, "EXIT_NON_ZERO");
        assert_eq!(mapped.details.as_deref(), Some("segmentation fault"));
    }

    #[test]
    fn test_timeout_message_is_distinct() {
        let mapped = map_engine_error(&EngineError::Timeout { timeout_ms: 5000 });
        assert_eq!(mapped.http_status, 500);
        assert_eq!(mapped.code, "TIMEOUT");
        assert_eq!(mapped.message, "求解器执行超时");
        assert!(mapped.details.is_none());
    }

    #[test]
    fn test_spawn_and_decode_failures_are_infrastructure() {
        let spawn = map_engine_error(&EngineError::SpawnFailed("No such file".to_string()));
        assert_eq!(spawn.http_status, 500);
        assert_eq!(spawn.code, "SPAWN_FAILED");
        assert_eq!(spawn.message, "求解器执行失败");

        let decode = map_engine_error(&EngineError::InvalidJson("EOF".to_string()));
        assert_eq!(decode.http_status, 500);
        assert_eq!(decode.code, "INVALID_JSON");
    }
}
