// ==========================================
// 医生值班排班系统 - 引擎层 (求解编排)
// ==========================================
// 职责: 请求构建 + 运行登记 + 批次编排
// 红线: 求解算法本体在外部子进程,本层只负责信封
// ==========================================

pub mod orchestrator;
pub mod request_builder;
pub mod run_recorder;

// 重导出核心引擎
pub use orchestrator::{
    CycleRunError, PlanningCycleOrchestrator, CODE_CONTRACT_MISMATCH, CODE_INTERNAL_ERROR,
    CODE_SPRINT_NOT_READY,
};
pub use request_builder::{BuildError, PreconditionError, SolveRequestBuilder};
pub use run_recorder::{RecorderError, RunRecorder};
