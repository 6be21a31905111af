// ==========================================
// 医生值班排班系统 - 求解器边界层
// ==========================================
// 职责: 子进程协议客户端 + 契约校验 + 失败归类
// 红线: 求解算法本体不在本仓库,只约定输入/输出契约
// ==========================================

pub mod client;
pub mod contract;
pub mod error;
pub mod mapper;

// 重导出核心类型
pub use client::{SolverClient, SolverEngine, DEFAULT_SOLVER_TIMEOUT_MS};
pub use contract::{
    SolveAssignment, SolveAvailability, SolveDayDemand, SolveRequest, SolveRequestDoctor,
    SolveRequestPeriod, SolveResponse, SOLVER_CONTRACT_VERSION,
};
pub use error::{EngineError, EngineResult};
pub use mapper::{map_engine_error, MappedSolverError, CODE_SOLVER_UNPROCESSABLE};
