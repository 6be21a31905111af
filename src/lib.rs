// ==========================================
// 医生值班排班系统 - 求解编排层核心库
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - 系统宪法
// 技术栈: Rust + SQLite + 外部求解器子进程
// 系统定位: 值班排班的求解编排与运行审计
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 求解编排
pub mod engine;

// 求解器边界层 - 子进程协议
pub mod solver;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施 (连接初始化/PRAGMA/schema 统一)
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CycleRunStatus, CycleStatus, RunStatus, SprintStatus};

// 领域实体
pub use domain::{
    AvailabilityEntry, CycleRunItem, Doctor, Period, PeriodDayDemand, PlanningCycle,
    PlanningCycleRun, Sprint, SprintConfig, SprintRun,
};

// 引擎
pub use engine::{
    PlanningCycleOrchestrator, PreconditionError, RunRecorder, SolveRequestBuilder,
};

// 求解器边界
pub use solver::{
    map_engine_error, EngineError, MappedSolverError, SolveRequest, SolveResponse, SolverClient,
    SolverEngine,
};

// 仓储
pub use repository::{
    DoctorRepository, PeriodRepository, PlanningCycleRepository, SprintRepository,
    SprintRunRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "医生值班排班系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
