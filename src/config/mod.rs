// ==========================================
// 医生值班排班系统 - 配置层
// ==========================================

pub mod config_manager;

pub use config_manager::{
    ConfigManager, SolverSettings, DEFAULT_SOLVER_BINARY, KEY_SOLVER_BINARY_PATH,
    KEY_SOLVER_TIMEOUT_MS,
};
