// ==========================================
// 医生值班排班系统 - 求解器协议客户端
// ==========================================
// 依据: Solver_Protocol_Spec_v1.md - 子进程协议
// ==========================================
// 协议: 无命令行参数; 请求经 stdin 一次写入后关闭;
//       成功 = 退出码 0 + stdout 单个 JSON 文档;
//       失败 = 非零退出码 + stderr 诊断文本
// 红线: 超时后强制终止,绝不返回部分输出
// ==========================================

use crate::solver::contract::{SolveRequest, SolveResponse};
use crate::solver::error::{EngineError, EngineResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// 默认求解超时 (毫秒)
pub const DEFAULT_SOLVER_TIMEOUT_MS: u64 = 5_000;

// ==========================================
// SolverEngine Trait
// ==========================================
// 用途: 编排层与子进程实现解耦,测试时可替换为桩实现
#[async_trait]
pub trait SolverEngine: Send + Sync {
    /// 执行一次求解
    ///
    /// # 返回
    /// - Ok(SolveResponse): 求解器零退出且输出可解码
    /// - Err(EngineError): 四类失败之一,见 error.rs
    async fn invoke(&self, request: &SolveRequest) -> EngineResult<SolveResponse>;
}

// ==========================================
// SolverClient - 子进程协议客户端
// ==========================================
pub struct SolverClient {
    binary_path: PathBuf,
    timeout: Duration,
}

impl SolverClient {
    /// 创建客户端 (默认超时)
    ///
    /// # 参数
    /// - binary_path: 求解器可执行文件路径
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self::with_timeout_ms(binary_path, DEFAULT_SOLVER_TIMEOUT_MS)
    }

    /// 创建客户端并指定超时 (毫秒)
    pub fn with_timeout_ms(binary_path: impl Into<PathBuf>, timeout_ms: u64) -> Self {
        Self {
            binary_path: binary_path.into(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// 配置的超时时长 (毫秒)
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

#[async_trait]
impl SolverEngine for SolverClient {
    async fn invoke(&self, request: &SolveRequest) -> EngineResult<SolveResponse> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| EngineError::SpawnFailed(format!("请求序列化失败: {}", e)))?;

        let started = Instant::now();
        debug!(
            binary = %self.binary_path.display(),
            timeout_ms = self.timeout_ms(),
            payload_bytes = payload.len(),
            "启动求解器子进程"
        );

        let mut child = Command::new(&self.binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::SpawnFailed(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::SpawnFailed("无法获取子进程 stdin".to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::SpawnFailed("无法获取子进程 stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::SpawnFailed("无法获取子进程 stderr".to_string()))?;

        // 写入、等待与读取放在同一个 future 内:
        // 超时分支 drop 该 future 后再补刀,两条路径结构上互斥,不会重复定论
        let io_and_wait = async {
            // 提前退出的子进程会让写入触发 EPIPE,此处不定性,由退出码分类兜底
            let _ = stdin.write_all(&payload).await;
            let _ = stdin.shutdown().await;
            drop(stdin);

            let mut out = Vec::new();
            let mut err = Vec::new();
            let (status, _, _) = tokio::try_join!(
                child.wait(),
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err),
            )?;
            Ok::<_, std::io::Error>((status, out, err))
        };

        let (status, out, err) = match tokio::time::timeout(self.timeout, io_and_wait).await {
            Err(_elapsed) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                warn!(
                    binary = %self.binary_path.display(),
                    timeout_ms = self.timeout_ms(),
                    "求解器超时,已强制终止"
                );
                return Err(EngineError::Timeout {
                    timeout_ms: self.timeout_ms(),
                });
            }
            Ok(Err(e)) => {
                return Err(EngineError::SpawnFailed(format!("子进程 I/O 失败: {}", e)));
            }
            Ok(Ok(result)) => result,
        };

        if !status.success() {
            // 被信号杀死时 code() 为 None,统一按 -1 上报
            let exit_code = status.code().unwrap_or(-1);
            return Err(EngineError::ExitNonZero {
                exit_code,
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            });
        }

        let response: SolveResponse = serde_json::from_slice(&out)
            .map_err(|e| EngineError::InvalidJson(e.to_string()))?;

        debug!(
            binary = %self.binary_path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            assigned_count = response.assigned_count,
            is_feasible = response.is_feasible,
            "求解器调用完成"
        );
        Ok(response)
    }
}
