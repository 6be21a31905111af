// ==========================================
// 求解器协议客户端测试
// ==========================================
// 测试范围:
// 1. 请求经 stdin 写入,响应从 stdout 解码
// 2. 四类失败分类: TIMEOUT / SPAWN_FAILED / EXIT_NON_ZERO / INVALID_JSON
// 3. 超时后子进程被强制终止,不返回部分输出
// ==========================================


use oncall_aps::solver::contract::{
    SolveAvailability, SolveDayDemand, SolveRequest, SolveRequestDoctor, SolveRequestPeriod,
    SOLVER_CONTRACT_VERSION,
};
use oncall_aps::solver::{EngineError, SolverClient, SolverEngine};
use std::time::Instant;
use tempfile::TempDir;
use test_helpers::{
    feasible_single_day_response_json, solver_script_echo_json, solver_script_fail,
    solver_script_sleep, write_mock_solver,
};

/// 构造最小求解请求
fn minimal_request() -> SolveRequest {
    SolveRequest {
        contract_version: SOLVER_CONTRACT_VERSION.to_string(),
        doctors: vec![SolveRequestDoctor {
            id: "D001".to_string(),
            max_total_days: 5,
        }],
        periods: vec![SolveRequestPeriod {
            id: "PER001".to_string(),
            ordered_day_ids: vec!["2026-08-01".to_string()],
        }],
        demands: vec![SolveDayDemand {
            day_id: "2026-08-01".to_string(),
            required_doctors: 1,
        }],
        availability: vec![SolveAvailability {
            doctor_id: "D001".to_string(),
            period_id: "PER001".to_string(),
            day_id: "2026-08-01".to_string(),
        }],
    }
}

#[tokio::test]
async fn test_success_decodes_response() {
    let dir = TempDir::new().expect("创建临时目录失败");
    let binary = write_mock_solver(
        dir.path(),
        "mock_solver.sh",
        &solver_script_echo_json(feasible_single_day_response_json()),
    );

    let client = SolverClient::new(&binary);
    let response = client.invoke(&minimal_request()).await.expect("求解应成功");

    assert!(response.is_feasible);
    assert_eq!(response.assigned_count, 1);
    assert_eq!(response.assignments.len(), 1);
    assert_eq!(response.assignments[0].doctor_id, "D001");
    assert!(response.uncovered_days.is_empty());
}

#[tokio::test]
async fn test_request_is_written_to_stdin() {
    let dir = TempDir::new().expect("创建临时目录失败");
    let capture_path = dir.path().join("captured_input.json");

    // 先把 stdin 落盘,再输出固定响应
    let script = format!(
        "#!/bin/sh\ncat > '{}'\nprintf '%s' '{}'\n",
        capture_path.display(),
        feasible_single_day_response_json()
    );
    let binary = write_mock_solver(dir.path(), "capture_solver.sh", &script);

    let request = minimal_request();
    let client = SolverClient::new(&binary);
    client.invoke(&request).await.expect("求解应成功");

    let captured = std::fs::read_to_string(&capture_path).expect("读取捕获的输入失败");
    let parsed: SolveRequest = serde_json::from_str(&captured).expect("捕获的输入应是合法请求");
    assert_eq!(parsed, request);
}

#[tokio::test]
async fn test_timeout_kills_process() {
    let dir = TempDir::new().expect("创建临时目录失败");
    let binary = write_mock_solver(dir.path(), "sleepy_solver.sh", &solver_script_sleep(5));

    let client = SolverClient::with_timeout_ms(&binary, 200);
    let started = Instant::now();
    let result = client.invoke(&minimal_request()).await;

    match result {
        Err(EngineError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 200),
        other => panic!("应为 Timeout,实际: {:?}", other.map(|_| ())),
    }
    // 不等子进程睡满: 超时即强制终止
    assert!(
        started.elapsed().as_secs() < 3,
        "超时后应立即返回,实际耗时 {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_exit_non_zero_carries_stderr() {
    let dir = TempDir::new().expect("创建临时目录失败");
    let binary = write_mock_solver(
        dir.path(),
        "failing_solver.sh",
        &solver_script_fail("demand matrix is singular", 3),
    );

    let client = SolverClient::new(&binary);
    match client.invoke(&minimal_request()).await {
        Err(EngineError::ExitNonZero { exit_code, stderr }) => {
            assert_eq!(exit_code, 3);
            assert_eq!(stderr, "demand matrix is singular");
        }
        other => panic!("应为 ExitNonZero,实际: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_zero_exit_with_garbage_is_invalid_json() {
    let dir = TempDir::new().expect("创建临时目录失败");
    let binary = write_mock_solver(
        dir.path(),
        "garbage_solver.sh",
        "#!/bin/sh\ncat > /dev/null\necho 'not a json document'\n",
    );

    let client = SolverClient::new(&binary);
    match client.invoke(&minimal_request()).await {
        Err(EngineError::InvalidJson(_)) => {}
        other => panic!("应为 InvalidJson,实际: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_missing_binary_is_spawn_failed() {
    let dir = TempDir::new().expect("创建临时目录失败");
    let binary = dir.path().join("no_such_solver");

    let client = SolverClient::new(&binary);
    match client.invoke(&minimal_request()).await {
        Err(EngineError::SpawnFailed(msg)) => assert!(!msg.is_empty()),
        other => panic!("应为 SpawnFailed,实际: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_early_exit_without_reading_stdin_classified_by_exit_code() {
    let dir = TempDir::new().expect("创建临时目录失败");
    // 不读 stdin 直接失败: 写入端的 EPIPE 不应掩盖退出码分类
    let binary = write_mock_solver(
        dir.path(),
        "eager_exit_solver.sh",
        "#!/bin/sh\necho 'refusing to read input' >&2\nexit 7\n",
    );

    let client = SolverClient::new(&binary);
    match client.invoke(&minimal_request()).await {
        Err(EngineError::ExitNonZero { exit_code, stderr }) => {
            assert_eq!(exit_code, 7);
            assert_eq!(stderr, "refusing to read input");
        }
        other => panic!("应为 ExitNonZero,实际: {:?}", other.map(|_| ())),
    }
}
