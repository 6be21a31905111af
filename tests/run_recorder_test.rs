// ==========================================
// 求解记录登记器 / 冲刺状态机测试
// ==========================================
// 测试范围:
// 1. 成功登记推进冲刺到 SOLVED; 失败登记不改状态
// 2. 记录只追加,按 executed_at 升序读回
// 3. mark_ready 守卫转换与显式重置
// ==========================================


use oncall_aps::domain::types::{RunStatus, SprintStatus};
use oncall_aps::engine::{PreconditionError, RecorderError, RunRecorder, SolveRequestBuilder};
use oncall_aps::repository::{
    DoctorRepository, PeriodRepository, RepositoryError, SprintRepository, SprintRunRepository,
};
use oncall_aps::solver::contract::{SolveResponse, SOLVER_CONTRACT_VERSION};
use std::sync::Arc;
use test_helpers::*;

struct Fixture {
    _tmp: tempfile::NamedTempFile,
    sprint_repo: Arc<SprintRepository>,
    run_repo: Arc<SprintRunRepository>,
    builder: SolveRequestBuilder,
    recorder: RunRecorder,
}

fn setup() -> Fixture {
    let (_tmp, conn) = setup_test_db();
    seed_single_day_ready_sprint(&conn);

    let sprint_repo = Arc::new(SprintRepository::new(conn.clone()));
    let period_repo = Arc::new(PeriodRepository::new(conn.clone()));
    let doctor_repo = Arc::new(DoctorRepository::new(conn.clone()));
    let run_repo = Arc::new(SprintRunRepository::new(conn.clone()));

    let builder = SolveRequestBuilder::new(sprint_repo.clone(), period_repo, doctor_repo);
    let recorder = RunRecorder::new(sprint_repo.clone(), run_repo.clone());

    Fixture {
        _tmp,
        sprint_repo,
        run_repo,
        builder,
        recorder,
    }
}

fn feasible_response() -> SolveResponse {
    serde_json::from_str(feasible_single_day_response_json()).expect("解析标准响应失败")
}

#[test]
fn test_register_succeeded_advances_to_solved() {
    let f = setup();
    let request = f.builder.build("SPR001").expect("构建应成功");
    let response = feasible_response();

    let run = f
        .recorder
        .register_succeeded("SPR001", &request, &response)
        .expect("登记成功记录失败");

    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(run.input_snapshot.as_ref(), Some(&request));
    assert_eq!(run.output_snapshot.as_ref(), Some(&response));
    assert!(run.error_code.is_none());

    let sprint = f
        .sprint_repo
        .find_by_id("SPR001")
        .expect("读取冲刺失败")
        .expect("冲刺应存在");
    assert_eq!(sprint.status, SprintStatus::Solved);
}

#[test]
fn test_register_failed_keeps_status() {
    let f = setup();
    let request = f.builder.build("SPR001").expect("构建应成功");

    let run = f
        .recorder
        .register_failed("SPR001", Some(&request), "TIMEOUT", "求解器执行超时")
        .expect("登记失败记录失败");

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.error_code.as_deref(), Some("TIMEOUT"));
    assert_eq!(run.error_message.as_deref(), Some("求解器执行超时"));
    assert!(run.output_snapshot.is_none());

    // 失败不推进状态,冲刺保持可重试
    let sprint = f
        .sprint_repo
        .find_by_id("SPR001")
        .expect("读取冲刺失败")
        .expect("冲刺应存在");
    assert_eq!(sprint.status, SprintStatus::ReadyToSolve);
}

#[test]
fn test_runs_are_append_only_and_ordered() {
    let f = setup();
    let request = f.builder.build("SPR001").expect("构建应成功");

    let first = f
        .recorder
        .register_failed("SPR001", Some(&request), "TIMEOUT", "求解器执行超时")
        .expect("登记失败记录失败");
    let second = f
        .recorder
        .register_succeeded("SPR001", &request, &feasible_response())
        .expect("登记成功记录失败");

    assert_ne!(first.run_id, second.run_id);

    let runs = f.run_repo.list_by_sprint("SPR001").expect("读取记录失败");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, first.run_id);
    assert_eq!(runs[1].run_id, second.run_id);
    assert!(runs[0].executed_at <= runs[1].executed_at);

    // 快照在读回后仍保持原值
    assert_eq!(runs[1].input_snapshot.as_ref(), Some(&request));
    assert_eq!(
        runs[1]
            .output_snapshot
            .as_ref()
            .map(|r| r.contract_version.as_str()),
        Some(SOLVER_CONTRACT_VERSION)
    );
}

#[test]
fn test_register_on_missing_sprint_is_not_found() {
    let f = setup();

    let result = f
        .recorder
        .register_failed("missing", None, "TIMEOUT", "求解器执行超时");
    match result {
        Err(RepositoryError::NotFound { entity, .. }) => assert_eq!(entity, "Sprint"),
        other => panic!("应为 NotFound,实际: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_mark_ready_from_draft() {
    let f = setup();
    f.recorder.reset_to_draft("SPR001").expect("重置失败");

    let sprint = f
        .recorder
        .mark_ready("SPR001", &f.builder)
        .expect("就绪转换应成功");
    assert_eq!(sprint.status, SprintStatus::ReadyToSolve);
}

#[test]
fn test_mark_ready_guarded_by_preconditions() {
    let (_tmp, conn) = setup_test_db();

    let sprint_repo = Arc::new(SprintRepository::new(conn.clone()));
    let period_repo = Arc::new(PeriodRepository::new(conn.clone()));
    let doctor_repo = Arc::new(DoctorRepository::new(conn.clone()));
    let run_repo = Arc::new(SprintRunRepository::new(conn.clone()));
    let builder = SolveRequestBuilder::new(sprint_repo.clone(), period_repo.clone(), doctor_repo.clone());
    let recorder = RunRecorder::new(sprint_repo.clone(), run_repo);

    // 草稿冲刺: 有医生有周期,但没有任何可值班登记
    doctor_repo.insert(&make_doctor("D001")).expect("插入医生失败");
    period_repo
        .insert(&make_period("PER001", day(2026, 8, 1), day(2026, 8, 1)))
        .expect("插入周期失败");
    sprint_repo
        .insert(&make_sprint("SPR001", "PER001", &["D001"]))
        .expect("插入冲刺失败");

    match recorder.mark_ready("SPR001", &builder) {
        Err(RecorderError::Precondition(PreconditionError::NoAvailability)) => {}
        other => panic!("应为 NO_AVAILABILITY,实际: {:?}", other.map(|_| ())),
    }

    // 守卫失败时状态保持 DRAFT
    let sprint = sprint_repo
        .find_by_id("SPR001")
        .expect("读取冲刺失败")
        .expect("冲刺应存在");
    assert_eq!(sprint.status, SprintStatus::Draft);
}

#[test]
fn test_mark_ready_is_idempotent_for_ready_sprint() {
    let f = setup();

    let sprint = f
        .recorder
        .mark_ready("SPR001", &f.builder)
        .expect("重复就绪转换应成功");
    assert_eq!(sprint.status, SprintStatus::ReadyToSolve);
}

#[test]
fn test_mark_ready_rejects_solved_sprint() {
    let f = setup();
    let request = f.builder.build("SPR001").expect("构建应成功");
    f.recorder
        .register_succeeded("SPR001", &request, &feasible_response())
        .expect("登记成功记录失败");

    match f.recorder.mark_ready("SPR001", &f.builder) {
        Err(RecorderError::InvalidTransition { from, to }) => {
            assert_eq!(from, "SOLVED");
            assert_eq!(to, "READY_TO_SOLVE");
        }
        other => panic!("应为 InvalidTransition,实际: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_reset_to_draft_from_solved() {
    let f = setup();
    let request = f.builder.build("SPR001").expect("构建应成功");
    f.recorder
        .register_succeeded("SPR001", &request, &feasible_response())
        .expect("登记成功记录失败");

    let sprint = f.recorder.reset_to_draft("SPR001").expect("重置失败");
    assert_eq!(sprint.status, SprintStatus::Draft);

    // 重置不清运行历史
    let runs = f.run_repo.list_by_sprint("SPR001").expect("读取记录失败");
    assert_eq!(runs.len(), 1);
}
