// ==========================================
// 仓储层集成测试
// ==========================================
// 测试范围:
// 1. 实体写入/读回的一致性 (名册顺序、登记、按日需求)
// 2. 批次运行记录的游标分页
// 3. 约束: 同一批次内冲刺唯一
// ==========================================


use chrono::{TimeZone, Utc};
use oncall_aps::domain::types::{CycleRunStatus, RunStatus, SprintStatus};
use oncall_aps::domain::{CycleRunItem, PlanningCycleRun, SprintRun};
use oncall_aps::repository::{
    DoctorRepository, PeriodRepository, PlanningCycleRepository, RepositoryError,
    SprintRepository, SprintRunRepository,
};
use test_helpers::*;

#[test]
fn test_doctor_roundtrip_and_set_active() {
    let (_tmp, conn) = setup_test_db();
    let repo = DoctorRepository::new(conn);

    let mut doctor = make_doctor("D001");
    doctor.max_total_days = Some(4);
    repo.insert(&doctor).expect("插入医生失败");

    let loaded = repo
        .find_by_id("D001")
        .expect("读取医生失败")
        .expect("医生应存在");
    assert_eq!(loaded.doctor_name, doctor.doctor_name);
    assert_eq!(loaded.max_total_days, Some(4));
    assert!(loaded.active);

    repo.set_active("D001", false).expect("停用医生失败");
    let loaded = repo
        .find_by_id("D001")
        .expect("读取医生失败")
        .expect("医生应存在");
    assert!(!loaded.active);

    assert!(repo.find_by_id("missing").expect("查询失败").is_none());
}

#[test]
fn test_period_roundtrip_with_demands() {
    let (_tmp, conn) = setup_test_db();
    let repo = PeriodRepository::new(conn);

    let mut period = make_period("PER001", day(2026, 8, 1), day(2026, 8, 7));
    period.day_demands = vec![
        oncall_aps::PeriodDayDemand {
            day: day(2026, 8, 2),
            required_doctors: 2,
        },
        oncall_aps::PeriodDayDemand {
            day: day(2026, 8, 5),
            required_doctors: 3,
        },
    ];
    repo.insert(&period).expect("插入周期失败");

    let loaded = repo
        .find_by_id("PER001")
        .expect("读取周期失败")
        .expect("周期应存在");
    assert_eq!(loaded.starts_on, period.starts_on);
    assert_eq!(loaded.ends_on, period.ends_on);
    assert_eq!(loaded.day_demands.len(), 2);
    assert_eq!(loaded.demand_for(day(2026, 8, 5)), Some(3));
    assert_eq!(loaded.demand_for(day(2026, 8, 3)), None);
}

#[test]
fn test_sprint_roundtrip_preserves_roster_order() {
    let (_tmp, conn) = setup_test_db();
    let repo = SprintRepository::new(conn);

    let mut sprint = make_sprint("SPR001", "PER001", &["D003", "D001", "D002"]);
    sprint.availability = vec![
        avail("D001", "PER001", day(2026, 8, 1)),
        avail("D003", "PER001", day(2026, 8, 2)),
    ];
    repo.insert(&sprint).expect("插入冲刺失败");

    let loaded = repo
        .find_by_id("SPR001")
        .expect("读取冲刺失败")
        .expect("冲刺应存在");
    assert_eq!(loaded.status, SprintStatus::Draft);
    assert_eq!(loaded.roster, vec!["D003", "D001", "D002"]);
    assert_eq!(loaded.availability.len(), 2);
    assert_eq!(loaded.config.required_doctors_per_shift, 1);

    repo.update_status("SPR001", SprintStatus::ReadyToSolve)
        .expect("更新状态失败");
    let loaded = repo
        .find_by_id("SPR001")
        .expect("读取冲刺失败")
        .expect("冲刺应存在");
    assert_eq!(loaded.status, SprintStatus::ReadyToSolve);

    match repo.update_status("missing", SprintStatus::Solved) {
        Err(RepositoryError::NotFound { .. }) => {}
        other => panic!("应为 NotFound,实际: {:?}", other),
    }
}

#[test]
fn test_sprint_run_append_and_ascending_order() {
    let (_tmp, conn) = setup_test_db();
    seed_single_day_ready_sprint(&conn);
    let repo = SprintRunRepository::new(conn);

    for (i, ts) in [
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 2).unwrap(),
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 1).unwrap(),
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 3).unwrap(),
    ]
    .into_iter()
    .enumerate()
    {
        repo.append(&SprintRun {
            run_id: format!("RUN{:03}", i),
            sprint_id: "SPR001".to_string(),
            executed_at: ts,
            status: RunStatus::Failed,
            input_snapshot: None,
            output_snapshot: None,
            error_code: Some("TIMEOUT".to_string()),
            error_message: Some("求解器执行超时".to_string()),
        })
        .expect("追加记录失败");
    }

    let runs = repo.list_by_sprint("SPR001").expect("读取记录失败");
    assert_eq!(runs.len(), 3);
    // 读回顺序按 executed_at 升序,与写入顺序无关
    assert_eq!(runs[0].run_id, "RUN001");
    assert_eq!(runs[1].run_id, "RUN000");
    assert_eq!(runs[2].run_id, "RUN002");
}

#[test]
fn test_cycle_roundtrip_and_unique_membership() {
    let (_tmp, conn) = setup_test_db();
    let repo = PlanningCycleRepository::new(conn);

    repo.insert(&make_cycle("CYC001", &["SPR002", "SPR001"]))
        .expect("插入批次失败");

    let loaded = repo
        .find_by_id("CYC001")
        .expect("读取批次失败")
        .expect("批次应存在");
    assert_eq!(loaded.sprint_ids, vec!["SPR002", "SPR001"]);

    // 同一冲刺在一个批次中至多出现一次
    match repo.insert(&make_cycle("CYC002", &["SPR001", "SPR001"])) {
        Err(RepositoryError::UniqueConstraintViolation(_)) => {}
        other => panic!("应为唯一约束违反,实际: {:?}", other),
    }
}

fn cycle_run(run_id: &str, cycle_id: &str, ts: chrono::DateTime<Utc>) -> PlanningCycleRun {
    PlanningCycleRun {
        run_id: run_id.to_string(),
        cycle_id: cycle_id.to_string(),
        executed_at: ts,
        status: CycleRunStatus::Failed,
        items: vec![CycleRunItem {
            sprint_id: "SPR001".to_string(),
            executed_at: ts,
            status: RunStatus::Failed,
            input_snapshot: None,
            output_snapshot: None,
            error_code: Some("SPRINT_NOT_READY".to_string()),
            error_message: Some("冲刺状态为 DRAFT,需要 READY_TO_SOLVE".to_string()),
        }],
    }
}

#[test]
fn test_cycle_run_pagination() {
    let (_tmp, conn) = setup_test_db();
    let repo = PlanningCycleRepository::new(conn);

    repo.insert(&make_cycle("CYC001", &["SPR001"]))
        .expect("插入批次失败");

    for i in 0..3 {
        let ts = Utc.with_ymd_and_hms(2026, 8, 1, 10, i, 0).unwrap();
        repo.append_run(&cycle_run(&format!("RUN{:03}", i), "CYC001", ts))
            .expect("追加批次运行失败");
    }

    // 第一页: limit=2, 存在后续页 => next_cursor = 本页末条时间戳
    let page1 = repo
        .list_runs_page("CYC001", 2, None)
        .expect("读取第一页失败");
    assert_eq!(page1.items.len(), 2);
    assert_eq!(page1.items[0].run_id, "RUN000");
    assert_eq!(page1.items[1].run_id, "RUN001");
    let cursor = page1.next_cursor.expect("应存在后续页游标");

    // 第二页: 游标之后只剩一条,无后续页
    let page2 = repo
        .list_runs_page("CYC001", 2, Some(&cursor))
        .expect("读取第二页失败");
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].run_id, "RUN002");
    assert!(page2.next_cursor.is_none());

    // limit 恰好等于剩余条数时也不应给出游标
    let exact = repo
        .list_runs_page("CYC001", 3, None)
        .expect("读取整页失败");
    assert_eq!(exact.items.len(), 3);
    assert!(exact.next_cursor.is_none());

    // 结果项随记录一同读回
    assert_eq!(
        exact.items[0].items[0].error_code.as_deref(),
        Some("SPRINT_NOT_READY")
    );
}
