// Dev utility: reset the database and seed a small demo scenario
// (4 doctors, one 7-day period, two sprints, one planning cycle).
//
// Usage:
//   cargo run --bin reset_and_seed_demo_db -- [db_path]
//
// The first sprint is marked READY_TO_SOLVE; the second is left in DRAFT so a
// cycle run demonstrates the partial-failure path end to end.

use chrono::{Duration, NaiveDate, Utc};
use oncall_aps::config::{ConfigManager, KEY_SOLVER_TIMEOUT_MS};
use oncall_aps::db::{init_schema, open_sqlite_connection};
use oncall_aps::domain::types::{CycleStatus, SprintStatus};
use oncall_aps::domain::{
    AvailabilityEntry, Doctor, Period, PeriodDayDemand, PlanningCycle, Sprint, SprintConfig,
};
use oncall_aps::repository::{
    DoctorRepository, PeriodRepository, PlanningCycleRepository, SprintRepository,
};
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

const PERIOD_ID: &str = "PER001";
const CYCLE_ID: &str = "CYC001";
const HORIZON_DAYS: i64 = 7;

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "oncall_aps.db".to_string());

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    let conn = Arc::new(Mutex::new(conn));
    seed_demo_scenario(conn.clone())?;

    print_quick_counts(conn)?;
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    if Path::new(db_path).exists() {
        let backup_path = format!("{}.bak", db_path);
        fs::copy(db_path, &backup_path)?;
        fs::remove_file(db_path)?;
        eprintln!("Existing database backed up to {}", backup_path);
    }
    Ok(())
}

fn seed_demo_scenario(conn: Arc<Mutex<rusqlite::Connection>>) -> Result<(), Box<dyn Error>> {
    let now = Utc::now();
    let starts_on = now.date_naive() + Duration::days(1);
    let ends_on = starts_on + Duration::days(HORIZON_DAYS - 1);

    let doctor_repo = DoctorRepository::new(conn.clone());
    let period_repo = PeriodRepository::new(conn.clone());
    let sprint_repo = SprintRepository::new(conn.clone());
    let cycle_repo = PlanningCycleRepository::new(conn.clone());

    let doctors = [
        ("D001", "内科-赵医生", Some(4)),
        ("D002", "内科-钱医生", None),
        ("D003", "外科-孙医生", Some(2)),
        ("D004", "外科-李医生", None),
    ];
    for (id, name, max_days) in doctors {
        doctor_repo.insert(&Doctor {
            doctor_id: id.to_string(),
            doctor_name: name.to_string(),
            active: true,
            max_total_days: max_days,
            created_at: now,
            updated_at: now,
        })?;
    }

    // Weekend days need one extra doctor on call.
    let weekend_demands: Vec<PeriodDayDemand> = enumerate_days(starts_on, ends_on)
        .into_iter()
        .filter(|d| is_weekend(*d))
        .map(|day| PeriodDayDemand {
            day,
            required_doctors: 2,
        })
        .collect();

    period_repo.insert(&Period {
        period_id: PERIOD_ID.to_string(),
        period_name: "演示排班周期".to_string(),
        starts_on,
        ends_on,
        day_demands: weekend_demands,
        created_at: now,
        updated_at: now,
    })?;

    // Sprint 1: fully prepared, ready to solve.
    let availability: Vec<AvailabilityEntry> = enumerate_days(starts_on, ends_on)
        .into_iter()
        .flat_map(|day| {
            ["D001", "D002", "D003", "D004"]
                .into_iter()
                .map(move |doctor_id| AvailabilityEntry {
                    doctor_id: doctor_id.to_string(),
                    period_id: PERIOD_ID.to_string(),
                    day,
                })
        })
        .collect();

    sprint_repo.insert(&Sprint {
        sprint_id: "SPR001".to_string(),
        sprint_name: "演示冲刺-就绪".to_string(),
        period_id: PERIOD_ID.to_string(),
        status: SprintStatus::ReadyToSolve,
        config: SprintConfig {
            required_doctors_per_shift: 1,
            max_days_per_doctor_default: 5,
        },
        roster: doctors.iter().map(|(id, _, _)| id.to_string()).collect(),
        availability,
        created_at: now,
        updated_at: now,
    })?;

    // Sprint 2: intentionally left in DRAFT.
    sprint_repo.insert(&Sprint {
        sprint_id: "SPR002".to_string(),
        sprint_name: "演示冲刺-草稿".to_string(),
        period_id: PERIOD_ID.to_string(),
        status: SprintStatus::Draft,
        config: SprintConfig {
            required_doctors_per_shift: 1,
            max_days_per_doctor_default: 5,
        },
        roster: vec!["D001".to_string(), "D002".to_string()],
        availability: vec![],
        created_at: now,
        updated_at: now,
    })?;

    cycle_repo.insert(&PlanningCycle {
        cycle_id: CYCLE_ID.to_string(),
        cycle_name: "演示规划批次".to_string(),
        status: CycleStatus::Active,
        sprint_ids: vec!["SPR001".to_string(), "SPR002".to_string()],
        created_at: now,
        updated_at: now,
    })?;

    let config = ConfigManager::from_connection(conn)?;
    config.set_value(KEY_SOLVER_TIMEOUT_MS, "5000")?;

    Ok(())
}

fn enumerate_days(starts_on: NaiveDate, ends_on: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = starts_on;
    while current <= ends_on {
        days.push(current);
        current += Duration::days(1);
    }
    days
}

fn is_weekend(day: NaiveDate) -> bool {
    use chrono::Datelike;
    matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

fn print_quick_counts(conn: Arc<Mutex<rusqlite::Connection>>) -> Result<(), Box<dyn Error>> {
    let conn = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
    let tables = [
        "doctor",
        "period",
        "period_day_demand",
        "sprint",
        "sprint_doctor",
        "sprint_availability",
        "sprint_run",
        "planning_cycle",
        "planning_cycle_sprint",
        "planning_cycle_run",
        "config_kv",
    ];

    eprintln!("Row counts:");
    for t in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let c: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<24} {}", t, c);
    }
    Ok(())
}
