// ==========================================
// 医生值班排班系统 - 求解请求构建器
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART B2 前置条件链
// 红线: 纯投影,不做任何写入; 按固定顺序报告第一个违反项
// ==========================================
// 输入: sprint + period + doctor 当前持久化状态
// 输出: 自洽的 SolveRequest (ID 唯一、引用完整、无重复登记)
// ==========================================

use crate::domain::period::Period;
use crate::domain::sprint::Sprint;
use crate::repository::error::RepositoryError;
use crate::repository::{DoctorRepository, PeriodRepository, SprintRepository};
use crate::solver::contract::{
    SolveAvailability, SolveDayDemand, SolveRequest, SolveRequestDoctor, SolveRequestPeriod,
    SOLVER_CONTRACT_VERSION,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

// ==========================================
// PreconditionError - 前置条件违反
// ==========================================
// 检查顺序固定,同时违反多项时报告最靠前的一项
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("排班冲刺不存在: sprint_id={0}")]
    SprintNotFound(String),

    #[error("冲刺名册中没有任何医生")]
    NoDoctors,

    #[error("排班周期不存在: period_id={0}")]
    PeriodNotFound(String),

    #[error("排班周期不包含任何日期")]
    NoPeriodDays,

    #[error("医生不存在或已停用: {0:?}")]
    DoctorNotFoundOrInactive(Vec<String>),

    #[error("周期内没有名册医生的可值班登记")]
    NoAvailability,
}

impl PreconditionError {
    /// 稳定错误码 (运行记录与批次结果项用)
    pub fn code(&self) -> &'static str {
        match self {
            PreconditionError::SprintNotFound(_) => "SPRINT_NOT_FOUND",
            PreconditionError::NoDoctors => "NO_DOCTORS",
            PreconditionError::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            PreconditionError::NoPeriodDays => "NO_PERIOD_DAYS",
            PreconditionError::DoctorNotFoundOrInactive(_) => "DOCTOR_NOT_FOUND_OR_INACTIVE",
            PreconditionError::NoAvailability => "NO_AVAILABILITY",
        }
    }
}

// ==========================================
// BuildError - 构建失败
// ==========================================
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ==========================================
// SolveRequestBuilder - 求解请求构建器
// ==========================================
pub struct SolveRequestBuilder {
    sprint_repo: Arc<SprintRepository>,
    period_repo: Arc<PeriodRepository>,
    doctor_repo: Arc<DoctorRepository>,
}

impl SolveRequestBuilder {
    /// 创建新的构建器实例
    pub fn new(
        sprint_repo: Arc<SprintRepository>,
        period_repo: Arc<PeriodRepository>,
        doctor_repo: Arc<DoctorRepository>,
    ) -> Self {
        Self {
            sprint_repo,
            period_repo,
            doctor_repo,
        }
    }

    /// 按冲刺ID构建求解请求
    pub fn build(&self, sprint_id: &str) -> Result<SolveRequest, BuildError> {
        let sprint = self
            .sprint_repo
            .find_by_id(sprint_id)?
            .ok_or_else(|| PreconditionError::SprintNotFound(sprint_id.to_string()))?;
        self.build_for_sprint(&sprint)
    }

    /// 为已加载的冲刺构建求解请求
    ///
    /// 调用方已确认冲刺存在时使用,避免重复读库;
    /// 检查顺序: 名册非空 -> 周期存在 -> 周期非空 ->
    /// 医生可解析 -> 存在可值班登记
    pub fn build_for_sprint(&self, sprint: &Sprint) -> Result<SolveRequest, BuildError> {
        if sprint.roster.is_empty() {
            return Err(PreconditionError::NoDoctors.into());
        }

        let period = self
            .period_repo
            .find_by_id(&sprint.period_id)?
            .ok_or_else(|| PreconditionError::PeriodNotFound(sprint.period_id.clone()))?;

        let days = period.days();
        if days.is_empty() {
            return Err(PreconditionError::NoPeriodDays.into());
        }

        // 医生解析: 收集全部问题ID,不止报告第一个
        let mut doctors = Vec::with_capacity(sprint.roster.len());
        let mut offending = Vec::new();
        for doctor_id in &sprint.roster {
            match self.doctor_repo.find_by_id(doctor_id)? {
                Some(doctor) if doctor.active => {
                    doctors.push(SolveRequestDoctor {
                        id: doctor.doctor_id.clone(),
                        max_total_days: doctor
                            .effective_max_total_days(sprint.config.max_days_per_doctor_default),
                    });
                }
                _ => offending.push(doctor_id.clone()),
            }
        }
        if !offending.is_empty() {
            return Err(PreconditionError::DoctorNotFoundOrInactive(offending).into());
        }

        let availability = Self::project_availability(sprint, &period);
        if availability.is_empty() {
            return Err(PreconditionError::NoAvailability.into());
        }

        let demands = days
            .iter()
            .map(|&day| SolveDayDemand {
                day_id: Period::day_id(day),
                required_doctors: period
                    .demand_for(day)
                    .unwrap_or(sprint.config.required_doctors_per_shift),
            })
            .collect();

        let request = SolveRequest {
            contract_version: SOLVER_CONTRACT_VERSION.to_string(),
            doctors,
            periods: vec![SolveRequestPeriod {
                id: period.period_id.clone(),
                ordered_day_ids: period.day_ids(),
            }],
            demands,
            availability,
        };

        debug!(
            sprint_id = %sprint.sprint_id,
            period_id = %period.period_id,
            doctors = request.doctors.len(),
            days = request.demands.len(),
            availability = request.availability.len(),
            "求解请求构建完成"
        );
        Ok(request)
    }

    /// 过滤可值班登记: 名册内医生 + 冲刺周期 + 周期内日期,去重
    fn project_availability(sprint: &Sprint, period: &Period) -> Vec<SolveAvailability> {
        let roster: HashSet<&str> = sprint.roster.iter().map(|s| s.as_str()).collect();
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for entry in &sprint.availability {
            if entry.period_id != period.period_id {
                continue;
            }
            if !roster.contains(entry.doctor_id.as_str()) {
                continue;
            }
            if !period.contains_day(entry.day) {
                continue;
            }
            let tuple = SolveAvailability {
                doctor_id: entry.doctor_id.clone(),
                period_id: entry.period_id.clone(),
                day_id: Period::day_id(entry.day),
            };
            if seen.insert(tuple.clone()) {
                result.push(tuple);
            }
        }
        result
    }
}
