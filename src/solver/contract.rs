// ==========================================
// 医生值班排班系统 - 求解器协议契约
// ==========================================
// 依据: Solver_Protocol_Spec_v1.md - 输入/输出契约
// 红线: 求解器输出必须先过契约校验再进入下游
// ==========================================
// 线上格式: 单个 JSON 文档, 字段名 camelCase
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};

/// 当前协议版本标签
pub const SOLVER_CONTRACT_VERSION: &str = "oncall-solve/v1";

// ==========================================
// SolveRequest - 求解请求
// ==========================================
// 由 SolveRequestBuilder 一次性构建,构建后不可变

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequestDoctor {
    pub id: String,          // 医生ID
    pub max_total_days: i32, // 有效值班天数上限 (个人覆盖或冲刺默认)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequestPeriod {
    pub id: String,                  // 周期ID
    pub ordered_day_ids: Vec<String>, // 周期内日期 (升序)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveDayDemand {
    pub day_id: String,        // 日期
    pub required_doctors: i32, // 当日需求医生数
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveAvailability {
    pub doctor_id: String, // 医生ID
    pub period_id: String, // 周期ID
    pub day_id: String,    // 日期
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub contract_version: String,            // 协议版本标签
    pub doctors: Vec<SolveRequestDoctor>,    // 医生列表 (ID 唯一)
    pub periods: Vec<SolveRequestPeriod>,    // 周期列表 (ID 唯一)
    pub demands: Vec<SolveDayDemand>,        // 按日需求
    pub availability: Vec<SolveAvailability>, // 可值班登记 (无重复)
}

// ==========================================
// SolveResponse - 求解响应
// ==========================================
// 只由求解器产出; 解码成功不代表可信,需过 validate

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveAssignment {
    pub doctor_id: String, // 医生ID
    pub period_id: String, // 周期ID
    pub day_id: String,    // 日期
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    pub contract_version: String,        // 协议版本标签
    pub is_feasible: bool,               // 可行性标志
    pub assigned_count: i32,             // 已分配班次数
    pub uncovered_days: Vec<String>,     // 未覆盖日期
    pub assignments: Vec<SolveAssignment>, // 分配明细
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cut: Option<JsonValue>,      // 最小割诊断信息 (可选,透传)
}

impl SolveResponse {
    /// 对照请求做穷举式契约校验
    ///
    /// # 返回
    /// - Ok(()): 响应可信,可进入下游
    /// - Err(msg): 首个违反项的描述,调用方按 INTERNAL_CONTRACT_MISMATCH 处理
    pub fn validate(&self, request: &SolveRequest) -> Result<(), String> {
        if self.contract_version != request.contract_version {
            return Err(format!(
                "协议版本不一致: 请求={}, 响应={}",
                request.contract_version, self.contract_version
            ));
        }

        if self.assigned_count < 0 {
            return Err(format!("assigned_count 为负数: {}", self.assigned_count));
        }
        if self.assigned_count as usize != self.assignments.len() {
            return Err(format!(
                "assigned_count 与分配明细数量不一致: count={}, assignments={}",
                self.assigned_count,
                self.assignments.len()
            ));
        }

        let doctor_ids: HashSet<&str> = request.doctors.iter().map(|d| d.id.as_str()).collect();
        let period_days: HashMap<&str, HashSet<&str>> = request
            .periods
            .iter()
            .map(|p| {
                (
                    p.id.as_str(),
                    p.ordered_day_ids.iter().map(|d| d.as_str()).collect(),
                )
            })
            .collect();
        let demand_days: HashSet<&str> =
            request.demands.iter().map(|d| d.day_id.as_str()).collect();

        let mut seen = HashSet::new();
        for a in &self.assignments {
            if !doctor_ids.contains(a.doctor_id.as_str()) {
                return Err(format!("分配引用了未声明的医生: {}", a.doctor_id));
            }
            let days = period_days
                .get(a.period_id.as_str())
                .ok_or_else(|| format!("分配引用了未声明的周期: {}", a.period_id))?;
            if !days.contains(a.day_id.as_str()) {
                return Err(format!(
                    "分配日期不属于所述周期: period={}, day={}",
                    a.period_id, a.day_id
                ));
            }
            if !seen.insert(a) {
                return Err(format!(
                    "重复的分配明细: doctor={}, period={}, day={}",
                    a.doctor_id, a.period_id, a.day_id
                ));
            }
        }

        for day in &self.uncovered_days {
            if !demand_days.contains(day.as_str()) {
                return Err(format!("未覆盖日期不在需求日期集合内: {}", day));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SolveRequest {
        SolveRequest {
            contract_version: SOLVER_CONTRACT_VERSION.to_string(),
            doctors: vec![SolveRequestDoctor {
                id: "D001".to_string(),
                max_total_days: 5,
            }],
            periods: vec![SolveRequestPeriod {
                id: "PER001".to_string(),
                ordered_day_ids: vec!["2026-08-01".to_string(), "2026-08-02".to_string()],
            }],
            demands: vec![
                SolveDayDemand {
                    day_id: "2026-08-01".to_string(),
                    required_doctors: 1,
                },
                SolveDayDemand {
                    day_id: "2026-08-02".to_string(),
                    required_doctors: 1,
                },
            ],
            availability: vec![SolveAvailability {
                doctor_id: "D001".to_string(),
                period_id: "PER001".to_string(),
                day_id: "2026-08-01".to_string(),
            }],
        }
    }

    fn response() -> SolveResponse {
        SolveResponse {
            contract_version: SOLVER_CONTRACT_VERSION.to_string(),
            is_feasible: true,
            assigned_count: 1,
            uncovered_days: vec!["2026-08-02".to_string()],
            assignments: vec![SolveAssignment {
                doctor_id: "D001".to_string(),
                period_id: "PER001".to_string(),
                day_id: "2026-08-01".to_string(),
            }],
            min_cut: None,
        }
    }

    #[test]
    fn test_valid_response_passes() {
        assert!(response().validate(&request()).is_ok());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut resp = response();
        resp.contract_version = "oncall-solve/v0".to_string();
        let err = resp.validate(&request()).unwrap_err();
        assert!(err.contains("协议版本"));
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let mut resp = response();
        resp.assigned_count = 2;
        assert!(resp.validate(&request()).is_err());
    }

    #[test]
    fn test_unknown_doctor_rejected() {
        let mut resp = response();
        resp.assignments[0].doctor_id = "D999".to_string();
        let err = resp.validate(&request()).unwrap_err();
        assert!(err.contains("未声明的医生"));
    }

    #[test]
    fn test_day_outside_period_rejected() {
        let mut resp = response();
        resp.assignments[0].day_id = "2026-09-01".to_string();
        assert!(resp.validate(&request()).is_err());
    }

    #[test]
    fn test_uncovered_day_must_be_demand_day() {
        let mut resp = response();
        resp.uncovered_days = vec!["2026-09-01".to_string()];
        assert!(resp.validate(&request()).is_err());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_string(&request()).unwrap();
        assert!(json.contains("\"contractVersion\""));
        assert!(json.contains("\"maxTotalDays\""));
        assert!(json.contains("\"orderedDayIds\""));
    }
}
