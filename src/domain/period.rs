// ==========================================
// 医生值班排班系统 - 排班周期领域模型
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART A 主数据
// ==========================================
// 周期 = 连续自然日区间 (UTC, 含首尾) + 按日需求覆盖
// ==========================================

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// PeriodDayDemand - 按日需求覆盖
// ==========================================
// 缺省日期的需求取冲刺全局配置 required_doctors_per_shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodDayDemand {
    pub day: NaiveDate,        // 日期
    pub required_doctors: i32, // 当日需要的值班医生数
}

// ==========================================
// Period - 排班周期
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub period_id: String,                // 周期ID
    pub period_name: String,              // 周期名称
    pub starts_on: NaiveDate,             // 起始日 (含)
    pub ends_on: NaiveDate,               // 结束日 (含)
    pub day_demands: Vec<PeriodDayDemand>, // 按日需求覆盖
    pub created_at: DateTime<Utc>,        // 创建时间
    pub updated_at: DateTime<Utc>,        // 更新时间
}

impl Period {
    /// 将日期转换为求解器协议中的 day_id
    pub fn day_id(day: NaiveDate) -> String {
        day.format("%Y-%m-%d").to_string()
    }

    /// 枚举周期内全部日期 (升序; 区间为空时返回空列表)
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        if self.ends_on < self.starts_on {
            return days;
        }
        let mut current = self.starts_on;
        while current <= self.ends_on {
            days.push(current);
            current += Duration::days(1);
        }
        days
    }

    /// 枚举周期内全部 day_id (升序)
    pub fn day_ids(&self) -> Vec<String> {
        self.days().into_iter().map(Self::day_id).collect()
    }

    /// 判断日期是否落在周期内
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.starts_on <= day && day <= self.ends_on
    }

    /// 查询某日的需求覆盖值
    pub fn demand_for(&self, day: NaiveDate) -> Option<i32> {
        self.day_demands
            .iter()
            .find(|d| d.day == day)
            .map(|d| d.required_doctors)
    }
}
