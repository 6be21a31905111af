// ==========================================
// 医生值班排班系统 - 医生领域模型
// ==========================================
// 依据: Oncall_Dev_Master_Spec.md - PART A 主数据
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Doctor - 医生主数据
// ==========================================
// 用途: 值班名册解析、个人值班上限覆盖
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: String,           // 医生ID
    pub doctor_name: String,         // 姓名
    pub active: bool,                // 在职/停用标志
    pub max_total_days: Option<i32>, // 个人值班天数上限 (缺省时用冲刺默认值)
    pub created_at: DateTime<Utc>,   // 创建时间
    pub updated_at: DateTime<Utc>,   // 更新时间
}

impl Doctor {
    /// 解析有效值班天数上限
    ///
    /// # 参数
    /// - default_max: 冲刺级默认上限
    pub fn effective_max_total_days(&self, default_max: i32) -> i32 {
        self.max_total_days.unwrap_or(default_max)
    }
}
