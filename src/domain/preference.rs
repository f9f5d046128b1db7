// ==========================================
// 采购风险评估 - 采购方偏好档案
// ==========================================
// 仅供 SupplierRanker 使用, 集成评分不读取
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// 原材料需求 (自由文本标签)
    pub raw_materials: Vec<String>,
    /// 偏好的来源国家
    pub preferred_countries: Vec<String>,
    /// 采购方企业类型, 与供应商行业标签匹配
    pub company_type: Option<String>,
}

impl PreferenceProfile {
    /// 无档案时的通用 (非个性化) 偏好
    pub fn general() -> Self {
        Self::default()
    }

    pub fn prefers_country(&self, country: &str) -> bool {
        self.preferred_countries.iter().any(|c| c == country)
    }
}
