// ==========================================
// 采购风险评估 - 供应商与交付计划实体
// ==========================================
// 红线: 交付记录导入后不可变, 评分只读
// ==========================================

use crate::domain::types::ScheduleStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SupplierProfile - 供应商档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierProfile {
    pub id: i64,
    pub supplier_name: String,
    pub country: String,
    /// 行业标签 (可缺失)
    pub industry: Option<String>,
    /// 可靠性百分比 (0~100)
    pub reliability_score: f64,
    /// 历史平均交付周期 (天), <=0 时相关指标平滑降级
    pub average_delivery_time: i64,
    /// 成本竞争力 (low / medium / high)
    pub cost_competitiveness: String,
}

// ==========================================
// ScheduleFact - 单条交付承诺
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFact {
    pub id: i64,
    pub equipment_name: String,
    pub supplier_id: i64,
    pub planned_delivery_date: NaiveDate,
    /// None 表示尚未交付
    pub actual_delivery_date: Option<NaiveDate>,
    /// 申报价值 (USD)
    pub equipment_value: f64,
    pub status: ScheduleStatus,
}

impl ScheduleFact {
    pub fn is_delayed(&self) -> bool {
        self.status == ScheduleStatus::Delayed
    }

    /// 延期天数
    ///
    /// - 已交付: actual - planned
    /// - 未交付: 视为在途逾期, max(0, today - planned)
    pub fn delay_days(&self, today: NaiveDate) -> f64 {
        match self.actual_delivery_date {
            Some(actual) => (actual - self.planned_delivery_date).num_days() as f64,
            None => (today - self.planned_delivery_date).num_days().max(0) as f64,
        }
    }
}

/// 供应商列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierFilter {
    pub country: Option<String>,
    pub industry: Option<String>,
    pub min_reliability: Option<f64>,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &SupplierProfile) -> bool {
        if let Some(country) = &self.country {
            if !supplier.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some(industry) = &self.industry {
            match &supplier.industry {
                Some(s) if s.eq_ignore_ascii_case(industry) => {}
                _ => return false,
            }
        }
        if let Some(min) = self.min_reliability {
            if supplier.reliability_score < min {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(planned: NaiveDate, actual: Option<NaiveDate>) -> ScheduleFact {
        ScheduleFact {
            id: 1,
            equipment_name: "Pump".to_string(),
            supplier_id: 1,
            planned_delivery_date: planned,
            actual_delivery_date: actual,
            equipment_value: 1000.0,
            status: ScheduleStatus::Delayed,
        }
    }

    #[test]
    fn test_delay_days_delivered() {
        let planned = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let actual = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(fact(planned, Some(actual)).delay_days(today), 10.0);
    }

    #[test]
    fn test_delay_days_in_flight() {
        let planned = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(fact(planned, None).delay_days(today), 7.0);

        // 未到计划日期的在途记录不计延期
        let early = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        assert_eq!(fact(planned, None).delay_days(early), 0.0);
    }

    #[test]
    fn test_filter_matches() {
        let supplier = SupplierProfile {
            id: 1,
            supplier_name: "Acme".to_string(),
            country: "India".to_string(),
            industry: Some("Automotive".to_string()),
            reliability_score: 85.0,
            average_delivery_time: 20,
            cost_competitiveness: "medium".to_string(),
        };

        assert!(SupplierFilter::default().matches(&supplier));
        let filter = SupplierFilter {
            industry: Some("automotive".to_string()),
            min_reliability: Some(80.0),
            ..Default::default()
        };
        assert!(filter.matches(&supplier));
        let filter = SupplierFilter {
            country: Some("China".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&supplier));
    }
}
