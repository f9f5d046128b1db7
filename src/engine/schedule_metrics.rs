// ==========================================
// 采购风险评估 - 进度指标 (EVM)
// ==========================================
// 职责: 从交付记录计算延期比例 / 平均延期 / SPI / SV / 成本影响
// 说明: 未交付且已过计划日期的延期记录按 today - planned 计延期天数
// ==========================================

use chrono::NaiveDate;

use crate::domain::analysis::{CostImpact, ScheduleMetrics};
use crate::domain::supplier::ScheduleFact;
use crate::domain::types::RiskLevel;
use crate::engine::agents::{
    compute_r_schedule, compute_spi, compute_sv_days, round1, round2,
};

pub struct ScheduleMetricsCalculator {
    disruption_threshold_days: f64,
}

impl ScheduleMetricsCalculator {
    pub fn new(disruption_threshold_days: f64) -> Self {
        Self {
            disruption_threshold_days,
        }
    }

    /// 计算单供应商进度指标
    ///
    /// # 参数
    /// - `facts`: 该供应商的全部交付记录
    /// - `planned_duration_days`: SPI 的计划工期 (供应商历史平均交付周期)
    /// - `today`: 在途逾期的参考日期
    pub fn compute(
        &self,
        facts: &[ScheduleFact],
        planned_duration_days: i64,
        today: NaiveDate,
    ) -> ScheduleMetrics {
        let total_count = facts.len();
        let delayed: Vec<&ScheduleFact> = facts.iter().filter(|f| f.is_delayed()).collect();
        let delayed_count = delayed.len();

        let delay_percent = if total_count > 0 {
            round1(delayed_count as f64 / total_count as f64 * 100.0)
        } else {
            0.0
        };

        let avg_delay_days = if delayed_count > 0 {
            let total_delay: f64 = delayed.iter().map(|f| f.delay_days(today)).sum();
            round1(total_delay / delayed_count as f64)
        } else {
            0.0
        };

        let r_schedule = compute_r_schedule(avg_delay_days, self.disruption_threshold_days);

        ScheduleMetrics {
            avg_delay_days,
            delay_percent,
            risk_level: RiskLevel::from_schedule_risk(r_schedule),
            r_schedule,
            spi: compute_spi(avg_delay_days, planned_duration_days),
            sv_days: compute_sv_days(avg_delay_days),
            disruption_threshold_days: self.disruption_threshold_days,
            delayed_count,
            total_count,
        }
    }

    /// 无交付记录时的中性指标
    pub fn empty(&self) -> ScheduleMetrics {
        ScheduleMetrics {
            avg_delay_days: 0.0,
            delay_percent: 0.0,
            risk_level: RiskLevel::Low,
            r_schedule: 0.0,
            spi: 1.0,
            sv_days: 0.0,
            disruption_threshold_days: self.disruption_threshold_days,
            delayed_count: 0,
            total_count: 0,
        }
    }
}

/// 成本影响: 延期记录申报价值之和
pub fn delayed_cost_impact(facts: &[ScheduleFact]) -> CostImpact {
    CostImpact::usd(round2(
        facts
            .iter()
            .filter(|f| f.is_delayed())
            .map(|f| f.equipment_value)
            .sum(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ScheduleStatus;
    use chrono::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn fact(id: i64, delay: Option<i64>, value: f64) -> ScheduleFact {
        let planned = day(1);
        ScheduleFact {
            id,
            equipment_name: format!("Item {}", id),
            supplier_id: 1,
            planned_delivery_date: planned,
            actual_delivery_date: Some(planned + Duration::days(delay.unwrap_or(0))),
            equipment_value: value,
            status: if delay.is_some() {
                ScheduleStatus::Delayed
            } else {
                ScheduleStatus::OnTime
            },
        }
    }

    #[test]
    fn test_metrics_for_mixed_schedule() {
        let mut facts: Vec<ScheduleFact> = [5, 10, 15, 20]
            .iter()
            .enumerate()
            .map(|(i, d)| fact(i as i64, Some(*d), 1000.0))
            .collect();
        facts.extend((4..10).map(|i| fact(i, None, 500.0)));

        let metrics = ScheduleMetricsCalculator::new(30.0).compute(&facts, 20, day(28));
        assert_eq!(metrics.total_count, 10);
        assert_eq!(metrics.delayed_count, 4);
        assert_eq!(metrics.delay_percent, 40.0);
        assert_eq!(metrics.avg_delay_days, 12.5);
        assert_eq!(metrics.r_schedule, 0.4167);
        assert_eq!(metrics.spi, 0.6154);
        assert_eq!(metrics.sv_days, -12.5);
        assert_eq!(metrics.risk_level, RiskLevel::Medium);

        assert_eq!(delayed_cost_impact(&facts).estimated_cost, 4000.0);
    }

    #[test]
    fn test_in_flight_overdue_counts_until_today() {
        let mut overdue = fact(1, Some(0), 2500.0);
        overdue.actual_delivery_date = None;

        let metrics = ScheduleMetricsCalculator::new(30.0).compute(&[overdue], 20, day(31));
        assert_eq!(metrics.avg_delay_days, 30.0);
        assert_eq!(metrics.r_schedule, 1.0);
        assert_eq!(metrics.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_empty_metrics_are_neutral() {
        let calc = ScheduleMetricsCalculator::new(30.0);
        assert_eq!(calc.compute(&[], 20, day(1)), calc.empty());
        assert_eq!(calc.empty().spi, 1.0);
        assert_eq!(calc.empty().risk_level, RiskLevel::Low);
    }
}
