// ==========================================
// 采购风险评估 - 供应商总览
// ==========================================
// 职责: 为每个供应商汇总交付统计 / 国家因素 / 国家风险, 并给出综合分
// 综合分 (越低越好):
//   0.35 * 国家风险 + 0.25 * min(1, 平均延期/30) + 0.25 * (1 - 可靠性) + 0.15 * 海运天数/35
// 排序: 国家名 → 供应商名
// ==========================================

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::analysis::{SupplierCard, SupplierOverview};
use crate::domain::country::{CountryFactors, CountrySignal};
use crate::domain::supplier::{ScheduleFact, SupplierProfile};
use crate::engine::agents::round4;
use crate::engine::schedule_metrics::ScheduleMetricsCalculator;

const DELAY_HORIZON_DAYS: f64 = 30.0;
const SHIPPING_HORIZON_DAYS: f64 = 35.0;
/// 缺少国家风险或国家因素时的中性归一值
const NEUTRAL_NORM: f64 = 0.5;

pub fn composite_score(
    country_risk: Option<f64>,
    avg_delay_days: f64,
    reliability_score: f64,
    shipping_days: Option<i64>,
) -> f64 {
    let risk_norm = country_risk.map(|r| r / 10.0).unwrap_or(NEUTRAL_NORM);
    let delay_norm = (avg_delay_days / DELAY_HORIZON_DAYS).min(1.0);
    let reliability_norm = 1.0 - reliability_score / 100.0;
    let shipping_norm = shipping_days
        .map(|d| d as f64 / SHIPPING_HORIZON_DAYS)
        .unwrap_or(NEUTRAL_NORM);

    round4(risk_norm * 0.35 + delay_norm * 0.25 + reliability_norm * 0.25 + shipping_norm * 0.15)
}

pub struct SupplierOverviewBuilder {
    metrics: ScheduleMetricsCalculator,
}

impl SupplierOverviewBuilder {
    pub fn new(disruption_threshold_days: f64) -> Self {
        Self {
            metrics: ScheduleMetricsCalculator::new(disruption_threshold_days),
        }
    }

    pub fn build(
        &self,
        suppliers: &[SupplierProfile],
        schedules: &[ScheduleFact],
        country_signals: &[CountrySignal],
        country_factors: &[CountryFactors],
        today: NaiveDate,
    ) -> SupplierOverview {
        let factors_by_country: HashMap<&str, &CountryFactors> = country_factors
            .iter()
            .map(|f| (f.country.as_str(), f))
            .collect();
        let signal_by_country: HashMap<&str, &CountrySignal> = country_signals
            .iter()
            .map(|s| (s.country.as_str(), s))
            .collect();

        let mut facts_by_supplier: HashMap<i64, Vec<ScheduleFact>> = HashMap::new();
        for fact in schedules {
            facts_by_supplier
                .entry(fact.supplier_id)
                .or_default()
                .push(fact.clone());
        }

        let mut ordered: Vec<&SupplierProfile> = suppliers.iter().collect();
        ordered.sort_by(|a, b| {
            a.country
                .cmp(&b.country)
                .then_with(|| a.supplier_name.cmp(&b.supplier_name))
        });

        let cards: Vec<SupplierCard> = ordered
            .into_iter()
            .map(|supplier| {
                let facts = facts_by_supplier
                    .get(&supplier.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let metrics = self
                    .metrics
                    .compute(facts, supplier.average_delivery_time, today);
                let factors = factors_by_country.get(supplier.country.as_str()).copied();
                let signal = signal_by_country.get(supplier.country.as_str()).copied();

                SupplierCard {
                    supplier_id: supplier.id,
                    supplier_name: supplier.supplier_name.clone(),
                    country: supplier.country.clone(),
                    continent: factors
                        .map(|f| f.continent.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    industry: supplier.industry.clone(),
                    reliability_score: supplier.reliability_score,
                    avg_delivery_days: supplier.average_delivery_time,
                    cost_competitiveness: supplier.cost_competitiveness.clone(),
                    total_schedules: metrics.total_count,
                    delayed_count: metrics.delayed_count,
                    delay_pct: metrics.delay_percent,
                    avg_delay_days: metrics.avg_delay_days,
                    country_factors: factors.cloned(),
                    country_risk_score: signal.map(|s| s.risk_score),
                    country_risk_headline: signal.map(|s| s.headline.clone()),
                    composite_score: composite_score(
                        signal.map(|s| s.risk_score),
                        metrics.avg_delay_days,
                        supplier.reliability_score,
                        factors.map(|f| f.avg_shipping_days),
                    ),
                }
            })
            .collect();

        let mut grouped_by_country: BTreeMap<String, Vec<SupplierCard>> = BTreeMap::new();
        for card in &cards {
            grouped_by_country
                .entry(card.country.clone())
                .or_default()
                .push(card.clone());
        }

        SupplierOverview {
            suppliers: cards,
            grouped_by_country,
        }
    }
}
