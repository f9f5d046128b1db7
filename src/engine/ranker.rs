// ==========================================
// 采购风险评估 - 替代供应商推荐排序
// ==========================================
// 职责: 按采购方偏好对供应商群体打分排序, 输出带理由的推荐列表
// 基础分 (越高越好, 权重和为 1.0):
//   0.35 * 可靠性 + 0.25 * (1 - 国家风险) + 0.20 * (1 - 海运天数/30) + 0.20 * (1 - 延期比例)
// 加成: 偏好国家 +0.15 / 原材料主产国 +0.10 (至多一次) / 行业匹配 +0.20
// 红线: 加成后截断到 1.0; 同分保持输入顺序
// ==========================================

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::analysis::SupplierRecommendation;
use crate::domain::country::{CountryFactors, CountrySignal};
use crate::domain::preference::PreferenceProfile;
use crate::domain::supplier::{ScheduleFact, SupplierProfile};
use crate::domain::types::RiskLevel;
use crate::engine::agents::round_to;
use crate::engine::signal_resolver::NEUTRAL_COUNTRY_RISK;

/// 无国家因素时的默认海运天数
pub const DEFAULT_SHIPPING_DAYS: i64 = 20;

pub const PREFERRED_COUNTRY_BOOST: f64 = 0.15;
pub const MATERIAL_SOURCE_BOOST: f64 = 0.10;
pub const INDUSTRY_MATCH_BOOST: f64 = 0.20;

pub const DEFAULT_MATCH_REASON: &str = "Competitive overall supplier profile";

/// 原材料关键词 → 主要来源国
///
/// 关键词按子串匹配小写后的原材料标签, 按表内顺序取第一个命中项
pub const MATERIAL_SOURCE_COUNTRIES: &[(&str, &[&str])] = &[
    // 电子
    ("semiconductors", &["Taiwan", "South Korea", "China"]),
    ("pcbs", &["China", "Taiwan", "South Korea"]),
    ("display panels", &["South Korea", "China", "Taiwan"]),
    ("batteries", &["China", "South Korea"]),
    ("rare earth", &["China"]),
    ("sensors", &["Germany", "Japan", "South Korea"]),
    ("capacitor", &["Japan", "China", "South Korea"]),
    ("microcontroller", &["Taiwan", "South Korea"]),
    ("optical", &["Japan", "Germany", "Taiwan"]),
    // 制造 / 汽车
    ("steel", &["India", "China", "Germany"]),
    ("aluminum", &["China", "India", "Germany"]),
    ("copper", &["China", "India", "South Korea"]),
    ("precision parts", &["Germany", "India", "Taiwan"]),
    ("wiring", &["Vietnam", "China", "India"]),
    ("hydraulic", &["Germany", "India"]),
    ("motors", &["Germany", "India", "China"]),
    ("rubber", &["Malaysia", "Thailand", "Vietnam"]),
    ("fastener", &["China", "India", "Germany"]),
    ("plastics", &["China", "Germany", "South Korea"]),
    ("glass", &["China", "Germany", "India"]),
    ("paints", &["Germany", "India", "China"]),
    // 医药
    ("active pharmaceutical", &["India", "China", "Germany"]),
    ("api", &["India", "China", "Germany"]),
    ("excipients", &["India", "Germany", "China"]),
    ("chemical solvents", &["Germany", "China", "India"]),
    ("biologic", &["Germany", "USA", "India"]),
    ("reagents", &["Germany", "USA", "Japan"]),
    ("sterile packaging", &["Germany", "India", "China"]),
    ("medical glass", &["Germany", "India"]),
    ("drug delivery", &["Germany", "India", "USA"]),
    ("laboratory", &["Germany", "Japan", "USA"]),
    ("filtration", &["Germany", "Japan", "India"]),
    ("cold-chain", &["Germany", "South Korea", "USA"]),
    // 航空航天
    ("titanium", &["Japan", "Germany", "China"]),
    ("carbon fiber", &["Japan", "Germany", "South Korea"]),
    ("avionics", &["USA", "Germany", "Japan"]),
    ("thermal insulation", &["Germany", "Japan", "China"]),
    ("fuel system", &["Germany", "Japan", "USA"]),
    // 能源
    ("solar", &["China", "South Korea"]),
    ("turbine", &["Germany", "India", "China"]),
    ("cables", &["China", "Germany", "India"]),
    ("transformer", &["China", "Germany", "India"]),
    ("insulation", &["China", "Germany"]),
    ("pumps", &["Germany", "India", "China"]),
    // 建筑
    ("cement", &["India", "China", "Vietnam"]),
    ("lumber", &["Vietnam", "Malaysia", "Indonesia"]),
    // 食品饮料
    ("packaging materials", &["China", "Vietnam", "India"]),
    ("food-grade", &["Germany", "USA", "China"]),
    ("flavoring", &["China", "India", "Germany"]),
    ("preservatives", &["China", "Germany", "India"]),
    ("enzymes", &["Germany", "China", "Denmark"]),
    ("sweeteners", &["China", "India"]),
    ("fats", &["Malaysia", "Indonesia", "India"]),
    ("starches", &["China", "India", "USA"]),
    ("agricultural", &["India", "Vietnam", "Thailand"]),
    // 纺织
    ("cotton", &["India", "China", "Bangladesh"]),
    ("synthetic fibers", &["China", "India", "Vietnam"]),
    ("dyes", &["India", "China", "Germany"]),
    ("elastane", &["China", "South Korea"]),
    // 化工
    ("solvents", &["Germany", "China", "India"]),
    ("catalysts", &["Germany", "Japan", "China"]),
    ("surfactants", &["Germany", "China", "India"]),
    ("petrochemicals", &["China", "India", "South Korea"]),
    ("specialty gases", &["Germany", "Japan", "South Korea"]),
    // 物流
    ("lubricants", &["Germany", "China", "India"]),
    ("conveyor", &["Germany", "China", "India"]),
    ("warehouse", &["China", "Germany", "South Korea"]),
    ("pallets", &["China", "Vietnam", "India"]),
];

/// 该国是否为原材料标签所命中关键词的主产国
fn leading_sources_for(material_lower: &str, country: &str) -> bool {
    MATERIAL_SOURCE_COUNTRIES
        .iter()
        .any(|(keyword, countries)| {
            material_lower.contains(keyword) && countries.iter().any(|c| *c == country)
        })
}

/// 去重并保持首次出现顺序
fn dedup_preserving_order(reasons: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(reasons.len());
    for reason in reasons {
        if !seen.contains(&reason) {
            seen.push(reason);
        }
    }
    seen
}

/// 单个供应商的打分中间结果
#[derive(Debug, Clone)]
struct ScoredSupplier<'a> {
    supplier: &'a SupplierProfile,
    score: f64,
    reasons: Vec<String>,
    risk_level: RiskLevel,
    factors: Option<&'a CountryFactors>,
}

// ==========================================
// SupplierRanker
// ==========================================
pub struct SupplierRanker {
    limit: usize,
}

impl Default for SupplierRanker {
    fn default() -> Self {
        Self::new(5)
    }
}

impl SupplierRanker {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// 按偏好排序供应商群体
    ///
    /// # 参数
    /// - `country_signals`: 已存储国家风险 (缺失按 5.0)
    /// - `country_factors`: 国家物流因素 (缺失按 20 天海运)
    ///
    /// # 返回
    /// 按匹配分降序的前 N 条推荐, 排名从 1 开始
    pub fn rank(
        &self,
        suppliers: &[SupplierProfile],
        schedules: &[ScheduleFact],
        country_signals: &[CountrySignal],
        country_factors: &[CountryFactors],
        preference: &PreferenceProfile,
    ) -> Vec<SupplierRecommendation> {
        let factors_by_country: HashMap<&str, &CountryFactors> = country_factors
            .iter()
            .map(|f| (f.country.as_str(), f))
            .collect();
        let risk_by_country: HashMap<&str, f64> = country_signals
            .iter()
            .map(|s| (s.country.as_str(), s.risk_score))
            .collect();

        // 每个供应商的 (总数, 延期数)
        let mut schedule_stats: HashMap<i64, (usize, usize)> = HashMap::new();
        for fact in schedules {
            let entry = schedule_stats.entry(fact.supplier_id).or_insert((0, 0));
            entry.0 += 1;
            if fact.is_delayed() {
                entry.1 += 1;
            }
        }

        let mut scored: Vec<ScoredSupplier> = suppliers
            .iter()
            .map(|supplier| {
                let (total, delayed) = schedule_stats
                    .get(&supplier.id)
                    .copied()
                    .unwrap_or((0, 0));
                let delay_pct = if total > 0 {
                    delayed as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                let factors = factors_by_country.get(supplier.country.as_str()).copied();
                let risk_score = risk_by_country
                    .get(supplier.country.as_str())
                    .copied()
                    .unwrap_or(NEUTRAL_COUNTRY_RISK);

                self.score_supplier(supplier, delay_pct, risk_score, factors, preference)
            })
            .collect();

        // 稳定排序: 同分保持输入顺序
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(self.limit)
            .enumerate()
            .map(|(i, item)| SupplierRecommendation {
                rank: i + 1,
                supplier_id: item.supplier.id,
                supplier_name: item.supplier.supplier_name.clone(),
                country: item.supplier.country.clone(),
                industry: item.supplier.industry.clone(),
                match_score: round_to(item.score, 3),
                match_reasons: if item.reasons.is_empty() {
                    vec![DEFAULT_MATCH_REASON.to_string()]
                } else {
                    item.reasons
                },
                reliability_score: item.supplier.reliability_score,
                avg_delivery_days: item.supplier.average_delivery_time,
                shipping_cost_usd_per_kg: item.factors.map(|f| f.shipping_cost_usd_per_kg),
                avg_shipping_days: item.factors.map(|f| f.avg_shipping_days),
                risk_level: item.risk_level,
            })
            .collect()
    }

    fn score_supplier<'a>(
        &self,
        supplier: &'a SupplierProfile,
        delay_pct: f64,
        risk_score: f64,
        factors: Option<&'a CountryFactors>,
        preference: &PreferenceProfile,
    ) -> ScoredSupplier<'a> {
        let shipping_days = factors
            .map(|f| f.avg_shipping_days)
            .unwrap_or(DEFAULT_SHIPPING_DAYS);

        let base = (supplier.reliability_score / 100.0) * 0.35
            + (1.0 - (risk_score / 10.0).min(1.0)) * 0.25
            + (1.0 - (shipping_days as f64 / 30.0).min(1.0)) * 0.20
            + (1.0 - (delay_pct / 100.0).min(1.0)) * 0.20;

        let mut reasons = Vec::new();

        let country_boost = if preference.prefers_country(&supplier.country) {
            reasons.push(format!(
                "Matches your preferred source country ({})",
                supplier.country
            ));
            PREFERRED_COUNTRY_BOOST
        } else {
            0.0
        };

        // 每个命中的原材料都给出理由, 加成只计一次
        let mut material_boost: f64 = 0.0;
        for material in &preference.raw_materials {
            if leading_sources_for(&material.to_lowercase(), &supplier.country) {
                material_boost = MATERIAL_SOURCE_BOOST;
                reasons.push(format!(
                    "{} is a leading source for {}",
                    supplier.country, material
                ));
            }
        }

        let industry_boost = match (&supplier.industry, &preference.company_type) {
            (Some(industry), Some(company_type))
                if industry.to_lowercase() == company_type.to_lowercase() =>
            {
                reasons.push(format!(
                    "Serves the {} industry — matches your company type",
                    industry
                ));
                INDUSTRY_MATCH_BOOST
            }
            _ => 0.0,
        };

        let score = (base + country_boost + material_boost + industry_boost).min(1.0);

        if supplier.reliability_score >= 90.0 {
            reasons.push(format!(
                "High reliability ({:.0}%)",
                supplier.reliability_score
            ));
        }
        if shipping_days <= 14 {
            reasons.push(format!("Fast shipping: ~{} days", shipping_days));
        }
        if factors.map(|f| f.has_fta).unwrap_or(false) {
            reasons.push("Free Trade Agreement in place — lower tariff burden".to_string());
        }
        if risk_score <= 3.0 {
            reasons.push(format!("Low geopolitical risk ({:?}/10)", risk_score));
        } else if risk_score >= 7.0 {
            reasons.push(format!(
                "⚠ High geopolitical risk ({:?}/10) — consider diversification",
                risk_score
            ));
        }

        ScoredSupplier {
            supplier,
            score,
            reasons: dedup_preserving_order(reasons),
            risk_level: RiskLevel::from_country_risk(risk_score),
            factors,
        }
    }
}
