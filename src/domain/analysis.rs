// ==========================================
// 采购风险评估 - 分析结果值对象
// ==========================================
// 职责: 智能体评分 / 集成结果 / 单供应商分析 / 全局分析 / 推荐
// 红线: 均为按需计算的值类型, 评分核心不负责持久化
// ==========================================

use crate::domain::country::CountryFactors;
use crate::domain::types::{AgentKind, Confidence, Provenance, RiskLevel};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// AgentScore - 单个智能体输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentScore {
    pub agent: AgentKind,
    /// 风险分 ∈ [0, 1], 已保留 4 位小数
    pub score: f64,
    /// 可解释性说明
    pub reasoning: String,
}

/// 集成结果中按插入顺序展示的单项分数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualScore {
    pub agent: AgentKind,
    pub score: f64,
}

// ==========================================
// EnsembleResult - 集成聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub final_score: f64,
    pub coefficient_of_variation: f64,
    pub high_uncertainty: bool,
    /// 分歧度的反向指标, 见 Confidence
    pub confidence: Confidence,
    pub n_agents: usize,
    pub individual_scores: Vec<IndividualScore>,
}

impl EnsembleResult {
    pub fn score_of(&self, agent: AgentKind) -> Option<f64> {
        self.individual_scores
            .iter()
            .find(|s| s.agent == agent)
            .map(|s| s.score)
    }
}

// ==========================================
// 单供应商分析
// ==========================================

/// 内部进度指标 (EVM)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    pub avg_delay_days: f64,
    pub delay_percent: f64,
    pub risk_level: RiskLevel,
    pub r_schedule: f64,
    pub spi: f64,
    /// 进度偏差 (天), 负数表示落后
    pub sv_days: f64,
    pub disruption_threshold_days: f64,
    pub delayed_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostImpact {
    pub currency: String,
    pub estimated_cost: f64,
}

impl CostImpact {
    pub fn usd(estimated_cost: f64) -> Self {
        Self {
            currency: "USD".to_string(),
            estimated_cost,
        }
    }
}

/// 外部地缘信号 (带来源标记)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRiskSignal {
    pub headline: String,
    pub source_url: String,
    /// 归一化国家风险 (0~1)
    pub r_external: f64,
    /// 原始国家风险 (0~10)
    pub risk_score_raw: f64,
    pub event_count: u32,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSupplier {
    pub id: i64,
    pub name: String,
    pub country: String,
    /// 可靠性分
    pub score: f64,
    pub industry: Option<String>,
    pub same_industry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAnalysis {
    pub analysis_id: String,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub country: String,
    pub schedule: ScheduleMetrics,
    pub cost_impact: CostImpact,
    pub agent_scores: Vec<AgentScore>,
    pub ensemble: EnsembleResult,
    pub geo_risk: Option<GeoRiskSignal>,
    pub alternatives: Vec<AlternativeSupplier>,
    pub summary: String,
    pub confidence: Confidence,
    pub generated_at: NaiveDateTime,
}

// ==========================================
// 全局 (供应链整体) 分析
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAlternative {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub country: String,
    pub reliability_score: f64,
    pub average_delivery_time: i64,
    pub cost_competitiveness: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAnalysis {
    pub schedule_risk: RiskLevel,
    pub delayed_equipment_count: usize,
    pub total_equipment_count: usize,
    pub cost_impact: f64,
    pub high_risk_countries: Vec<String>,
    pub alternative_suppliers: Vec<FleetAlternative>,
    pub executive_summary: String,
}

// ==========================================
// 替代供应商推荐
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecommendation {
    /// 排名 (从 1 开始)
    pub rank: usize,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub country: String,
    pub industry: Option<String>,
    /// 匹配分 (0~1, 越高越好)
    pub match_score: f64,
    pub match_reasons: Vec<String>,
    pub reliability_score: f64,
    pub avg_delivery_days: i64,
    pub shipping_cost_usd_per_kg: Option<f64>,
    pub avg_shipping_days: Option<i64>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub raw_materials: Vec<String>,
    pub preferred_countries: Vec<String>,
    pub recommendations: Vec<SupplierRecommendation>,
    pub summary: String,
}

// ==========================================
// 供应商总览
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierCard {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub country: String,
    pub continent: String,
    pub industry: Option<String>,
    pub reliability_score: f64,
    pub avg_delivery_days: i64,
    pub cost_competitiveness: String,
    pub total_schedules: usize,
    pub delayed_count: usize,
    pub delay_pct: f64,
    pub avg_delay_days: f64,
    pub country_factors: Option<CountryFactors>,
    pub country_risk_score: Option<f64>,
    pub country_risk_headline: Option<String>,
    /// 综合分 (越低越好)
    pub composite_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOverview {
    pub suppliers: Vec<SupplierCard>,
    pub grouped_by_country: BTreeMap<String, Vec<SupplierCard>>,
}

// ==========================================
// 国家信号刷新
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshedCountry {
    pub country: String,
    pub risk_score: f64,
    pub headline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCountry {
    pub country: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub updated: usize,
    pub skipped: usize,
    pub results: Vec<RefreshedCountry>,
    pub skipped_details: Vec<SkippedCountry>,
}
