// ==========================================
// 采购风险评估 - 模板化摘要
// ==========================================
// 职责: 单供应商 / 全局 / 推荐三类确定性摘要文本
// 说明: 文本生成服务不可用时单供应商分析必须回退到这里
// ==========================================

use crate::domain::analysis::{
    CostImpact, EnsembleResult, FleetAlternative, GeoRiskSignal, ScheduleMetrics,
    SupplierRecommendation,
};
use crate::domain::types::RiskLevel;
use crate::i18n::{t, t_with_args};

/// 金额格式化: 千分位 + 两位小数 (1234567.8 → "1,234,567.80")
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if amount < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

pub struct NarrativeComposer {
    locale: String,
}

impl NarrativeComposer {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    /// 单供应商分析摘要
    pub fn supplier_summary(
        &self,
        supplier_name: &str,
        country: &str,
        schedule: &ScheduleMetrics,
        ensemble: &EnsembleResult,
        cost_impact: &CostImpact,
        geo: &GeoRiskSignal,
    ) -> String {
        let body = t_with_args(
            &self.locale,
            "narrative.supplier_summary",
            &[
                ("name", supplier_name),
                ("country", country),
                ("delayed", &schedule.delayed_count.to_string()),
                ("total", &schedule.total_count.to_string()),
                ("delay_pct", &format!("{:.1}", schedule.delay_percent)),
                ("avg_delay", &format!("{:.1}", schedule.avg_delay_days)),
                ("score", &format!("{:.3}", ensemble.final_score)),
                ("confidence", ensemble.confidence.as_str()),
                ("cv", &format!("{:.3}", ensemble.coefficient_of_variation)),
                ("cost", &format_currency(cost_impact.estimated_cost)),
                ("country_risk", &format!("{:.1}", geo.risk_score_raw)),
                ("provenance", geo.provenance.as_str()),
            ],
        );

        let verdict = if ensemble.high_uncertainty {
            t(&self.locale, "narrative.disagreement")
        } else {
            t(&self.locale, "narrative.agreement")
        };

        format!("{}{}", body, verdict)
    }

    /// 无交付记录时的摘要
    pub fn no_schedule_data(&self, supplier_name: &str) -> String {
        t_with_args(
            &self.locale,
            "narrative.no_schedule_data",
            &[("name", supplier_name)],
        )
    }

    pub fn fleet_alternative_reason(
        &self,
        reliability_score: f64,
        delivery_days: i64,
        country: &str,
    ) -> String {
        t_with_args(
            &self.locale,
            "narrative.fleet_alternative_reason",
            &[
                ("reliability", &format!("{:?}", reliability_score)),
                ("delivery_days", &delivery_days.to_string()),
                ("country", country),
            ],
        )
    }

    /// 全局分析摘要
    pub fn fleet_summary(
        &self,
        risk_level: RiskLevel,
        delayed: usize,
        total: usize,
        cost_impact: f64,
        high_risk_countries: &[String],
        alternatives: &[FleetAlternative],
    ) -> String {
        let mut summary = t_with_args(
            &self.locale,
            "narrative.fleet_summary",
            &[
                ("level", &risk_level.as_str().to_uppercase()),
                ("delayed", &delayed.to_string()),
                ("total", &total.to_string()),
                ("cost", &format_currency(cost_impact)),
            ],
        );

        if !high_risk_countries.is_empty() {
            summary.push_str(&t_with_args(
                &self.locale,
                "narrative.fleet_high_risk",
                &[("countries", &high_risk_countries.join(", "))],
            ));
        }

        if alternatives.is_empty() {
            summary.push_str(&t(&self.locale, "narrative.fleet_no_alternatives"));
        } else {
            let avg_reliability = alternatives.iter().map(|a| a.reliability_score).sum::<f64>()
                / alternatives.len() as f64;
            summary.push_str(&t_with_args(
                &self.locale,
                "narrative.fleet_alternatives",
                &[
                    ("count", &alternatives.len().to_string()),
                    ("avg_reliability", &format!("{:.1}", avg_reliability)),
                ],
            ));
        }

        summary
    }

    /// 推荐摘要
    pub fn recommendation_summary(
        &self,
        raw_materials: &[String],
        preferred_countries: &[String],
        recommendations: &[SupplierRecommendation],
    ) -> String {
        let Some(top) = recommendations.first() else {
            return t(&self.locale, "narrative.recommend_empty");
        };

        let materials = if raw_materials.is_empty() {
            t(&self.locale, "narrative.recommend_materials_default")
        } else {
            raw_materials.join(", ")
        };
        let preferred = if preferred_countries.is_empty() {
            String::new()
        } else {
            t_with_args(
                &self.locale,
                "narrative.recommend_preferred",
                &[("countries", &preferred_countries.join(", "))],
            )
        };

        t_with_args(
            &self.locale,
            "narrative.recommend_summary",
            &[
                ("materials", &materials),
                ("preferred", &preferred),
                ("count", &recommendations.len().to_string()),
                ("name", &top.supplier_name),
                ("country", &top.country),
                ("score", &format!("{:.2}", top.match_score)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::IndividualScore;
    use crate::domain::types::{AgentKind, Confidence, Provenance};

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(999.5), "999.50");
        assert_eq!(format_currency(1234.0), "1,234.00");
        assert_eq!(format_currency(1234567.891), "1,234,567.89");
        assert_eq!(format_currency(-45000.0), "-45,000.00");
    }

    fn ensemble(high_uncertainty: bool) -> EnsembleResult {
        EnsembleResult {
            final_score: 0.4312,
            coefficient_of_variation: if high_uncertainty { 0.42 } else { 0.12 },
            high_uncertainty,
            confidence: if high_uncertainty {
                Confidence::Low
            } else {
                Confidence::High
            },
            n_agents: 3,
            individual_scores: vec![IndividualScore {
                agent: AgentKind::ScheduleVariance,
                score: 0.4312,
            }],
        }
    }

    fn schedule() -> ScheduleMetrics {
        ScheduleMetrics {
            avg_delay_days: 12.5,
            delay_percent: 40.0,
            risk_level: RiskLevel::Medium,
            r_schedule: 0.4167,
            spi: 0.6154,
            sv_days: -12.5,
            disruption_threshold_days: 30.0,
            delayed_count: 4,
            total_count: 10,
        }
    }

    fn geo() -> GeoRiskSignal {
        GeoRiskSignal {
            headline: "h".to_string(),
            source_url: String::new(),
            r_external: 0.5,
            risk_score_raw: 5.0,
            event_count: 0,
            provenance: Provenance::Default,
        }
    }

    #[test]
    fn test_supplier_summary_template() {
        let composer = NarrativeComposer::new("en");
        let summary = composer.supplier_summary(
            "Delta Forge",
            "India",
            &schedule(),
            &ensemble(false),
            &CostImpact::usd(125000.0),
            &geo(),
        );
        assert_eq!(
            summary,
            "Analysis of Delta Forge (India): 4/10 equipment items delayed (40.0%), avg delay 12.5 days. \
Ensemble risk score 0.431 (confidence: high, CV=0.120). Cost impact: $125,000.00. \
Country risk 5.0/10 [default]. Agents in agreement."
        );

        let flagged = composer.supplier_summary(
            "Delta Forge",
            "India",
            &schedule(),
            &ensemble(true),
            &CostImpact::usd(0.0),
            &geo(),
        );
        assert!(flagged.ends_with("⚠ High agent disagreement — review manually."));
    }

    #[test]
    fn test_fleet_summary() {
        let composer = NarrativeComposer::new("en");
        let alternatives = vec![
            FleetAlternative {
                supplier_id: 1,
                supplier_name: "A".to_string(),
                country: "Japan".to_string(),
                reliability_score: 92.0,
                average_delivery_time: 14,
                cost_competitiveness: "high".to_string(),
                reason: String::new(),
            },
            FleetAlternative {
                supplier_id: 2,
                supplier_name: "B".to_string(),
                country: "Germany".to_string(),
                reliability_score: 85.0,
                average_delivery_time: 21,
                cost_competitiveness: "medium".to_string(),
                reason: String::new(),
            },
        ];
        let summary = composer.fleet_summary(
            RiskLevel::High,
            3,
            8,
            54321.0,
            &["Russia".to_string()],
            &alternatives,
        );
        assert_eq!(
            summary,
            "Global supply chain analysis: HIGH risk. 3/8 items delayed, cost impact $54,321.00. \
High-risk countries: Russia. 2 alternative suppliers available (avg reliability 88.5%)."
        );

        let none = composer.fleet_summary(RiskLevel::Low, 0, 0, 0.0, &[], &[]);
        assert!(none.ends_with("No alternative suppliers currently available meeting criteria."));
    }

    #[test]
    fn test_alternative_reason_keeps_decimal() {
        let composer = NarrativeComposer::new("en");
        assert_eq!(
            composer.fleet_alternative_reason(92.0, 14, "Japan"),
            "High reliability (92.0%), 14-day delivery, located in Japan"
        );
    }

    #[test]
    fn test_recommendation_summary() {
        let composer = NarrativeComposer::new("en");
        assert_eq!(
            composer.recommendation_summary(&[], &[], &[]),
            "No supplier recommendations available yet."
        );

        let rec = SupplierRecommendation {
            rank: 1,
            supplier_id: 4,
            supplier_name: "Gamma".to_string(),
            country: "Taiwan".to_string(),
            industry: None,
            match_score: 0.876,
            match_reasons: vec![],
            reliability_score: 95.0,
            avg_delivery_days: 12,
            shipping_cost_usd_per_kg: None,
            avg_shipping_days: None,
            risk_level: RiskLevel::Low,
        };
        assert_eq!(
            composer.recommendation_summary(
                &["semiconductors".to_string()],
                &["Taiwan".to_string(), "Japan".to_string()],
                &[rec.clone()]
            ),
            "Based on your raw material needs (semiconductors) and preferred source countries (Taiwan, Japan), \
we recommend 1 suppliers. Top pick: Gamma (Taiwan) with a match score of 0.88."
        );
        assert!(composer
            .recommendation_summary(&[], &[], &[rec])
            .starts_with("Based on your raw material needs (your specified materials) and we recommend"));
    }

    #[test]
    fn test_recommendation_summary_keeps_material_tags_verbatim() {
        let composer = NarrativeComposer::new("en");
        let rec = SupplierRecommendation {
            rank: 1,
            supplier_id: 9,
            supplier_name: "Osaka Precision".to_string(),
            country: "Japan".to_string(),
            industry: None,
            match_score: 0.5,
            match_reasons: vec![],
            reliability_score: 90.0,
            avg_delivery_days: 14,
            shipping_cost_usd_per_kg: None,
            avg_shipping_days: None,
            risk_level: RiskLevel::Low,
        };
        let summary =
            composer.recommendation_summary(&["Grade %{name} steel".to_string()], &[], &[rec]);
        assert!(summary.starts_with("Based on your raw material needs (Grade %{name} steel) and"));
        assert!(summary.contains("Top pick: Osaka Precision (Japan)"));

        let supplier = composer.supplier_summary(
            "%{country} Works",
            "India",
            &schedule(),
            &ensemble(false),
            &CostImpact::usd(0.0),
            &geo(),
        );
        assert!(supplier.starts_with("Analysis of %{country} Works (India):"));
    }
}
