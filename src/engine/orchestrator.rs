// ==========================================
// 采购风险评估 - 分析编排器
// ==========================================
// 用途: 协调 信号解析 → 智能体 → 集成聚合 → 摘要 的执行顺序
// 路径:
//   1. 单供应商深度分析 (进度指标 / 地缘信号 / 三智能体 / 集成 / 替代供应商)
//   2. 全局分析 (延期与成本汇总 / 高风险国家 / 替代供应商)
//   3. 偏好推荐 / 供应商总览 / 国家信号刷新
// 红线: 外部数据失败只降级不报错; 唯一对外可见的失败是供应商不存在
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::domain::analysis::{
    AlternativeSupplier, CostImpact, FleetAlternative, FleetAnalysis, RecommendationReport,
    RefreshReport, RefreshedCountry, SkippedCountry, SupplierAnalysis, SupplierOverview,
};
use crate::domain::country::CountrySignal;
use crate::domain::preference::PreferenceProfile;
use crate::domain::supplier::{SupplierFilter, SupplierProfile};
use crate::domain::types::{Confidence, Provenance, RiskLevel};
use crate::engine::agents::{
    AgentEvidence, GeopoliticalEvidence, ReliabilityEvidence, RiskAgentEngine, ScheduleEvidence,
};
use crate::engine::ensemble::EnsembleAggregator;
use crate::engine::narrative::NarrativeComposer;
use crate::engine::overview::SupplierOverviewBuilder;
use crate::engine::ranker::SupplierRanker;
use crate::engine::repositories::{CountrySignalWriter, RiskDataStore};
use crate::engine::schedule_metrics::{delayed_cost_impact, ScheduleMetricsCalculator};
use crate::engine::signal_resolver::{stability_to_risk, SignalResolver, NEUTRAL_COUNTRY_RISK};
use crate::engine::signals::{
    DisabledNarrative, EventFeed, FetchOutcome, NarrativeContext, NarrativeGenerator,
    OfflineEventFeed, OfflineStabilityFeed, StabilityFeed,
};
use crate::repository::{RepositoryError, RepositoryResult};

/// 全局分析: 高风险国家阈值 (国家风险 0~10)
pub const HIGH_RISK_COUNTRY_THRESHOLD: f64 = 7.0;
/// 全局分析: 替代供应商最低可靠性
pub const FLEET_ALTERNATIVE_MIN_RELIABILITY: f64 = 80.0;
/// 单供应商分析: 同行业替代供应商的可靠性容差
pub const SAME_INDUSTRY_RELIABILITY_TOLERANCE: f64 = 5.0;
/// 刷新结果中标题的最大长度
const REFRESH_HEADLINE_MAX_CHARS: usize = 120;

// ==========================================
// AnalysisOrchestrator - 分析编排器
// ==========================================
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
    store: Arc<dyn RiskDataStore>,
    stability_feed: Arc<dyn StabilityFeed>,
    resolver: SignalResolver,
    narrative_generator: Arc<dyn NarrativeGenerator>,
    agents: RiskAgentEngine,
    aggregator: EnsembleAggregator,
    metrics: ScheduleMetricsCalculator,
    ranker: SupplierRanker,
    overview: SupplierOverviewBuilder,
    composer: NarrativeComposer,
}

impl AnalysisOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 显式分析配置 (构造后不再变化)
    /// - store: 持久化协作者
    /// - stability_feed / event_feed: 外部信号源
    /// - narrative_generator: 可选文本生成 (不可用时使用模板)
    pub fn new(
        config: AnalysisConfig,
        store: Arc<dyn RiskDataStore>,
        stability_feed: Arc<dyn StabilityFeed>,
        event_feed: Arc<dyn EventFeed>,
        narrative_generator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            resolver: SignalResolver::new(stability_feed.clone(), event_feed, store.clone()),
            agents: RiskAgentEngine::new(config.disruption_threshold_days),
            aggregator: EnsembleAggregator::new(),
            metrics: ScheduleMetricsCalculator::new(config.disruption_threshold_days),
            ranker: SupplierRanker::new(config.recommendation_limit),
            overview: SupplierOverviewBuilder::new(config.disruption_threshold_days),
            composer: NarrativeComposer::new(config.narrative_locale.clone()),
            stability_feed,
            narrative_generator,
            store,
            config,
        }
    }

    /// 离线编排器: 外部数据源全部关闭, 只使用已存储记录
    pub fn offline(config: AnalysisConfig, store: Arc<dyn RiskDataStore>) -> Self {
        Self::new(
            config,
            store,
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            Arc::new(DisabledNarrative),
        )
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    // ==========================================
    // 单供应商深度分析
    // ==========================================

    pub async fn analyze_supplier(&self, supplier_id: i64) -> RepositoryResult<SupplierAnalysis> {
        self.analyze_supplier_at(supplier_id, Self::today()).await
    }

    /// 以指定日期为"今天"执行单供应商分析 (在途逾期按该日期计算)
    pub async fn analyze_supplier_at(
        &self,
        supplier_id: i64,
        today: NaiveDate,
    ) -> RepositoryResult<SupplierAnalysis> {
        info!(supplier_id, "开始单供应商风险分析");

        let supplier = self
            .store
            .get_supplier_profile(supplier_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Supplier".to_string(),
                id: supplier_id.to_string(),
            })?;

        let facts = self.store.get_schedule_facts(supplier_id)?;
        if facts.is_empty() {
            return Ok(self.analyze_without_schedule(&supplier));
        }

        // 1. 内部进度指标
        let schedule = self
            .metrics
            .compute(&facts, supplier.average_delivery_time, today);
        let cost_impact = delayed_cost_impact(&facts);

        // 2. 外部地缘信号 (实时 → 已存储 → 默认)
        let geo = self.resolver.resolve_geo_signal(&supplier.country).await;

        // 3. 三个独立智能体
        let evidence = AgentEvidence {
            schedule: ScheduleEvidence {
                delay_days: schedule.avg_delay_days,
                spi: schedule.spi,
                r_schedule: schedule.r_schedule,
            },
            geopolitical: GeopoliticalEvidence {
                country_risk_score: geo.risk_score_raw,
                headline: geo.headline.clone(),
                r_external: geo.r_external,
                event_count: geo.event_count,
            },
            reliability: ReliabilityEvidence {
                reliability_score: supplier.reliability_score,
                avg_delivery_time: supplier.average_delivery_time,
                delay_days: schedule.avg_delay_days,
                delay_percent: schedule.delay_percent,
            },
        };
        let agent_scores = self.agents.evaluate_all(&evidence);

        // 4. 集成聚合
        let ensemble = self.aggregator.aggregate(&agent_scores);

        // 5. 摘要: 文本生成优先, 不可用时使用模板
        let context = NarrativeContext {
            supplier_name: supplier.supplier_name.clone(),
            country: supplier.country.clone(),
            agent_scores: agent_scores.clone(),
            ensemble: ensemble.clone(),
        };
        let summary = match self.narrative_generator.generate_narrative(&context).await {
            FetchOutcome::Available(text) => text,
            FetchOutcome::Unavailable(reason) => {
                debug!(supplier_id, reason = %reason, "使用模板化摘要");
                self.composer.supplier_summary(
                    &supplier.supplier_name,
                    &supplier.country,
                    &schedule,
                    &ensemble,
                    &cost_impact,
                    &geo,
                )
            }
        };

        // 6. 替代供应商
        let alternatives = self.select_alternatives(&supplier)?;

        info!(
            supplier_id,
            final_score = ensemble.final_score,
            confidence = %ensemble.confidence,
            provenance = %geo.provenance,
            "单供应商风险分析完成"
        );

        Ok(SupplierAnalysis {
            analysis_id: Uuid::new_v4().to_string(),
            supplier_id: supplier.id,
            supplier_name: supplier.supplier_name.clone(),
            country: supplier.country.clone(),
            schedule,
            cost_impact,
            confidence: ensemble.confidence,
            agent_scores,
            ensemble,
            geo_risk: Some(geo),
            alternatives,
            summary,
            generated_at: Utc::now().naive_utc(),
        })
    }

    /// 无交付记录: 使用中性零延期输入, 仍完整运行集成
    fn analyze_without_schedule(&self, supplier: &SupplierProfile) -> SupplierAnalysis {
        info!(supplier_id = supplier.id, "无交付记录, 使用中性输入");

        let evidence = AgentEvidence {
            schedule: ScheduleEvidence {
                delay_days: 0.0,
                spi: 1.0,
                r_schedule: 0.0,
            },
            geopolitical: GeopoliticalEvidence {
                country_risk_score: NEUTRAL_COUNTRY_RISK,
                headline: "No data".to_string(),
                r_external: 0.5,
                event_count: 0,
            },
            reliability: ReliabilityEvidence {
                reliability_score: supplier.reliability_score,
                avg_delivery_time: supplier.average_delivery_time,
                delay_days: 0.0,
                delay_percent: 0.0,
            },
        };
        let agent_scores = self.agents.evaluate_all(&evidence);
        let ensemble = self.aggregator.aggregate(&agent_scores);

        SupplierAnalysis {
            analysis_id: Uuid::new_v4().to_string(),
            supplier_id: supplier.id,
            supplier_name: supplier.supplier_name.clone(),
            country: supplier.country.clone(),
            schedule: self.metrics.empty(),
            cost_impact: CostImpact::usd(0.0),
            agent_scores,
            ensemble,
            geo_risk: None,
            alternatives: Vec::new(),
            summary: self.composer.no_schedule_data(&supplier.supplier_name),
            // 无证据: 顶层置信度固定为 low, 集成结果保留自身的 CV 标签
            confidence: Confidence::Low,
            generated_at: Utc::now().naive_utc(),
        }
    }

    /// 替代供应商
    ///
    /// 先取同行业且可靠性不低于 (主体 - 5) 的供应商, 不足时用可靠性更高的供应商补齐
    fn select_alternatives(
        &self,
        subject: &SupplierProfile,
    ) -> RepositoryResult<Vec<AlternativeSupplier>> {
        let limit = self.config.alternative_limit;
        let mut candidates: Vec<SupplierProfile> = self
            .store
            .list_suppliers(&SupplierFilter::default())?
            .into_iter()
            .filter(|s| s.id != subject.id)
            .collect();
        sort_by_reliability_desc(&mut candidates);

        let same_industry: Vec<&SupplierProfile> = match &subject.industry {
            Some(industry) => candidates
                .iter()
                .filter(|s| {
                    s.industry.as_deref() == Some(industry.as_str())
                        && s.reliability_score
                            >= subject.reliability_score - SAME_INDUSTRY_RELIABILITY_TOLERANCE
                })
                .take(limit)
                .collect(),
            None => Vec::new(),
        };
        let same_ids: HashSet<i64> = same_industry.iter().map(|s| s.id).collect();

        let padding: Vec<&SupplierProfile> = candidates
            .iter()
            .filter(|s| {
                s.reliability_score > subject.reliability_score && !same_ids.contains(&s.id)
            })
            .take(limit.saturating_sub(same_industry.len()))
            .collect();

        Ok(same_industry
            .into_iter()
            .chain(padding)
            .map(|s| AlternativeSupplier {
                id: s.id,
                name: s.supplier_name.clone(),
                country: s.country.clone(),
                score: s.reliability_score,
                industry: s.industry.clone(),
                same_industry: same_ids.contains(&s.id),
            })
            .collect())
    }

    // ==========================================
    // 全局分析
    // ==========================================

    pub async fn analyze_fleet(&self) -> RepositoryResult<FleetAnalysis> {
        info!("开始全局供应链风险分析");

        let facts = self.store.list_schedule_facts()?;
        let suppliers = self.store.list_suppliers(&SupplierFilter::default())?;
        let stored_signals = self.store.list_stored_country_signals()?;

        let total = facts.len();
        let delayed: Vec<_> = facts.iter().filter(|f| f.is_delayed()).collect();
        let cost_impact = delayed_cost_impact(&facts).estimated_cost;

        let schedule_risk = if delayed.is_empty() {
            RiskLevel::Low
        } else if (delayed.len() as f64 / total as f64) < 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };

        // 已存储国家在前, 其余供应商国家按首次出现顺序追加
        let mut countries: Vec<String> = Vec::new();
        for country in stored_signals
            .iter()
            .map(|s| &s.country)
            .chain(suppliers.iter().map(|s| &s.country))
        {
            if !countries.iter().any(|c| c.eq_ignore_ascii_case(country)) {
                countries.push(country.clone());
            }
        }

        let resolved = join_all(
            countries
                .iter()
                .map(|country| self.resolver.resolve_country_risk(country)),
        )
        .await;
        let high_risk_countries: Vec<String> = resolved
            .into_iter()
            .filter(|r| r.risk_score >= HIGH_RISK_COUNTRY_THRESHOLD)
            .map(|r| r.country)
            .collect();

        let delayed_supplier_ids: HashSet<i64> = delayed.iter().map(|f| f.supplier_id).collect();

        let mut eligible: Vec<SupplierProfile> = suppliers
            .into_iter()
            .filter(|s| {
                s.reliability_score >= FLEET_ALTERNATIVE_MIN_RELIABILITY
                    && !high_risk_countries
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(&s.country))
                    && !delayed_supplier_ids.contains(&s.id)
            })
            .collect();
        sort_by_reliability_desc(&mut eligible);

        let alternative_suppliers: Vec<FleetAlternative> = eligible
            .into_iter()
            .take(self.config.alternative_limit)
            .map(|s| FleetAlternative {
                reason: self.composer.fleet_alternative_reason(
                    s.reliability_score,
                    s.average_delivery_time,
                    &s.country,
                ),
                supplier_id: s.id,
                supplier_name: s.supplier_name,
                country: s.country,
                reliability_score: s.reliability_score,
                average_delivery_time: s.average_delivery_time,
                cost_competitiveness: s.cost_competitiveness,
            })
            .collect();

        let executive_summary = self.composer.fleet_summary(
            schedule_risk,
            delayed.len(),
            total,
            cost_impact,
            &high_risk_countries,
            &alternative_suppliers,
        );

        info!(
            schedule_risk = %schedule_risk,
            delayed = delayed.len(),
            total,
            high_risk_countries = high_risk_countries.len(),
            "全局供应链风险分析完成"
        );

        Ok(FleetAnalysis {
            schedule_risk,
            delayed_equipment_count: delayed.len(),
            total_equipment_count: total,
            cost_impact,
            high_risk_countries,
            alternative_suppliers,
            executive_summary,
        })
    }

    // ==========================================
    // 偏好推荐
    // ==========================================

    /// 按采购方档案推荐; 无档案时退化为通用排序
    pub fn recommend_for_user(&self, user_id: i64) -> RepositoryResult<RecommendationReport> {
        let preference = match self.store.get_preference_profile(user_id)? {
            Some(profile) => profile,
            None => {
                info!(user_id, "未找到采购方档案, 使用通用排序");
                PreferenceProfile::general()
            }
        };
        self.recommend(&preference)
    }

    pub fn recommend(&self, preference: &PreferenceProfile) -> RepositoryResult<RecommendationReport> {
        let suppliers = self.store.list_suppliers(&SupplierFilter::default())?;
        let schedules = self.store.list_schedule_facts()?;
        let signals = self.store.list_stored_country_signals()?;
        let factors = self.store.list_country_factors()?;

        let recommendations =
            self.ranker
                .rank(&suppliers, &schedules, &signals, &factors, preference);
        let summary = self.composer.recommendation_summary(
            &preference.raw_materials,
            &preference.preferred_countries,
            &recommendations,
        );

        debug!(count = recommendations.len(), "推荐列表生成完成");

        Ok(RecommendationReport {
            raw_materials: preference.raw_materials.clone(),
            preferred_countries: preference.preferred_countries.clone(),
            recommendations,
            summary,
        })
    }

    // ==========================================
    // 供应商总览
    // ==========================================

    pub fn suppliers_overview(&self) -> RepositoryResult<SupplierOverview> {
        self.suppliers_overview_at(Self::today())
    }

    pub fn suppliers_overview_at(&self, today: NaiveDate) -> RepositoryResult<SupplierOverview> {
        let suppliers = self.store.list_suppliers(&SupplierFilter::default())?;
        let schedules = self.store.list_schedule_facts()?;
        let signals = self.store.list_stored_country_signals()?;
        let factors = self.store.list_country_factors()?;

        Ok(self
            .overview
            .build(&suppliers, &schedules, &signals, &factors, today))
    }

    // ==========================================
    // 国家信号刷新
    // ==========================================

    /// 用实时指标 + 近期事件刷新每条已存储国家风险
    ///
    /// 实时指标不可用的国家跳过并记录原因; 事件不可用时保留原标题
    pub async fn refresh_country_signals(
        &self,
        writer: &dyn CountrySignalWriter,
    ) -> RepositoryResult<RefreshReport> {
        let stored = self.store.list_stored_country_signals()?;
        info!(countries = stored.len(), "开始刷新国家风险信号");

        let mut report = RefreshReport::default();

        for record in stored {
            let stability = match self
                .stability_feed
                .fetch_country_stability(&record.country)
                .await
            {
                FetchOutcome::Available(value) => value,
                FetchOutcome::Unavailable(reason) => {
                    warn!(country = %record.country, reason = %reason, "刷新跳过: 实时指标不可用");
                    report.skipped_details.push(SkippedCountry {
                        country: record.country.clone(),
                        reason: "WGI fetch failed".to_string(),
                    });
                    continue;
                }
            };

            let risk_score = stability_to_risk(stability);
            let event = self.resolver.resolve_event_signal(&record.country).await;
            let (headline, source_url) = if event.is_placeholder {
                (record.headline.clone(), record.source_url.clone())
            } else {
                (event.headline, Some(event.source_url))
            };

            writer.store_country_signal(&CountrySignal {
                country: record.country.clone(),
                risk_score,
                headline: headline.clone(),
                source_url,
                provenance: Provenance::LiveService,
                last_updated: Some(Utc::now().naive_utc()),
            })?;

            report.results.push(RefreshedCountry {
                country: record.country,
                risk_score,
                headline: headline.chars().take(REFRESH_HEADLINE_MAX_CHARS).collect(),
            });
        }

        report.updated = report.results.len();
        report.skipped = report.skipped_details.len();

        info!(
            updated = report.updated,
            skipped = report.skipped,
            "国家风险信号刷新完成"
        );
        Ok(report)
    }
}

/// 按可靠性降序 (稳定排序, 同分保持原顺序)
fn sort_by_reliability_desc(suppliers: &mut [SupplierProfile]) {
    suppliers.sort_by(|a, b| {
        b.reliability_score
            .partial_cmp(&a.reliability_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::EventSignal;
    use crate::domain::types::{AgentKind, ScheduleStatus};
    use crate::domain::supplier::ScheduleFact;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ===== 内存仓储 =====
    #[derive(Default)]
    struct MemoryStore {
        suppliers: Vec<SupplierProfile>,
        facts: Vec<ScheduleFact>,
        signals: Mutex<Vec<CountrySignal>>,
        profiles: Vec<(i64, PreferenceProfile)>,
    }

    impl RiskDataStore for MemoryStore {
        fn get_supplier_profile(&self, id: i64) -> RepositoryResult<Option<SupplierProfile>> {
            Ok(self.suppliers.iter().find(|s| s.id == id).cloned())
        }
        fn list_suppliers(&self, filter: &SupplierFilter) -> RepositoryResult<Vec<SupplierProfile>> {
            Ok(self.suppliers.iter().filter(|s| filter.matches(s)).cloned().collect())
        }
        fn get_schedule_facts(&self, id: i64) -> RepositoryResult<Vec<ScheduleFact>> {
            Ok(self.facts.iter().filter(|f| f.supplier_id == id).cloned().collect())
        }
        fn list_schedule_facts(&self) -> RepositoryResult<Vec<ScheduleFact>> {
            Ok(self.facts.clone())
        }
        fn get_stored_country_signal(&self, country: &str) -> RepositoryResult<Option<CountrySignal>> {
            Ok(self
                .signals
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.country.eq_ignore_ascii_case(country))
                .cloned())
        }
        fn list_stored_country_signals(&self) -> RepositoryResult<Vec<CountrySignal>> {
            Ok(self.signals.lock().unwrap().clone())
        }
        fn list_country_factors(&self) -> RepositoryResult<Vec<crate::domain::country::CountryFactors>> {
            Ok(Vec::new())
        }
        fn get_preference_profile(&self, user_id: i64) -> RepositoryResult<Option<PreferenceProfile>> {
            Ok(self
                .profiles
                .iter()
                .find(|(id, _)| *id == user_id)
                .map(|(_, p)| p.clone()))
        }
    }

    impl CountrySignalWriter for MemoryStore {
        fn store_country_signal(&self, signal: &CountrySignal) -> RepositoryResult<()> {
            let mut signals = self.signals.lock().unwrap();
            match signals.iter_mut().find(|s| s.country == signal.country) {
                Some(existing) => *existing = signal.clone(),
                None => signals.push(signal.clone()),
            }
            Ok(())
        }
    }

    // ===== 外部源 =====
    struct FixedStability(Option<f64>);

    #[async_trait]
    impl StabilityFeed for FixedStability {
        async fn fetch_country_stability(&self, _country: &str) -> FetchOutcome<f64> {
            match self.0 {
                Some(v) => FetchOutcome::Available(v),
                None => FetchOutcome::unavailable("down"),
            }
        }
    }

    struct FixedEvents;

    #[async_trait]
    impl EventFeed for FixedEvents {
        fn home_url(&self) -> &str {
            GDELT_HOME
        }
        async fn fetch_recent_events(&self, _country: &str) -> FetchOutcome<EventSignal> {
            FetchOutcome::Available(EventSignal {
                headline: "Port congestion eases".to_string(),
                source_url: "https://news.example/port".to_string(),
                event_count: 4,
                is_placeholder: false,
            })
        }
    }

    const GDELT_HOME: &str = "https://www.gdeltproject.org/";

    struct CannedNarrative;

    #[async_trait]
    impl NarrativeGenerator for CannedNarrative {
        async fn generate_narrative(&self, context: &NarrativeContext) -> FetchOutcome<String> {
            FetchOutcome::Available(format!("Generated for {}", context.supplier_name))
        }
    }

    fn supplier(id: i64, name: &str, country: &str, industry: Option<&str>, rel: f64) -> SupplierProfile {
        SupplierProfile {
            id,
            supplier_name: name.to_string(),
            country: country.to_string(),
            industry: industry.map(str::to_string),
            reliability_score: rel,
            average_delivery_time: 20,
            cost_competitiveness: "medium".to_string(),
        }
    }

    fn fact(id: i64, supplier_id: i64, delay: u64, delayed: bool, value: f64) -> ScheduleFact {
        let planned = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        ScheduleFact {
            id,
            equipment_name: format!("Item {}", id),
            supplier_id,
            planned_delivery_date: planned,
            actual_delivery_date: planned.checked_add_days(chrono::Days::new(delay)),
            equipment_value: value,
            status: if delayed {
                ScheduleStatus::Delayed
            } else {
                ScheduleStatus::OnTime
            },
        }
    }

    fn stored(country: &str, risk: f64) -> CountrySignal {
        CountrySignal {
            country: country.to_string(),
            risk_score: risk,
            headline: format!("{} stored headline", country),
            source_url: Some("https://stored.example".to_string()),
            provenance: Provenance::Stored,
            last_updated: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn sample_store() -> MemoryStore {
        MemoryStore {
            suppliers: vec![
                supplier(1, "Delta Forge", "India", Some("Steel"), 80.0),
                supplier(2, "Kaveri Metals", "India", Some("Steel"), 76.0),
                supplier(3, "Osaka Precision", "Japan", Some("Electronics"), 93.0),
                supplier(4, "Volga Castings", "Russia", Some("Steel"), 88.0),
                supplier(5, "Rhine Works", "Germany", Some("Machinery"), 70.0),
            ],
            facts: vec![
                fact(1, 1, 10, true, 20000.0),
                fact(2, 1, 0, false, 5000.0),
                fact(3, 5, 40, true, 7000.0),
                fact(4, 3, 0, false, 9000.0),
            ],
            signals: Mutex::new(vec![stored("Russia", 8.2), stored("India", 4.5)]),
            profiles: vec![],
        }
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_not_found() {
        let orchestrator =
            AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(sample_store()));
        let err = orchestrator.analyze_supplier(999).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { ref id, .. } if id == "999"));
    }

    #[tokio::test]
    async fn test_supplier_without_schedule_uses_neutral_inputs() {
        let store = sample_store();
        let orchestrator = AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(store));

        // Volga Castings 没有交付记录
        let analysis = orchestrator.analyze_supplier_at(4, today()).await.unwrap();
        assert_eq!(analysis.agent_scores.len(), 3);
        assert_eq!(analysis.agent_scores[0].score, 0.0);
        assert_eq!(analysis.agent_scores[1].score, 0.5);
        assert_eq!(analysis.confidence, Confidence::Low);
        assert!(analysis.geo_risk.is_none());
        assert!(analysis.alternatives.is_empty());
        assert_eq!(analysis.schedule.total_count, 0);
        assert_eq!(analysis.schedule.risk_level, RiskLevel::Low);
        assert_eq!(analysis.schedule.r_schedule, 0.0);
        assert_eq!(analysis.cost_impact.estimated_cost, 0.0);
        // 集成结果完整: (0 + 0.5 + 0.4 * 0.12) / 3
        assert_eq!(analysis.ensemble.n_agents, 3);
        assert_eq!(analysis.ensemble.individual_scores.len(), 3);
        assert!((analysis.ensemble.final_score - 0.1827).abs() < 1e-9);
        assert_eq!(
            analysis.summary,
            "No equipment schedule data available for Volga Castings."
        );
    }

    #[tokio::test]
    async fn test_analysis_offline_uses_stored_signal() {
        let orchestrator =
            AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(sample_store()));
        let analysis = orchestrator.analyze_supplier_at(1, today()).await.unwrap();

        let geo = analysis.geo_risk.as_ref().unwrap();
        assert_eq!(geo.provenance, Provenance::Stored);
        assert_eq!(geo.risk_score_raw, 4.5);
        assert_eq!(geo.r_external, 0.45);
        assert_eq!(geo.headline, "India stored headline");

        let kinds: Vec<AgentKind> = analysis.agent_scores.iter().map(|a| a.agent).collect();
        assert_eq!(
            kinds,
            vec![
                AgentKind::ScheduleVariance,
                AgentKind::GeopoliticalSignal,
                AgentKind::SupplierReliability
            ]
        );
        assert_eq!(analysis.cost_impact.estimated_cost, 20000.0);
        assert_eq!(analysis.confidence, analysis.ensemble.confidence);
        assert!(analysis.summary.starts_with("Analysis of Delta Forge (India)"));
        for score in &analysis.agent_scores {
            assert!((0.0..=1.0).contains(&score.score));
        }
    }

    #[tokio::test]
    async fn test_live_signals_and_generated_narrative() {
        let store: Arc<dyn RiskDataStore> = Arc::new(sample_store());
        let orchestrator = AnalysisOrchestrator::new(
            AnalysisConfig::default(),
            store,
            Arc::new(FixedStability(Some(0.5))),
            Arc::new(FixedEvents),
            Arc::new(CannedNarrative),
        );
        let analysis = orchestrator.analyze_supplier_at(1, today()).await.unwrap();

        let geo = analysis.geo_risk.unwrap();
        assert_eq!(geo.provenance, Provenance::LiveService);
        // 5 - 2*0.5
        assert_eq!(geo.risk_score_raw, 4.0);
        assert_eq!(geo.event_count, 4);
        assert_eq!(geo.headline, "Port congestion eases");
        assert_eq!(analysis.summary, "Generated for Delta Forge");
    }

    #[tokio::test]
    async fn test_alternatives_same_industry_then_padding() {
        let orchestrator =
            AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(sample_store()));
        let analysis = orchestrator.analyze_supplier_at(1, today()).await.unwrap();

        let ids: Vec<i64> = analysis.alternatives.iter().map(|a| a.id).collect();
        // 同行业: Volga(88) / Kaveri(76 >= 75); 补齐: Osaka(93 > 80)
        assert_eq!(ids, vec![4, 2, 3]);
        assert!(analysis.alternatives[0].same_industry);
        assert!(!analysis.alternatives[2].same_industry);
        assert!(analysis.alternatives.iter().all(|a| a.id != 1));
    }

    #[tokio::test]
    async fn test_fleet_analysis() {
        let orchestrator =
            AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(sample_store()));
        let fleet = orchestrator.analyze_fleet().await.unwrap();

        assert_eq!(fleet.total_equipment_count, 4);
        assert_eq!(fleet.delayed_equipment_count, 2);
        assert_eq!(fleet.schedule_risk, RiskLevel::High);
        assert_eq!(fleet.cost_impact, 27000.0);
        assert_eq!(fleet.high_risk_countries, vec!["Russia".to_string()]);

        // Volga 在高风险国家, Delta 有延期, Rhine 可靠性不足
        let ids: Vec<i64> = fleet
            .alternative_suppliers
            .iter()
            .map(|a| a.supplier_id)
            .collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(
            fleet.alternative_suppliers[0].reason,
            "High reliability (93.0%), 20-day delivery, located in Japan"
        );
        assert!(fleet.executive_summary.contains("High-risk countries: Russia."));
    }

    #[tokio::test]
    async fn test_fleet_without_schedules_is_low() {
        let store = MemoryStore {
            suppliers: vec![supplier(1, "Solo", "Japan", None, 60.0)],
            ..Default::default()
        };
        let orchestrator = AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(store));
        let fleet = orchestrator.analyze_fleet().await.unwrap();
        assert_eq!(fleet.schedule_risk, RiskLevel::Low);
        assert_eq!(fleet.total_equipment_count, 0);
        assert!(fleet.high_risk_countries.is_empty());
        assert!(fleet.alternative_suppliers.is_empty());
    }

    #[test]
    fn test_recommend_without_profile_is_general() {
        let orchestrator =
            AnalysisOrchestrator::offline(AnalysisConfig::default(), Arc::new(sample_store()));
        let report = orchestrator.recommend_for_user(42).unwrap();
        assert!(report.raw_materials.is_empty());
        assert!(!report.recommendations.is_empty());
        assert!(report.recommendations.len() <= 5);
        assert_eq!(report.recommendations[0].rank, 1);
    }

    #[tokio::test]
    async fn test_refresh_updates_and_skips() {
        let store = Arc::new(sample_store());
        let live = AnalysisOrchestrator::new(
            AnalysisConfig::default(),
            store.clone(),
            Arc::new(FixedStability(Some(-1.0))),
            Arc::new(OfflineEventFeed),
            Arc::new(DisabledNarrative),
        );
        let report = live.refresh_country_signals(store.as_ref()).await.unwrap();
        assert_eq!(report.updated, 2);
        assert_eq!(report.skipped, 0);
        // 事件不可用: 保留原标题
        assert_eq!(report.results[0].headline, "Russia stored headline");

        let russia = store.get_stored_country_signal("Russia").unwrap().unwrap();
        assert_eq!(russia.risk_score, 7.0);
        assert_eq!(russia.provenance, Provenance::LiveService);

        let offline = AnalysisOrchestrator::offline(AnalysisConfig::default(), store.clone());
        let report = offline.refresh_country_signals(store.as_ref()).await.unwrap();
        assert_eq!(report.updated, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.skipped_details[0].reason, "WGI fetch failed");
    }
}
