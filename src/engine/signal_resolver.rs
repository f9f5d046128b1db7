// ==========================================
// 采购风险评估 - 国家风险信号解析器
// ==========================================
// 职责: 按优先级降级链解析国家风险值, 并附带来源标记
// 降级链: 实时稳定性指标 → 已存储记录 → 中性默认值 5.0
// 红线: 永不返回错误; 每一层失败只记录日志后降级到下一层
// ==========================================

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::analysis::GeoRiskSignal;
use crate::domain::country::{CountrySignal, EventSignal};
use crate::domain::types::Provenance;
use crate::engine::agents::{clamp01, round2, round4};
use crate::engine::repositories::RiskDataStore;
use crate::engine::signals::{EventFeed, FetchOutcome, StabilityFeed};

/// 无任何数据时的中性国家风险
pub const NEUTRAL_COUNTRY_RISK: f64 = 5.0;

/// 稳定性指标 (约 -2.5 ~ +2.5, 越高越稳定) → 风险 (0 ~ 10)
pub fn stability_to_risk(stability: f64) -> f64 {
    round2((5.0 - 2.0 * stability).clamp(0.0, 10.0))
}

/// 国家风险 (0~10) → 归一化外部风险 (0~1)
pub fn normalize_country_risk(risk_score: f64) -> f64 {
    round4(clamp01(risk_score / 10.0))
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCountryRisk {
    pub country: String,
    /// 风险值 (0~10)
    pub risk_score: f64,
    pub provenance: Provenance,
    /// 已存储记录 (若存在), 供标题回退使用
    pub stored: Option<CountrySignal>,
}

// ==========================================
// SignalResolver
// ==========================================
pub struct SignalResolver {
    stability_feed: Arc<dyn StabilityFeed>,
    event_feed: Arc<dyn EventFeed>,
    store: Arc<dyn RiskDataStore>,
}

impl SignalResolver {
    pub fn new(
        stability_feed: Arc<dyn StabilityFeed>,
        event_feed: Arc<dyn EventFeed>,
        store: Arc<dyn RiskDataStore>,
    ) -> Self {
        Self {
            stability_feed,
            event_feed,
            store,
        }
    }

    /// 已存储记录层; 读取失败按"无记录"处理
    fn stored_signal(&self, country: &str) -> Option<CountrySignal> {
        match self.store.get_stored_country_signal(country) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(country, error = %e, "读取已存储国家风险失败, 跳过该层");
                None
            }
        }
    }

    /// 解析国家风险值 (0~10) 及来源
    pub async fn resolve_country_risk(&self, country: &str) -> ResolvedCountryRisk {
        let live = self.stability_feed.fetch_country_stability(country).await;
        self.resolve_with_live(country, live)
    }

    fn resolve_with_live(&self, country: &str, live: FetchOutcome<f64>) -> ResolvedCountryRisk {
        let stored = self.stored_signal(country);

        let (risk_score, provenance) = match (live, &stored) {
            (FetchOutcome::Available(stability), _) => {
                (stability_to_risk(stability), Provenance::LiveService)
            }
            (FetchOutcome::Unavailable(reason), Some(record)) => {
                debug!(country, reason = %reason, "实时指标不可用, 使用已存储记录");
                (record.risk_score, Provenance::Stored)
            }
            (FetchOutcome::Unavailable(reason), None) => {
                debug!(country, reason = %reason, "实时指标与已存储记录均不可用, 使用中性默认值");
                (NEUTRAL_COUNTRY_RISK, Provenance::Default)
            }
        };

        debug!(country, risk_score, provenance = %provenance, "国家风险解析完成");

        ResolvedCountryRisk {
            country: country.to_string(),
            risk_score,
            provenance,
            stored,
        }
    }

    /// 近期事件; 不可用时返回确定性占位 (事件数 0)
    pub async fn resolve_event_signal(&self, country: &str) -> EventSignal {
        let outcome = self.event_feed.fetch_recent_events(country).await;
        self.event_or_placeholder(country, outcome)
    }

    fn event_or_placeholder(&self, country: &str, outcome: FetchOutcome<EventSignal>) -> EventSignal {
        match outcome {
            FetchOutcome::Available(signal) => signal,
            FetchOutcome::Unavailable(reason) => {
                debug!(country, reason = %reason, "事件源不可用, 使用占位信息");
                EventSignal::placeholder(country, self.event_feed.home_url())
            }
        }
    }

    /// 组装单供应商分析所需的地缘信号
    ///
    /// 两个外部请求并发执行; 标题优先级: 实时事件 → 已存储记录 → 固定提示
    pub async fn resolve_geo_signal(&self, country: &str) -> GeoRiskSignal {
        let (live, events) = tokio::join!(
            self.stability_feed.fetch_country_stability(country),
            self.event_feed.fetch_recent_events(country)
        );

        let resolved = self.resolve_with_live(country, live);
        let event = self.event_or_placeholder(country, events);

        self.assemble_geo_signal(&resolved, &event)
    }

    pub fn assemble_geo_signal(
        &self,
        resolved: &ResolvedCountryRisk,
        event: &EventSignal,
    ) -> GeoRiskSignal {
        let (headline, source_url) = if !event.is_placeholder {
            (event.headline.clone(), event.source_url.clone())
        } else if let Some(stored) = &resolved.stored {
            (
                stored.headline.clone(),
                stored.source_url.clone().unwrap_or_default(),
            )
        } else {
            (
                format!("No recent risk events recorded for {}", resolved.country),
                self.event_feed.home_url().to_string(),
            )
        };

        GeoRiskSignal {
            headline,
            source_url,
            r_external: normalize_country_risk(resolved.risk_score),
            risk_score_raw: resolved.risk_score,
            event_count: event.event_count,
            provenance: resolved.provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::CountryFactors;
    use crate::domain::preference::PreferenceProfile;
    use crate::domain::supplier::{ScheduleFact, SupplierFilter, SupplierProfile};
    use crate::engine::signals::{OfflineEventFeed, OfflineStabilityFeed, GDELT_HOME_URL};
    use crate::repository::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;

    /// 只提供国家风险记录的内存存储
    struct SignalOnlyStore {
        signals: Vec<CountrySignal>,
        fail: bool,
    }

    impl RiskDataStore for SignalOnlyStore {
        fn get_supplier_profile(&self, _id: i64) -> RepositoryResult<Option<SupplierProfile>> {
            Ok(None)
        }
        fn list_suppliers(&self, _f: &SupplierFilter) -> RepositoryResult<Vec<SupplierProfile>> {
            Ok(vec![])
        }
        fn get_schedule_facts(&self, _id: i64) -> RepositoryResult<Vec<ScheduleFact>> {
            Ok(vec![])
        }
        fn list_schedule_facts(&self) -> RepositoryResult<Vec<ScheduleFact>> {
            Ok(vec![])
        }
        fn get_stored_country_signal(&self, country: &str) -> RepositoryResult<Option<CountrySignal>> {
            if self.fail {
                return Err(RepositoryError::LockError("poisoned".to_string()));
            }
            Ok(self
                .signals
                .iter()
                .find(|s| s.country.eq_ignore_ascii_case(country))
                .cloned())
        }
        fn list_stored_country_signals(&self) -> RepositoryResult<Vec<CountrySignal>> {
            Ok(self.signals.clone())
        }
        fn list_country_factors(&self) -> RepositoryResult<Vec<CountryFactors>> {
            Ok(vec![])
        }
        fn get_preference_profile(&self, _id: i64) -> RepositoryResult<Option<PreferenceProfile>> {
            Ok(None)
        }
    }

    struct FixedStability(f64);

    #[async_trait]
    impl StabilityFeed for FixedStability {
        async fn fetch_country_stability(&self, _country: &str) -> FetchOutcome<f64> {
            FetchOutcome::Available(self.0)
        }
    }

    struct FixedEvents;

    #[async_trait]
    impl EventFeed for FixedEvents {
        fn home_url(&self) -> &str {
            GDELT_HOME_URL
        }
        async fn fetch_recent_events(&self, _country: &str) -> FetchOutcome<EventSignal> {
            FetchOutcome::Available(EventSignal {
                headline: "Strike at main port".to_string(),
                source_url: "https://news.example/strike".to_string(),
                event_count: 7,
                is_placeholder: false,
            })
        }
    }

    fn stored(country: &str, risk: f64) -> CountrySignal {
        CountrySignal {
            country: country.to_string(),
            risk_score: risk,
            headline: format!("Stored headline for {}", country),
            source_url: Some("https://stored.example".to_string()),
            provenance: Provenance::Stored,
            last_updated: None,
        }
    }

    fn resolver(
        stability: Arc<dyn StabilityFeed>,
        events: Arc<dyn EventFeed>,
        store: SignalOnlyStore,
    ) -> SignalResolver {
        SignalResolver::new(stability, events, Arc::new(store))
    }

    #[test]
    fn test_stability_normalization() {
        assert_eq!(stability_to_risk(0.0), 5.0);
        assert_eq!(stability_to_risk(-0.35), 5.7);
        assert_eq!(stability_to_risk(2.5), 0.0);
        assert_eq!(stability_to_risk(-3.0), 10.0);
        assert_eq!(normalize_country_risk(5.7), 0.57);
        assert_eq!(normalize_country_risk(12.0), 1.0);
    }

    #[tokio::test]
    async fn test_live_tier_wins() {
        let r = resolver(
            Arc::new(FixedStability(1.0)),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![stored("Japan", 8.0)],
                fail: false,
            },
        );
        let resolved = r.resolve_country_risk("Japan").await;
        assert_eq!(resolved.risk_score, 3.0);
        assert_eq!(resolved.provenance, Provenance::LiveService);
        assert!(resolved.stored.is_some());
    }

    #[tokio::test]
    async fn test_stored_tier_is_case_insensitive() {
        let r = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![stored("Vietnam", 6.2)],
                fail: false,
            },
        );
        let resolved = r.resolve_country_risk("vietnam").await;
        assert_eq!(resolved.risk_score, 6.2);
        assert_eq!(resolved.provenance, Provenance::Stored);
    }

    #[tokio::test]
    async fn test_unknown_country_defaults() {
        let r = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![],
                fail: false,
            },
        );
        let resolved = r.resolve_country_risk("Atlantis").await;
        assert_eq!(resolved.risk_score, 5.0);
        assert_eq!(resolved.provenance, Provenance::Default);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_default() {
        let r = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![],
                fail: true,
            },
        );
        let resolved = r.resolve_country_risk("India").await;
        assert_eq!(resolved.provenance, Provenance::Default);
    }

    #[tokio::test]
    async fn test_geo_signal_headline_fallbacks() {
        // 实时事件优先
        let live = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(FixedEvents),
            SignalOnlyStore {
                signals: vec![stored("India", 4.5)],
                fail: false,
            },
        );
        let geo = live.resolve_geo_signal("India").await;
        assert_eq!(geo.headline, "Strike at main port");
        assert_eq!(geo.event_count, 7);
        assert_eq!(geo.r_external, 0.45);
        assert_eq!(geo.provenance, Provenance::Stored);

        // 事件不可用 → 已存储标题
        let stored_only = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![stored("India", 4.5)],
                fail: false,
            },
        );
        let geo = stored_only.resolve_geo_signal("India").await;
        assert_eq!(geo.headline, "Stored headline for India");
        assert_eq!(geo.source_url, "https://stored.example");
        assert_eq!(geo.event_count, 0);

        // 两者都没有 → 固定提示
        let nothing = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![],
                fail: false,
            },
        );
        let geo = nothing.resolve_geo_signal("Peru").await;
        assert_eq!(geo.headline, "No recent risk events recorded for Peru");
        assert_eq!(geo.source_url, GDELT_HOME_URL);
        assert_eq!(geo.risk_score_raw, 5.0);
        assert_eq!(geo.r_external, 0.5);
    }

    #[tokio::test]
    async fn test_event_placeholder() {
        let r = resolver(
            Arc::new(OfflineStabilityFeed),
            Arc::new(OfflineEventFeed),
            SignalOnlyStore {
                signals: vec![],
                fail: false,
            },
        );
        let event = r.resolve_event_signal("Chile").await;
        assert!(event.is_placeholder);
        assert_eq!(event.event_count, 0);
        assert_eq!(event.headline, "No recent events retrieved for Chile");
    }
}
